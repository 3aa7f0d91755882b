//! Common, shared types.

pub mod clock;
pub mod difficulty;
pub mod error;
pub mod state;
pub mod tunables;

#[cfg(test)]
pub mod test_utils;
