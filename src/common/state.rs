//! Session state.
//!
//! Every simulation system runs only in `InGame`. The host moves to `GameOver`
//! to stop ticking; entering `InGame` again starts a fresh session with reset
//! resources and the configured seed.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, States, Default)]
pub enum GameState {
    #[default]
    InGame,
    GameOver,
}
