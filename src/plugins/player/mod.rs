//! Player plugin.
//!
//! The player is an inbound fact: the host writes `PlayerMotion::position`
//! (usually from its own controller) and the simulation only reads it. For the
//! headless demo, `auto_run_speed` moves the player along +Z every fixed tick.
//!
//! The travel axis is world Z. Displacement is the player's Z coordinate.

use bevy::prelude::*;

use crate::common::{clock::SimClock, state::GameState, tunables::Tunables};
use crate::plugins::SimSet;
use crate::plugins::core::advance_clock;

#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerMotion {
    pub position: Vec3,
}

impl PlayerMotion {
    /// Progress along the travel axis.
    #[inline]
    pub fn displacement(&self) -> f32 {
        self.position.z
    }

    /// Distance used for difficulty scaling. Never negative.
    #[inline]
    pub fn travel_distance(&self) -> f32 {
        if self.position.z.is_finite() { self.position.z.max(0.0) } else { 0.0 }
    }
}

pub fn plugin(app: &mut App) {
    app.insert_resource(PlayerMotion::default())
        .add_systems(OnEnter(GameState::InGame), reset_player)
        .add_systems(
            FixedUpdate,
            auto_run.in_set(SimSet::Input).after(advance_clock),
        );
}

fn reset_player(mut motion: ResMut<PlayerMotion>) {
    *motion = PlayerMotion::default();
}

fn auto_run(tunables: Res<Tunables>, clock: Res<SimClock>, mut motion: ResMut<PlayerMotion>) {
    if tunables.auto_run_speed <= 0.0 {
        return;
    }
    motion.position.z += tunables.auto_run_speed * clock.step_secs();
}

#[cfg(test)]
mod tests;
