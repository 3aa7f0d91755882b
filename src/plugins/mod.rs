//! Feature plugins.

use bevy::prelude::*;

use crate::common::state::GameState;
use crate::plugins::projectiles::ProjectilesPlugin;

pub mod core;
pub mod damage;
pub mod enemies;
pub mod player;
pub mod projectiles;
pub mod snapshot;
pub mod world;

/// Per-tick order inside `FixedUpdate`. Chained, so each set sees the
/// previous set's writes.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimSet {
    /// Clock and player motion.
    Input,
    Chunks,
    /// Countdowns, movement, cleanup, spawning.
    Enemies,
    /// Projectile advance, hits, auto-fire.
    Projectiles,
    /// Lethal hits become Dying; removed enemies release their health.
    Lifecycle,
}

/// Register every simulation plugin. Works headless.
pub fn register_gameplay(app: &mut App) {
    app.configure_sets(
        FixedUpdate,
        (
            SimSet::Input,
            SimSet::Chunks,
            SimSet::Enemies,
            SimSet::Projectiles,
            SimSet::Lifecycle,
        )
            .chain()
            .run_if(in_state(GameState::InGame)),
    );

    core::plugin(app);
    player::plugin(app);
    world::plugin(app);
    enemies::plugin(app);
    damage::plugin(app);
    app.add_plugins(ProjectilesPlugin);
    snapshot::plugin(app);
}
