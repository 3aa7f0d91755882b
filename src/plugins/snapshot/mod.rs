//! Snapshot plugin: the read-only view a renderer consumes.
//!
//! Rebuilt once per frame in `PostUpdate`, after every fixed tick of the frame
//! has run. Buffers are cleared and refilled, never reallocated in steady state.

use bevy::prelude::*;

use crate::common::{clock::SimClock, state::GameState, tunables::Tunables};
use crate::plugins::damage::DamageRegistry;
use crate::plugins::enemies::{EnemyId, EnemyKind, EnemyRoster, LifecycleState};
use crate::plugins::player::PlayerMotion;
use crate::plugins::projectiles::ProjectileEngine;
use crate::plugins::projectiles::components::ProjectileId;
use crate::plugins::world::{Chunk, ChunkStreamer};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyView {
    pub id: EnemyId,
    pub kind: EnemyKind,
    pub position: Vec3,
    /// Render scale including the spawn grow-in and the dying shrink.
    pub scale: f32,
    pub state: LifecycleState,
    pub health_fraction: f32,
    pub recently_hit: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileView {
    pub id: ProjectileId,
    pub position: Vec3,
}

#[derive(Resource, Debug, Default, Clone)]
pub struct SimSnapshot {
    pub tick: u64,
    pub now_ms: f64,
    pub player: Vec3,
    pub chunks: Vec<Chunk>,
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<ProjectileView>,
}

pub fn plugin(app: &mut App) {
    app.init_resource::<SimSnapshot>().add_systems(
        PostUpdate,
        rebuild_snapshot.run_if(in_state(GameState::InGame)),
    );
}

pub fn rebuild_snapshot(
    tunables: Res<Tunables>,
    clock: Res<SimClock>,
    motion: Res<PlayerMotion>,
    streamer: Res<ChunkStreamer>,
    roster: Option<Res<EnemyRoster>>,
    registry: Res<DamageRegistry>,
    engine: Res<ProjectileEngine>,
    mut snapshot: ResMut<SimSnapshot>,
) {
    let snapshot = &mut *snapshot;
    snapshot.tick = clock.ticks();
    snapshot.now_ms = clock.now_ms();
    snapshot.player = motion.position;

    snapshot.chunks.clear();
    if let Some(window) = streamer.window() {
        snapshot.chunks.extend(window.chunks());
    }

    snapshot.enemies.clear();
    if let Some(roster) = roster {
        let now = clock.now_ms();
        snapshot.enemies.extend(roster.iter().map(|e| EnemyView {
            id: e.id,
            kind: e.kind,
            position: e.position,
            scale: e.presentation_scale(tunables.spawn_ticks, tunables.dying_ticks),
            state: e.state,
            health_fraction: registry.health_fraction(e.id),
            recently_hit: registry.is_recently_hit(e.id, now, tunables.hit_flash_window_ms),
        }));
    }

    snapshot.projectiles.clear();
    snapshot.projectiles.extend(
        engine
            .pool()
            .active()
            .map(|p| ProjectileView { id: p.id, position: p.position }),
    );
}

#[cfg(test)]
mod tests;
