//! Projectile messages.
//!
//! `FireRequest` is inbound intent from the host; the other two are outbound
//! facts written once per event.

use bevy::prelude::*;

use super::components::ProjectileId;
use crate::plugins::enemies::EnemyId;

/// Manual shot. Skips the auto-fire cadence but not the pool capacity.
#[derive(Message, Clone, Copy, Debug, Default)]
pub struct FireRequest {
    /// `None` fires from the player's position.
    pub origin: Option<Vec3>,
}

#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct ProjectileFired {
    pub id: ProjectileId,
    pub target: EnemyId,
    pub origin: Vec3,
    pub direction: Vec3,
}

/// A confirmed hit. `died` is set on exactly one hit per enemy.
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnemyHit {
    pub projectile: ProjectileId,
    pub target: EnemyId,
    pub damage: u32,
    pub new_health: u32,
    pub died: bool,
}
