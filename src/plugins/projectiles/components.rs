use std::fmt;

use bevy::prelude::*;

use crate::plugins::enemies::EnemyId;

/// Pool slot plus the claim generation, unique across slot reuse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProjectileId {
    pub slot: u32,
    pub generation: u32,
}

impl fmt::Display for ProjectileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "projectile-{}.{}", self.slot, self.generation)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProjectileState {
    #[default]
    Inactive,
    Active,
    /// Finished this tick. Goes back on the free list at the next commit.
    PendingReturn,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projectile {
    pub id: ProjectileId,
    pub state: ProjectileState,
    pub position: Vec3,
    /// Where it was fired from. Travel is measured against this.
    pub origin: Vec3,
    /// Unit vector, fixed at fire time.
    pub direction: Vec3,
    pub speed: f32,
    pub damage: u32,
    pub target: EnemyId,
    pub remaining_life: f32,
    pub fired_at_ms: f64,
}

impl Projectile {
    pub(crate) fn inactive(slot: u32) -> Self {
        Self {
            id: ProjectileId { slot, generation: 0 },
            state: ProjectileState::Inactive,
            position: Vec3::ZERO,
            origin: Vec3::ZERO,
            direction: Vec3::ZERO,
            speed: 0.0,
            damage: 0,
            target: EnemyId::from_raw(0),
            remaining_life: 0.0,
            fired_at_ms: 0.0,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.state == ProjectileState::Active
    }
}

/// Weapon stats written by the upgrade layer. The simulation only reads them.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct CombatStats {
    pub damage: u32,
    pub fire_interval_ms: f64,
    pub range: f32,
}

impl Default for CombatStats {
    fn default() -> Self {
        Self { damage: 1, fire_interval_ms: 400.0, range: 60.0 }
    }
}
