//! Fixed-capacity projectile pool.
//!
//! Every slot is allocated up front. A slot moves
//! `Inactive -> Active -> PendingReturn -> Inactive`, and only `commit_returns`
//! puts slots back on the free list, so a slot finished mid-tick cannot be
//! claimed again in the same collision pass.

use bevy::prelude::*;

use super::components::{Projectile, ProjectileId, ProjectileState};
use crate::plugins::enemies::EnemyId;

/// Everything needed to put a projectile in flight.
#[derive(Clone, Copy, Debug)]
pub struct Launch {
    pub origin: Vec3,
    pub direction: Vec3,
    pub speed: f32,
    pub damage: u32,
    pub target: EnemyId,
    pub lifetime_secs: f32,
    pub now_ms: f64,
}

#[derive(Debug, Clone)]
pub struct ProjectilePool {
    slots: Vec<Projectile>,
    free: Vec<u32>,
}

impl ProjectilePool {
    pub fn new(capacity: usize) -> Self {
        let capacity = u32::try_from(capacity).unwrap_or(u32::MAX);
        let slots = (0..capacity).map(Projectile::inactive).collect();
        // Popped from the back, so slot 0 goes out first.
        let free = (0..capacity).rev().collect();
        Self { slots, free }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|p| p.is_active()).count()
    }

    pub fn active(&self) -> impl Iterator<Item = &Projectile> {
        self.slots.iter().filter(|p| p.is_active())
    }

    pub fn get(&self, id: ProjectileId) -> Option<&Projectile> {
        self.slots
            .get(id.slot as usize)
            .filter(|p| p.id == id && p.state != ProjectileState::Inactive)
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [Projectile] {
        &mut self.slots
    }

    /// `None` when every slot is in use.
    pub fn claim(&mut self, launch: Launch) -> Option<ProjectileId> {
        let slot = self.free.pop()?;
        let p = &mut self.slots[slot as usize];
        debug_assert_eq!(p.state, ProjectileState::Inactive, "free list held a busy slot");

        p.id.generation = p.id.generation.wrapping_add(1);
        p.state = ProjectileState::Active;
        p.position = launch.origin;
        p.origin = launch.origin;
        p.direction = launch.direction;
        p.speed = launch.speed;
        p.damage = launch.damage;
        p.target = launch.target;
        p.remaining_life = launch.lifetime_secs;
        p.fired_at_ms = launch.now_ms;
        Some(p.id)
    }

    /// Recycle every `PendingReturn` slot. Returns how many were freed.
    pub fn commit_returns(&mut self) -> usize {
        let mut freed = 0;
        for p in &mut self.slots {
            if p.state != ProjectileState::PendingReturn {
                continue;
            }
            p.state = ProjectileState::Inactive;
            p.direction = Vec3::ZERO;
            p.speed = 0.0;
            self.free.push(p.id.slot);
            freed += 1;
        }
        freed
    }

    /// Every slot back to Inactive. Generations are kept so ids stay unique.
    pub fn reset(&mut self) {
        for p in &mut self.slots {
            if p.state != ProjectileState::Inactive {
                p.state = ProjectileState::PendingReturn;
            }
        }
        self.commit_returns();
    }
}
