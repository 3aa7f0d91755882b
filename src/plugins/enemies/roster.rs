//! Enemy roster: owns every live enemy and drives its state machine.
//!
//! All transitions happen here, once per fixed tick, in this order:
//! 1. `step`: Spawning/Dying countdowns, movement, reached-player check.
//! 2. `update_cleanup`: silent removal of enemies left far behind.
//! 3. `update_spawning`: at most one spawn per interval, capped by `max_enemies`.
//!
//! Removed enemies are dropped from the roster at the end of the pass that removed
//! them. Ids come from a monotonic counter and are never handed out twice.

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use super::realm::{EnemyKind, KindTable, Realm};
use super::{Enemy, EnemyId, LifecycleState, RemovalCause, TargetCandidate};
use crate::common::difficulty::{DifficultyCurve, spawn_interval_ms};
use crate::common::error::ConfigError;
use crate::common::tunables::Tunables;

/// Roster knobs, copied out of `Tunables` when the roster is built.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RosterSettings {
    pub max_enemies: usize,
    pub spawn_interval_ms: f64,
    pub min_spawn_interval_ms: f64,
    pub spawn_interval_shrink_distance: f32,
    pub spawn_distance_min: f32,
    pub spawn_distance_max: f32,
    pub spawn_lateral_half_width: f32,
    pub reach_threshold: f32,
    pub cleanup_interval_ms: f64,
    pub cleanup_distance: f32,
    pub spawn_ticks: u32,
    pub dying_ticks: u32,
    pub difficulty: DifficultyCurve,
}

impl From<&Tunables> for RosterSettings {
    fn from(t: &Tunables) -> Self {
        Self {
            max_enemies: t.max_enemies,
            spawn_interval_ms: t.spawn_interval_ms,
            min_spawn_interval_ms: t.min_spawn_interval_ms,
            spawn_interval_shrink_distance: t.spawn_interval_shrink_distance,
            spawn_distance_min: t.spawn_distance_min,
            spawn_distance_max: t.spawn_distance_max,
            spawn_lateral_half_width: t.spawn_lateral_half_width,
            reach_threshold: t.reach_threshold,
            cleanup_interval_ms: t.cleanup_interval_ms,
            cleanup_distance: t.cleanup_distance,
            spawn_ticks: t.spawn_ticks,
            dying_ticks: t.dying_ticks,
            difficulty: t.difficulty(),
        }
    }
}

/// Something that happened to an enemy during a roster pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LifecycleEvent {
    Spawned(Enemy),
    Removed { enemy: Enemy, cause: RemovalCause },
}

#[derive(Resource, Debug)]
pub struct EnemyRoster {
    enemies: Vec<Enemy>,
    next_id: u64,
    table: KindTable,
    rng: Xoshiro256PlusPlus,
    since_spawn_ms: f64,
    since_cleanup_ms: f64,
    settings: RosterSettings,
    events: Vec<LifecycleEvent>,
}

impl EnemyRoster {
    pub fn new(tunables: &Tunables) -> Result<Self, ConfigError> {
        Self::with_settings(tunables.realm, tunables.seed, RosterSettings::from(tunables))
    }

    pub fn with_settings(realm: Realm, seed: u64, settings: RosterSettings) -> Result<Self, ConfigError> {
        Ok(Self {
            enemies: Vec::with_capacity(settings.max_enemies),
            next_id: 1,
            table: KindTable::new(realm)?,
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            since_spawn_ms: 0.0,
            since_cleanup_ms: 0.0,
            settings,
            events: Vec::with_capacity(settings.max_enemies),
        })
    }

    pub fn settings(&self) -> &RosterSettings {
        &self.settings
    }

    /// Every enemy not yet removed, Dying ones included.
    #[inline]
    pub fn live_count(&self) -> usize {
        self.enemies.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter()
    }

    pub fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    /// Refill `out` with the enemies projectiles may acquire, in spawn order.
    pub fn candidates_into(&self, out: &mut Vec<TargetCandidate>) {
        out.clear();
        out.extend(
            self.enemies
                .iter()
                .filter(|e| e.state.is_targetable())
                .map(Enemy::as_candidate),
        );
    }

    /// Take the events produced since the last drain.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, LifecycleEvent> {
        self.events.drain(..)
    }

    /// Spawn cadence at the given travel distance.
    pub fn current_spawn_interval_ms(&self, travel_distance: f32) -> f64 {
        spawn_interval_ms(
            self.settings.spawn_interval_ms,
            self.settings.min_spawn_interval_ms,
            self.settings.spawn_interval_shrink_distance,
            travel_distance,
        )
    }

    /// Advance countdowns and movement by one tick.
    ///
    /// Enemies travel along -Z toward a player running along +Z. Reaching the
    /// player is detected as a crossing of `reach_threshold`, so it fires once.
    /// The crossing counts when the enemy's own move this tick carried it over
    /// the threshold, however far, or when it ends up within the threshold band.
    /// An enemy the player jumped far past crosses neither way; it is left for
    /// `update_cleanup`.
    pub fn step(&mut self, dt_secs: f32, player: Vec3) {
        let threshold = self.settings.reach_threshold;

        for enemy in &mut self.enemies {
            match enemy.state {
                LifecycleState::Spawning { ticks_left } => {
                    let next = if ticks_left <= 1 {
                        LifecycleState::Active
                    } else {
                        LifecycleState::Spawning { ticks_left: ticks_left - 1 }
                    };
                    enemy.advance_state(next);
                }
                LifecycleState::Dying { ticks_left } => {
                    if ticks_left <= 1 {
                        enemy.advance_state(LifecycleState::Removed);
                        self.events.push(LifecycleEvent::Removed {
                            enemy: *enemy,
                            cause: RemovalCause::Destroyed,
                        });
                    } else {
                        enemy.advance_state(LifecycleState::Dying { ticks_left: ticks_left - 1 });
                    }
                    continue;
                }
                LifecycleState::Active | LifecycleState::Removed => {}
            }

            if !enemy.state.is_targetable() {
                continue;
            }

            let travel = enemy.speed * dt_secs;
            enemy.position.z -= travel;

            let ahead = enemy.position.z - player.z;
            let before_move = ahead + travel;
            let crossed = enemy.last_ahead > threshold
                && ahead <= threshold
                && (before_move > threshold || ahead >= -threshold);
            enemy.last_ahead = ahead;
            if crossed {
                enemy.advance_state(LifecycleState::Removed);
                self.events.push(LifecycleEvent::Removed {
                    enemy: *enemy,
                    cause: RemovalCause::ReachedPlayer,
                });
            }
        }

        self.prune_removed();
    }

    /// Silently remove Spawning/Active enemies further than `cleanup_distance`
    /// behind the player. Runs once per `cleanup_interval_ms`.
    pub fn update_cleanup(&mut self, step_ms: f64, player: Vec3) {
        self.since_cleanup_ms += step_ms;
        if self.since_cleanup_ms < self.settings.cleanup_interval_ms {
            return;
        }
        self.since_cleanup_ms = 0.0;

        let limit = self.settings.cleanup_distance;
        for enemy in &mut self.enemies {
            if !enemy.state.is_targetable() {
                continue;
            }
            if player.z - enemy.position.z > limit {
                enemy.advance_state(LifecycleState::Removed);
                self.events.push(LifecycleEvent::Removed {
                    enemy: *enemy,
                    cause: RemovalCause::Despawned,
                });
            }
        }
        self.prune_removed();
    }

    /// Spawn at most one enemy if the interval has elapsed and the cap allows.
    ///
    /// At the cap the timer keeps running, so the next spawn happens as soon as
    /// a slot frees up.
    pub fn update_spawning(&mut self, step_ms: f64, now_ms: f64, player: Vec3) -> Option<EnemyId> {
        self.since_spawn_ms += step_ms;

        let travel = if player.z.is_finite() { player.z.max(0.0) } else { 0.0 };
        if self.since_spawn_ms < self.current_spawn_interval_ms(travel) {
            return None;
        }
        if self.live_count() >= self.settings.max_enemies {
            trace!("Spawn skipped: {} live enemies at cap", self.live_count());
            return None;
        }
        if !player.is_finite() {
            debug!("Spawn skipped: non-finite player position {player:?}");
            return None;
        }

        self.since_spawn_ms = 0.0;
        Some(self.spawn_near(now_ms, player))
    }

    /// Spawn one enemy ahead of `player` regardless of cadence or cap.
    pub(crate) fn spawn_near(&mut self, now_ms: f64, player: Vec3) -> EnemyId {
        let s = self.settings;
        let kind = self.table.pick(&mut self.rng).kind;
        let ahead = self.rng.gen_range(s.spawn_distance_min..=s.spawn_distance_max);
        let lateral = self
            .rng
            .gen_range(-s.spawn_lateral_half_width..=s.spawn_lateral_half_width);

        let position = Vec3::new(player.x + lateral, 0.0, player.z + ahead);
        self.insert_new(kind, position, now_ms)
    }

    /// Scripted spawn of a given kind at an exact position. Skips the cadence
    /// and the random band but still honours the cap.
    pub fn spawn_kind_at(&mut self, kind: EnemyKind, position: Vec3, now_ms: f64) -> Option<EnemyId> {
        if self.live_count() >= self.settings.max_enemies {
            debug!("Scripted spawn of {kind:?} skipped: at cap");
            return None;
        }
        if !position.is_finite() {
            debug!("Scripted spawn of {kind:?} skipped: non-finite position {position:?}");
            return None;
        }
        Some(self.insert_new(kind, position, now_ms))
    }

    fn insert_new(&mut self, kind: EnemyKind, position: Vec3, now_ms: f64) -> EnemyId {
        let s = self.settings;
        let stats = kind.stats();
        let spawn_distance = position.z.max(0.0);

        let id = EnemyId(self.next_id);
        self.next_id += 1;

        let state = if s.spawn_ticks == 0 {
            LifecycleState::Active
        } else {
            LifecycleState::Spawning { ticks_left: s.spawn_ticks }
        };

        let enemy = Enemy {
            id,
            kind,
            position,
            spawn_position: position,
            speed: s.difficulty.scaled_speed(stats.base_speed, spawn_distance),
            scale_size: stats.scale_size,
            base_health: stats.base_health,
            state,
            spawned_at_ms: now_ms,
            last_ahead: f32::INFINITY,
        };
        self.enemies.push(enemy);
        self.events.push(LifecycleEvent::Spawned(enemy));
        id
    }

    /// Active/Spawning -> Dying. Returns `false` if the enemy is unknown or already
    /// past that point, which makes repeated lethal hits harmless.
    pub fn begin_dying(&mut self, id: EnemyId) -> bool {
        let dying_ticks = self.settings.dying_ticks;
        let Some(enemy) = self.enemies.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        if !enemy.state.is_targetable() {
            return false;
        }
        enemy.advance_state(LifecycleState::Dying { ticks_left: dying_ticks.max(1) });
        true
    }

    fn prune_removed(&mut self) {
        self.enemies.retain(|e| e.state != LifecycleState::Removed);
    }

    #[cfg(test)]
    pub(crate) fn insert_for_test(&mut self, enemy: Enemy) {
        self.next_id = self.next_id.max(enemy.id.0 + 1);
        self.enemies.push(enemy);
    }
}
