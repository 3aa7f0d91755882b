//! Projectiles plugin: pooled shots, target selection and hit resolution.
//!
//! # Data flow (one fixed tick)
//! ```text
//!   SimSet::Projectiles
//!┌────────────────────────────────────────────────────────────────────────────┐
//!│  (A) run_projectiles                                                       │
//!│      - reads: EnemyRoster candidates (Spawning/Active, positions after     │
//!│               this tick's move), PlayerMotion, CombatStats, SimClock       │
//!│      - advance: every Active slot moves, then hit/expiry check             │
//!│      - mutates: DamageRegistry (through DamageSink)                        │
//!│      - commit: PendingReturn slots go back on the free list                │
//!│      - auto-fire: at most one shot per fire interval                       │
//!│      - writes: EnemyHit, ProjectileFired                                   │
//!│                                                                            │
//!│  (B) handle_fire_requests                                                  │
//!│      - reads: FireRequest messages                                         │
//!│      - same candidates and kills as (A), no cadence                        │
//!└────────────────────────────────────────────────────────────────────────────┘
//!                │
//!                v
//!   SimSet::Lifecycle: EnemyHit { died: true } -> Dying
//! ```
//!
//! # Rules
//! - Direction is fixed at fire time. There is no homing.
//! - The hit test uses the target's position for the current tick.
//! - A target that left the candidate list (removed, Dying, killed earlier in
//!   this tick) ends the flight without a hit.
//! - Pool exhaustion drops the shot. It is counted, never an error.

use std::mem;

use bevy::prelude::*;

use crate::common::{clock::SimClock, state::GameState, tunables::Tunables};
use crate::plugins::SimSet;
use crate::plugins::core::SimStats;
use crate::plugins::damage::{DamageRegistry, DamageSink};
use crate::plugins::enemies::{EnemyId, EnemyRoster, TargetCandidate};
use crate::plugins::player::PlayerMotion;

pub mod collision;
pub mod components;
pub mod messages;
pub mod pool;
pub mod request;
pub mod targeting;

use collision::{FlightLimits, advance_projectiles};
use components::{CombatStats, ProjectileId};
use messages::{EnemyHit, FireRequest, ProjectileFired};
use pool::{Launch, ProjectilePool};
use targeting::{TargetPolicy, TargetSelector, any_in_range};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSettings {
    pub speed: f32,
    pub lifetime_secs: f32,
    pub limits: FlightLimits,
}

impl From<&Tunables> for ProjectileSettings {
    fn from(t: &Tunables) -> Self {
        Self {
            speed: t.projectile_speed,
            lifetime_secs: t.projectile_lifetime_secs,
            limits: FlightLimits {
                hit_radius: t.projectile_hit_radius,
                max_travel: t.projectile_max_travel,
            },
        }
    }
}

#[derive(Resource, Debug)]
pub struct ProjectileEngine {
    pool: ProjectilePool,
    selector: TargetSelector,
    settings: ProjectileSettings,
    since_last_shot_ms: f64,
    candidates: Vec<TargetCandidate>,
    /// Enemies whose health hit zero during the current tick.
    killed: Vec<EnemyId>,
    hits: Vec<EnemyHit>,
    fired: Vec<ProjectileFired>,
    dropped: u64,
}

impl ProjectileEngine {
    pub fn new(tunables: &Tunables) -> Self {
        Self::with_settings(
            tunables.projectile_pool_capacity,
            tunables.target_policy,
            ProjectileSettings::from(tunables),
        )
    }

    pub fn with_settings(capacity: usize, policy: TargetPolicy, settings: ProjectileSettings) -> Self {
        Self {
            pool: ProjectilePool::new(capacity),
            selector: TargetSelector::new(policy),
            settings,
            since_last_shot_ms: f64::INFINITY,
            candidates: Vec::new(),
            killed: Vec::new(),
            hits: Vec::with_capacity(capacity),
            fired: Vec::with_capacity(capacity),
            dropped: 0,
        }
    }

    pub fn pool(&self) -> &ProjectilePool {
        &self.pool
    }

    /// Fire one projectile at the target chosen by the policy.
    ///
    /// `None` for a non-finite origin, no candidate in `stats.range`, or a
    /// full pool. A full pool also bumps the dropped-shot counter.
    pub fn fire(
        &mut self,
        origin: Vec3,
        candidates: &[TargetCandidate],
        stats: &CombatStats,
        now_ms: f64,
    ) -> Option<ProjectileId> {
        if !origin.is_finite() {
            debug!("Fire skipped: non-finite origin {origin:?}");
            return None;
        }
        if candidates.is_empty() {
            return None;
        }
        let target = self.selector.select(origin, candidates, &self.killed, stats.range)?;
        let direction = (target.position - origin).normalize_or(Vec3::Z);

        let launch = Launch {
            origin,
            direction,
            speed: self.settings.speed,
            damage: stats.damage,
            target: target.id,
            lifetime_secs: self.settings.lifetime_secs,
            now_ms,
        };
        let Some(id) = self.pool.claim(launch) else {
            self.dropped += 1;
            debug!(
                "Projectile pool exhausted ({} slots); shot at {} dropped",
                self.pool.capacity(),
                target.id
            );
            return None;
        };

        self.fired.push(ProjectileFired { id, target: target.id, origin, direction });
        Some(id)
    }

    /// Fire against the candidates captured by the last `tick`.
    pub fn fire_at_current(&mut self, origin: Vec3, stats: &CombatStats, now_ms: f64) -> Option<ProjectileId> {
        let candidates = mem::take(&mut self.candidates);
        let id = self.fire(origin, &candidates, stats, now_ms);
        self.candidates = candidates;
        id
    }

    /// One fixed step: advance and resolve, recycle finished slots, then auto-fire.
    pub fn tick(
        &mut self,
        dt_secs: f32,
        now_ms: f64,
        origin: Vec3,
        candidates: &[TargetCandidate],
        stats: &CombatStats,
        sink: &mut impl DamageSink,
    ) {
        let dt_secs = if dt_secs.is_finite() { dt_secs.max(0.0) } else { 0.0 };

        self.killed.clear();
        self.candidates.clear();
        self.candidates.extend_from_slice(candidates);

        advance_projectiles(
            &mut self.pool,
            dt_secs,
            now_ms,
            &self.candidates,
            &mut self.killed,
            self.settings.limits,
            sink,
            &mut self.hits,
        );
        self.pool.commit_returns();

        if !stats.fire_interval_ms.is_finite() {
            return;
        }
        self.since_last_shot_ms += f64::from(dt_secs) * 1000.0;
        if self.since_last_shot_ms < stats.fire_interval_ms.max(0.0) {
            return;
        }
        if !any_in_range(origin, &self.candidates, &self.killed, stats.range) {
            return;
        }
        self.since_last_shot_ms = 0.0;
        self.fire_at_current(origin, stats, now_ms);
    }

    pub fn drain_hits(&mut self) -> std::vec::Drain<'_, EnemyHit> {
        self.hits.drain(..)
    }

    pub fn drain_fired(&mut self) -> std::vec::Drain<'_, ProjectileFired> {
        self.fired.drain(..)
    }

    /// Shots dropped on a full pool since the last call.
    pub fn take_dropped(&mut self) -> u64 {
        mem::take(&mut self.dropped)
    }
}

pub struct ProjectilesPlugin;

impl Plugin for ProjectilesPlugin {
    fn build(&self, app: &mut App) {
        let engine = ProjectileEngine::new(app.world().resource::<Tunables>());

        app.insert_resource(engine)
            .init_resource::<CombatStats>()
            .add_message::<FireRequest>()
            .add_message::<ProjectileFired>()
            .add_message::<EnemyHit>()
            .add_systems(OnEnter(GameState::InGame), reset_engine)
            .add_systems(
                FixedUpdate,
                (run_projectiles, request::handle_fire_requests)
                    .chain()
                    .in_set(SimSet::Projectiles),
            );
    }
}

fn reset_engine(tunables: Res<Tunables>, mut engine: ResMut<ProjectileEngine>) {
    *engine = ProjectileEngine::new(&tunables);
}

pub fn run_projectiles(
    clock: Res<SimClock>,
    motion: Res<PlayerMotion>,
    combat: Res<CombatStats>,
    roster: Option<Res<EnemyRoster>>,
    mut registry: ResMut<DamageRegistry>,
    mut engine: ResMut<ProjectileEngine>,
    mut stats: ResMut<SimStats>,
    mut candidates: Local<Vec<TargetCandidate>>,
    mut fired: MessageWriter<ProjectileFired>,
    mut hits: MessageWriter<EnemyHit>,
) {
    match roster {
        Some(roster) => roster.candidates_into(&mut candidates),
        None => candidates.clear(),
    }

    engine.tick(
        clock.step_secs(),
        clock.now_ms(),
        motion.position,
        &candidates,
        &combat,
        &mut *registry,
    );

    publish(&mut engine, &mut stats, &mut fired, &mut hits);
}

/// Move buffered engine output into messages and counters.
fn publish(
    engine: &mut ProjectileEngine,
    stats: &mut SimStats,
    fired: &mut MessageWriter<ProjectileFired>,
    hits: &mut MessageWriter<EnemyHit>,
) {
    for hit in engine.drain_hits() {
        stats.hits += 1;
        if hit.died {
            debug!("{} killed {}", hit.projectile, hit.target);
        }
        hits.write(hit);
    }
    for shot in engine.drain_fired() {
        stats.shots_fired += 1;
        trace!("{} fired at {}", shot.id, shot.target);
        fired.write(shot);
    }
    stats.shots_dropped += engine.take_dropped();
}
