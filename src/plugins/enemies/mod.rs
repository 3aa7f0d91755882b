//! Enemies plugin: spawning, movement and the per-enemy lifecycle.
//!
//! ---------------------------
//! HOW THIS IS DESIGNED
//! ---------------------------
//! 1) FACTS live in `EnemyRoster`:
//!    - one `Enemy` record per live enemy, tagged with its `EnemyKind`.
//!    - `LifecycleState` is the single source of truth for Spawning/Active/Dying/Removed.
//!
//! 2) RULES mutate facts in one place per tick (`advance_enemies`):
//!    countdowns and movement, then cleanup, then spawning.
//!    Lethal hits arrive as `EnemyHit` messages and are turned into Dying by
//!    `apply_lethal_hits`, after the projectile pass.
//!
//! 3) OUTPUT is messages: `EnemySpawned`, `EnemyReachedPlayer`, `EnemyDestroyed`
//!    for the host, `EnemyRemoved` for internal bookkeeping (health records).
//!
//! ---------------------------
//! STATE MACHINE
//! ---------------------------
//! Spawning -> Active -> Dying -> Removed, never backwards.
//! - Spawning and Dying are tick-counted; no animation callbacks are involved.
//! - Spawning enemies are already valid targets.
//! - Dying enemies are never targets. The transition into Dying is guarded, so
//!   any number of lethal hits in one tick produce one `EnemyDestroyed`.
//! - Reaching the player and the cleanup despawn both go straight to Removed.

use std::fmt;

use bevy::prelude::*;

use crate::common::{clock::SimClock, state::GameState, tunables::Tunables};
use crate::plugins::SimSet;
use crate::plugins::core::SimStats;
use crate::plugins::player::PlayerMotion;
use crate::plugins::projectiles::messages::EnemyHit;

pub mod realm;
pub mod roster;

pub use realm::{EnemyKind, Realm};
pub use roster::{EnemyRoster, LifecycleEvent, RosterSettings};

// -----------------------------------------------------------------------------
// Types
// -----------------------------------------------------------------------------

/// Opaque enemy identity. Issued from a monotonic counter, never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u64);

impl EnemyId {
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EnemyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "enemy-{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    Spawning { ticks_left: u32 },
    Active,
    Dying { ticks_left: u32 },
    Removed,
}

impl LifecycleState {
    /// Ordering used to enforce forward-only transitions.
    #[inline]
    pub fn rank(self) -> u8 {
        match self {
            LifecycleState::Spawning { .. } => 0,
            LifecycleState::Active => 1,
            LifecycleState::Dying { .. } => 2,
            LifecycleState::Removed => 3,
        }
    }

    /// Spawning and Active enemies can be acquired by projectiles.
    #[inline]
    pub fn is_targetable(self) -> bool {
        matches!(self, LifecycleState::Spawning { .. } | LifecycleState::Active)
    }
}

/// Why an enemy left the roster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemovalCause {
    ReachedPlayer,
    Destroyed,
    /// Fell too far behind the player. No host event.
    Despawned,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Enemy {
    pub id: EnemyId,
    pub kind: EnemyKind,
    pub position: Vec3,
    pub spawn_position: Vec3,
    pub speed: f32,
    pub scale_size: f32,
    pub base_health: u32,
    pub state: LifecycleState,
    pub spawned_at_ms: f64,
    /// Travel-axis gap to the player at the end of the previous step.
    pub(crate) last_ahead: f32,
}

impl Enemy {
    /// Move the state machine forward. Backward moves are bugs.
    #[inline]
    pub(crate) fn advance_state(&mut self, next: LifecycleState) {
        debug_assert!(
            next.rank() >= self.state.rank(),
            "{} tried to move from {:?} to {:?}",
            self.id,
            self.state,
            next
        );
        self.state = next;
    }

    #[inline]
    pub fn as_candidate(&self) -> TargetCandidate {
        TargetCandidate {
            id: self.id,
            position: self.position,
            base_health: self.base_health,
            spawn_position: self.spawn_position,
        }
    }

    /// Render scale: grows in while Spawning, shrinks out while Dying.
    pub fn presentation_scale(&self, spawn_ticks: u32, dying_ticks: u32) -> f32 {
        let t = match self.state {
            LifecycleState::Spawning { ticks_left } if spawn_ticks > 0 => {
                1.0 - ticks_left as f32 / spawn_ticks as f32
            }
            LifecycleState::Dying { ticks_left } if dying_ticks > 0 => {
                ticks_left as f32 / dying_ticks as f32
            }
            LifecycleState::Removed => 0.0,
            _ => 1.0,
        };
        self.scale_size * t.clamp(0.0, 1.0)
    }
}

/// Read-only view of an enemy that projectiles may acquire.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetCandidate {
    pub id: EnemyId,
    pub position: Vec3,
    pub base_health: u32,
    pub spawn_position: Vec3,
}

// -----------------------------------------------------------------------------
// Messages
// -----------------------------------------------------------------------------

#[derive(Message, Clone, Copy, Debug)]
pub struct EnemySpawned(pub Enemy);

/// One-shot: the enemy got to the player. It is already gone from the roster.
#[derive(Message, Clone, Copy, Debug)]
pub struct EnemyReachedPlayer(pub Enemy);

/// One-shot: the enemy finished dying.
#[derive(Message, Clone, Copy, Debug)]
pub struct EnemyDestroyed(pub Enemy);

/// Every removal, whatever the cause. Consumers release per-enemy state.
#[derive(Message, Clone, Copy, Debug)]
pub struct EnemyRemoved {
    pub id: EnemyId,
    pub cause: RemovalCause,
}

// -----------------------------------------------------------------------------
// Plugin wiring
// -----------------------------------------------------------------------------

/// Schedules (all FixedUpdate):
/// - `SimSet::Enemies`: `advance_enemies` (move, transitions, cleanup, spawn).
/// - `SimSet::Lifecycle`: `apply_lethal_hits`, after projectiles resolved damage.
pub fn plugin(app: &mut App) {
    let tunables = app.world().resource::<Tunables>().clone();
    match EnemyRoster::new(&tunables) {
        Ok(roster) => {
            app.insert_resource(roster);
        }
        Err(err) => error!("Enemy roster disabled: {err}"),
    }

    app.add_message::<EnemySpawned>()
        .add_message::<EnemyReachedPlayer>()
        .add_message::<EnemyDestroyed>()
        .add_message::<EnemyRemoved>()
        .add_systems(OnEnter(GameState::InGame), reset_roster)
        .add_systems(FixedUpdate, advance_enemies.in_set(SimSet::Enemies))
        .add_systems(FixedUpdate, apply_lethal_hits.in_set(SimSet::Lifecycle));
}

fn reset_roster(mut commands: Commands, tunables: Res<Tunables>) {
    match EnemyRoster::new(&tunables) {
        Ok(roster) => commands.insert_resource(roster),
        Err(err) => error!("Enemy roster not reset: {err}"),
    }
}

// -----------------------------------------------------------------------------
// Rules
// -----------------------------------------------------------------------------

/// One roster pass per fixed tick, then publish what happened.
pub fn advance_enemies(
    clock: Res<SimClock>,
    motion: Res<PlayerMotion>,
    roster: Option<ResMut<EnemyRoster>>,
    mut stats: ResMut<SimStats>,
    mut spawned: MessageWriter<EnemySpawned>,
    mut reached: MessageWriter<EnemyReachedPlayer>,
    mut destroyed: MessageWriter<EnemyDestroyed>,
    mut removed: MessageWriter<EnemyRemoved>,
) {
    let Some(mut roster) = roster else { return; };
    let player = motion.position;

    roster.step(clock.step_secs(), player);
    roster.update_cleanup(clock.step_ms(), player);
    roster.update_spawning(clock.step_ms(), clock.now_ms(), player);

    for event in roster.drain_events() {
        match event {
            LifecycleEvent::Spawned(enemy) => {
                stats.spawned += 1;
                trace!("Spawned {} ({:?}) at {}", enemy.id, enemy.kind, enemy.position);
                spawned.write(EnemySpawned(enemy));
            }
            LifecycleEvent::Removed { enemy, cause } => {
                match cause {
                    RemovalCause::ReachedPlayer => {
                        stats.reached_player += 1;
                        reached.write(EnemyReachedPlayer(enemy));
                    }
                    RemovalCause::Destroyed => {
                        stats.destroyed += 1;
                        destroyed.write(EnemyDestroyed(enemy));
                    }
                    RemovalCause::Despawned => {
                        stats.despawned += 1;
                        trace!("Despawned {} behind the player", enemy.id);
                    }
                }
                removed.write(EnemyRemoved { id: enemy.id, cause });
            }
        }
    }
}

/// Turn lethal hits into Dying. The roster guard drops repeats.
pub fn apply_lethal_hits(mut hits: MessageReader<EnemyHit>, roster: Option<ResMut<EnemyRoster>>) {
    let Some(mut roster) = roster else {
        hits.clear();
        return;
    };
    for hit in hits.read().filter(|h| h.died) {
        if roster.begin_dying(hit.target) {
            debug!("{} is dying", hit.target);
        }
    }
}
