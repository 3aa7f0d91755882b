//! Core plugin: shared resources, the simulation clock and session counters.

use bevy::prelude::*;

use crate::common::{clock::SimClock, state::GameState, tunables::Tunables};
use crate::plugins::SimSet;

/// Running totals for the session. Only ever incremented.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SimStats {
    pub spawned: u64,
    pub reached_player: u64,
    pub destroyed: u64,
    /// Enemies silently removed for falling too far behind.
    pub despawned: u64,
    pub shots_fired: u64,
    /// Fire attempts that found a target but no free pool slot.
    pub shots_dropped: u64,
    pub hits: u64,
}

/// Sim time between progress log lines.
const PROGRESS_LOG_INTERVAL_MS: f64 = 10_000.0;

pub fn plugin(app: &mut App) {
    if !app.world().contains_resource::<Tunables>() {
        app.insert_resource(Tunables::default());
    }
    let tick_hz = app.world().resource::<Tunables>().tick_hz;

    app.insert_resource(Time::<Fixed>::from_hz(tick_hz))
        .init_resource::<SimClock>()
        .init_resource::<SimStats>()
        .add_systems(OnEnter(GameState::InGame), reset_session)
        .add_systems(OnEnter(GameState::GameOver), log_session_end)
        .add_systems(FixedUpdate, advance_clock.in_set(SimSet::Input))
        .add_systems(FixedPostUpdate, log_progress.run_if(in_state(GameState::InGame)));
}

fn reset_session(
    tunables: Res<Tunables>,
    mut clock: ResMut<SimClock>,
    mut stats: ResMut<SimStats>,
) {
    *clock = SimClock::default();
    *stats = SimStats::default();
    info!(
        "Session start: realm={:?} seed={:#x} tick_hz={} pool={}",
        tunables.realm, tunables.seed, tunables.tick_hz, tunables.projectile_pool_capacity
    );
}

fn log_session_end(clock: Res<SimClock>, stats: Res<SimStats>) {
    info!(
        "Session over after {} ticks ({:.1}s): {:?}",
        clock.ticks(),
        clock.now_ms() / 1000.0,
        *stats
    );
}

/// First system of every fixed tick.
pub fn advance_clock(time: Res<Time<Fixed>>, mut clock: ResMut<SimClock>) {
    clock.advance(time.delta_secs());
}

/// First tick of a session, then every tick that crosses a multiple of
/// `PROGRESS_LOG_INTERVAL_MS`. Reads only the clock, so a session reset
/// restarts the cadence.
pub(crate) fn progress_due(clock: &SimClock) -> bool {
    if clock.ticks() == 1 {
        return true;
    }
    let now = clock.now_ms();
    let prev = now - clock.step_ms();
    (now / PROGRESS_LOG_INTERVAL_MS).floor() > (prev / PROGRESS_LOG_INTERVAL_MS).floor()
}

fn log_progress(clock: Res<SimClock>, stats: Res<SimStats>) {
    if !progress_due(&clock) {
        return;
    }
    info!(
        "t={:.1}s spawned={} destroyed={} reached={} despawned={} shots={} dropped={} hits={}",
        clock.now_ms() / 1000.0,
        stats.spawned,
        stats.destroyed,
        stats.reached_player,
        stats.despawned,
        stats.shots_fired,
        stats.shots_dropped,
        stats.hits,
    );
}

#[cfg(test)]
mod tests;
