//! Manual fire requests.
//!
//! The host only writes `FireRequest`; it never touches the engine. Requests
//! are consumed right after the auto-fire pass, against the same candidate
//! list, so a target killed earlier in the tick cannot be picked.

use bevy::prelude::*;

use super::components::CombatStats;
use super::messages::{EnemyHit, FireRequest, ProjectileFired};
use super::{ProjectileEngine, publish};
use crate::common::clock::SimClock;
use crate::plugins::core::SimStats;
use crate::plugins::player::PlayerMotion;

pub fn handle_fire_requests(
    mut requests: MessageReader<FireRequest>,
    clock: Res<SimClock>,
    motion: Res<PlayerMotion>,
    combat: Res<CombatStats>,
    mut engine: ResMut<ProjectileEngine>,
    mut stats: ResMut<SimStats>,
    mut fired: MessageWriter<ProjectileFired>,
    mut hits: MessageWriter<EnemyHit>,
) {
    if requests.is_empty() {
        return;
    }
    for req in requests.read() {
        let origin = req.origin.unwrap_or(motion.position);
        if engine.fire_at_current(origin, &combat, clock.now_ms()).is_none() {
            trace!("Fire request from {origin} produced no shot");
        }
    }
    publish(&mut engine, &mut stats, &mut fired, &mut hits);
}
