//! Test helpers shared by the plugin unit tests.
//!
//! Systems are exercised on a bare `World` through `RunSystemOnce`, without
//! building a schedule. `sim_world` seeds the resources every simulation system
//! reads, and `tick_clock` stands in for `advance_clock`.

use bevy::ecs::message::{Message, Messages};
use bevy::ecs::system::{IntoSystem, RunSystemOnce};
use bevy::prelude::*;

use crate::common::{clock::SimClock, tunables::Tunables};
use crate::plugins::core::SimStats;
use crate::plugins::player::PlayerMotion;

/// Run a system once on the given world, then flush deferred commands.
pub fn run_system_once<T, Out, Marker>(world: &mut World, system: T) -> Out
where
    T: IntoSystem<(), Out, Marker>,
{
    let out = world.run_system_once(system).expect("system run failed");
    world.flush();
    out
}

/// World with tunables, a zeroed clock, the player at the origin and fresh stats.
pub fn sim_world(tunables: Tunables) -> World {
    let mut world = World::new();
    world.insert_resource(tunables);
    world.init_resource::<SimClock>();
    world.init_resource::<SimStats>();
    world.init_resource::<PlayerMotion>();
    world
}

/// Register a message buffer so writers and readers can be used in `run_system_once`.
pub fn add_message<M: Message>(world: &mut World) {
    world.init_resource::<Messages<M>>();
}

/// Advance the sim clock by one tick of `dt_secs`.
pub fn tick_clock(world: &mut World, dt_secs: f32) {
    world.resource_mut::<SimClock>().advance(dt_secs);
}

/// Every message currently buffered for `M`, oldest first.
pub fn drain_messages<M: Message>(world: &mut World) -> Vec<M> {
    world.resource_mut::<Messages<M>>().drain().collect()
}
