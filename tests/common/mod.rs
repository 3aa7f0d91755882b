//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` + `StatesPlugin` provide the ECS runtime and states.
//! - `runner_sim::game::configure_headless_with` installs the simulation.
//! - Time advances by exactly one fixed step per `app.update()`, so every
//!   update runs `FixedUpdate` once and runs are reproducible.

#![allow(dead_code)]

use bevy::ecs::message::Message;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

use runner_sim::common::tunables::Tunables;

pub fn app_headless() -> App {
    app_headless_with(Tunables::default())
}

/// Build, then run one warm-up update that enters `InGame` (no fixed tick yet).
pub fn app_headless_with(tunables: Tunables) -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin));
    runner_sim::game::configure_headless_with(&mut app, tunables);

    let step = app.world().resource::<Time<Fixed>>().timestep();
    app.insert_resource(TimeUpdateStrategy::ManualDuration(step));
    app.update();
    app
}

pub fn run_ticks(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        app.update();
    }
}

/// Every `M` written since the collector was installed.
#[derive(Resource)]
pub struct Collected<M>(pub Vec<M>);

impl<M> Default for Collected<M> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

pub fn collect<M: Message + Clone>(app: &mut App) {
    app.init_resource::<Collected<M>>()
        .add_systems(Last, collect_system::<M>);
}

fn collect_system<M: Message + Clone>(mut reader: MessageReader<M>, mut out: ResMut<Collected<M>>) {
    out.0.extend(reader.read().cloned());
}

pub fn collected<M: Message>(app: &App) -> &[M] {
    &app.world().resource::<Collected<M>>().0
}
