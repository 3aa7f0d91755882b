//! Game composition root.
//!
//! Provides two public configuration functions:
//! - `run`: a headless app ticking at the configured rate, with logging.
//! - `configure_headless`: gameplay only, for integration tests that bring
//!   their own `MinimalPlugins`.

use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins;

pub fn run(tunables: Tunables) {
    let frame = Duration::from_secs_f64(1.0 / tunables.tick_hz);
    App::new()
        .add_plugins((
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(frame)),
            StatesPlugin,
            LogPlugin::default(),
        ))
        .add_plugins(move |app: &mut App| configure_headless_with(app, tunables.clone()))
        .run();
}

/// Headless configuration with default tunables.
///
/// Notes:
/// - Do NOT add DefaultPlugins.
/// - The caller provides `MinimalPlugins` and `StatesPlugin`.
pub fn configure_headless(app: &mut App) {
    configure_headless_with(app, Tunables::default());
}

pub fn configure_headless_with(app: &mut App, tunables: Tunables) {
    app.insert_resource(tunables);
    configure_game(app);
}

fn configure_game(app: &mut App) {
    app.init_state::<GameState>();
    plugins::register_gameplay(app);
}
