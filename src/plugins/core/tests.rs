use bevy::prelude::*;
use std::time::Duration;

use crate::common::clock::SimClock;
use crate::common::test_utils::run_system_once;
use crate::common::tunables::Tunables;
use crate::plugins::core;

#[test]
fn inserts_resources() {
    let mut app = App::new();
    core::plugin(&mut app);
    assert!(app.world().get_resource::<Tunables>().is_some());
    assert!(app.world().get_resource::<SimClock>().is_some());
    assert!(app.world().get_resource::<core::SimStats>().is_some());
}

#[test]
fn keeps_tunables_inserted_before_it() {
    let mut app = App::new();
    app.insert_resource(Tunables { tick_hz: 30.0, ..Tunables::default() });
    core::plugin(&mut app);

    assert_eq!(app.world().resource::<Tunables>().tick_hz, 30.0);
    let fixed = app.world().resource::<Time<Fixed>>();
    assert!((fixed.timestep().as_secs_f64() - 1.0 / 30.0).abs() < 1e-9);
}

#[test]
fn advance_clock_reads_fixed_delta() {
    let mut world = World::new();
    let mut fixed = Time::<Fixed>::default();
    fixed.advance_by(Duration::from_millis(250));
    world.insert_resource(fixed);
    world.init_resource::<SimClock>();

    run_system_once(&mut world, core::advance_clock);

    let clock = world.resource::<SimClock>();
    assert_eq!(clock.ticks(), 1);
    assert!((clock.now_ms() - 250.0).abs() < 1e-6);
}

#[test]
fn progress_cadence_restarts_with_the_clock() {
    let mut clock = SimClock::default();
    let due: Vec<u64> = (0..1300)
        .filter_map(|_| {
            clock.advance(1.0 / 60.0);
            core::progress_due(&clock).then_some(clock.ticks())
        })
        .collect();
    assert_eq!(due, vec![1, 600, 1200]);

    // A new session starts from a fresh clock and logs straight away.
    let mut clock = SimClock::default();
    clock.advance(1.0 / 60.0);
    assert!(core::progress_due(&clock));
    clock.advance(1.0 / 60.0);
    assert!(!core::progress_due(&clock));
}
