use bevy::prelude::*;

use crate::common::test_utils::{run_system_once, sim_world, tick_clock};
use crate::common::tunables::Tunables;

use super::PlayerMotion;

fn world_with(speed: f32, dt: f32) -> World {
    let mut world = sim_world(Tunables { auto_run_speed: speed, ..Tunables::default() });
    tick_clock(&mut world, dt);
    world
}

#[test]
fn auto_run_advances_along_travel_axis() {
    let mut world = world_with(10.0, 0.5);
    run_system_once(&mut world, super::auto_run);

    let motion = world.resource::<PlayerMotion>();
    assert_eq!(motion.position, Vec3::new(0.0, 0.0, 5.0));
    assert_eq!(motion.displacement(), 5.0);
}

#[test]
fn zero_speed_leaves_host_position_alone() {
    let mut world = world_with(0.0, 0.5);
    world.resource_mut::<PlayerMotion>().position = Vec3::new(1.0, 0.0, 33.0);
    run_system_once(&mut world, super::auto_run);
    assert_eq!(world.resource::<PlayerMotion>().position.z, 33.0);
}

#[test]
fn travel_distance_is_clamped() {
    let behind = PlayerMotion { position: Vec3::new(0.0, 0.0, -12.0) };
    assert_eq!(behind.travel_distance(), 0.0);
    let broken = PlayerMotion { position: Vec3::new(0.0, 0.0, f32::NAN) };
    assert_eq!(broken.travel_distance(), 0.0);
}
