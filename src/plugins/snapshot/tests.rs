use bevy::prelude::*;

use super::*;
use crate::common::difficulty::DifficultyCurve;
use crate::common::test_utils::{run_system_once, sim_world, tick_clock};
use crate::plugins::damage::DamageSink;
use crate::plugins::projectiles::components::CombatStats;
use crate::plugins::world::ChunkParams;

fn snapshot_world() -> World {
    let tunables = Tunables::default();
    let mut world = sim_world(tunables.clone());
    world.insert_resource(ChunkStreamer::default());
    world.insert_resource(EnemyRoster::new(&tunables).unwrap());
    world.insert_resource(DamageRegistry::new(DifficultyCurve::default()));
    world.insert_resource(ProjectileEngine::new(&tunables));
    world.init_resource::<SimSnapshot>();
    world
}

#[test]
fn empty_world_gives_empty_snapshot() {
    let mut world = snapshot_world();
    run_system_once(&mut world, rebuild_snapshot);

    let snap = world.resource::<SimSnapshot>();
    assert!(snap.chunks.is_empty());
    assert!(snap.enemies.is_empty());
    assert!(snap.projectiles.is_empty());
}

#[test]
fn snapshot_reports_chunks_enemies_and_projectiles() {
    let mut world = snapshot_world();
    tick_clock(&mut world, 0.5);
    world
        .resource_mut::<ChunkStreamer>()
        .recompute(0.0, ChunkParams::from_tunables(&Tunables::default()));

    let id = world.resource_mut::<EnemyRoster>().spawn_near(0.0, Vec3::ZERO);
    let enemy = *world.resource::<EnemyRoster>().get(id).unwrap();
    {
        let mut reg = world.resource_mut::<DamageRegistry>();
        reg.register_enemy(id, 4, Vec3::ZERO);
        reg.apply_damage(id, 1, 450.0);
    }
    {
        let mut engine = world.resource_mut::<ProjectileEngine>();
        let stats = CombatStats { range: 500.0, ..CombatStats::default() };
        engine.fire(Vec3::ZERO, &[enemy.as_candidate()], &stats, 0.0).unwrap();
    }

    run_system_once(&mut world, rebuild_snapshot);

    let snap = world.resource::<SimSnapshot>();
    assert_eq!(snap.now_ms, 500.0);
    assert_eq!(snap.chunks.len(), 5);
    assert_eq!(snap.enemies.len(), 1);

    let view = snap.enemies[0];
    assert_eq!(view.id, id);
    assert_eq!(view.health_fraction, 0.75);
    assert!(view.recently_hit);
    assert_eq!(view.scale, 0.0);
    assert_eq!(snap.projectiles.len(), 1);
}
