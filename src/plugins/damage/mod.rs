//! Damage plugin: per-enemy health bookkeeping.
//!
//! The registry only tracks numbers. It never moves an enemy through its
//! lifecycle; callers look at `DamageResult::died` and do that themselves.
//! Records are created lazily on first contact and released when the enemy
//! leaves the roster (`EnemyRemoved`).

use bevy::platform::collections::HashMap;
use bevy::prelude::*;

use crate::common::difficulty::DifficultyCurve;
use crate::common::{state::GameState, tunables::Tunables};
use crate::plugins::SimSet;
use crate::plugins::enemies::{EnemyId, EnemyRemoved, apply_lethal_hits};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyHealth {
    pub id: EnemyId,
    pub current: u32,
    pub max: u32,
    pub last_hit_ms: Option<f64>,
}

impl EnemyHealth {
    /// `current / max`, in `[0, 1]`.
    #[inline]
    pub fn fraction(&self) -> f32 {
        if self.max == 0 { 0.0 } else { self.current as f32 / self.max as f32 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageResult {
    pub new_health: u32,
    /// True only for the call that took health from above zero to zero.
    pub died: bool,
}

/// Where confirmed hits go. The projectile engine is handed one per tick.
pub trait DamageSink {
    /// Create the health record on first contact. Repeat calls are no-ops.
    fn register_enemy(&mut self, id: EnemyId, base_health: u32, spawn_position: Vec3);

    /// `None` when the id was never registered or its health is already zero.
    fn apply_damage(&mut self, id: EnemyId, amount: u32, now_ms: f64) -> Option<DamageResult>;
}

#[derive(Resource, Debug, Default)]
pub struct DamageRegistry {
    records: HashMap<EnemyId, EnemyHealth>,
    curve: DifficultyCurve,
}

impl DamageRegistry {
    pub fn new(curve: DifficultyCurve) -> Self {
        Self { records: HashMap::default(), curve }
    }

    pub fn health(&self, id: EnemyId) -> Option<&EnemyHealth> {
        self.records.get(&id)
    }

    /// Unregistered enemies have not been touched yet, so they read as full.
    pub fn health_fraction(&self, id: EnemyId) -> f32 {
        self.records.get(&id).map_or(1.0, EnemyHealth::fraction)
    }

    pub fn is_recently_hit(&self, id: EnemyId, now_ms: f64, window_ms: f64) -> bool {
        self.records
            .get(&id)
            .and_then(|h| h.last_hit_ms)
            .is_some_and(|t| now_ms - t <= window_ms)
    }

    /// Safe on unknown ids.
    pub fn unregister(&mut self, id: EnemyId) {
        self.records.remove(&id);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl DamageSink for DamageRegistry {
    fn register_enemy(&mut self, id: EnemyId, base_health: u32, spawn_position: Vec3) {
        let curve = self.curve;
        self.records.entry(id).or_insert_with(|| {
            // Travel coordinate of the spawn point drives max health.
            let max = curve.scaled_health(base_health, spawn_position.z);
            EnemyHealth { id, current: max, max, last_hit_ms: None }
        });
    }

    fn apply_damage(&mut self, id: EnemyId, amount: u32, now_ms: f64) -> Option<DamageResult> {
        let record = self.records.get_mut(&id)?;
        if record.current == 0 {
            return None;
        }
        record.current = record.current.saturating_sub(amount).min(record.max);
        record.last_hit_ms = Some(now_ms);
        Some(DamageResult {
            new_health: record.current,
            died: record.current == 0,
        })
    }
}

pub fn plugin(app: &mut App) {
    let curve = app.world().resource::<Tunables>().difficulty();
    app.insert_resource(DamageRegistry::new(curve))
        .add_systems(OnEnter(GameState::InGame), reset_registry)
        .add_systems(
            FixedUpdate,
            release_removed_health
                .in_set(SimSet::Lifecycle)
                .after(apply_lethal_hits),
        );
}

fn reset_registry(tunables: Res<Tunables>, mut registry: ResMut<DamageRegistry>) {
    *registry = DamageRegistry::new(tunables.difficulty());
}

fn release_removed_health(mut removed: MessageReader<EnemyRemoved>, mut registry: ResMut<DamageRegistry>) {
    for msg in removed.read() {
        registry.unregister(msg.id);
    }
}
