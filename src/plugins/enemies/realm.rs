//! Realm tables: which enemy kinds exist and their base stats.
//!
//! A realm only swaps tables. The lifecycle rules are the same for every kind.

use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use serde::Deserialize;

use crate::common::error::ConfigError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
pub enum Realm {
    #[default]
    Fantasy,
    SciFi,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Goblin,
    Orc,
    Wraith,
    Drone,
    Mech,
    Sentinel,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KindStats {
    pub kind: EnemyKind,
    pub base_health: u32,
    /// Units per second along the travel axis.
    pub base_speed: f32,
    /// Render scale only.
    pub scale_size: f32,
    /// Relative spawn weight within the realm.
    pub weight: u32,
}

const FANTASY: [KindStats; 3] = [
    KindStats { kind: EnemyKind::Goblin, base_health: 2, base_speed: 9.0, scale_size: 0.8, weight: 6 },
    KindStats { kind: EnemyKind::Orc, base_health: 5, base_speed: 6.0, scale_size: 1.3, weight: 3 },
    KindStats { kind: EnemyKind::Wraith, base_health: 3, base_speed: 12.0, scale_size: 1.0, weight: 1 },
];

const SCI_FI: [KindStats; 3] = [
    KindStats { kind: EnemyKind::Drone, base_health: 2, base_speed: 11.0, scale_size: 0.7, weight: 6 },
    KindStats { kind: EnemyKind::Mech, base_health: 6, base_speed: 5.0, scale_size: 1.5, weight: 2 },
    KindStats { kind: EnemyKind::Sentinel, base_health: 4, base_speed: 8.0, scale_size: 1.1, weight: 2 },
];

impl Realm {
    pub fn kinds(self) -> &'static [KindStats] {
        match self {
            Realm::Fantasy => &FANTASY,
            Realm::SciFi => &SCI_FI,
        }
    }
}

impl EnemyKind {
    pub fn realm(self) -> Realm {
        match self {
            EnemyKind::Goblin | EnemyKind::Orc | EnemyKind::Wraith => Realm::Fantasy,
            EnemyKind::Drone | EnemyKind::Mech | EnemyKind::Sentinel => Realm::SciFi,
        }
    }

    pub fn stats(self) -> &'static KindStats {
        let kinds = self.realm().kinds();
        // Every kind appears exactly once in its realm's table.
        let pos = kinds.iter().position(|s| s.kind == self).unwrap_or(0);
        &kinds[pos]
    }
}

/// Weighted kind picker for one realm.
#[derive(Debug, Clone)]
pub struct KindTable {
    kinds: &'static [KindStats],
    picker: WeightedIndex<u32>,
}

impl KindTable {
    pub fn new(realm: Realm) -> Result<Self, ConfigError> {
        let kinds = realm.kinds();
        let picker = WeightedIndex::new(kinds.iter().map(|s| s.weight))
            .map_err(|e| ConfigError::invalid("realm", format!("{realm:?} spawn weights: {e}")))?;
        Ok(Self { kinds, picker })
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &'static KindStats {
        &self.kinds[self.picker.sample(rng)]
    }

    pub fn kinds(&self) -> &'static [KindStats] {
        self.kinds
    }
}
