//! Tunable simulation constants.
//!
//! Every field has a default, so a RON file only needs to name the values it
//! overrides:
//!
//! ```ron
//! (
//!     chunk_size: 80.0,
//!     max_enemies: 12,
//!     realm: SciFi,
//! )
//! ```

use std::path::Path;

use bevy::prelude::*;
use serde::Deserialize;

use super::difficulty::DifficultyCurve;
use super::error::ConfigError;
use crate::plugins::enemies::realm::{KindTable, Realm};
use crate::plugins::projectiles::targeting::TargetPolicy;
use crate::plugins::world::{MAX_WINDOW_CHUNKS, ahead_chunk_count};

#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Tunables {
    pub tick_hz: f64,
    pub seed: u64,
    pub realm: Realm,

    // Chunk streaming.
    pub chunk_size: f32,
    pub chunk_ahead_distance: f32,
    pub chunk_behind_margin: u32,
    /// Displacement change that triggers a chunk recompute.
    pub chunk_recompute_threshold: f32,

    /// Units per second along +Z. Zero means the host drives the player.
    pub auto_run_speed: f32,

    // Enemy lifecycle.
    pub max_enemies: usize,
    pub spawn_interval_ms: f64,
    pub min_spawn_interval_ms: f64,
    pub spawn_interval_shrink_distance: f32,
    pub spawn_distance_min: f32,
    pub spawn_distance_max: f32,
    pub spawn_lateral_half_width: f32,
    pub reach_threshold: f32,
    pub cleanup_interval_ms: f64,
    pub cleanup_distance: f32,
    pub spawn_ticks: u32,
    pub dying_ticks: u32,

    // Difficulty.
    pub difficulty_scale_distance: f32,
    pub health_scale_factor: f32,
    pub speed_scale_factor: f32,

    // Projectiles.
    pub projectile_pool_capacity: usize,
    pub projectile_speed: f32,
    pub projectile_lifetime_secs: f32,
    pub projectile_hit_radius: f32,
    pub projectile_max_travel: f32,
    pub target_policy: TargetPolicy,

    pub hit_flash_window_ms: f64,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            tick_hz: 60.0,
            seed: 0x5EED_2024,
            realm: Realm::Fantasy,

            chunk_size: 80.0,
            chunk_ahead_distance: 200.0,
            chunk_behind_margin: 2,
            chunk_recompute_threshold: 10.0,

            auto_run_speed: 0.0,

            max_enemies: 24,
            spawn_interval_ms: 1500.0,
            min_spawn_interval_ms: 350.0,
            spawn_interval_shrink_distance: 400.0,
            spawn_distance_min: 60.0,
            spawn_distance_max: 120.0,
            spawn_lateral_half_width: 6.0,
            reach_threshold: 1.5,
            cleanup_interval_ms: 1000.0,
            cleanup_distance: 30.0,
            spawn_ticks: 18,
            dying_ticks: 21,

            difficulty_scale_distance: 100.0,
            health_scale_factor: 0.5,
            speed_scale_factor: 0.25,

            projectile_pool_capacity: 64,
            projectile_speed: 60.0,
            projectile_lifetime_secs: 2.0,
            projectile_hit_radius: 1.2,
            projectile_max_travel: 150.0,
            target_policy: TargetPolicy::Nearest,

            hit_flash_window_ms: 120.0,
        }
    }
}

impl Tunables {
    /// Defaults for the headless demo binary: the player runs on its own.
    pub fn demo() -> Self {
        Self { auto_run_speed: 14.0, ..Self::default() }
    }

    pub fn from_ron_str(src: &str) -> Result<Self, ConfigError> {
        let tunables: Self = ron::from_str(src)?;
        tunables.validate()?;
        Ok(tunables)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron_str(&src)
    }

    pub fn difficulty(&self) -> DifficultyCurve {
        DifficultyCurve {
            scale_distance: self.difficulty_scale_distance,
            health_factor: self.health_scale_factor,
            speed_factor: self.speed_scale_factor,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("tick_hz", self.tick_hz)?;
        positive("chunk_size", f64::from(self.chunk_size))?;
        non_negative("chunk_ahead_distance", f64::from(self.chunk_ahead_distance))?;
        if ahead_chunk_count(self.chunk_ahead_distance, self.chunk_size, self.chunk_behind_margin).is_none() {
            return Err(ConfigError::invalid(
                "chunk_ahead_distance",
                format!("chunk window would exceed {MAX_WINDOW_CHUNKS} chunks"),
            ));
        }
        non_negative("chunk_recompute_threshold", f64::from(self.chunk_recompute_threshold))?;
        non_negative("auto_run_speed", f64::from(self.auto_run_speed))?;

        positive("spawn_interval_ms", self.spawn_interval_ms)?;
        positive("min_spawn_interval_ms", self.min_spawn_interval_ms)?;
        if self.min_spawn_interval_ms > self.spawn_interval_ms {
            return Err(ConfigError::invalid(
                "min_spawn_interval_ms",
                "must not exceed spawn_interval_ms",
            ));
        }
        positive("spawn_interval_shrink_distance", f64::from(self.spawn_interval_shrink_distance))?;
        non_negative("spawn_distance_min", f64::from(self.spawn_distance_min))?;
        non_negative("spawn_distance_max", f64::from(self.spawn_distance_max))?;
        if self.spawn_distance_min > self.spawn_distance_max {
            return Err(ConfigError::invalid(
                "spawn_distance_min",
                "must not exceed spawn_distance_max",
            ));
        }
        non_negative("spawn_lateral_half_width", f64::from(self.spawn_lateral_half_width))?;
        non_negative("reach_threshold", f64::from(self.reach_threshold))?;
        positive("cleanup_interval_ms", self.cleanup_interval_ms)?;
        non_negative("cleanup_distance", f64::from(self.cleanup_distance))?;

        positive("difficulty_scale_distance", f64::from(self.difficulty_scale_distance))?;
        non_negative("health_scale_factor", f64::from(self.health_scale_factor))?;
        non_negative("speed_scale_factor", f64::from(self.speed_scale_factor))?;

        if self.projectile_pool_capacity == 0 {
            return Err(ConfigError::invalid("projectile_pool_capacity", "must be at least 1"));
        }
        if u32::try_from(self.projectile_pool_capacity).is_err() {
            return Err(ConfigError::invalid("projectile_pool_capacity", "too large"));
        }
        positive("projectile_speed", f64::from(self.projectile_speed))?;
        positive("projectile_lifetime_secs", f64::from(self.projectile_lifetime_secs))?;
        positive("projectile_hit_radius", f64::from(self.projectile_hit_radius))?;
        positive("projectile_max_travel", f64::from(self.projectile_max_travel))?;
        non_negative("hit_flash_window_ms", self.hit_flash_window_ms)?;

        KindTable::new(self.realm)?;
        Ok(())
    }
}

fn positive(field: &'static str, v: f64) -> Result<(), ConfigError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("expected a finite value > 0, got {v}")))
    }
}

fn non_negative(field: &'static str, v: f64) -> Result<(), ConfigError> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("expected a finite value >= 0, got {v}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        Tunables::default().validate().unwrap();
        Tunables::demo().validate().unwrap();
    }

    #[test]
    fn partial_ron_overrides_only_named_fields() {
        let t = Tunables::from_ron_str("(chunk_size: 40.0, max_enemies: 3, realm: SciFi)").unwrap();
        assert_eq!(t.chunk_size, 40.0);
        assert_eq!(t.max_enemies, 3);
        assert_eq!(t.realm, Realm::SciFi);
        assert_eq!(t.chunk_behind_margin, Tunables::default().chunk_behind_margin);
    }

    #[test]
    fn target_policy_parses() {
        let t = Tunables::from_ron_str("(target_policy: RoundRobin)").unwrap();
        assert_eq!(t.target_policy, TargetPolicy::RoundRobin);
    }

    #[test]
    fn malformed_ron_is_a_parse_error() {
        let err = Tunables::from_ron_str("(chunk_size: )").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let err = Tunables::from_ron_str("(chunk_size: 0.0)").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "chunk_size", .. }));
    }

    #[test]
    fn inverted_spawn_band_is_rejected() {
        let err = Tunables::from_ron_str("(spawn_distance_min: 50.0, spawn_distance_max: 10.0)").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "spawn_distance_min", .. }));
    }

    #[test]
    fn oversized_chunk_window_is_rejected() {
        let err = Tunables::from_ron_str("(chunk_ahead_distance: 1e30)").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "chunk_ahead_distance", .. }));

        let err = Tunables::from_ron_str("(chunk_behind_margin: 5000)").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "chunk_ahead_distance", .. }));
    }

    #[test]
    fn empty_pool_is_rejected() {
        let err = Tunables::from_ron_str("(projectile_pool_capacity: 0)").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "projectile_pool_capacity", .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Tunables::load("/definitely/not/here.ron").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
