//! Distance-based difficulty.
//!
//! Difficulty follows progress along the travel axis, never wall-clock time,
//! so two runs that cover the same ground see the same enemies.

/// Linear scaling of enemy stats with travel distance.
///
/// `scaled = base * (1 + distance / scale_distance * factor)`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DifficultyCurve {
    pub scale_distance: f32,
    pub health_factor: f32,
    pub speed_factor: f32,
}

impl Default for DifficultyCurve {
    fn default() -> Self {
        Self { scale_distance: 100.0, health_factor: 0.5, speed_factor: 0.25 }
    }
}

impl DifficultyCurve {
    /// Distances behind the start line and non-finite distances count as zero.
    #[inline]
    fn progress(&self, distance: f32) -> f32 {
        if !distance.is_finite() || self.scale_distance <= 0.0 {
            return 0.0;
        }
        distance.max(0.0) / self.scale_distance
    }

    /// Never below 1, so every enemy can still be killed.
    pub fn scaled_health(&self, base: u32, distance: f32) -> u32 {
        let multiplier = 1.0 + self.progress(distance) * self.health_factor.max(0.0);
        let scaled = (base as f32 * multiplier).floor();
        if scaled >= u32::MAX as f32 { u32::MAX } else { (scaled as u32).max(1) }
    }

    pub fn scaled_speed(&self, base: f32, distance: f32) -> f32 {
        base * (1.0 + self.progress(distance) * self.speed_factor.max(0.0))
    }
}

/// Spawn cadence shrinks with distance travelled and is floored at `min_ms`.
pub fn spawn_interval_ms(base_ms: f64, min_ms: f64, shrink_distance: f32, distance: f32) -> f64 {
    let progress = if distance.is_finite() && shrink_distance > 0.0 {
        f64::from(distance.max(0.0) / shrink_distance)
    } else {
        0.0
    };
    (base_ms / (1.0 + progress)).max(min_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_scales_with_distance() {
        let curve = DifficultyCurve { scale_distance: 100.0, health_factor: 0.5, speed_factor: 0.0 };
        assert_eq!(curve.scaled_health(2, 0.0), 2);
        assert_eq!(curve.scaled_health(2, 100.0), 3);
        assert_eq!(curve.scaled_health(2, 400.0), 6);
    }

    #[test]
    fn health_never_drops_below_one_or_base() {
        let curve = DifficultyCurve::default();
        assert_eq!(curve.scaled_health(0, 0.0), 1);
        assert_eq!(curve.scaled_health(5, -300.0), 5);
        assert_eq!(curve.scaled_health(5, f32::NAN), 5);
    }

    #[test]
    fn health_is_monotonic_in_distance() {
        let curve = DifficultyCurve::default();
        let mut prev = 0;
        for step in 0..500 {
            let h = curve.scaled_health(3, step as f32 * 7.5);
            assert!(h >= prev);
            prev = h;
        }
    }

    #[test]
    fn speed_scales_with_its_own_factor() {
        let curve = DifficultyCurve { scale_distance: 100.0, health_factor: 0.5, speed_factor: 0.25 };
        assert!((curve.scaled_speed(4.0, 200.0) - 6.0).abs() < 1e-6);
    }

    #[test]
    fn spawn_interval_shrinks_then_floors() {
        assert_eq!(spawn_interval_ms(1200.0, 300.0, 100.0, 0.0), 1200.0);
        assert_eq!(spawn_interval_ms(1200.0, 300.0, 100.0, 100.0), 600.0);
        assert_eq!(spawn_interval_ms(1200.0, 300.0, 100.0, 10_000.0), 300.0);
        assert_eq!(spawn_interval_ms(1200.0, 300.0, 100.0, f32::INFINITY), 1200.0);
    }
}
