//! Target selection.
//!
//! Only candidates within `range` of the origin are considered, and enemies
//! already killed this tick are skipped.

use bevy::prelude::*;
use serde::Deserialize;

use crate::plugins::enemies::{EnemyId, TargetCandidate};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum TargetPolicy {
    /// Closest to the origin; ties go to the lower id.
    #[default]
    Nearest,
    /// Cycle through in-range candidates in spawn order.
    RoundRobin,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TargetSelector {
    policy: TargetPolicy,
    cursor: usize,
}

impl TargetSelector {
    pub fn new(policy: TargetPolicy) -> Self {
        Self { policy, cursor: 0 }
    }

    pub fn policy(&self) -> TargetPolicy {
        self.policy
    }

    pub fn select(
        &mut self,
        origin: Vec3,
        candidates: &[TargetCandidate],
        excluded: &[EnemyId],
        range: f32,
    ) -> Option<TargetCandidate> {
        match self.policy {
            TargetPolicy::Nearest => nearest_in_range(origin, candidates, excluded, range),
            TargetPolicy::RoundRobin => {
                let count = in_range(origin, candidates, excluded, range).count();
                if count == 0 {
                    return None;
                }
                let pick = self.cursor % count;
                self.cursor = self.cursor.wrapping_add(1);
                in_range(origin, candidates, excluded, range).nth(pick).copied()
            }
        }
    }
}

fn in_range<'a>(
    origin: Vec3,
    candidates: &'a [TargetCandidate],
    excluded: &'a [EnemyId],
    range: f32,
) -> impl Iterator<Item = &'a TargetCandidate> + 'a {
    let range_sq = range * range;
    candidates.iter().filter(move |c| {
        c.position.is_finite()
            && !excluded.contains(&c.id)
            && origin.distance_squared(c.position) <= range_sq
    })
}

/// Whether anything could be fired at right now.
pub fn any_in_range(origin: Vec3, candidates: &[TargetCandidate], excluded: &[EnemyId], range: f32) -> bool {
    in_range(origin, candidates, excluded, range).next().is_some()
}

pub fn nearest_in_range(
    origin: Vec3,
    candidates: &[TargetCandidate],
    excluded: &[EnemyId],
    range: f32,
) -> Option<TargetCandidate> {
    in_range(origin, candidates, excluded, range)
        .min_by(|a, b| {
            let da = origin.distance_squared(a.position);
            let db = origin.distance_squared(b.position);
            da.total_cmp(&db).then(a.id.cmp(&b.id))
        })
        .copied()
}
