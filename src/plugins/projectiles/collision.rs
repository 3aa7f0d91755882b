//! Per-tick projectile advance and hit resolution.
//!
//! A projectile tests the segment it swept this tick against its target's
//! position for this tick, so fast shots cannot tunnel through a target.
//! Each projectile scores at most one hit and then goes to `PendingReturn`.

use bevy::prelude::*;

use super::components::{Projectile, ProjectileState};
use super::messages::EnemyHit;
use super::pool::ProjectilePool;
use crate::plugins::damage::DamageSink;
use crate::plugins::enemies::{EnemyId, TargetCandidate};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlightLimits {
    pub hit_radius: f32,
    pub max_travel: f32,
}

/// Shortest distance from `p` to the segment `a..b`.
pub fn segment_point_distance(a: Vec3, b: Vec3, p: Vec3) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return a.distance(p);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (a + ab * t).distance(p)
}

/// Why a projectile stopped without scoring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expiry {
    TargetGone,
    LifetimeOver,
    OutOfRange,
}

enum Outcome {
    Flying,
    Expired(Expiry),
    Hit(EnemyHit),
}

fn advance_one(
    p: &mut Projectile,
    dt_secs: f32,
    now_ms: f64,
    candidates: &[TargetCandidate],
    killed: &[EnemyId],
    limits: FlightLimits,
    sink: &mut impl DamageSink,
) -> Outcome {
    let from = p.position;
    p.position += p.direction * p.speed * dt_secs;
    p.remaining_life -= dt_secs;

    let target = if killed.contains(&p.target) {
        None
    } else {
        candidates.iter().find(|c| c.id == p.target)
    };
    let Some(target) = target else {
        return Outcome::Expired(Expiry::TargetGone);
    };
    if p.remaining_life <= 0.0 {
        return Outcome::Expired(Expiry::LifetimeOver);
    }
    if p.origin.distance(p.position) > limits.max_travel {
        return Outcome::Expired(Expiry::OutOfRange);
    }
    if segment_point_distance(from, p.position, target.position) >= limits.hit_radius {
        return Outcome::Flying;
    }

    sink.register_enemy(target.id, target.base_health, target.spawn_position);
    match sink.apply_damage(target.id, p.damage, now_ms) {
        Some(result) => Outcome::Hit(EnemyHit {
            projectile: p.id,
            target: target.id,
            damage: p.damage,
            new_health: result.new_health,
            died: result.died,
        }),
        None => Outcome::Expired(Expiry::TargetGone),
    }
}

/// Move every active projectile and resolve hits, in slot order.
///
/// Targets that die here are appended to `killed`, so later projectiles in the
/// same pass treat them as gone instead of hitting them again.
pub fn advance_projectiles(
    pool: &mut ProjectilePool,
    dt_secs: f32,
    now_ms: f64,
    candidates: &[TargetCandidate],
    killed: &mut Vec<EnemyId>,
    limits: FlightLimits,
    sink: &mut impl DamageSink,
    hits: &mut Vec<EnemyHit>,
) {
    for p in pool.slots_mut() {
        if p.state != ProjectileState::Active {
            continue;
        }
        match advance_one(p, dt_secs, now_ms, candidates, killed, limits, sink) {
            Outcome::Flying => {}
            Outcome::Expired(why) => {
                trace!("{} expired: {why:?}", p.id);
                p.state = ProjectileState::PendingReturn;
            }
            Outcome::Hit(hit) => {
                if hit.died {
                    killed.push(hit.target);
                }
                hits.push(hit);
                p.state = ProjectileState::PendingReturn;
            }
        }
    }
}
