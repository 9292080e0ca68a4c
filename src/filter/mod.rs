//! Range and field-of-view pre-checks.
//!
//! Both checks are cheap and run before any tile walk. Either failing
//! settles the query as "not visible".

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::FULL_CIRCLE;
use crate::direction::Direction;
use crate::world::SightMap;

/// Metric used to measure sight range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// Whatever the host map uses
    #[default]
    Host,
    /// |dx| + |dy|
    Rectilinear,
    /// Straight-line (Cartesian) distance
    Euclidean,
}

impl DistanceMetric {
    /// Parse a host parameter value; unknown names fall back to `Host`
    pub fn from_param(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "rectilinear" | "manhattan" => Self::Rectilinear,
            "cartesian" | "euclidean" => Self::Euclidean,
            "default" | "" => Self::Host,
            other => {
                warn!("Unknown distance metric '{}', using host metric", other);
                Self::Host
            }
        }
    }

    pub fn measure<M: SightMap + ?Sized>(
        &self,
        map: &M,
        from: (i32, i32),
        to: (i32, i32),
    ) -> f64 {
        let dx = to.0 as f64 - from.0 as f64;
        let dy = to.1 as f64 - from.1 as f64;
        match self {
            Self::Host => map.distance(from.0, from.1, to.0, to.1),
            Self::Rectilinear => dx.abs() + dy.abs(),
            Self::Euclidean => dx.hypot(dy),
        }
    }
}

/// True if `target` lies within `range` of `observer`; negative range is unlimited
pub fn in_range<M: SightMap + ?Sized>(
    map: &M,
    metric: DistanceMetric,
    observer: (i32, i32),
    target: (i32, i32),
    range: f64,
) -> bool {
    if range < 0.0 {
        return true;
    }
    metric.measure(map, observer, target) <= range
}

/// Bearing from one tile to another in degrees, normalized to [0, 360)
pub fn bearing(from: (i32, i32), to: (i32, i32)) -> f64 {
    let dx = to.0 as f64 - from.0 as f64;
    let dy = to.1 as f64 - from.1 as f64;
    let t = dy.atan2(dx).to_degrees();
    if t < 0.0 {
        t + FULL_CIRCLE
    } else {
        t
    }
}

/// True if `angle` lies on the arc between `b1` and `b2` (inclusive), with wrap-around
pub fn angle_in_bounds(angle: f64, b1: f64, b2: f64) -> bool {
    let arc = (b1 - b2).abs();
    let lo = b1.min(b2).rem_euclid(FULL_CIRCLE);
    let mut angle = angle.rem_euclid(FULL_CIRCLE);
    if angle < lo {
        angle += FULL_CIRCLE;
    }
    lo + arc >= angle
}

/// True if `target` is inside the vision arc of width `fov` degrees centred
/// on `facing`. Negative FOVs count by magnitude; 360 or more sees all round.
pub fn in_arc(observer: (i32, i32), target: (i32, i32), facing: Direction, fov: f64) -> bool {
    let fov = fov.abs();
    if fov >= FULL_CIRCLE {
        return true;
    }
    // An observer always sees its own tile
    if observer == target {
        return true;
    }
    let t = bearing(observer, target);
    let c = facing.angle();
    angle_in_bounds(t, c - fov / 2.0, c + fov / 2.0)
}
