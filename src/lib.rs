//! HyperMap: hyperbolic network mapping and greedy geometric routing.
//!
//! Takes an unweighted, undirected graph (an edge list of string-named
//! nodes) and embeds it into the two-dimensional hyperbolic plane so that
//! the coordinates predict the graph's structure: radial position encodes
//! expected degree, angular position is found by local maximum-likelihood
//! optimization under the standard connection-probability model. Over the
//! embedded coordinates, path queries are answered by bidirectional greedy
//! descent in hyperbolic distance.
//!
//! Pipeline: [`parser`] → [`graph`] → [`stats`] → [`embedding`] (which
//! drives [`angular`]) → [`routing`]. [`topology`] provides seeded
//! synthetic graphs for tests and benchmarks.

pub mod angular;
pub mod embedding;
pub mod graph;
pub mod parser;
pub mod routing;
pub mod stats;
pub mod topology;

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// A point in the native (polar) representation of the hyperbolic plane:
/// radial coordinate `r ≥ 0` and angle `theta ∈ (−π, π]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarPoint {
    pub r: f64,
    pub theta: f64,
}

impl PolarPoint {
    pub fn new(r: f64, theta: f64) -> Self {
        Self {
            r,
            theta: normalize_angle(theta),
        }
    }

    /// Hyperbolic distance on the hyperboloid, via the polar form
    /// `d = arcosh(cosh r₁ · cosh r₂ − sinh r₁ · sinh r₂ · cos Δθ)`.
    ///
    /// Evaluated as `cosh(r₁−r₂) + sinh r₁ · sinh r₂ · (1 − cos Δθ)`,
    /// which is the same quantity without the catastrophic cancellation of
    /// the textbook form at small separations. The argument is still
    /// clamped to ≥ 1 before `acosh`.
    pub fn hyperbolic_distance(&self, other: &Self) -> f64 {
        let dt = angular_separation(self.theta, other.theta);
        let arg = (self.r - other.r).cosh() + self.r.sinh() * other.r.sinh() * (1.0 - dt.cos());
        arg.max(1.0).acosh()
    }
}

impl std::fmt::Display for PolarPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(r={:.4}, θ={:.4})", self.r, self.theta)
    }
}

/// Reduce an angle to the half-open interval (−π, π].
pub fn normalize_angle(theta: f64) -> f64 {
    let mut t = theta.rem_euclid(2.0 * PI);
    if t > PI {
        t -= 2.0 * PI;
    }
    t
}

/// Angular separation `min(|a−b|, 2π − |a−b|)`, always in [0, π].
pub fn angular_separation(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(2.0 * PI);
    d.min(2.0 * PI - d)
}
