//! Network statistics and derived embedding parameters.
//!
//! From the degree sequence and local triangle counts this module derives
//! everything the coordinate assignment needs: the mean degree, a
//! Hill-style tail exponent of the degree distribution, the sampled average
//! clustering coefficient, and the closed-form model parameters
//! (inverse temperature β, normalization μ, degree scale κ₀, disc radius R)
//! of the connection-probability model.
//!
//! The estimators are pragmatic: they trade statistical rigor for a single
//! cheap pass over the graph, which is all the embedding needs.

use crate::graph::{Graph, NodeId};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use thiserror::Error;

/// Clamp range for the Hill tail exponent. The floor stays strictly above 2
/// so that `kappa0 ∝ (gamma − 2)` remains positive.
pub const GAMMA_MIN: f64 = 2.01;
pub const GAMMA_MAX: f64 = 4.0;

/// Floor for the inverse temperature. `beta = 1 + 1.75·clustering` reaches
/// exactly 1 on triangle-free graphs, where `mu` diverges; the floor keeps
/// trees and paths embeddable.
pub const BETA_MIN: f64 = 1.1;

/// Clustering is averaged over at most this many nodes, in input order.
const CLUSTERING_SAMPLE: usize = 1000;

/// Minimum Hill tail length; smaller graphs use every nonzero degree.
const HILL_TAIL_MIN: usize = 10;

/// Aggregate statistics of a graph together with the derived parameters of
/// the connection model. Immutable once estimated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetworkStats {
    /// Node count.
    pub n: usize,
    /// Mean degree, `2|E| / n`.
    pub k_bar: f64,
    /// Degree-distribution tail exponent, clamped to [`GAMMA_MIN`, `GAMMA_MAX`].
    pub gamma: f64,
    /// Sampled average local clustering coefficient, in [0, 1].
    pub clustering: f64,
    /// Inverse temperature, `max(1 + 1.75·clustering, BETA_MIN)`.
    pub beta: f64,
    /// Scale of the expected-degree distribution, `k_bar·(γ−2)/(γ−1)`.
    pub kappa0: f64,
    /// Connection-probability normalization, `β / (2π·k_bar·sin(π/β))`.
    pub mu: f64,
    /// Disc radius, `2·ln(n / (π·μ·κ₀²))`.
    pub radius: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum StatsError {
    #[error("degenerate statistics (beta = {beta:.4}, kappa0 = {kappa0:.4}); the connection model is undefined for this graph")]
    Degenerate { beta: f64, kappa0: f64 },
}

impl Default for NetworkStats {
    fn default() -> Self {
        Self::empty()
    }
}

impl NetworkStats {
    /// Stats record for a zero-node graph: `n = 0`, every other field NaN.
    pub fn empty() -> Self {
        Self {
            n: 0,
            k_bar: f64::NAN,
            gamma: f64::NAN,
            clustering: f64::NAN,
            beta: f64::NAN,
            kappa0: f64::NAN,
            mu: f64::NAN,
            radius: f64::NAN,
        }
    }

    /// Estimate every field from a non-empty graph.
    ///
    /// Fails with [`StatsError::Degenerate`] when the derived parameters
    /// fall outside the model's domain (`beta ≤ 1`, `kappa0 ≤ 0`, or a
    /// non-finite normalization), which happens on edgeless inputs.
    pub fn estimate(graph: &Graph) -> Result<Self, StatsError> {
        let n = graph.node_count();
        debug_assert!(n > 0, "empty graphs are handled by the caller");

        let degrees: Vec<usize> = graph.nodes().iter().map(|v| graph.degree(v)).collect();
        let k_bar = degrees.iter().sum::<usize>() as f64 / n as f64;
        let gamma = hill_exponent(&degrees);
        let clustering = average_clustering(graph);
        let beta = (1.0 + 1.75 * clustering).max(BETA_MIN);

        let kappa0 = k_bar * (gamma - 2.0) / (gamma - 1.0);
        let mu = beta / (2.0 * PI * k_bar * (PI / beta).sin());
        let radius = 2.0 * (n as f64 / (PI * mu * kappa0 * kappa0)).ln();

        if beta <= 1.0 || kappa0 <= 0.0 || !mu.is_finite() || !radius.is_finite() {
            return Err(StatsError::Degenerate { beta, kappa0 });
        }

        Ok(Self {
            n,
            k_bar,
            gamma,
            clustering,
            beta,
            kappa0,
            mu,
            radius,
        })
    }
}

/// Hill-style tail exponent of the degree distribution.
///
/// Takes the top 20% of nonzero degrees (at least [`HILL_TAIL_MIN`], or all
/// of them on small graphs), with `kMin` the smallest tail value:
/// `gamma = 1 + n_tail / Σ ln(k / kMin)`, clamped. A tail of identical
/// values leaves the estimator undefined and returns the upper clamp.
fn hill_exponent(degrees: &[usize]) -> f64 {
    let mut nonzero: Vec<f64> = degrees
        .iter()
        .filter(|&&d| d > 0)
        .map(|&d| d as f64)
        .collect();
    if nonzero.is_empty() {
        return GAMMA_MAX;
    }
    nonzero.sort_by(|a, b| b.partial_cmp(a).expect("degrees are finite"));

    let tail_len = ((nonzero.len() as f64 * 0.2) as usize)
        .max(HILL_TAIL_MIN)
        .min(nonzero.len());
    let tail = &nonzero[..tail_len];
    let k_min = tail[tail_len - 1];

    let log_sum: f64 = tail.iter().map(|&k| (k / k_min).ln()).sum();
    if log_sum <= 0.0 {
        return GAMMA_MAX;
    }
    (1.0 + tail_len as f64 / log_sum).clamp(GAMMA_MIN, GAMMA_MAX)
}

/// Average local clustering coefficient over the first
/// [`CLUSTERING_SAMPLE`] nodes in input order. Nodes with fewer than two
/// neighbors are skipped; if every node is skipped the estimate is 0.
fn average_clustering(graph: &Graph) -> f64 {
    let mut total = 0.0;
    let mut counted = 0usize;

    for v in graph.nodes().iter().take(CLUSTERING_SAMPLE) {
        let neighbors: Vec<&NodeId> = graph
            .neighbors(v)
            .map(|s| s.iter().collect())
            .unwrap_or_default();
        if neighbors.len() < 2 {
            continue;
        }
        let mut triangles = 0usize;
        for i in 0..neighbors.len() {
            for j in (i + 1)..neighbors.len() {
                if graph.has_edge(neighbors[i], neighbors[j]) {
                    triangles += 1;
                }
            }
        }
        let possible = neighbors.len() * (neighbors.len() - 1) / 2;
        total += triangles as f64 / possible as f64;
        counted += 1;
    }

    if counted == 0 {
        0.0
    } else {
        total / counted as f64
    }
}
