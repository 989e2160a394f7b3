//! Seeded synthetic topologies.
//!
//! Small deterministic generators used by the tests and benchmarks, and
//! handy as demo inputs. Every generator emits an edge list so the output
//! flows through the same construction path as parsed CSV.

use crate::parser::Edge;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::f64::consts::PI;

fn node_name(i: usize) -> String {
    format!("n{}", i)
}

/// Temperature-zero hyperbolic geometric graph.
///
/// Radii are drawn by inverse-CDF sampling of the quasi-uniform density
/// with `alpha = (gamma − 1)/2` on a disc of radius
/// `L = 2·ln(8n / (π·k_bar))`; angles are uniform. Two nodes connect when
/// `r_i + r_j + 2·ln(Δθ/2) ≤ L`, the far-apart approximation of their
/// hyperbolic distance falling inside the disc. Requires `gamma > 2`.
///
/// Expected degree lands near `k_bar` and clustering is high, so the
/// output exercises the same regime the embedding is built for.
pub fn hyperbolic_geometric(n: usize, gamma: f64, k_bar: f64, seed: u64) -> Vec<Edge> {
    assert!(gamma > 2.0, "gamma must exceed 2");
    assert!(k_bar > 0.0, "k_bar must be positive");

    let mut rng = StdRng::seed_from_u64(seed);
    let alpha = (gamma - 1.0) / 2.0;
    let disc_radius = 2.0 * (8.0 * n as f64 / (PI * k_bar)).ln();

    let cosh_al = (alpha * disc_radius).cosh();
    let mut radius = Vec::with_capacity(n);
    let mut angle = Vec::with_capacity(n);
    for _ in 0..n {
        let u: f64 = rng.gen();
        radius.push((1.0 + u * (cosh_al - 1.0)).acosh() / alpha);
        angle.push(rng.gen_range(0.0..2.0 * PI));
    }

    let mut edges = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            let mut dt = (angle[i] - angle[j]).abs();
            dt = dt.min(2.0 * PI - dt).max(1e-10);
            let separation = radius[i] + radius[j] + 2.0 * (dt / 2.0).ln();
            if separation <= disc_radius {
                edges.push(Edge::new(node_name(i), node_name(j)));
            }
        }
    }
    edges
}

/// Barabási-Albert preferential attachment: a complete seed graph of `m`
/// nodes, then each new node attaches to `m` distinct existing nodes
/// chosen with probability proportional to degree.
pub fn barabasi_albert(n: usize, m: usize, seed: u64) -> Vec<Edge> {
    assert!(m >= 1 && n >= m, "need n >= m >= 1");

    let mut rng = StdRng::seed_from_u64(seed);
    let mut edges = Vec::new();
    let mut degrees = vec![0usize; n];

    let core = m.min(n);
    for i in 0..core {
        for j in (i + 1)..core {
            edges.push(Edge::new(node_name(i), node_name(j)));
            degrees[i] += 1;
            degrees[j] += 1;
        }
    }

    for i in core..n {
        let wanted = m.min(i);
        let mut targets: HashSet<usize> = HashSet::new();
        let total: usize = degrees[..i].iter().sum();

        // Roulette selection over current degrees; after enough misses
        // (repeat hits on already-chosen hubs) fall back to filling from
        // the lowest indices so the attachment count is always met.
        let mut attempts = 0;
        while targets.len() < wanted && attempts < 50 * wanted {
            attempts += 1;
            let mut pick = rng.gen_range(0..total.max(1));
            for (j, &degree) in degrees[..i].iter().enumerate() {
                if pick < degree {
                    targets.insert(j);
                    break;
                }
                pick -= degree;
            }
        }
        let mut fill = 0;
        while targets.len() < wanted {
            targets.insert(fill);
            fill += 1;
        }

        let mut sorted: Vec<usize> = targets.into_iter().collect();
        sorted.sort_unstable();
        for target in sorted {
            edges.push(Edge::new(node_name(i), node_name(target)));
            degrees[i] += 1;
            degrees[target] += 1;
        }
    }
    edges
}

/// Regular ring lattice: each node links to its `k` nearest neighbors on
/// either side. Deterministic, high clustering for `k ≥ 2`, no hubs.
pub fn ring_lattice(n: usize, k: usize) -> Vec<Edge> {
    let mut edges = Vec::new();
    for i in 0..n {
        for offset in 1..=k {
            let j = (i + offset) % n;
            if i < j {
                edges.push(Edge::new(node_name(i), node_name(j)));
            } else if j < i && i + offset >= n {
                // Wrapped pair, emitted once with the smaller index first.
                edges.push(Edge::new(node_name(j), node_name(i)));
            }
        }
    }
    edges
}
