//! Likelihood embedding driver.
//!
//! Sequences the whole pipeline: parse, build the graph, estimate the
//! connection-model parameters, assign hidden degrees and radii in closed
//! form, run the two-phase angular optimization, and emit the embedded
//! nodes together with the statistics and a routing-ready adjacency.
//!
//! Emission order is part of the contract: nodes come out sorted by
//! descending degree (first-seen order breaking ties), and the adjacency is
//! re-indexed into that order so consumers can use positional lookups.

use crate::angular::{AngularConfig, AngularOptimizer, ConnectionModel};
use crate::graph::{Graph, NodeId};
use crate::parser::{parse_edge_list, Edge, ParseError};
use crate::stats::{NetworkStats, StatsError};
use crate::PolarPoint;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::info;

/// Configuration for one embedding run.
#[derive(Debug, Clone)]
pub struct EmbedConfig {
    /// Seed for the single PRNG behind every stochastic choice (tail
    /// initialization, isolated-node placement). A fixed seed reproduces
    /// the embedding exactly.
    pub seed: u64,
    /// Angular-optimizer tunables.
    pub angular: AngularConfig,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            angular: AngularConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Stats(#[from] StatsError),
}

/// A node with its hyperbolic coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedNode {
    pub id: NodeId,
    /// Radial coordinate, `0 ≤ r ≤ R`.
    pub r: f64,
    /// Angular coordinate in (−π, π].
    pub theta: f64,
    /// Hidden expected-degree parameter, `κ ≥ κ₀`.
    pub kappa: f64,
    /// Graph degree.
    pub degree: usize,
}

impl EmbeddedNode {
    pub fn position(&self) -> PolarPoint {
        PolarPoint::new(self.r, self.theta)
    }

    pub fn hyperbolic_distance(&self, other: &Self) -> f64 {
        self.position().hyperbolic_distance(&other.position())
    }
}

/// The embedding output: coordinates, statistics, and the adjacency
/// re-keyed into emission order. Read-only after construction; concurrent
/// routing queries share it freely.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingResult {
    /// Embedded nodes sorted by descending degree.
    pub nodes: Vec<EmbeddedNode>,
    pub stats: NetworkStats,
    /// Adjacency in sorted index space; each list ascending.
    pub neighbors: Vec<Vec<usize>>,
    /// Node id to position in `nodes`.
    pub index: HashMap<NodeId, usize>,
}

impl EmbeddingResult {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &NodeId) -> Option<&EmbeddedNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn index_of(&self, id: &NodeId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Hyperbolic distance between two nodes by position.
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.nodes[i].hyperbolic_distance(&self.nodes[j])
    }
}

/// Maximum-likelihood hyperbolic embedding.
///
/// Radii come from degrees in closed form; angles from the two-phase local
/// likelihood optimization in [`crate::angular`].
pub struct LikelihoodEmbedding {
    config: EmbedConfig,
}

impl LikelihoodEmbedding {
    pub fn new() -> Self {
        Self {
            config: EmbedConfig::default(),
        }
    }

    pub fn with_config(config: EmbedConfig) -> Self {
        Self { config }
    }

    /// Embed an edge CSV (header line plus `source,target` rows).
    pub fn embed_text(&self, text: &str) -> Result<EmbeddingResult, EmbedError> {
        let edges = parse_edge_list(text)?;
        self.embed_edges(&edges)
    }

    /// Embed an already-parsed edge list.
    pub fn embed_edges(&self, edges: &[Edge]) -> Result<EmbeddingResult, EmbedError> {
        self.embed_graph(&Graph::from_edges(edges))
    }

    /// Embed a built graph.
    ///
    /// A zero-node graph yields an empty result with `n = 0` stats rather
    /// than an error; degenerate statistics abort with [`EmbedError::Stats`].
    pub fn embed_graph(&self, graph: &Graph) -> Result<EmbeddingResult, EmbedError> {
        let n = graph.node_count();
        if n == 0 {
            info!("embedding empty graph");
            return Ok(EmbeddingResult::default());
        }

        let stats = NetworkStats::estimate(graph)?;
        info!(
            n,
            edges = graph.edge_count(),
            k_bar = stats.k_bar,
            gamma = stats.gamma,
            beta = stats.beta,
            radius = stats.radius,
            "embedding graph"
        );

        // Sort into descending-degree order, first-seen position breaking
        // ties, then re-index the adjacency into that space.
        let first_seen: HashMap<&NodeId, usize> = graph
            .nodes()
            .iter()
            .enumerate()
            .map(|(i, id)| (id, i))
            .collect();
        let degrees: Vec<usize> = graph.nodes().iter().map(|v| graph.degree(v)).collect();
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| degrees[b].cmp(&degrees[a]).then(a.cmp(&b)));
        let mut position = vec![0usize; n];
        for (sorted, &orig) in order.iter().enumerate() {
            position[orig] = sorted;
        }

        let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (sorted, &orig) in order.iter().enumerate() {
            let id = &graph.nodes()[orig];
            let mut list: Vec<usize> = graph
                .neighbors(id)
                .map(|set| set.iter().map(|nb| position[first_seen[nb]]).collect())
                .unwrap_or_default();
            list.sort_unstable();
            neighbors[sorted] = list;
        }
        let neighbor_sets: Vec<HashSet<usize>> = neighbors
            .iter()
            .map(|list| list.iter().copied().collect())
            .collect();

        // Hidden degrees, floored at kappa0, and the radii they induce.
        let kappa: Vec<f64> = order
            .iter()
            .map(|&orig| (degrees[orig] as f64 - stats.gamma / stats.beta).max(stats.kappa0))
            .collect();
        let radial: Vec<f64> = kappa
            .iter()
            .map(|&k| (stats.radius - 2.0 * (k / stats.kappa0).ln()).max(0.0))
            .collect();

        let model = ConnectionModel {
            n: n as f64,
            mu: stats.mu,
            beta: stats.beta,
        };
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let theta = AngularOptimizer::new(
            &self.config.angular,
            model,
            &kappa,
            &neighbors,
            &neighbor_sets,
        )
        .assign(&mut rng);

        let nodes: Vec<EmbeddedNode> = order
            .iter()
            .enumerate()
            .map(|(sorted, &orig)| EmbeddedNode {
                id: graph.nodes()[orig].clone(),
                r: radial[sorted],
                theta: theta[sorted],
                kappa: kappa[sorted],
                degree: degrees[orig],
            })
            .collect();
        let index: HashMap<NodeId, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.clone(), i))
            .collect();

        info!(nodes = nodes.len(), "embedding complete");
        Ok(EmbeddingResult {
            nodes,
            stats,
            neighbors,
            index,
        })
    }
}

impl Default for LikelihoodEmbedding {
    fn default() -> Self {
        Self::new()
    }
}
