//! Bidirectional greedy geometric routing.
//!
//! Walks from the start and the end of a query simultaneously over the
//! embedded coordinates: each side repeatedly hops to the unvisited
//! neighbor closest (in hyperbolic distance) to the opposing endpoint.
//! After every hop the newly reached node is checked against the other
//! side's visited set; the first intersection is the meeting node and the
//! two partial walks are stitched into one simple path. When neither side
//! can move the query fails, reported as an unsuccessful result rather
//! than an error.
//!
//! Each side visits a node at most once, so the loop runs at most N
//! iterations. Queries only read the shared embedding; all per-query state
//! lives on the stack of the call.

use crate::embedding::{EmbeddedNode, EmbeddingResult};
use crate::graph::NodeId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq)]
pub enum RoutingError {
    #[error("cannot route on an empty embedding")]
    EmptyGraph,
    #[error("node {0} is not part of the embedding")]
    NodeNotFound(NodeId),
}

/// Outcome of one routing query.
///
/// On success `path` runs from start to end, every consecutive pair is an
/// edge, and all entries are distinct. On failure `path` is empty and the
/// metrics are infinite; the partial walks are still reported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingResult {
    pub success: bool,
    pub path: Vec<EmbeddedNode>,
    pub forward_path: Vec<EmbeddedNode>,
    pub backward_path: Vec<EmbeddedNode>,
    pub meeting_node: Option<EmbeddedNode>,
    /// Sum of hyperbolic distances along `path`.
    pub distance: f64,
    /// `distance` over the direct start-to-end distance; 1.0 for identity
    /// queries.
    pub stretch: f64,
    /// Hop count, `|path| − 1`; 0 on failure.
    pub path_length: usize,
}

/// Bidirectional greedy router over a finished embedding.
pub struct BidirectionalRouter<'a> {
    embedding: &'a EmbeddingResult,
}

impl<'a> BidirectionalRouter<'a> {
    pub fn new(embedding: &'a EmbeddingResult) -> Self {
        Self { embedding }
    }

    /// Route between two embedded nodes by id.
    pub fn route(&self, start: &NodeId, end: &NodeId) -> Result<RoutingResult, RoutingError> {
        if self.embedding.is_empty() {
            return Err(RoutingError::EmptyGraph);
        }
        let s = self
            .embedding
            .index_of(start)
            .ok_or_else(|| RoutingError::NodeNotFound(start.clone()))?;
        let t = self
            .embedding
            .index_of(end)
            .ok_or_else(|| RoutingError::NodeNotFound(end.clone()))?;

        if s == t {
            let node = self.embedding.nodes[s].clone();
            return Ok(RoutingResult {
                success: true,
                path: vec![node.clone()],
                forward_path: vec![node.clone()],
                backward_path: vec![node.clone()],
                meeting_node: Some(node),
                distance: 0.0,
                stretch: 1.0,
                path_length: 0,
            });
        }

        let n = self.embedding.len();
        let mut forward = vec![s];
        let mut backward = vec![t];
        let mut forward_visited = vec![false; n];
        let mut backward_visited = vec![false; n];
        forward_visited[s] = true;
        backward_visited[t] = true;

        loop {
            let mut moved = false;

            // One forward hop toward the end.
            if let Some(next) = self.best_hop(*forward.last().expect("nonempty"), t, &forward_visited)
            {
                forward.push(next);
                forward_visited[next] = true;
                moved = true;
                if backward_visited[next] {
                    return Ok(self.stitch_forward_meet(s, t, forward, backward, next));
                }
            }

            // One backward hop toward the start.
            if let Some(next) =
                self.best_hop(*backward.last().expect("nonempty"), s, &backward_visited)
            {
                backward.push(next);
                backward_visited[next] = true;
                moved = true;
                if forward_visited[next] {
                    return Ok(self.stitch_backward_meet(s, t, forward, backward, next));
                }
            }

            if !moved {
                debug!(start = %start, end = %end, "both walks stalled");
                return Ok(self.failure(forward, backward));
            }
        }
    }

    /// Greedy next hop: the unvisited neighbor of `current` minimizing
    /// hyperbolic distance to `target`. Strict comparison keeps the lowest
    /// index on ties, so routing is deterministic.
    fn best_hop(&self, current: usize, target: usize, visited: &[bool]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for &candidate in &self.embedding.neighbors[current] {
            if visited[candidate] {
                continue;
            }
            let d = self.embedding.distance(candidate, target);
            match best {
                Some((_, best_d)) if d >= best_d => {}
                _ => best = Some((candidate, d)),
            }
        }
        best.map(|(idx, _)| idx)
    }

    /// Forward walk landed on `meet`, already visited by the backward walk:
    /// append the backward prefix before `meet`, reversed, so the combined
    /// path ends at the query's end node.
    fn stitch_forward_meet(
        &self,
        s: usize,
        t: usize,
        forward: Vec<usize>,
        backward: Vec<usize>,
        meet: usize,
    ) -> RoutingResult {
        let k = backward
            .iter()
            .position(|&x| x == meet)
            .expect("meet is in the backward walk");
        let full: Vec<usize> = forward
            .iter()
            .copied()
            .chain(backward[..k].iter().rev().copied())
            .collect();
        self.success(s, t, full, forward, backward, meet)
    }

    /// Backward walk landed on `meet`, already visited by the forward walk:
    /// keep the forward prefix up to `meet`, then the whole backward walk
    /// reversed minus its final entry (which duplicates `meet`).
    fn stitch_backward_meet(
        &self,
        s: usize,
        t: usize,
        forward: Vec<usize>,
        backward: Vec<usize>,
        meet: usize,
    ) -> RoutingResult {
        let k = forward
            .iter()
            .position(|&x| x == meet)
            .expect("meet is in the forward walk");
        let full: Vec<usize> = forward[..=k]
            .iter()
            .copied()
            .chain(backward[..backward.len() - 1].iter().rev().copied())
            .collect();
        self.success(s, t, full, forward, backward, meet)
    }

    fn success(
        &self,
        s: usize,
        t: usize,
        full: Vec<usize>,
        forward: Vec<usize>,
        backward: Vec<usize>,
        meet: usize,
    ) -> RoutingResult {
        let distance: f64 = full
            .windows(2)
            .map(|pair| self.embedding.distance(pair[0], pair[1]))
            .sum();
        let direct = self.embedding.distance(s, t);
        let stretch = if direct > 0.0 { distance / direct } else { 1.0 };
        debug!(
            hops = full.len() - 1,
            distance, stretch, "routing query succeeded"
        );
        RoutingResult {
            success: true,
            path_length: full.len() - 1,
            path: self.materialize(&full),
            forward_path: self.materialize(&forward),
            backward_path: self.materialize(&backward),
            meeting_node: Some(self.embedding.nodes[meet].clone()),
            distance,
            stretch,
        }
    }

    fn failure(&self, forward: Vec<usize>, backward: Vec<usize>) -> RoutingResult {
        RoutingResult {
            success: false,
            path: Vec::new(),
            forward_path: self.materialize(&forward),
            backward_path: self.materialize(&backward),
            meeting_node: None,
            distance: f64::INFINITY,
            stretch: f64::INFINITY,
            path_length: 0,
        }
    }

    fn materialize(&self, indices: &[usize]) -> Vec<EmbeddedNode> {
        indices
            .iter()
            .map(|&i| self.embedding.nodes[i].clone())
            .collect()
    }
}
