//! Edge-list parsing.
//!
//! Accepts the two-column CSV convention used by the common network
//! repositories: a header line (content ignored) followed by
//! `source,target` rows. Extra columns are ignored, malformed rows are
//! skipped, row order is preserved.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An endpoint pair as it appeared in the input. Undirected: `(u, v)` and
/// `(v, u)` denote the same edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("edge list has no lines; expected a header followed by source,target rows")]
    MalformedInput,
}

/// Parse edge CSV text into an ordered edge list.
///
/// The first line is a header and is discarded. Each following non-empty
/// line is split on commas; the first two fields are the endpoints, both
/// trimmed. Rows with a missing or empty endpoint are skipped silently.
/// An input that parses to zero edges is legal and yields an empty list.
pub fn parse_edge_list(text: &str) -> Result<Vec<Edge>, ParseError> {
    let mut lines = text.lines();
    if lines.next().is_none() {
        return Err(ParseError::MalformedInput);
    }

    let mut edges = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let Some((source, rest)) = line.split_once(',') else {
            continue;
        };
        let target = rest.split(',').next().unwrap_or(rest);
        let source = source.trim();
        let target = target.trim();
        if source.is_empty() || target.is_empty() {
            continue;
        }
        edges.push(Edge::new(source, target));
    }
    Ok(edges)
}
