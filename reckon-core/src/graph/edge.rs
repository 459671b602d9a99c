//! Graph Edges
//!
//! An [`Edge`] `(from, to)` declares that `from` depends on `to`. Edges are
//! stored independently of nodes, so they may dangle: an edge can exist
//! while one or both of its endpoints do not.
//!
//! [`EdgeStore`] keeps the canonical edge set together with two indexes, one
//! keyed by source and one keyed by destination, so both directions can be
//! looked up without scanning.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A directed dependency: `from` reads from `to`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    from: String,
    to: String,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// The dependent end.
    pub fn from(&self) -> &str {
        &self.from
    }

    /// The dependency end.
    pub fn to(&self) -> &str {
        &self.to
    }
}

impl<A: Into<String>, B: Into<String>> From<(A, B)> for Edge {
    fn from((from, to): (A, B)) -> Self {
        Edge::new(from, to)
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

type Bucket = SmallVec<[String; 4]>;

/// Canonical edge set with `by_from` / `by_to` indexes.
#[derive(Debug, Clone, Default)]
pub struct EdgeStore {
    edges: IndexSet<Edge>,
    by_from: HashMap<String, Bucket>,
    by_to: HashMap<String, Bucket>,
}

impl EdgeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn contains(&self, edge: &Edge) -> bool {
        self.edges.contains(edge)
    }

    /// Insert an edge. Returns `false` if the exact ordered pair exists.
    pub fn insert(&mut self, edge: Edge) -> bool {
        if self.edges.contains(&edge) {
            return false;
        }
        self.by_from
            .entry(edge.from.clone())
            .or_default()
            .push(edge.to.clone());
        self.by_to
            .entry(edge.to.clone())
            .or_default()
            .push(edge.from.clone());
        self.edges.insert(edge);
        true
    }

    /// Remove an edge. Returns `false` if it was not present.
    pub fn remove(&mut self, edge: &Edge) -> bool {
        if !self.edges.shift_remove(edge) {
            return false;
        }
        detach(&mut self.by_from, &edge.from, &edge.to);
        detach(&mut self.by_to, &edge.to, &edge.from);
        true
    }

    /// All edges leaving `from` (what `from` depends on).
    pub fn by_from(&self, from: &str) -> Vec<Edge> {
        self.by_from
            .get(from)
            .map(|targets| targets.iter().map(|to| Edge::new(from, to.as_str())).collect())
            .unwrap_or_default()
    }

    /// All edges arriving at `to` (what depends on `to`).
    pub fn by_to(&self, to: &str) -> Vec<Edge> {
        self.by_to
            .get(to)
            .map(|sources| sources.iter().map(|from| Edge::new(from.as_str(), to)).collect())
            .unwrap_or_default()
    }

    /// Number of edges leaving `from`, dangling or not.
    pub fn out_degree(&self, from: &str) -> usize {
        self.by_from.get(from).map_or(0, |targets| targets.len())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn clear(&mut self) {
        self.edges.clear();
        self.by_from.clear();
        self.by_to.clear();
    }
}

fn detach(index: &mut HashMap<String, Bucket>, key: &str, value: &str) {
    if let Some(bucket) = index.get_mut(key) {
        bucket.retain(|v| v != value);
        if bucket.is_empty() {
            index.remove(key);
        }
    }
}
