//! Batch Transactions
//!
//! While a batch update is open, every structural mutation of the graph is
//! recorded as an [`Operation`] and cycle detection is deferred to commit.
//! Commit runs cycle detection once over the whole graph; if it finds a cycle
//! the log is replayed backwards, applying the exact inverse of each entry.
//!
//! [`BatchUpdate`] is the scoped form: it opens a batch on creation, commits
//! through [`BatchUpdate::commit`], and rolls everything back if it is
//! dropped without committing. Opening a batch while another is open yields a
//! guard that does not own the transaction; its commit and drop are no-ops,
//! so helpers can open a guard unconditionally and still compose inside an
//! outer batch.

use std::ops::{Deref, DerefMut};

use super::dependency_graph::DependencyGraph;
use super::edge::Edge;
use super::node::Node;
use crate::error::CycleError;

/// One reversible entry of the batch log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    AddNode(String),
    /// Carries the removed node and its position so a rollback restores
    /// both its dirty flag and stamp and the node iteration order.
    RemoveNode { name: String, index: usize, node: Node },
    AddEdge(Edge),
    RemoveEdge(Edge),
}

/// Scoped batch transaction over a [`DependencyGraph`].
#[must_use = "an uncommitted batch is rolled back when dropped"]
pub struct BatchUpdate<'g> {
    graph: &'g mut DependencyGraph,
    owned: bool,
    finished: bool,
}

impl<'g> BatchUpdate<'g> {
    pub(super) fn new(graph: &'g mut DependencyGraph) -> Self {
        let owned = graph.begin_batch_update();
        Self {
            graph,
            owned,
            finished: false,
        }
    }

    /// Whether this guard opened the transaction (as opposed to joining an
    /// outer one).
    pub fn is_owner(&self) -> bool {
        self.owned
    }

    /// Commit the transaction.
    ///
    /// On a cycle the graph is restored to its state before the batch opened
    /// and the cycle is returned. A non-owning guard commits nothing.
    pub fn commit(mut self) -> Result<(), CycleError> {
        self.finished = true;
        if self.owned {
            self.graph.end_batch_update()?;
        }
        Ok(())
    }
}

impl Deref for BatchUpdate<'_> {
    type Target = DependencyGraph;

    fn deref(&self) -> &DependencyGraph {
        self.graph
    }
}

impl DerefMut for BatchUpdate<'_> {
    fn deref_mut(&mut self) -> &mut DependencyGraph {
        self.graph
    }
}

impl Drop for BatchUpdate<'_> {
    fn drop(&mut self) {
        if self.owned && !self.finished {
            self.graph.abort_batch_update();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn committed_batch_keeps_changes() {
        let mut graph = DependencyGraph::new();
        let mut batch = graph.batch_update();
        assert!(batch.is_owner());
        batch.add_node("A").unwrap();
        batch.add_edge(Edge::new("A", "B")).unwrap();
        batch.commit().unwrap();

        assert!(graph.contains_node("A"));
        assert!(graph.contains_edge(&Edge::new("A", "B")));
        assert!(!graph.is_batch_update_in_progress());
    }

    #[test]
    fn dropped_batch_rolls_back() {
        let mut graph = DependencyGraph::new();
        graph.add_node("keep").unwrap();
        {
            let mut batch = graph.batch_update();
            batch.add_node("A").unwrap();
            batch.remove_node("keep");
            batch.add_edge(Edge::new("A", "keep")).unwrap();
        }

        assert!(!graph.contains_node("A"));
        assert!(graph.contains_node("keep"));
        assert!(!graph.contains_edge(&Edge::new("A", "keep")));
        assert!(!graph.is_batch_update_in_progress());
    }

    #[test]
    fn cyclic_commit_restores_previous_state() {
        let mut graph = DependencyGraph::new();
        graph.add_node("A").unwrap();
        graph.add_node("B").unwrap();
        graph.add_edge(Edge::new("A", "B")).unwrap();

        let mut batch = graph.batch_update();
        batch.add_node("C").unwrap();
        batch.add_edge(Edge::new("B", "C")).unwrap();
        batch.add_edge(Edge::new("C", "A")).unwrap();
        let err = batch.commit().unwrap_err();

        assert_eq!(err.path().first(), err.path().last());
        assert!(!graph.contains_node("C"));
        assert!(!graph.contains_edge(&Edge::new("B", "C")));
        assert!(!graph.contains_edge(&Edge::new("C", "A")));
        assert!(graph.contains_edge(&Edge::new("A", "B")));
        assert!(graph.node("A").unwrap().dependencies().contains("B"));
    }

    #[test]
    fn nested_guard_joins_outer_transaction() {
        let mut graph = DependencyGraph::new();
        let mut outer = graph.batch_update();
        {
            let mut inner = outer.batch_update();
            assert!(!inner.is_owner());
            inner.add_node("A").unwrap();
            inner.commit().unwrap();
        }
        assert!(outer.is_batch_update_in_progress());
        outer.add_edge(Edge::new("A", "A")).unwrap();
        assert!(outer.commit().is_err());

        assert!(!graph.contains_node("A"));
        assert_eq!(graph.edge_count(), 0);
    }
}
