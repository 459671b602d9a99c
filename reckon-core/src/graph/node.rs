//! Graph Nodes
//!
//! This module defines the node type that lives in the dependency graph.
//!
//! A node's `dependencies` and `dependents` are caches of the edge store,
//! restricted to edges whose both endpoints currently exist. The graph keeps
//! them in sync; nothing outside `graph` mutates them.

use indexmap::IndexSet;

use super::stamp::EventStamp;

/// Insertion-ordered set of node names.
pub type NodeNameSet = IndexSet<String>;

/// A node in the dependency graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    /// Nodes that this node reads from.
    dependencies: NodeNameSet,

    /// Nodes that read from this node.
    dependents: NodeNameSet,

    /// Whether the node may be stale and should be rechecked on the next
    /// update pass.
    dirty: bool,

    /// Last time this node's externally visible value changed.
    event_stamp: EventStamp,
}

impl Node {
    /// Create a new clean node with no edges.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all dependencies.
    pub fn dependencies(&self) -> &NodeNameSet {
        &self.dependencies
    }

    /// Get all dependents.
    pub fn dependents(&self) -> &NodeNameSet {
        &self.dependents
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn event_stamp(&self) -> EventStamp {
        self.event_stamp
    }

    pub(crate) fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    pub(crate) fn set_event_stamp(&mut self, stamp: EventStamp) {
        self.event_stamp = stamp;
    }

    pub(crate) fn add_dependency(&mut self, name: &str) -> bool {
        self.dependencies.insert(name.to_owned())
    }

    pub(crate) fn remove_dependency(&mut self, name: &str) -> bool {
        self.dependencies.shift_remove(name)
    }

    pub(crate) fn add_dependent(&mut self, name: &str) -> bool {
        self.dependents.insert(name.to_owned())
    }

    pub(crate) fn remove_dependent(&mut self, name: &str) -> bool {
        self.dependents.shift_remove(name)
    }
}
