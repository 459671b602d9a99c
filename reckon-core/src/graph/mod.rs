//! Dependency Graph
//!
//! This module implements the dependency graph that tracks which named
//! quantities read from which others.
//!
//! # Overview
//!
//! - Nodes are keyed by name and carry a dirty flag and an event stamp
//! - An edge `(from, to)` means `from` depends on `to`
//! - Edges may exist before or after their endpoints; they only show up in a
//!   node's `dependencies` / `dependents` while both endpoints exist
//!
//! The graph is acyclic after every completed mutation. Single mutations are
//! checked immediately; batch updates are checked once at commit and rolled
//! back as a whole on failure.
//!
//! # Staleness
//!
//! Invalidating a node marks it and its whole dependent closure dirty. Dirty
//! only means "worth rechecking": a dirty node whose dependencies all carry
//! older event stamps than its own does not need to be evaluated again.

mod dependency_graph;
mod edge;
mod node;
mod scheduler;
mod stamp;
mod transaction;

pub use dependency_graph::{DependencyGraph, NodeChangedSlot};
pub use edge::{Edge, EdgeStore};
pub use node::{Node, NodeNameSet};
pub use stamp::{EventStamp, EventStampGenerator};
pub use transaction::{BatchUpdate, Operation};
