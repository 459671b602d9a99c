//! Dependency Graph
//!
//! [`DependencyGraph`] owns the nodes (keyed by name) and the edge store, and
//! keeps the per-node `dependencies` / `dependents` caches in step with the
//! edges whose two endpoints both exist.
//!
//! Outside a batch update every add is cycle-checked immediately and undone
//! on failure. Inside a batch update mutations are logged and the check runs
//! once at commit (see [`super::transaction`]).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use super::edge::{Edge, EdgeStore};
use super::node::Node;
use super::stamp::{EventStamp, EventStampGenerator};
use super::transaction::{BatchUpdate, Operation};
use crate::error::CycleError;
use crate::signal::{Connection, Signal};

/// Listener shape for the dependency/dependent change signals. The argument
/// is the name of the node whose set changed.
pub type NodeChangedSlot = dyn Fn(&str) + Send + Sync;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Visited,
}

/// Acyclic dependency graph with transactional mutation.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    nodes: IndexMap<String, Node>,
    edges: EdgeStore,
    /// Present exactly while a batch update is open.
    journal: Option<Vec<Operation>>,
    dependency_changed: Signal<NodeChangedSlot>,
    dependent_changed: Signal<NodeChangedSlot>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }

    /// Like [`node`](Self::node), but also hands back the graph-owned name.
    pub fn node_entry(&self, name: &str) -> Option<(&str, &Node)> {
        self.nodes
            .get_key_value(name)
            .map(|(name, node)| (name.as_str(), node))
    }

    pub fn contains_node(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn contains_edge(&self, edge: &Edge) -> bool {
        self.edges.contains(edge)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of stored edges, dangling ones included.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Node names in insertion order.
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.nodes.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// Edges whose source is `from`, dangling or not.
    pub fn edges_by_from(&self, from: &str) -> Vec<Edge> {
        self.edges.by_from(from)
    }

    /// Edges whose destination is `to`, dangling or not.
    pub fn edges_by_to(&self, to: &str) -> Vec<Edge> {
        self.edges.by_to(to)
    }

    /// Visit every node in insertion order.
    pub fn traversal(&self, mut visit: impl FnMut(&str, &Node)) {
        for (name, node) in &self.nodes {
            visit(name, node);
        }
    }

    /// Add a node, activating any edge that now has both endpoints.
    ///
    /// Returns `Ok(false)` if the node already exists.
    pub fn add_node(&mut self, name: &str) -> Result<bool, CycleError> {
        if self.nodes.contains_key(name) {
            return Ok(false);
        }
        self.attach_node(name, Node::new());

        if let Some(journal) = self.journal.as_mut() {
            journal.push(Operation::AddNode(name.to_owned()));
            return Ok(true);
        }
        if let Some(path) = self.find_cycle() {
            self.detach_node(name);
            warn!(node = name, "rejected node: {}", path.join(" -> "));
            return Err(CycleError::new(path));
        }
        Ok(true)
    }

    /// Remove a node. Its edges stay in the store as dangling edges.
    pub fn remove_node(&mut self, name: &str) -> bool {
        let Some((index, node)) = self.detach_node(name) else {
            return false;
        };
        if let Some(journal) = self.journal.as_mut() {
            journal.push(Operation::RemoveNode {
                name: name.to_owned(),
                index,
                node,
            });
        }
        true
    }

    /// Add an edge, activating it if both endpoints exist.
    ///
    /// Returns `Ok(false)` if the exact edge already exists.
    pub fn add_edge(&mut self, edge: Edge) -> Result<bool, CycleError> {
        if !self.edges.insert(edge.clone()) {
            return Ok(false);
        }
        self.activate(&edge);

        if let Some(journal) = self.journal.as_mut() {
            journal.push(Operation::AddEdge(edge));
            return Ok(true);
        }
        if let Some(path) = self.find_cycle() {
            self.edges.remove(&edge);
            self.deactivate(&edge);
            warn!(%edge, "rejected edge: {}", path.join(" -> "));
            return Err(CycleError::new(path));
        }
        Ok(true)
    }

    pub fn remove_edge(&mut self, edge: &Edge) -> bool {
        if !self.edges.remove(edge) {
            return false;
        }
        self.deactivate(edge);
        if let Some(journal) = self.journal.as_mut() {
            journal.push(Operation::RemoveEdge(edge.clone()));
        }
        true
    }

    /// Add several nodes, checked for cycles as one unit.
    ///
    /// Joins an already open batch instead of opening its own.
    pub fn add_nodes<I, S>(&mut self, names: I) -> Result<bool, CycleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut batch = self.batch_update();
        let mut all = true;
        for name in names {
            all &= batch.add_node(name.as_ref())?;
        }
        batch.commit()?;
        Ok(all)
    }

    pub fn remove_nodes<I, S>(&mut self, names: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut all = true;
        for name in names {
            all &= self.remove_node(name.as_ref());
        }
        all
    }

    /// Add several edges, checked for cycles as one unit.
    pub fn add_edges<I>(&mut self, edges: I) -> Result<bool, CycleError>
    where
        I: IntoIterator<Item = Edge>,
    {
        let mut batch = self.batch_update();
        let mut all = true;
        for edge in edges {
            all &= batch.add_edge(edge)?;
        }
        batch.commit()?;
        Ok(all)
    }

    pub fn remove_edges<'e, I>(&mut self, edges: I) -> bool
    where
        I: IntoIterator<Item = &'e Edge>,
    {
        let mut all = true;
        for edge in edges {
            all &= self.remove_edge(edge);
        }
        all
    }

    pub fn is_batch_update_in_progress(&self) -> bool {
        self.journal.is_some()
    }

    /// Open a batch update. Returns `false` if one is already open.
    pub fn begin_batch_update(&mut self) -> bool {
        if self.journal.is_some() {
            return false;
        }
        trace!("batch update opened");
        self.journal = Some(Vec::new());
        true
    }

    /// Close the open batch update.
    ///
    /// Returns `Ok(false)` if no batch was open. On a cycle every logged
    /// operation is undone and the cycle is returned.
    pub fn end_batch_update(&mut self) -> Result<bool, CycleError> {
        let Some(journal) = self.journal.take() else {
            return Ok(false);
        };
        if let Some(path) = self.find_cycle() {
            warn!(
                operations = journal.len(),
                "batch update rolled back: {}",
                path.join(" -> ")
            );
            self.roll_back(journal);
            return Err(CycleError::new(path));
        }
        debug!(operations = journal.len(), "batch update committed");
        Ok(true)
    }

    /// Like [`end_batch_update`](Self::end_batch_update), but a cycle is
    /// rolled back silently. Returns `false` if no batch was open.
    pub fn end_batch_update_no_throw(&mut self) -> bool {
        match self.end_batch_update() {
            Ok(closed) => closed,
            Err(_) => true,
        }
    }

    /// Undo everything logged since the batch opened and close it.
    pub fn abort_batch_update(&mut self) -> bool {
        let Some(journal) = self.journal.take() else {
            return false;
        };
        debug!(operations = journal.len(), "batch update aborted");
        self.roll_back(journal);
        true
    }

    /// Open a scoped batch update. See [`BatchUpdate`].
    pub fn batch_update(&mut self) -> BatchUpdate<'_> {
        BatchUpdate::new(self)
    }

    /// Mark `name` and everything that transitively depends on it dirty.
    pub fn invalidate_node(&mut self, name: &str) -> bool {
        if !self.nodes.contains_key(name) {
            return false;
        }
        let mut visited = HashSet::new();
        let mut pending = vec![name.to_owned()];
        while let Some(current) = pending.pop() {
            let Some(node) = self.nodes.get_mut(&current) else {
                continue;
            };
            node.set_dirty(true);
            pending.extend(
                node.dependents()
                    .iter()
                    .filter(|dependent| !visited.contains(*dependent))
                    .cloned(),
            );
            visited.insert(current);
        }
        true
    }

    /// Clear the dirty flag of one node without touching its dependents.
    pub fn mark_clean(&mut self, name: &str) -> bool {
        match self.nodes.get_mut(name) {
            Some(node) => {
                node.set_dirty(false);
                true
            }
            None => false,
        }
    }

    /// Record that the node's visible value changed just now.
    pub fn update_event_stamp(&mut self, name: &str) -> Option<EventStamp> {
        let node = self.nodes.get_mut(name)?;
        let stamp = EventStampGenerator::next();
        node.set_event_stamp(stamp);
        Some(stamp)
    }

    /// Whether a dirty node actually has to be re-evaluated.
    ///
    /// True if the node was never stamped, if one of its declared dependencies
    /// is missing or unstamped, or if some dependency changed at or after the
    /// node's own last change. A recreated dependency starts unstamped, so its
    /// dependents are re-evaluated even when it never produces a value.
    pub fn needs_evaluation(&self, name: &str) -> bool {
        let Some(node) = self.nodes.get(name) else {
            return false;
        };
        if node.event_stamp() == EventStamp::ZERO {
            return true;
        }
        if node.dependencies().len() != self.edges.out_degree(name) {
            return true;
        }
        node.dependencies()
            .iter()
            .filter_map(|dependency| self.nodes.get(dependency))
            .map(Node::event_stamp)
            .any(|stamp| stamp == EventStamp::ZERO || node.event_stamp() <= stamp)
    }

    /// Drop every node and edge. An open batch is discarded without rollback.
    /// Signal listeners stay connected.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.journal = None;
    }

    /// Called with a node's name whenever its `dependencies` set changes.
    pub fn connect_dependency_changed(&self, slot: Arc<NodeChangedSlot>) -> Connection {
        self.dependency_changed.connect(slot)
    }

    /// Called with a node's name whenever its `dependents` set changes.
    pub fn connect_dependent_changed(&self, slot: Arc<NodeChangedSlot>) -> Connection {
        self.dependent_changed.connect(slot)
    }

    /// Find one cycle, if any, following `dependencies`.
    ///
    /// The returned path starts and ends on the same node.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let mut marks: HashMap<&str, Mark> = HashMap::with_capacity(self.nodes.len());
        let mut predecessor: HashMap<&str, &str> = HashMap::new();

        for start in self.nodes.keys() {
            if marks.contains_key(start.as_str()) {
                continue;
            }
            marks.insert(start.as_str(), Mark::Visiting);
            let mut stack: Vec<(&str, usize)> = vec![(start.as_str(), 0)];

            while let Some(&(current, cursor)) = stack.last() {
                let next = self
                    .nodes
                    .get(current)
                    .and_then(|node| node.dependencies().get_index(cursor));

                let Some(next) = next else {
                    marks.insert(current, Mark::Visited);
                    stack.pop();
                    continue;
                };
                if let Some(frame) = stack.last_mut() {
                    frame.1 += 1;
                }

                match marks.get(next.as_str()) {
                    None => {
                        marks.insert(next.as_str(), Mark::Visiting);
                        predecessor.insert(next.as_str(), current);
                        stack.push((next.as_str(), 0));
                    }
                    Some(Mark::Visiting) => {
                        let mut path = vec![next.clone()];
                        let mut walk = current;
                        while walk != next.as_str() {
                            path.push(walk.to_owned());
                            match predecessor.get(walk) {
                                Some(&previous) => walk = previous,
                                None => break,
                            }
                        }
                        path.push(next.clone());
                        path.reverse();
                        return Some(path);
                    }
                    Some(Mark::Visited) => {}
                }
            }
        }
        None
    }

    fn attach_node(&mut self, name: &str, node: Node) {
        self.attach_node_at(self.nodes.len(), name, node);
    }

    fn attach_node_at(&mut self, index: usize, name: &str, node: Node) {
        let index = index.min(self.nodes.len());
        self.nodes.shift_insert(index, name.to_owned(), node);
        for edge in self.edges.by_from(name) {
            self.activate(&edge);
        }
        for edge in self.edges.by_to(name) {
            self.activate(&edge);
        }
    }

    /// Remove a node and return it with its former position.
    fn detach_node(&mut self, name: &str) -> Option<(usize, Node)> {
        let (index, _, node) = self.nodes.shift_remove_full(name)?;
        for edge in self.edges.by_from(name) {
            self.deactivate(&edge);
        }
        for edge in self.edges.by_to(name) {
            self.deactivate(&edge);
        }
        Some((index, node))
    }

    fn activate(&mut self, edge: &Edge) {
        if !(self.nodes.contains_key(edge.from()) && self.nodes.contains_key(edge.to())) {
            return;
        }
        let added_dependency = self
            .nodes
            .get_mut(edge.from())
            .is_some_and(|node| node.add_dependency(edge.to()));
        let added_dependent = self
            .nodes
            .get_mut(edge.to())
            .is_some_and(|node| node.add_dependent(edge.from()));

        if added_dependency {
            self.dependency_changed.emit_with(|slot| slot(edge.from()));
        }
        if added_dependent {
            self.dependent_changed.emit_with(|slot| slot(edge.to()));
        }
    }

    fn deactivate(&mut self, edge: &Edge) {
        let removed_dependency = self
            .nodes
            .get_mut(edge.from())
            .is_some_and(|node| node.remove_dependency(edge.to()));
        let removed_dependent = self
            .nodes
            .get_mut(edge.to())
            .is_some_and(|node| node.remove_dependent(edge.from()));

        if removed_dependency {
            self.dependency_changed.emit_with(|slot| slot(edge.from()));
        }
        if removed_dependent {
            self.dependent_changed.emit_with(|slot| slot(edge.to()));
        }
    }

    fn roll_back(&mut self, journal: Vec<Operation>) {
        for operation in journal.into_iter().rev() {
            match operation {
                Operation::AddNode(name) => {
                    self.detach_node(&name);
                }
                Operation::RemoveNode {
                    name,
                    index,
                    node: snapshot,
                } => {
                    let mut node = Node::new();
                    node.set_dirty(snapshot.is_dirty());
                    node.set_event_stamp(snapshot.event_stamp());
                    self.attach_node_at(index, &name, node);
                }
                Operation::AddEdge(edge) => {
                    if self.edges.remove(&edge) {
                        self.deactivate(&edge);
                    }
                }
                Operation::RemoveEdge(edge) => {
                    if self.edges.insert(edge.clone()) {
                        self.activate(&edge);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn graph_with(nodes: &[&str], edges: &[(&str, &str)]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for node in nodes {
            graph.add_node(node).unwrap();
        }
        for &edge in edges {
            graph.add_edge(edge.into()).unwrap();
        }
        graph
    }

    #[test]
    fn duplicate_node_and_edge_are_rejected() {
        let mut graph = graph_with(&["A", "B"], &[("A", "B")]);
        assert!(!graph.add_node("A").unwrap());
        assert!(!graph.add_edge(Edge::new("A", "B")).unwrap());
        assert!(!graph.remove_node("missing"));
        assert!(!graph.remove_edge(&Edge::new("B", "A")));
    }

    #[test]
    fn dangling_edge_activates_when_both_endpoints_exist() {
        let mut graph = DependencyGraph::new();
        assert!(graph.add_edge(Edge::new("A", "B")).unwrap());
        assert!(graph.contains_edge(&Edge::new("A", "B")));

        graph.add_node("A").unwrap();
        assert!(graph.node("A").unwrap().dependencies().is_empty());

        graph.add_node("B").unwrap();
        assert!(graph.node("A").unwrap().dependencies().contains("B"));
        assert!(graph.node("B").unwrap().dependents().contains("A"));
    }

    #[test]
    fn removing_node_leaves_edge_dangling() {
        let mut graph = graph_with(&["A", "B"], &[("A", "B")]);
        assert!(graph.remove_node("B"));

        assert!(graph.node("A").unwrap().dependencies().is_empty());
        assert!(graph.contains_edge(&Edge::new("A", "B")));

        graph.add_node("B").unwrap();
        assert!(graph.node("A").unwrap().dependencies().contains("B"));
    }

    #[test]
    fn reverse_edge_is_a_cycle() {
        let mut graph = graph_with(&["A", "B"], &[("A", "B")]);
        let err = graph.add_edge(Edge::new("B", "A")).unwrap_err();

        let path = err.path();
        assert!(path.contains(&"A".to_string()));
        assert!(path.contains(&"B".to_string()));
        assert_eq!(path.first(), path.last());
        assert!(!graph.contains_edge(&Edge::new("B", "A")));
        assert!(!graph.node("B").unwrap().dependencies().contains("A"));
    }

    #[test]
    fn self_edge_is_a_cycle() {
        let mut graph = graph_with(&["A"], &[]);
        let err = graph.add_edge(Edge::new("A", "A")).unwrap_err();
        assert_eq!(err.path(), ["A".to_string(), "A".to_string()]);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn node_completing_a_cycle_is_removed_again() {
        let mut graph = graph_with(&["A", "B"], &[("A", "B"), ("B", "C"), ("C", "A")]);
        assert!(graph.add_node("C").is_err());
        assert!(!graph.contains_node("C"));
        assert!(graph.contains_edge(&Edge::new("C", "A")));
        assert!(graph.node("B").unwrap().dependencies().is_empty());
    }

    #[test]
    fn cycle_path_follows_dependency_direction() {
        let graph = {
            let mut graph = graph_with(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
            graph.begin_batch_update();
            graph.add_edge(Edge::new("C", "A")).unwrap();
            graph
        };
        let path = graph.find_cycle().unwrap();
        assert_eq!(path.len(), 4);
        for pair in path.windows(2) {
            assert!(graph.node(&pair[0]).unwrap().dependencies().contains(&pair[1]));
        }
    }

    #[test]
    fn batch_rejects_reentrant_begin() {
        let mut graph = DependencyGraph::new();
        assert!(graph.begin_batch_update());
        assert!(!graph.begin_batch_update());
        assert!(graph.end_batch_update().unwrap());
        assert!(!graph.end_batch_update().unwrap());
    }

    #[test]
    fn batch_defers_cycle_check_to_commit() {
        let mut graph = graph_with(&["A", "B"], &[("A", "B")]);
        graph.invalidate_node("B");
        let before: Vec<(String, bool)> = graph
            .nodes()
            .map(|(name, node)| (name.to_owned(), node.is_dirty()))
            .collect();

        graph.begin_batch_update();
        assert!(graph.add_edge(Edge::new("B", "A")).unwrap());
        assert!(graph.add_node("C").unwrap());
        assert!(graph.remove_node("A"));
        assert!(graph.add_node("A").unwrap());
        assert!(graph.end_batch_update().is_err());

        assert!(!graph.contains_node("C"));
        assert!(!graph.contains_edge(&Edge::new("B", "A")));
        assert!(graph.contains_edge(&Edge::new("A", "B")));
        let after: Vec<(String, bool)> = graph
            .nodes()
            .map(|(name, node)| (name.to_owned(), node.is_dirty()))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn no_throw_end_rolls_back_silently() {
        let mut graph = graph_with(&["A", "B"], &[("A", "B")]);
        graph.begin_batch_update();
        graph.add_edge(Edge::new("B", "A")).unwrap();
        assert!(graph.end_batch_update_no_throw());
        assert!(!graph.contains_edge(&Edge::new("B", "A")));
        assert!(!graph.end_batch_update_no_throw());
    }

    #[test]
    fn rollback_restores_removed_node_state() {
        let mut graph = graph_with(&["A", "B"], &[("A", "B")]);
        let stamp = graph.update_event_stamp("B").unwrap();
        graph.mark_clean("A");
        graph.invalidate_node("B");

        graph.begin_batch_update();
        graph.remove_node("B");
        graph.add_edge(Edge::new("A", "A")).unwrap();
        assert!(graph.end_batch_update().is_err());

        let b = graph.node("B").unwrap();
        assert!(b.is_dirty());
        assert_eq!(b.event_stamp(), stamp);
        assert!(graph.node("A").unwrap().dependencies().contains("B"));
    }

    #[test]
    fn batch_add_edges_is_atomic() {
        let mut graph = graph_with(&["A", "B", "C"], &[]);
        let result = graph.add_edges([
            Edge::new("A", "B"),
            Edge::new("B", "C"),
            Edge::new("C", "A"),
        ]);
        assert!(result.is_err());
        assert_eq!(graph.edge_count(), 0);

        assert!(graph.add_nodes(["D", "E"]).unwrap());
        assert!(!graph.add_nodes(["D", "F"]).unwrap());
        assert!(graph.contains_node("F"));
        assert!(graph.remove_nodes(["D", "E"]));
        assert!(!graph.remove_nodes(["F", "nope"]));
    }

    #[test]
    fn invalidate_marks_dependent_closure() {
        let mut graph = graph_with(
            &["A", "B", "C", "D"],
            &[("B", "A"), ("C", "B"), ("D", "X")],
        );
        assert!(graph.invalidate_node("A"));

        assert!(graph.node("A").unwrap().is_dirty());
        assert!(graph.node("B").unwrap().is_dirty());
        assert!(graph.node("C").unwrap().is_dirty());
        assert!(!graph.node("D").unwrap().is_dirty());
        assert!(!graph.invalidate_node("X"));
    }

    #[test]
    fn needs_evaluation_compares_stamps() {
        let mut graph = graph_with(&["A", "B"], &[("A", "B")]);
        graph.update_event_stamp("B");
        assert!(graph.needs_evaluation("A"));

        graph.update_event_stamp("A");
        assert!(!graph.needs_evaluation("A"));

        graph.update_event_stamp("B");
        assert!(graph.needs_evaluation("A"));
    }

    #[test]
    fn needs_evaluation_with_missing_dependency() {
        let mut graph = graph_with(&["A"], &[("A", "B")]);
        graph.update_event_stamp("A");
        assert!(graph.needs_evaluation("A"));
        assert!(!graph.needs_evaluation("B"));
    }

    /// Test that a recreated dependency counts as changed before its first stamp.
    #[test]
    fn needs_evaluation_with_unstamped_dependency() {
        let mut graph = graph_with(&["A", "B"], &[("A", "B")]);
        graph.update_event_stamp("B");
        graph.update_event_stamp("A");
        assert!(!graph.needs_evaluation("A"));

        graph.remove_node("B");
        graph.add_node("B").unwrap();
        assert_eq!(graph.node("B").unwrap().event_stamp(), EventStamp::ZERO);
        assert!(graph.needs_evaluation("A"));
    }

    #[test]
    fn change_signals_fire_on_activation() {
        let mut graph = DependencyGraph::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let deps = seen.clone();
        let _c1 = graph.connect_dependency_changed(Arc::new(move |name: &str| {
            deps.lock().push(format!("dependencies:{name}"));
        }));
        let dependents = seen.clone();
        let _c2 = graph.connect_dependent_changed(Arc::new(move |name: &str| {
            dependents.lock().push(format!("dependents:{name}"));
        }));

        graph.add_edge(Edge::new("A", "B")).unwrap();
        graph.add_node("A").unwrap();
        assert!(seen.lock().is_empty());

        graph.add_node("B").unwrap();
        assert_eq!(
            *seen.lock(),
            vec!["dependencies:A".to_string(), "dependents:B".to_string()]
        );

        seen.lock().clear();
        graph.remove_node("B");
        assert_eq!(*seen.lock(), vec!["dependencies:A".to_string()]);
    }

    #[test]
    fn reset_clears_everything() {
        let mut graph = graph_with(&["A", "B"], &[("A", "B"), ("C", "D")]);
        graph.begin_batch_update();
        graph.reset();
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
        assert!(!graph.is_batch_update_in_progress());
    }

    #[test]
    fn edge_queries_include_dangling_edges() {
        let graph = graph_with(&["A"], &[("A", "B"), ("A", "C"), ("D", "B")]);
        assert_eq!(graph.edges_by_from("A").len(), 2);
        assert_eq!(graph.edges_by_to("B").len(), 2);
        assert_eq!(graph.edges().count(), 3);

        let mut visited = Vec::new();
        graph.traversal(|name, _| visited.push(name.to_owned()));
        assert_eq!(visited, vec!["A".to_string()]);
    }
}
