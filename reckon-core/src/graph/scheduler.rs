//! Update Scheduler
//!
//! The scheduler determines the order in which nodes should be evaluated.
//! It ensures that dependencies are always evaluated before their dependents.
//!
//! # Algorithm
//!
//! All three orderings use Kahn's algorithm restricted to a set of nodes:
//!
//! 1. Count, for each node in the set, its dependencies inside the set
//! 2. Queue every node whose count is zero
//! 3. Pop a node, emit it, and decrement the count of its dependents
//!
//! The rooted and seeded forms first collect the *dependent closure* of their
//! seeds (everything that transitively reads from them) and sort only that.
//! They return an empty order if the closure contains a cycle.
//!
//! Nodes that do not depend on each other come out in queue order, which is
//! not a stable contract.

use std::collections::{HashMap, VecDeque};

use indexmap::IndexSet;
use tracing::warn;

use super::dependency_graph::DependencyGraph;

impl DependencyGraph {
    /// Every node, dependencies before dependents.
    ///
    /// If the graph is cyclic (only possible while a batch update is open)
    /// the nodes on or behind the cycle are left out.
    pub fn topological_sort(&self) -> Vec<String> {
        let scope: IndexSet<&str> = self.node_names().collect();
        let order = self.kahn(&scope);
        if order.len() != scope.len() {
            warn!(
                sorted = order.len(),
                nodes = scope.len(),
                "topological sort hit a cycle"
            );
        }
        order
    }

    /// `name` and everything that transitively depends on it, in evaluation
    /// order. Empty if `name` does not exist.
    pub fn topological_sort_from(&self, name: &str) -> Vec<String> {
        self.topological_sort_of([name])
    }

    /// The union of the dependent closures of `names`, in evaluation order.
    /// Names without a node are ignored.
    pub fn topological_sort_of<I, S>(&self, names: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let scope = self.dependent_closure(names);
        let order = self.kahn(&scope);
        if order.len() != scope.len() {
            warn!(nodes = scope.len(), "scoped topological sort hit a cycle");
            return Vec::new();
        }
        order
    }

    fn dependent_closure<I, S>(&self, seeds: I) -> IndexSet<&str>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut closure = IndexSet::new();
        let mut queue = VecDeque::new();

        for seed in seeds {
            if let Some((name, _)) = self.node_entry(seed.as_ref()) {
                queue.push_back(name);
            }
        }

        while let Some(name) = queue.pop_front() {
            if !closure.insert(name) {
                continue;
            }
            if let Some(node) = self.node(name) {
                for dependent in node.dependents() {
                    if !closure.contains(dependent.as_str()) {
                        queue.push_back(dependent.as_str());
                    }
                }
            }
        }

        closure
    }

    fn kahn(&self, scope: &IndexSet<&str>) -> Vec<String> {
        let mut in_degree: HashMap<&str, usize> = HashMap::with_capacity(scope.len());
        let mut result = Vec::with_capacity(scope.len());
        let mut queue = VecDeque::new();

        // Only dependencies inside the scope count
        for &name in scope {
            let degree = self.node(name).map_or(0, |node| {
                node.dependencies()
                    .iter()
                    .filter(|dependency| scope.contains(dependency.as_str()))
                    .count()
            });
            in_degree.insert(name, degree);
            if degree == 0 {
                queue.push_back(name);
            }
        }

        while let Some(name) = queue.pop_front() {
            result.push(name.to_owned());

            if let Some(node) = self.node(name) {
                for dependent in node.dependents() {
                    if let Some(degree) = in_degree.get_mut(dependent.as_str()) {
                        *degree = degree.saturating_sub(1);
                        if *degree == 0 {
                            queue.push_back(dependent.as_str());
                        }
                    }
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::{DependencyGraph, Edge};

    fn position(order: &[String], name: &str) -> usize {
        order
            .iter()
            .position(|n| n == name)
            .unwrap_or_else(|| panic!("{name} missing from {order:?}"))
    }

    fn sample() -> DependencyGraph {
        // A = B + C; B = D + E; C = F
        let mut graph = DependencyGraph::new();
        graph.add_nodes(["A", "B", "C", "D", "E", "F"]).unwrap();
        graph
            .add_edges([
                Edge::new("A", "B"),
                Edge::new("A", "C"),
                Edge::new("B", "D"),
                Edge::new("B", "E"),
                Edge::new("C", "F"),
            ])
            .unwrap();
        graph
    }

    #[test]
    fn whole_graph_puts_dependencies_first() {
        let graph = sample();
        let order = graph.topological_sort();
        assert_eq!(order.len(), 6);

        for edge in graph.edges() {
            assert!(position(&order, edge.to()) < position(&order, edge.from()));
        }
    }

    #[test]
    fn rooted_sort_covers_dependent_closure_only() {
        let graph = sample();

        let order = graph.topological_sort_from("D");
        assert_eq!(order, vec!["D".to_string(), "B".to_string(), "A".to_string()]);

        let order = graph.topological_sort_from("A");
        assert_eq!(order, vec!["A".to_string()]);

        assert!(graph.topological_sort_from("missing").is_empty());
    }

    #[test]
    fn seeded_sort_unions_closures() {
        let graph = sample();
        let order = graph.topological_sort_of(["F", "E"]);

        let mut names = order.clone();
        names.sort();
        assert_eq!(names, vec!["A", "B", "C", "E", "F"]);
        assert!(position(&order, "F") < position(&order, "C"));
        assert!(position(&order, "C") < position(&order, "A"));
        assert!(position(&order, "E") < position(&order, "B"));
        assert!(position(&order, "B") < position(&order, "A"));
    }

    #[test]
    fn scoped_sort_over_cycle_is_empty() {
        let mut graph = sample();
        graph.begin_batch_update();
        graph.add_edge(Edge::new("F", "A")).unwrap();

        assert!(graph.topological_sort_from("F").is_empty());
        assert!(graph.topological_sort().len() < 6);
        assert!(graph.end_batch_update().is_err());
        assert_eq!(graph.topological_sort_from("F").len(), 3);
    }
}
