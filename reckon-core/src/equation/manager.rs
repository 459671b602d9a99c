//! Equation Manager
//!
//! [`EquationManager`] turns "add / edit / remove a statement" into graph and
//! value-store mutations that either fully apply or leave nothing behind.
//!
//! # Structural edits
//!
//! Every structural edit parses first, checks names, and then rewires the
//! graph inside one batch update. Only after the batch commits are equations
//! created, changed or destroyed and events emitted. A parse error, a name
//! collision or a cycle therefore leaves the manager exactly as it was.
//!
//! Changes to dependency / dependent sets are collected while the graph is
//! rewired and announced as `updated` events after all structural events.
//! A set that ends up equal to what it was before the edit is not announced.
//!
//! # Updates
//!
//! An update pass walks a topological order. Clean equations are skipped.
//! Dirty ones are cleaned and, if the graph says something they read from
//! changed (see [`DependencyGraph::needs_evaluation`]), executed through the
//! interpreter.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use super::context::{EquationContext, Value};
use super::engine::{InterpretResult, Interpreter, ParseItem, ParseMode, StatementParser};
use super::group::{EquationGroup, EquationGroupId};
use super::signals::EquationSignalsManager;
use super::{Equation, EquationGroupUpdateFlags, EquationUpdateFlags, ItemType, ResultStatus};
use crate::config::ManagerOptions;
use crate::error::{CycleError, EquationError, Result};
use crate::graph::{DependencyGraph, Edge, EventStamp, NodeNameSet};
use crate::signal::ScopedConnection;

/// Which equations an update pass covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateScope {
    /// Every equation.
    All,
    /// The named equation and everything that depends on it.
    Equation(String),
    /// The group's equations and everything that depends on them.
    Group(EquationGroupId),
}

type PendingChanges = Arc<Mutex<IndexMap<String, EquationUpdateFlags>>>;

fn record_change(pending: &PendingChanges, name: &str, flags: EquationUpdateFlags) {
    *pending.lock().entry(name.to_owned()).or_default() |= flags;
}

/// Dependency and dependent sets of the nodes an edit may touch, taken
/// before the edit's batch opens.
#[derive(Debug, Default)]
struct LinkSnapshot {
    links: IndexMap<String, (NodeNameSet, NodeNameSet)>,
}

impl LinkSnapshot {
    fn capture(graph: &DependencyGraph, detached: &[&str], attached: &[&ParseItem]) -> Self {
        let mut snapshot = Self::default();
        let touched = detached
            .iter()
            .copied()
            .chain(attached.iter().map(|item| item.name.as_str()));

        for name in touched {
            snapshot.record(graph, name);
            for edge in graph.edges_by_from(name) {
                snapshot.record(graph, edge.to());
            }
            for edge in graph.edges_by_to(name) {
                snapshot.record(graph, edge.from());
            }
        }
        for item in attached {
            for dependency in &item.dependencies {
                snapshot.record(graph, dependency);
            }
        }
        snapshot
    }

    fn record(&mut self, graph: &DependencyGraph, name: &str) {
        if self.links.contains_key(name) {
            return;
        }
        if let Some(node) = graph.node(name) {
            self.links.insert(
                name.to_owned(),
                (node.dependencies().clone(), node.dependents().clone()),
            );
        }
    }

    fn names(&self) -> impl Iterator<Item = &str> {
        self.links.keys().map(String::as_str)
    }

    /// Link flags for `name` after the edit. Recorded nodes are diffed
    /// against their snapshot, other nodes keep what the graph reported.
    fn net_change(
        &self,
        graph: &DependencyGraph,
        name: &str,
        reported: EquationUpdateFlags,
    ) -> EquationUpdateFlags {
        let (Some((dependencies, dependents)), Some(node)) =
            (self.links.get(name), graph.node(name))
        else {
            return reported;
        };
        let mut flags = EquationUpdateFlags::empty();
        if node.dependencies() != dependencies {
            flags |= EquationUpdateFlags::DEPENDENCIES;
        }
        if node.dependents() != dependents {
            flags |= EquationUpdateFlags::DEPENDENTS;
        }
        flags
    }
}

/// Rewire the graph for an edit in one batch update.
///
/// `detached` names lose their node and outgoing edges. `attached` items get
/// a node and one edge per declared dependency.
fn rewire_graph(
    graph: &mut DependencyGraph,
    detached: &[&str],
    attached: &[&ParseItem],
) -> std::result::Result<(), CycleError> {
    let mut batch = graph.batch_update();

    for &name in detached {
        batch.remove_node(name);
        for edge in batch.edges_by_from(name) {
            batch.remove_edge(&edge);
        }
    }
    for item in attached {
        batch.add_node(&item.name)?;
        for edge in batch.edges_by_from(&item.name) {
            batch.remove_edge(&edge);
        }
        for dependency in &item.dependencies {
            batch.add_edge(Edge::new(&item.name, dependency))?;
        }
    }

    batch.commit()
}

fn reject_duplicate_names(items: &[ParseItem]) -> Result<()> {
    let mut seen = HashSet::new();
    for item in items {
        if !seen.insert(item.name.as_str()) {
            return Err(EquationError::AlreadyExists {
                name: item.name.clone(),
            });
        }
    }
    Ok(())
}

/// Owns equation groups, the dependency graph between their equations and
/// the value store they evaluate into.
pub struct EquationManager {
    graph: DependencyGraph,
    groups: IndexMap<EquationGroupId, EquationGroup>,
    /// Equation name to owning group. Names are unique across groups.
    owners: HashMap<String, EquationGroupId>,
    context: Box<dyn EquationContext>,
    parser: Box<dyn StatementParser>,
    interpreter: Box<dyn Interpreter>,
    signals: EquationSignalsManager,
    options: ManagerOptions,
    pending: PendingChanges,
    _graph_listeners: [ScopedConnection; 2],
}

impl EquationManager {
    pub fn new<C, P, I>(context: C, parser: P, interpreter: I) -> Self
    where
        C: EquationContext + 'static,
        P: StatementParser + 'static,
        I: Interpreter + 'static,
    {
        Self::with_options(context, parser, interpreter, ManagerOptions::default())
    }

    pub fn with_options<C, P, I>(
        context: C,
        parser: P,
        interpreter: I,
        options: ManagerOptions,
    ) -> Self
    where
        C: EquationContext + 'static,
        P: StatementParser + 'static,
        I: Interpreter + 'static,
    {
        let graph = DependencyGraph::new();
        let pending = PendingChanges::default();

        let dependencies = Arc::clone(&pending);
        let on_dependencies = graph
            .connect_dependency_changed(Arc::new(move |name: &str| {
                record_change(&dependencies, name, EquationUpdateFlags::DEPENDENCIES)
            }))
            .scoped();
        let dependents = Arc::clone(&pending);
        let on_dependents = graph
            .connect_dependent_changed(Arc::new(move |name: &str| {
                record_change(&dependents, name, EquationUpdateFlags::DEPENDENTS)
            }))
            .scoped();

        let mut manager = Self {
            graph,
            groups: IndexMap::new(),
            owners: HashMap::new(),
            context: Box::new(context),
            parser: Box::new(parser),
            interpreter: Box::new(interpreter),
            signals: EquationSignalsManager::new(),
            options,
            pending,
            _graph_listeners: [on_dependencies, on_dependents],
        };
        manager.run_startup_script();
        manager
    }

    /// Parse `statement` and add its items as a new group.
    ///
    /// Fails without side effects if the statement does not parse, if any
    /// item name is already taken, or if the new edges would form a cycle.
    pub fn add_equation_group(&mut self, statement: &str) -> Result<EquationGroupId> {
        let items = self.parser.parse(statement, ParseMode::Statement)?;
        reject_duplicate_names(&items)?;
        if let Some(item) = items.iter().find(|item| self.owners.contains_key(&item.name)) {
            return Err(EquationError::AlreadyExists {
                name: item.name.clone(),
            });
        }

        let attached: Vec<&ParseItem> = items.iter().collect();
        let snapshot = LinkSnapshot::capture(&self.graph, &[], &attached);
        self.rewire(&[], &attached)?;

        let id = EquationGroupId::generate();
        let mut group = EquationGroup::new(id, statement);
        for item in &items {
            group.insert_equation(Equation::from_item(item, id));
            self.owners.insert(item.name.clone(), id);
            self.graph.invalidate_node(&item.name);
        }
        self.groups.insert(id, group);
        debug!(group = %id, equations = items.len(), "equation group added");

        if let Some(group) = self.groups.get(&id) {
            for equation in group.equations() {
                self.signals.emit_equation_added(equation);
            }
            self.signals.emit_group_added(group);
        }
        self.flush_changes(&snapshot);

        if self.options.auto_update {
            self.update_equation_group(id)?;
        }
        Ok(id)
    }

    /// Replace the statement of a group, applying the minimal change.
    ///
    /// Names that disappeared are removed, names whose content or type
    /// changed are updated in place, new names are added. Unchanged
    /// equations keep their values and status.
    ///
    /// The group-updated event always carries
    /// [`EquationGroupUpdateFlags::STATEMENT`], since the statement text is
    /// replaced even when only whitespace or order changed.
    /// [`EquationGroupUpdateFlags::EQUATIONS`] is added when names were added
    /// or removed. Resubmitting the identical statement emits nothing.
    pub fn edit_equation_group(&mut self, id: EquationGroupId, statement: &str) -> Result<()> {
        let group = self
            .groups
            .get(&id)
            .ok_or(EquationError::GroupNotFound { id })?;
        if group.statement() == statement {
            return Ok(());
        }

        let items = self.parser.parse(statement, ParseMode::Statement)?;
        reject_duplicate_names(&items)?;

        let removed: Vec<String> = group
            .equation_names()
            .filter(|name| !items.iter().any(|item| item.name == *name))
            .map(str::to_owned)
            .collect();
        let mut added = Vec::new();
        let mut updated = Vec::new();
        for item in &items {
            match group.equation(&item.name) {
                None => added.push(item),
                Some(equation)
                    if equation.content() != item.content
                        || equation.item_type() != item.item_type =>
                {
                    updated.push(item)
                }
                Some(_) => {}
            }
        }
        if let Some(item) = added.iter().find(|item| self.owners.contains_key(&item.name)) {
            return Err(EquationError::AlreadyExists {
                name: item.name.clone(),
            });
        }

        let detached: Vec<&str> = removed
            .iter()
            .map(String::as_str)
            .chain(updated.iter().map(|item| item.name.as_str()))
            .collect();
        let attached: Vec<&ParseItem> = added.iter().chain(updated.iter()).copied().collect();
        let snapshot = LinkSnapshot::capture(&self.graph, &detached, &attached);
        self.rewire(&detached, &attached)?;

        for name in &removed {
            self.destroy_equation(name);
        }

        for item in &updated {
            // The recreated node is unstamped. Its next evaluation stamps it
            // even on failure, and until then dependents treat it as changed.
            self.context.remove(&item.name);
            if let Some(equation) = self.equation_mut(&item.name) {
                equation.set_content(&item.content);
                equation.set_item_type(item.item_type);
            }
            self.graph.invalidate_node(&item.name);
            self.emit_equation_updated(
                &item.name,
                EquationUpdateFlags::CONTENT | EquationUpdateFlags::TYPE,
            );
        }

        if let Some(group) = self.groups.get_mut(&id) {
            for item in &added {
                group.insert_equation(Equation::from_item(item, id));
            }
            group.reorder(items.iter().map(|item| item.name.as_str()));
            group.set_statement(statement);
        }
        for item in &added {
            self.owners.insert(item.name.clone(), id);
            self.graph.invalidate_node(&item.name);
            if let Some(equation) = self.equation(&item.name) {
                self.signals.emit_equation_added(equation);
            }
        }

        let mut flags = EquationGroupUpdateFlags::STATEMENT;
        if !removed.is_empty() || !added.is_empty() {
            flags |= EquationGroupUpdateFlags::EQUATIONS;
        }
        debug!(
            group = %id,
            removed = removed.len(),
            updated = updated.len(),
            added = added.len(),
            "equation group edited"
        );
        if let Some(group) = self.groups.get(&id) {
            self.signals.emit_group_updated(group, flags);
        }
        self.flush_changes(&snapshot);

        if self.options.auto_update {
            self.update_equation_group(id)?;
        }
        Ok(())
    }

    /// Remove a group and every equation it owns.
    pub fn remove_equation_group(&mut self, id: EquationGroupId) -> Result<()> {
        let names: Vec<String> = self
            .groups
            .get(&id)
            .ok_or(EquationError::GroupNotFound { id })?
            .equation_names()
            .map(str::to_owned)
            .collect();

        let detached: Vec<&str> = names.iter().map(String::as_str).collect();
        let snapshot = LinkSnapshot::capture(&self.graph, &detached, &[]);
        self.rewire(&detached, &[])?;

        if let Some(group) = self.groups.get(&id) {
            self.signals.emit_group_removing(group);
        }
        for name in &names {
            self.destroy_equation(name);
        }
        self.groups.shift_remove(&id);
        debug!(group = %id, equations = names.len(), "equation group removed");

        self.flush_changes(&snapshot);
        Ok(())
    }

    /// Re-evaluate every stale equation.
    pub fn update(&mut self) -> Result<()> {
        self.update_interruptible(UpdateScope::All, || false)
    }

    /// Re-evaluate `name` and everything that depends on it.
    pub fn update_equation(&mut self, name: &str) -> Result<()> {
        self.update_interruptible(UpdateScope::Equation(name.to_owned()), || false)
    }

    pub fn update_equation_group(&mut self, id: EquationGroupId) -> Result<()> {
        self.update_interruptible(UpdateScope::Group(id), || false)
    }

    /// Run an update pass that checks `cancelled` before each equation.
    ///
    /// Once it returns `true`, every remaining stale equation is marked
    /// [`ResultStatus::Interrupted`] instead of being evaluated, and stays
    /// stale for the next pass.
    pub fn update_interruptible(
        &mut self,
        scope: UpdateScope,
        cancelled: impl Fn() -> bool,
    ) -> Result<()> {
        let order = match &scope {
            UpdateScope::All => self.graph.topological_sort(),
            UpdateScope::Equation(name) => {
                if !self.contains_equation(name) {
                    return Err(EquationError::NotFound { name: name.clone() });
                }
                self.graph.topological_sort_from(name)
            }
            UpdateScope::Group(id) => {
                let group = self
                    .groups
                    .get(id)
                    .ok_or(EquationError::GroupNotFound { id: *id })?;
                self.graph.topological_sort_of(group.equation_names())
            }
        };

        trace!(?scope, equations = order.len(), "update pass");
        let mut interrupted = false;
        for name in &order {
            match self.graph.node(name) {
                Some(node) if node.is_dirty() => {}
                _ => continue,
            }

            if !interrupted && cancelled() {
                warn!(equation = %name, "update interrupted");
                interrupted = true;
            }
            if interrupted {
                self.mark_interrupted(name);
                continue;
            }

            let stale = self.graph.needs_evaluation(name);
            self.graph.mark_clean(name);
            if stale {
                self.evaluate(name);
            } else {
                trace!(equation = %name, "inputs unchanged, skipped");
            }
        }
        Ok(())
    }

    /// Evaluate one equation without walking its dependents. They are marked
    /// stale for the next pass.
    pub fn update_equation_only(&mut self, name: &str) -> Result<()> {
        if !self.contains_equation(name) {
            return Err(EquationError::NotFound {
                name: name.to_owned(),
            });
        }
        self.evaluate(name);
        self.graph.invalidate_node(name);
        self.graph.mark_clean(name);
        Ok(())
    }

    /// Evaluate `expression` against the current values without storing
    /// anything.
    pub fn eval(&self, expression: &str) -> InterpretResult {
        let items = match self.parser.parse(expression, ParseMode::Expression) {
            Ok(items) => items,
            Err(err) => return InterpretResult::failure(ResultStatus::SyntaxError, err.message()),
        };
        if let Some(item) = items.iter().find(|item| item.is_error()) {
            return InterpretResult::failure(item.status, item.message.clone());
        }
        self.interpreter.eval(expression, &*self.context)
    }

    /// Drop every group and value, then rerun the startup script.
    pub fn reset(&mut self) {
        for group in self.groups.values() {
            self.signals.emit_group_removing(group);
            for equation in group.equations() {
                self.signals.emit_equation_removing(equation);
                self.signals.emit_equation_removed(equation.name());
            }
        }

        self.graph.reset();
        self.groups.clear();
        self.owners.clear();
        self.context.clear();
        self.pending.lock().clear();
        debug!("equation manager reset");

        self.run_startup_script();
    }

    pub fn set_equation_status(
        &mut self,
        name: &str,
        status: ResultStatus,
        message: impl Into<String>,
    ) -> Result<()> {
        let equation = self
            .equation_mut(name)
            .ok_or_else(|| EquationError::NotFound {
                name: name.to_owned(),
            })?;
        equation.set_status(status);
        equation.set_message(message);
        self.emit_equation_updated(
            name,
            EquationUpdateFlags::STATUS | EquationUpdateFlags::MESSAGE,
        );
        Ok(())
    }

    pub fn contains_equation(&self, name: &str) -> bool {
        self.owners.contains_key(name)
    }

    pub fn contains_equation_group(&self, id: EquationGroupId) -> bool {
        self.groups.contains_key(&id)
    }

    pub fn equation(&self, name: &str) -> Option<&Equation> {
        let id = self.owners.get(name)?;
        self.groups.get(id)?.equation(name)
    }

    pub fn equation_group(&self, id: EquationGroupId) -> Option<&EquationGroup> {
        self.groups.get(&id)
    }

    pub fn equation_groups(&self) -> impl Iterator<Item = &EquationGroup> {
        self.groups.values()
    }

    /// All equation names, group by group in creation order.
    pub fn equation_names(&self) -> Vec<String> {
        self.groups
            .values()
            .flat_map(|group| group.equation_names().map(str::to_owned))
            .collect()
    }

    pub fn equation_group_ids(&self) -> Vec<EquationGroupId> {
        self.groups.keys().copied().collect()
    }

    /// Current value of an equation in the store.
    pub fn equation_value(&self, name: &str) -> Option<Value> {
        self.context.get(name)
    }

    /// Names the equation reads from that currently exist as equations.
    pub fn equation_dependencies(&self, name: &str) -> Option<&NodeNameSet> {
        self.graph.node(name).map(|node| node.dependencies())
    }

    /// Names of equations that read from this one.
    pub fn equation_dependents(&self, name: &str) -> Option<&NodeNameSet> {
        self.graph.node(name).map(|node| node.dependents())
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn context(&self) -> &dyn EquationContext {
        &*self.context
    }

    pub fn signals(&self) -> &EquationSignalsManager {
        &self.signals
    }

    pub fn options(&self) -> &ManagerOptions {
        &self.options
    }

    pub fn language(&self) -> &str {
        self.interpreter.language()
    }

    fn equation_mut(&mut self, name: &str) -> Option<&mut Equation> {
        let id = self.owners.get(name)?;
        self.groups.get_mut(id)?.equation_mut(name)
    }

    fn rewire(&mut self, detached: &[&str], attached: &[&ParseItem]) -> Result<()> {
        if let Err(err) = rewire_graph(&mut self.graph, detached, attached) {
            self.pending.lock().clear();
            return Err(err.into());
        }
        Ok(())
    }

    /// Announce and drop one equation whose node is already gone.
    fn destroy_equation(&mut self, name: &str) {
        if let Some(equation) = self.equation(name) {
            self.signals.emit_equation_removing(equation);
        }
        for edge in self.graph.edges_by_to(name) {
            self.graph.invalidate_node(edge.from());
        }
        if let Some(id) = self.owners.remove(name) {
            if let Some(group) = self.groups.get_mut(&id) {
                group.remove_equation(name);
            }
        }
        self.context.remove(name);
        self.signals.emit_equation_removed(name);
    }

    fn evaluate(&mut self, name: &str) {
        let Some(equation) = self.equation(name) else {
            return;
        };
        let code = match equation.item_type() {
            ItemType::Variable => format!("{name} = {}", equation.content()),
            _ => equation.content().to_owned(),
        };

        let before = self.context.get(name);
        let result = self.interpreter.exec(&code, &mut *self.context);
        let changed = if result.is_success() {
            self.context.get(name) != before
        } else {
            // Dependents must see a missing value, not a stale one. A node that
            // was never stamped may have lost its value to an edit.
            let unstamped = self
                .graph
                .node(name)
                .is_some_and(|node| node.event_stamp() == EventStamp::ZERO);
            self.context.remove(name) || unstamped
        };
        if changed {
            self.graph.update_event_stamp(name);
        }
        debug!(equation = name, status = %result.status, changed, "evaluated");

        if let Some(equation) = self.equation_mut(name) {
            equation.set_status(result.status);
            equation.set_message(result.message);
        }
        self.emit_equation_updated(
            name,
            EquationUpdateFlags::STATUS | EquationUpdateFlags::MESSAGE | EquationUpdateFlags::VALUE,
        );
    }

    fn mark_interrupted(&mut self, name: &str) {
        if let Some(equation) = self.equation_mut(name) {
            equation.set_status(ResultStatus::Interrupted);
            equation.set_message("interrupted");
        }
        self.emit_equation_updated(
            name,
            EquationUpdateFlags::STATUS | EquationUpdateFlags::MESSAGE,
        );
    }

    fn emit_equation_updated(&self, name: &str, flags: EquationUpdateFlags) {
        if let Some(equation) = self.equation(name) {
            self.signals.emit_equation_updated(equation, flags);
        }
    }

    fn flush_changes(&self, snapshot: &LinkSnapshot) {
        let mut changes = std::mem::take(&mut *self.pending.lock());
        // A node recreated by the edit lost its old links without a signal.
        for name in snapshot.names() {
            if !changes.contains_key(name) {
                changes.insert(name.to_owned(), EquationUpdateFlags::empty());
            }
        }
        for (name, flags) in changes {
            let flags = snapshot.net_change(&self.graph, &name, flags);
            if !flags.is_empty() {
                self.emit_equation_updated(&name, flags);
            }
        }
    }

    fn run_startup_script(&mut self) {
        let Some(script) = self.options.startup_script.as_deref() else {
            return;
        };
        let result = self.interpreter.exec(script, &mut *self.context);
        if !result.is_success() {
            warn!(status = %result.status, message = %result.message, "startup script failed");
        }
    }
}

impl fmt::Debug for EquationManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EquationManager")
            .field("groups", &self.groups.len())
            .field("equations", &self.owners.len())
            .field("graph", &self.graph)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
