//! Equation Events
//!
//! [`EquationSignalsManager`] holds one statically typed listener list per
//! event kind. Listeners run synchronously in registration order.

use std::fmt;
use std::sync::Arc;

use super::group::EquationGroup;
use super::{Equation, EquationGroupUpdateFlags, EquationUpdateFlags};
use crate::signal::{Connection, Signal};

type EquationSlot = dyn Fn(&Equation) + Send + Sync;
type NameSlot = dyn Fn(&str) + Send + Sync;
type EquationUpdateSlot = dyn Fn(&Equation, EquationUpdateFlags) + Send + Sync;
type GroupSlot = dyn Fn(&EquationGroup) + Send + Sync;
type GroupUpdateSlot = dyn Fn(&EquationGroup, EquationGroupUpdateFlags) + Send + Sync;

/// The closed set of events the manager announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EquationEvent {
    EquationAdded,
    EquationRemoving,
    EquationRemoved,
    EquationUpdated,
    GroupAdded,
    GroupRemoving,
    GroupUpdated,
}

impl EquationEvent {
    pub const ALL: [EquationEvent; 7] = [
        EquationEvent::EquationAdded,
        EquationEvent::EquationRemoving,
        EquationEvent::EquationRemoved,
        EquationEvent::EquationUpdated,
        EquationEvent::GroupAdded,
        EquationEvent::GroupRemoving,
        EquationEvent::GroupUpdated,
    ];
}

#[derive(Default)]
pub struct EquationSignalsManager {
    equation_added: Signal<EquationSlot>,
    equation_removing: Signal<EquationSlot>,
    equation_removed: Signal<NameSlot>,
    equation_updated: Signal<EquationUpdateSlot>,
    group_added: Signal<GroupSlot>,
    group_removing: Signal<GroupSlot>,
    group_updated: Signal<GroupUpdateSlot>,
}

impl EquationSignalsManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect_equation_added<F>(&self, listener: F) -> Connection
    where
        F: Fn(&Equation) + Send + Sync + 'static,
    {
        self.equation_added.connect(Arc::new(listener))
    }

    /// Fires while the equation is still fully populated.
    pub fn connect_equation_removing<F>(&self, listener: F) -> Connection
    where
        F: Fn(&Equation) + Send + Sync + 'static,
    {
        self.equation_removing.connect(Arc::new(listener))
    }

    pub fn connect_equation_removed<F>(&self, listener: F) -> Connection
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.equation_removed.connect(Arc::new(listener))
    }

    pub fn connect_equation_updated<F>(&self, listener: F) -> Connection
    where
        F: Fn(&Equation, EquationUpdateFlags) + Send + Sync + 'static,
    {
        self.equation_updated.connect(Arc::new(listener))
    }

    pub fn connect_group_added<F>(&self, listener: F) -> Connection
    where
        F: Fn(&EquationGroup) + Send + Sync + 'static,
    {
        self.group_added.connect(Arc::new(listener))
    }

    pub fn connect_group_removing<F>(&self, listener: F) -> Connection
    where
        F: Fn(&EquationGroup) + Send + Sync + 'static,
    {
        self.group_removing.connect(Arc::new(listener))
    }

    pub fn connect_group_updated<F>(&self, listener: F) -> Connection
    where
        F: Fn(&EquationGroup, EquationGroupUpdateFlags) + Send + Sync + 'static,
    {
        self.group_updated.connect(Arc::new(listener))
    }

    pub fn listener_count(&self, event: EquationEvent) -> usize {
        match event {
            EquationEvent::EquationAdded => self.equation_added.slot_count(),
            EquationEvent::EquationRemoving => self.equation_removing.slot_count(),
            EquationEvent::EquationRemoved => self.equation_removed.slot_count(),
            EquationEvent::EquationUpdated => self.equation_updated.slot_count(),
            EquationEvent::GroupAdded => self.group_added.slot_count(),
            EquationEvent::GroupRemoving => self.group_removing.slot_count(),
            EquationEvent::GroupUpdated => self.group_updated.slot_count(),
        }
    }

    pub fn disconnect_all(&self, event: EquationEvent) {
        match event {
            EquationEvent::EquationAdded => self.equation_added.disconnect_all(),
            EquationEvent::EquationRemoving => self.equation_removing.disconnect_all(),
            EquationEvent::EquationRemoved => self.equation_removed.disconnect_all(),
            EquationEvent::EquationUpdated => self.equation_updated.disconnect_all(),
            EquationEvent::GroupAdded => self.group_added.disconnect_all(),
            EquationEvent::GroupRemoving => self.group_removing.disconnect_all(),
            EquationEvent::GroupUpdated => self.group_updated.disconnect_all(),
        }
    }

    pub(crate) fn emit_equation_added(&self, equation: &Equation) {
        self.equation_added.emit_with(|slot| slot(equation));
    }

    pub(crate) fn emit_equation_removing(&self, equation: &Equation) {
        self.equation_removing.emit_with(|slot| slot(equation));
    }

    pub(crate) fn emit_equation_removed(&self, name: &str) {
        self.equation_removed.emit_with(|slot| slot(name));
    }

    pub(crate) fn emit_equation_updated(&self, equation: &Equation, flags: EquationUpdateFlags) {
        self.equation_updated.emit_with(|slot| slot(equation, flags));
    }

    pub(crate) fn emit_group_added(&self, group: &EquationGroup) {
        self.group_added.emit_with(|slot| slot(group));
    }

    pub(crate) fn emit_group_removing(&self, group: &EquationGroup) {
        self.group_removing.emit_with(|slot| slot(group));
    }

    pub(crate) fn emit_group_updated(&self, group: &EquationGroup, flags: EquationGroupUpdateFlags) {
        self.group_updated.emit_with(|slot| slot(group, flags));
    }
}

impl fmt::Debug for EquationSignalsManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for event in EquationEvent::ALL {
            map.entry(&event, &self.listener_count(event));
        }
        map.finish()
    }
}
