//! Signal Slots
//!
//! A [`Signal`] is a list of listener callbacks of one statically known
//! shape. The shape is the type parameter: `Signal<dyn Fn(&str) + Send + Sync>`
//! only accepts listeners taking a `&str`.
//!
//! # Emission
//!
//! Emission is synchronous and runs listeners in registration order. The slot
//! list is snapshotted before the first listener runs, so a listener may
//! connect, disconnect or emit again without deadlocking. Re-entrant emission
//! is not deduplicated.
//!
//! # Connections
//!
//! `connect` returns a [`Connection`] that can detach the listener explicitly.
//! Wrapping it in a [`ScopedConnection`] detaches on drop instead. Dropping a
//! plain `Connection` leaves the listener attached.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

/// Unique identifier for a connected listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(u64);

impl SlotId {
    /// Generate a new unique slot ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SlotId {
    fn default() -> Self {
        Self::new()
    }
}

trait Detach: Send + Sync {
    fn detach(&self, id: SlotId) -> bool;
    fn contains(&self, id: SlotId) -> bool;
}

struct SlotList<F: ?Sized> {
    slots: RwLock<Vec<(SlotId, Arc<F>)>>,
}

impl<F: ?Sized + Send + Sync> Detach for SlotList<F> {
    fn detach(&self, id: SlotId) -> bool {
        let mut slots = self.slots.write();
        let before = slots.len();
        slots.retain(|(slot_id, _)| *slot_id != id);
        slots.len() != before
    }

    fn contains(&self, id: SlotId) -> bool {
        self.slots.read().iter().any(|(slot_id, _)| *slot_id == id)
    }
}

/// An ordered list of listeners sharing one callback signature.
pub struct Signal<F: ?Sized> {
    slots: Arc<SlotList<F>>,
}

impl<F> Signal<F>
where
    F: ?Sized + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            slots: Arc::new(SlotList {
                slots: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Attach a listener. It runs after every listener already attached.
    pub fn connect(&self, slot: Arc<F>) -> Connection {
        let id = SlotId::new();
        self.slots.slots.write().push((id, slot));

        let list: Arc<dyn Detach> = self.slots.clone();
        Connection {
            id,
            list: Arc::downgrade(&list),
        }
    }

    /// Invoke every listener through `call`.
    ///
    /// `call` receives each listener in registration order and decides how
    /// to pass the event arguments to it.
    pub fn emit_with(&self, mut call: impl FnMut(&F)) {
        let snapshot: Vec<Arc<F>> = self
            .slots
            .slots
            .read()
            .iter()
            .map(|(_, slot)| Arc::clone(slot))
            .collect();

        for slot in snapshot {
            call(&slot);
        }
    }

    /// Number of attached listeners.
    pub fn slot_count(&self) -> usize {
        self.slots.slots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slot_count() == 0
    }

    /// Detach every listener.
    pub fn disconnect_all(&self) {
        self.slots.slots.write().clear();
    }
}

impl<F> Default for Signal<F>
where
    F: ?Sized + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<F> fmt::Debug for Signal<F>
where
    F: ?Sized + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("slot_count", &self.slot_count())
            .finish()
    }
}

/// Handle to one attached listener.
#[must_use = "dropping a Connection keeps the listener attached; use `scoped` to tie it to a scope"]
pub struct Connection {
    id: SlotId,
    list: Weak<dyn Detach>,
}

impl Connection {
    pub fn id(&self) -> SlotId {
        self.id
    }

    /// Detach the listener. Returns `false` if it was already detached or the
    /// signal is gone.
    pub fn disconnect(&self) -> bool {
        self.list
            .upgrade()
            .map(|list| list.detach(self.id))
            .unwrap_or(false)
    }

    pub fn is_connected(&self) -> bool {
        self.list
            .upgrade()
            .map(|list| list.contains(self.id))
            .unwrap_or(false)
    }

    /// Tie the listener's lifetime to the returned guard.
    pub fn scoped(self) -> ScopedConnection {
        ScopedConnection { inner: Some(self) }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection").field("id", &self.id).finish()
    }
}

/// Detaches its listener when dropped.
#[derive(Debug)]
pub struct ScopedConnection {
    inner: Option<Connection>,
}

impl ScopedConnection {
    pub fn is_connected(&self) -> bool {
        self.inner.as_ref().is_some_and(Connection::is_connected)
    }

    /// Give up scope ownership; the listener stays attached.
    pub fn release(mut self) -> Connection {
        match self.inner.take() {
            Some(connection) => connection,
            None => unreachable!("scoped connection released twice"),
        }
    }
}

impl Drop for ScopedConnection {
    fn drop(&mut self) {
        if let Some(connection) = self.inner.take() {
            connection.disconnect();
        }
    }
}
