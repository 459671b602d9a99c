//! Event Stamps
//!
//! An event stamp records *when* a node's externally visible value last
//! changed. Stamps come from a single process-wide counter, so any two stamps
//! can be compared regardless of which graph produced them.
//!
//! The zero stamp is never handed out by the generator. A node that has not
//! produced a value since it was (re)created carries the zero stamp, which
//! compares as older than or equal to everything.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// A snapshot of the global event counter.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct EventStamp(u64);

impl EventStamp {
    /// The stamp of a node that has never changed.
    pub const ZERO: EventStamp = EventStamp(0);

    /// Get the raw counter value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl From<u64> for EventStamp {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for EventStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventStamp{{{}}}", self.0)
    }
}

static CURRENT_STAMP: AtomicU64 = AtomicU64::new(0);

/// Process-wide monotonically increasing stamp source.
pub struct EventStampGenerator;

impl EventStampGenerator {
    /// Advance the counter and return the new stamp.
    pub fn next() -> EventStamp {
        EventStamp(CURRENT_STAMP.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// The most recently issued stamp (zero if none yet).
    pub fn current() -> EventStamp {
        EventStamp(CURRENT_STAMP.load(Ordering::Relaxed))
    }
}
