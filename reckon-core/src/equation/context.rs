//! Value Store
//!
//! The manager reads and writes values through [`EquationContext`] only. The
//! store is normally backed by the interpreter's own namespace;
//! [`InMemoryContext`] is the plain map version.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A dynamically typed value held in the store.
pub use serde_json::Value;

/// Key-value store keyed by equation name.
pub trait EquationContext {
    fn contains(&self, key: &str) -> bool;

    fn get(&self, key: &str) -> Option<Value>;

    fn set(&mut self, key: &str, value: Value);

    /// Returns `false` if the key was absent.
    fn remove(&mut self, key: &str) -> bool;

    fn clear(&mut self);

    fn keys(&self) -> Vec<String>;

    fn len(&self) -> usize {
        self.keys().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InMemoryContext {
    values: IndexMap<String, Value>,
}

impl InMemoryContext {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EquationContext for InMemoryContext {
    fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_owned(), value);
    }

    fn remove(&mut self, key: &str) -> bool {
        self.values.shift_remove(key).is_some()
    }

    fn clear(&mut self) {
        self.values.clear();
    }

    fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    fn len(&self) -> usize {
        self.values.len()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for InMemoryContext {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
