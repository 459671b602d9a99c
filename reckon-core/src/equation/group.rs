use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Equation;

/// Opaque identifier of an [`EquationGroup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EquationGroupId(Uuid);

impl EquationGroupId {
    /// A fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for EquationGroupId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for EquationGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The equations produced by one statement, keyed by name in parse order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquationGroup {
    id: EquationGroupId,
    statement: String,
    equations: IndexMap<String, Equation>,
}

impl EquationGroup {
    pub(crate) fn new(id: EquationGroupId, statement: impl Into<String>) -> Self {
        Self {
            id,
            statement: statement.into(),
            equations: IndexMap::new(),
        }
    }

    pub fn id(&self) -> EquationGroupId {
        self.id
    }

    /// The exact text the group was created or last edited with.
    pub fn statement(&self) -> &str {
        &self.statement
    }

    pub fn equation(&self, name: &str) -> Option<&Equation> {
        self.equations.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.equations.contains_key(name)
    }

    pub fn equations(&self) -> impl Iterator<Item = &Equation> {
        self.equations.values()
    }

    pub fn equation_names(&self) -> impl Iterator<Item = &str> {
        self.equations.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.equations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.equations.is_empty()
    }

    pub(crate) fn set_statement(&mut self, statement: impl Into<String>) {
        self.statement = statement.into();
    }

    pub(crate) fn equation_mut(&mut self, name: &str) -> Option<&mut Equation> {
        self.equations.get_mut(name)
    }

    pub(crate) fn insert_equation(&mut self, equation: Equation) {
        self.equations.insert(equation.name().to_owned(), equation);
    }

    pub(crate) fn remove_equation(&mut self, name: &str) -> Option<Equation> {
        self.equations.shift_remove(name)
    }

    /// Reorder equations to follow `names`. Names not listed go last.
    pub(crate) fn reorder<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        let rank: HashMap<&str, usize> = names
            .into_iter()
            .enumerate()
            .map(|(index, name)| (name, index))
            .collect();
        let rank_of = |name: &String| rank.get(name.as_str()).copied().unwrap_or(usize::MAX);
        self.equations.sort_by(|a, _, b, _| rank_of(a).cmp(&rank_of(b)));
    }
}
