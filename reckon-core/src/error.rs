//! Error Types
//!
//! Only structural problems are raised as errors. Evaluation failures are not
//! errors at this level: they are recorded on the equation as a
//! [`ResultStatus`](crate::equation::ResultStatus) plus a message.

use thiserror::Error;

use crate::equation::EquationGroupId;

/// A committed mutation would have introduced a directed cycle.
///
/// The path starts and ends on the same node and reads
/// dependency -> ... -> dependency.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("dependency cycle detected: {}", .path.join(" -> "))]
pub struct CycleError {
    path: Vec<String>,
}

impl CycleError {
    pub fn new(path: Vec<String>) -> Self {
        Self { path }
    }

    /// The discovered cycle, first and last element equal.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn into_path(self) -> Vec<String> {
        self.path
    }
}

/// A statement could not be parsed by the external parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error: {message}")]
pub struct ParseError {
    message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A status or item-type name that matches no variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownVariantError {
    kind: &'static str,
    value: String,
}

impl UnknownVariantError {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// What was being parsed, e.g. `result status`.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Errors raised by [`EquationManager`](crate::equation::EquationManager).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EquationError {
    #[error("equation `{name}` already exists")]
    AlreadyExists { name: String },

    #[error("equation `{name}` not found")]
    NotFound { name: String },

    #[error("equation group `{id}` not found")]
    GroupNotFound { id: EquationGroupId },

    #[error(transparent)]
    Cycle(#[from] CycleError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

pub type Result<T, E = EquationError> = std::result::Result<T, E>;
