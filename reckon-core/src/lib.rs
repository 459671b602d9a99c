//! Reckon Core
//!
//! This crate provides the computation core behind the Reckon "what-if"
//! calculation sheet. It implements:
//!
//! - A dependency graph with dangling edges, transactional batch updates and
//!   cycle rollback
//! - Topological scheduling and staleness tracking with event stamps
//! - Equation groups: statements parsed into named equations, diffed on edit
//!   and re-evaluated incrementally
//! - Typed change notification for observers
//!
//! The expression language is not part of this crate. Hosts plug in a
//! [`StatementParser`](equation::StatementParser), an
//! [`Interpreter`](equation::Interpreter) and an
//! [`EquationContext`](equation::EquationContext) value store.
//!
//! # Architecture
//!
//! - `graph`: nodes, edges, transactions and topological sorts
//! - `equation`: equations, groups, the language seams and the manager
//! - `signal`: listener lists used by both layers
//! - `config`: manager options
//! - `error`: error types
//!
//! # Example
//!
//! ```rust,ignore
//! use reckon_core::equation::{EquationManager, InMemoryContext};
//!
//! let mut manager = EquationManager::new(InMemoryContext::new(), parser, interpreter);
//! let group = manager.add_equation_group("A=B+C;B=1;C=2")?;
//! manager.update()?;
//! assert_eq!(manager.equation_value("A"), Some(3.into()));
//! ```

pub mod config;
pub mod equation;
pub mod error;
pub mod graph;
pub mod signal;

pub use config::ManagerOptions;
pub use equation::{EquationManager, UpdateScope};
pub use error::{CycleError, EquationError, ParseError, Result, UnknownVariantError};
pub use graph::DependencyGraph;
