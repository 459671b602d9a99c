//! Shared fixtures for the integration tests.
//!
//! The toy language has one statement form, `NAME=TERM+TERM+...`, where each
//! term is an integer literal or a name. Statements are separated by `;` or
//! newlines.

#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use reckon_core::equation::{
    EquationContext, EquationGroupUpdateFlags, EquationManager, EquationUpdateFlags,
    InMemoryContext, InterpretMode, InterpretResult, ItemType, ParseItem, ParseMode, ResultStatus,
    Value,
};
use reckon_core::signal::ScopedConnection;
use reckon_core::{ManagerOptions, ParseError};
use serde_json::json;
use tracing_subscriber::EnvFilter;

/// Route library logs to the test output. Filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn is_name(term: &str) -> bool {
    term.parse::<i64>().is_err()
}

fn terms(expression: &str) -> impl Iterator<Item = &str> {
    expression.split('+').map(str::trim)
}

pub fn parse(code: &str, mode: ParseMode) -> Result<Vec<ParseItem>, ParseError> {
    if mode == ParseMode::Expression {
        if code.trim().is_empty() || code.contains('=') || terms(code).any(str::is_empty) {
            return Ok(vec![ParseItem::error(
                ResultStatus::SyntaxError,
                format!("invalid expression `{code}`"),
            )]);
        }
        return Ok(vec![ParseItem::new("", code.trim(), ItemType::Expression)]);
    }

    let mut items = Vec::new();
    for part in code.split([';', '\n']).map(str::trim).filter(|part| !part.is_empty()) {
        let (name, content) = part
            .split_once('=')
            .ok_or_else(|| ParseError::new(format!("expected `name=expression`, got `{part}`")))?;
        let (name, content) = (name.trim(), content.trim());
        if name.is_empty() || content.is_empty() || terms(content).any(str::is_empty) {
            return Err(ParseError::new(format!("malformed statement `{part}`")));
        }

        let mut dependencies: Vec<&str> = Vec::new();
        for term in terms(content).filter(|term| is_name(term)) {
            if !dependencies.contains(&term) {
                dependencies.push(term);
            }
        }
        items.push(ParseItem::new(name, content, ItemType::Variable).with_dependencies(dependencies));
    }
    Ok(items)
}

fn sum(expression: &str, context: &dyn EquationContext) -> InterpretResult {
    let mut total = 0i64;
    for term in terms(expression) {
        let value = match term.parse::<i64>() {
            Ok(number) => number,
            Err(_) => match context.get(term) {
                Some(Value::Number(number)) => match number.as_i64() {
                    Some(number) => number,
                    None => {
                        return InterpretResult::failure(
                            ResultStatus::TypeError,
                            format!("`{term}` is not an integer"),
                        )
                    }
                },
                Some(_) => {
                    return InterpretResult::failure(
                        ResultStatus::TypeError,
                        format!("`{term}` is not a number"),
                    )
                }
                None => {
                    return InterpretResult::failure(
                        ResultStatus::NameError,
                        format!("name '{term}' is not defined"),
                    )
                }
            },
        };
        total = match total.checked_add(value) {
            Some(total) => total,
            None => return InterpretResult::failure(ResultStatus::OverflowError, "integer overflow"),
        };
    }
    InterpretResult::success(Some(json!(total)))
}

pub fn interpret(code: &str, context: &mut dyn EquationContext, mode: InterpretMode) -> InterpretResult {
    match (mode, code.split_once('=')) {
        (InterpretMode::Exec, Some((name, expression))) => {
            let result = sum(expression, &*context);
            if let Some(value) = &result.value {
                context.set(name.trim(), value.clone());
            }
            result
        }
        _ => sum(code, &*context),
    }
}

pub fn manager() -> EquationManager {
    EquationManager::new(InMemoryContext::new(), parse, interpret)
}

pub fn manager_with(options: ManagerOptions) -> EquationManager {
    EquationManager::with_options(InMemoryContext::new(), parse, interpret, options)
}

pub fn value(manager: &EquationManager, name: &str) -> Option<i64> {
    manager.equation_value(name).and_then(|value| value.as_i64())
}

/// Flags carried by an in-place edit.
pub const EDITED: EquationUpdateFlags =
    EquationUpdateFlags::CONTENT.union(EquationUpdateFlags::TYPE);

pub fn updated(name: &str, flags: EquationUpdateFlags) -> String {
    format!("updated:{name}:{:#b}", flags.bits())
}

pub fn group_updated(flags: EquationGroupUpdateFlags) -> String {
    format!("group_updated:{:#b}", flags.bits())
}

/// Records every manager event as a short string, e.g. `added:A` or
/// `updated:A:0b100`.
pub struct EventLog {
    events: Arc<Mutex<Vec<String>>>,
    _connections: Vec<ScopedConnection>,
}

impl EventLog {
    pub fn attach(manager: &EquationManager) -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));
        let signals = manager.signals();
        let sink = |events: &Arc<Mutex<Vec<String>>>| Arc::clone(events);

        let log = sink(&events);
        let added = signals.connect_equation_added(move |equation| {
            log.lock().push(format!("added:{}", equation.name()))
        });
        let log = sink(&events);
        let removing = signals.connect_equation_removing(move |equation| {
            log.lock().push(format!("removing:{}", equation.name()))
        });
        let log = sink(&events);
        let removed = signals
            .connect_equation_removed(move |name| log.lock().push(format!("removed:{name}")));
        let log = sink(&events);
        let on_updated = signals.connect_equation_updated(move |equation, flags| {
            log.lock().push(updated(equation.name(), flags))
        });
        let log = sink(&events);
        let group_added = signals.connect_group_added(move |_| log.lock().push("group_added".into()));
        let log = sink(&events);
        let group_removing =
            signals.connect_group_removing(move |_| log.lock().push("group_removing".into()));
        let log = sink(&events);
        let on_group_updated =
            signals.connect_group_updated(move |_, flags| log.lock().push(group_updated(flags)));

        Self {
            events,
            _connections: [
                added,
                removing,
                removed,
                on_updated,
                group_added,
                group_removing,
                on_group_updated,
            ]
            .into_iter()
            .map(|connection| connection.scoped())
            .collect(),
        }
    }

    /// Events seen since the last call.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.events.lock())
    }
}
