//! Language Seams
//!
//! The manager knows nothing about the expression language. It depends on two
//! collaborators:
//!
//! - a [`StatementParser`] that splits statement text into named items and
//!   reports what each item reads from
//! - an [`Interpreter`] that executes code against the value store, or
//!   evaluates an expression without persisting anything
//!
//! Both are implemented for plain closures of the matching shape.

use serde::{Deserialize, Serialize};

use super::context::{EquationContext, Value};
use super::{ItemType, ResultStatus};
use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParseMode {
    /// Full statements that bind names. Syntax errors are returned as
    /// [`ParseError`].
    Statement,
    /// A single expression. Syntax errors come back as one error-tagged item.
    Expression,
}

/// One named item reported by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseItem {
    pub name: String,
    pub content: String,
    pub item_type: ItemType,
    pub dependencies: Vec<String>,
    pub status: ResultStatus,
    pub message: String,
}

impl ParseItem {
    pub fn new(name: impl Into<String>, content: impl Into<String>, item_type: ItemType) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            item_type,
            dependencies: Vec::new(),
            status: ResultStatus::Pending,
            message: String::new(),
        }
    }

    /// An error-tagged item, as returned in expression mode.
    pub fn error(status: ResultStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            ..Self::new("", "", ItemType::Error)
        }
    }

    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_error(&self) -> bool {
        self.item_type == ItemType::Error
    }
}

/// Turns statement text into named items. Must be deterministic: the manager
/// diffs two parse results by name and content.
pub trait StatementParser {
    fn parse(&self, code: &str, mode: ParseMode) -> Result<Vec<ParseItem>, ParseError>;
}

impl<F> StatementParser for F
where
    F: Fn(&str, ParseMode) -> Result<Vec<ParseItem>, ParseError>,
{
    fn parse(&self, code: &str, mode: ParseMode) -> Result<Vec<ParseItem>, ParseError> {
        self(code, mode)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterpretMode {
    Exec,
    Eval,
}

/// Outcome of running code through an [`Interpreter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpretResult {
    pub status: ResultStatus,
    pub message: String,
    pub value: Option<Value>,
}

impl InterpretResult {
    pub fn success(value: Option<Value>) -> Self {
        Self {
            status: ResultStatus::Success,
            message: String::new(),
            value,
        }
    }

    pub fn failure(status: ResultStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            value: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Executes or evaluates code against a value store.
pub trait Interpreter {
    /// Run `code` for its side effects on `context`.
    fn exec(&self, code: &str, context: &mut dyn EquationContext) -> InterpretResult;

    /// Compute the value of `code` without touching `context`.
    fn eval(&self, code: &str, context: &dyn EquationContext) -> InterpretResult;

    /// Name of the language this interpreter speaks.
    fn language(&self) -> &str {
        ""
    }

    fn interpret(
        &self,
        code: &str,
        context: &mut dyn EquationContext,
        mode: InterpretMode,
    ) -> InterpretResult {
        match mode {
            InterpretMode::Exec => self.exec(code, context),
            InterpretMode::Eval => self.eval(code, context),
        }
    }
}

impl<F> Interpreter for F
where
    F: Fn(&str, &mut dyn EquationContext, InterpretMode) -> InterpretResult,
{
    fn exec(&self, code: &str, context: &mut dyn EquationContext) -> InterpretResult {
        self(code, context, InterpretMode::Exec)
    }

    /// Closure interpreters only get mutable access, so evaluation runs
    /// against a scratch copy of the store.
    fn eval(&self, code: &str, context: &dyn EquationContext) -> InterpretResult {
        let mut scratch: super::InMemoryContext = context
            .keys()
            .into_iter()
            .filter_map(|key| context.get(&key).map(|value| (key, value)))
            .collect();
        self(code, &mut scratch, InterpretMode::Eval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equation::InMemoryContext;
    use serde_json::json;

    #[test]
    fn closure_parser() {
        let parser = |code: &str, _mode: ParseMode| -> Result<Vec<ParseItem>, ParseError> {
            if code.is_empty() {
                return Err(ParseError::new("empty"));
            }
            Ok(vec![ParseItem::new("x", code, ItemType::Variable).with_dependencies(["y"])])
        };

        let items = parser.parse("y + 1", ParseMode::Statement).unwrap();
        assert_eq!(items[0].dependencies, vec!["y".to_string()]);
        assert!(parser.parse("", ParseMode::Statement).is_err());
    }

    #[test]
    fn closure_interpreter_eval_does_not_persist() {
        let interpreter = |code: &str, context: &mut dyn EquationContext, _mode: InterpretMode| {
            context.set(code, json!(true));
            InterpretResult::success(context.get(code))
        };

        let mut context = InMemoryContext::new();
        context.set("a", json!(1));

        let result = interpreter.eval("b", &context);
        assert!(result.is_success());
        assert_eq!(result.value, Some(json!(true)));
        assert!(!context.contains("b"));

        interpreter.exec("b", &mut context);
        assert!(context.contains("b"));
    }

    #[test]
    fn error_item() {
        let item = ParseItem::error(ResultStatus::SyntaxError, "unexpected EOF");
        assert!(item.is_error());
        assert_eq!(item.message, "unexpected EOF");
    }
}
