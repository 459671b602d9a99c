//! Equations
//!
//! An [`Equation`] is one named, independently re-evaluable item. Equations
//! never exist on their own: each belongs to exactly one [`EquationGroup`],
//! the set of items parsed out of one user statement.
//!
//! The [`EquationManager`] owns the groups, the dependency graph and the
//! value store, and is the only place equations are created, changed or
//! destroyed.

mod context;
mod engine;
mod group;
mod manager;
mod signals;

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownVariantError;

pub use context::{EquationContext, InMemoryContext, Value};
pub use engine::{
    InterpretMode, InterpretResult, Interpreter, ParseItem, ParseMode, StatementParser,
};
pub use group::{EquationGroup, EquationGroupId};
pub use manager::{EquationManager, UpdateScope};
pub use signals::{EquationEvent, EquationSignalsManager};

/// What kind of item a parsed name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Variable,
    Function,
    Class,
    Import,
    ImportFrom,
    Expression,
    Error,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Variable => "variable",
            ItemType::Function => "function",
            ItemType::Class => "class",
            ItemType::Import => "import",
            ItemType::ImportFrom => "import_from",
            ItemType::Expression => "expression",
            ItemType::Error => "error",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = UnknownVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "variable" => Ok(ItemType::Variable),
            "function" => Ok(ItemType::Function),
            "class" => Ok(ItemType::Class),
            "import" => Ok(ItemType::Import),
            "import_from" => Ok(ItemType::ImportFrom),
            "expression" => Ok(ItemType::Expression),
            "error" => Ok(ItemType::Error),
            other => Err(UnknownVariantError::new("item type", other)),
        }
    }
}

/// Outcome of the last evaluation of an equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    #[default]
    Pending,
    Success,
    SyntaxError,
    NameError,
    TypeError,
    ZeroDivisionError,
    ValueError,
    MemoryError,
    OverflowError,
    RecursionError,
    IndexError,
    KeyError,
    AttributeError,
    /// The update pass was cancelled before this equation was reached.
    Interrupted,
}

impl ResultStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultStatus::Pending => "pending",
            ResultStatus::Success => "success",
            ResultStatus::SyntaxError => "syntax_error",
            ResultStatus::NameError => "name_error",
            ResultStatus::TypeError => "type_error",
            ResultStatus::ZeroDivisionError => "zero_division_error",
            ResultStatus::ValueError => "value_error",
            ResultStatus::MemoryError => "memory_error",
            ResultStatus::OverflowError => "overflow_error",
            ResultStatus::RecursionError => "recursion_error",
            ResultStatus::IndexError => "index_error",
            ResultStatus::KeyError => "key_error",
            ResultStatus::AttributeError => "attribute_error",
            ResultStatus::Interrupted => "interrupted",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResultStatus::Success)
    }

    /// Any status the interpreter reports for a failed evaluation.
    pub fn is_error(&self) -> bool {
        !matches!(
            self,
            ResultStatus::Pending | ResultStatus::Success | ResultStatus::Interrupted
        )
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResultStatus {
    type Err = UnknownVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let status = match s {
            "pending" => ResultStatus::Pending,
            "success" => ResultStatus::Success,
            "syntax_error" => ResultStatus::SyntaxError,
            "name_error" => ResultStatus::NameError,
            "type_error" => ResultStatus::TypeError,
            "zero_division_error" => ResultStatus::ZeroDivisionError,
            "value_error" => ResultStatus::ValueError,
            "memory_error" => ResultStatus::MemoryError,
            "overflow_error" => ResultStatus::OverflowError,
            "recursion_error" => ResultStatus::RecursionError,
            "index_error" => ResultStatus::IndexError,
            "key_error" => ResultStatus::KeyError,
            "attribute_error" => ResultStatus::AttributeError,
            "interrupted" => ResultStatus::Interrupted,
            other => return Err(UnknownVariantError::new("result status", other)),
        };
        Ok(status)
    }
}

macro_rules! update_flags {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$flag_meta:meta])* $flag:ident = $bit:expr,)+ }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u8);

        impl $name {
            $($(#[$flag_meta])* pub const $flag: $name = $name(1 << $bit);)+

            pub const fn empty() -> Self {
                Self(0)
            }

            pub const fn all() -> Self {
                Self(0 $(| (1 << $bit))+)
            }

            pub const fn bits(&self) -> u8 {
                self.0
            }

            pub const fn is_empty(&self) -> bool {
                self.0 == 0
            }

            pub const fn contains(&self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            pub const fn union(self, other: Self) -> Self {
                Self(self.0 | other.0)
            }

            pub fn insert(&mut self, other: Self) {
                self.0 |= other.0;
            }

            pub fn remove(&mut self, other: Self) {
                self.0 &= !other.0;
            }
        }

        impl BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                self.union(rhs)
            }
        }

        impl BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }
    };
}

update_flags! {
    /// Which fields of an [`Equation`] an update event touched.
    EquationUpdateFlags {
        CONTENT = 0,
        TYPE = 1,
        STATUS = 2,
        MESSAGE = 3,
        VALUE = 4,
        DEPENDENCIES = 5,
        DEPENDENTS = 6,
    }
}

update_flags! {
    /// Which parts of an [`EquationGroup`] an update event touched.
    EquationGroupUpdateFlags {
        STATEMENT = 0,
        /// The set of equation names changed.
        EQUATIONS = 1,
    }
}

/// One named item produced by parsing a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equation {
    name: String,
    content: String,
    item_type: ItemType,
    status: ResultStatus,
    message: String,
    group_id: EquationGroupId,
}

impl Equation {
    pub fn new(
        name: impl Into<String>,
        content: impl Into<String>,
        item_type: ItemType,
        group_id: EquationGroupId,
    ) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            item_type,
            status: ResultStatus::Pending,
            message: String::new(),
            group_id,
        }
    }

    pub(crate) fn from_item(item: &ParseItem, group_id: EquationGroupId) -> Self {
        let mut equation = Equation::new(&item.name, &item.content, item.item_type, group_id);
        if item.is_error() {
            equation.status = item.status;
            equation.message = item.message.clone();
        }
        equation
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source text without the name binding.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn item_type(&self) -> ItemType {
        self.item_type
    }

    pub fn status(&self) -> ResultStatus {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn group_id(&self) -> EquationGroupId {
        self.group_id
    }

    pub(crate) fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub(crate) fn set_item_type(&mut self, item_type: ItemType) {
        self.item_type = item_type;
    }

    pub(crate) fn set_status(&mut self, status: ResultStatus) {
        self.status = status;
    }

    pub(crate) fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }
}
