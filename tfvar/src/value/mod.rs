//! Structured values carried by variable defaults and overrides.
//!
//! Values parsed from the native syntax ([`hcl::Value`]) and from the JSON
//! syntax ([`serde_json::Value`]) are normalised into [`Value`]. Object keys
//! are kept in a [`BTreeMap`] so every renderer sees them in name order.

mod number;
mod types;

use std::collections::BTreeMap;
use std::fmt;

use hcl::eval::{Context, Evaluate};

pub use number::Number;
pub use types::{ConversionError, ObjectAttribute, TypeConstraint};

/// A fully evaluated structured value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// The absence of a value.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A number.
    Number(Number),
    /// A string.
    String(String),
    /// A list, set or tuple.
    List(Vec<Self>),
    /// A map or object with name-ordered keys.
    Object(BTreeMap<String, Self>),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short human readable name of the value's kind, used in messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Object(_) => "object",
        }
    }

    /// Convenience constructor for string values.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Evaluates a native-syntax expression with no variables or functions
    /// in scope.
    ///
    /// # Errors
    ///
    /// Returns the evaluator's message when the expression refers to
    /// anything beyond literals and operators.
    pub fn evaluate(expr: &hcl::Expression) -> Result<Self, String> {
        expr.evaluate(&Context::new())
            .map(Self::from)
            .map_err(|e| e.to_string())
    }
}

/// Whether `name` can be written without quotes: a letter or underscore
/// followed by letters, digits, underscores or dashes.
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

impl fmt::Display for Value {
    /// Formats the value on a single line in native syntax.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::format::inline(self))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(Number::from(n)),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => Self::Object(
                map.into_iter()
                    .map(|(key, item)| (key, Self::from(item)))
                    .collect(),
            ),
        }
    }
}

impl From<hcl::Value> for Value {
    fn from(value: hcl::Value) -> Self {
        match value {
            hcl::Value::Null => Self::Null,
            hcl::Value::Bool(b) => Self::Bool(b),
            hcl::Value::Number(n) => Self::Number(Number::from(n)),
            hcl::Value::String(s) => Self::String(s),
            hcl::Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            hcl::Value::Object(map) => Self::Object(
                map.into_iter()
                    .map(|(key, item)| (key, Self::from(item)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests;
