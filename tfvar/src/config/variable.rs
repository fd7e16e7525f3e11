//! The declared shape of a single input variable.

use crate::error::SourceLocation;
use crate::value::{TypeConstraint, Value};

/// How a raw string override is interpreted for a variable.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ParsingMode {
    /// The raw string is the value, converted to the type constraint.
    #[default]
    Literal,
    /// The raw string is expression syntax to be evaluated.
    Expression,
}

impl ParsingMode {
    /// Parsing mode implied by a declared type constraint.
    ///
    /// Primitive constraints and undeclared types take raw strings
    /// literally; everything else, including `any`, expects expression
    /// syntax.
    #[must_use]
    pub fn for_constraint(constraint: Option<&TypeConstraint>) -> Self {
        match constraint {
            None => Self::Literal,
            Some(ty) if ty.is_primitive() => Self::Literal,
            Some(_) => Self::Expression,
        }
    }
}

/// A `variable "<name>" { ... }` block as declared in configuration.
///
/// The `*_set` flags record which optional attributes the block actually
/// wrote, which lets override files change only the fields they mention.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VariableDeclaration {
    /// Variable name, unique within a module.
    pub name: String,
    /// Description text, empty when not given.
    pub description: String,
    /// Whether `description` was written.
    pub description_set: bool,
    /// Default value; `None` means the variable is required and
    /// `Some(Value::Null)` is an explicit null default.
    pub default: Option<Value>,
    /// Type constraint as written, `None` when not declared.
    pub type_constraint: Option<TypeConstraint>,
    /// Constraint values are converted to: the declared one or `any`.
    pub constraint: TypeConstraint,
    /// How raw string overrides are interpreted.
    pub parsing_mode: ParsingMode,
    /// Whether the value is sensitive.
    pub sensitive: bool,
    /// Whether `sensitive` was written.
    pub sensitive_set: bool,
    /// Whether the variable may hold null.
    pub nullable: bool,
    /// Whether `nullable` was written.
    pub nullable_set: bool,
    /// Where the declaration was read from.
    pub location: SourceLocation,
}

impl VariableDeclaration {
    /// A bare declaration named `name` with default settings.
    #[must_use]
    pub fn new(name: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            name: name.into(),
            nullable: true,
            location,
            ..Self::default()
        }
    }

    /// Sets the declared type constraint and the parsing mode it implies.
    #[must_use]
    pub fn with_type(mut self, constraint: TypeConstraint) -> Self {
        self.parsing_mode = ParsingMode::for_constraint(Some(&constraint));
        self.constraint = constraint.clone();
        self.type_constraint = Some(constraint);
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self.description_set = true;
        self
    }
}
