//! Type constraints declared by `type = ...` and value conversion.
//!
//! A constraint is parsed from the expression tree of the `type` attribute:
//! bare keywords (`string`, `number`, `bool`, `any`, and the legacy `list`
//! and `map`) and constructor calls (`list(T)`, `set(T)`, `map(T)`,
//! `tuple([...])`, `object({...})`, `optional(T[, default])`).

use std::collections::BTreeMap;
use std::fmt;

use hcl::Expression;
use hcl::eval::{Context, Evaluate};

use super::Value;

/// A declared type constraint.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum TypeConstraint {
    /// Accepts any value unchanged.
    #[default]
    Any,
    /// A string; numbers and bools convert to their literal text.
    String,
    /// A number; numeric strings convert.
    Number,
    /// A bool; `"true"` and `"false"` convert.
    Bool,
    /// A list whose elements share one type.
    List(Box<Self>),
    /// A set whose elements share one type; duplicates are removed.
    Set(Box<Self>),
    /// A map whose values share one type.
    Map(Box<Self>),
    /// A fixed-length sequence with per-position types.
    Tuple(Vec<Self>),
    /// An object with named, typed attributes.
    Object(Vec<ObjectAttribute>),
}

/// One attribute of an `object({...})` constraint.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectAttribute {
    /// Attribute name.
    pub name: String,
    /// Attribute type.
    pub constraint: TypeConstraint,
    /// Whether the attribute was wrapped in `optional(...)`.
    pub optional: bool,
    /// Default substituted for an absent optional attribute.
    pub default: Option<Value>,
}

/// Failure to convert a value to a [`TypeConstraint`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversionError {
    path: String,
    message: String,
}

impl ConversionError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            path: String::new(),
            message: message.into(),
        }
    }

    fn at(mut self, step: &str) -> Self {
        self.path.insert_str(0, step);
        self
    }

    /// The human readable reason without the path prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

impl std::error::Error for ConversionError {}

impl TypeConstraint {
    /// Parses a type expression written as source text, as found in the
    /// JSON syntax where `type` holds a string.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem when the text is not a valid
    /// type expression.
    pub fn parse(source: &str) -> Result<Self, String> {
        let body = hcl::parse(&format!("type = {source}\n")).map_err(|e| e.to_string())?;
        let mut attrs = body.attributes();
        match (attrs.next(), attrs.next(), body.blocks().next()) {
            (Some(attr), None, None) => Self::from_expression(attr.expr()),
            _ => Err(format!("{source:?} is not a single type expression")),
        }
    }

    /// Interprets an expression as a type constraint.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem when the expression is not a
    /// type expression.
    pub fn from_expression(expr: &Expression) -> Result<Self, String> {
        match expr {
            Expression::Variable(var) => match var.as_str() {
                "any" => Ok(Self::Any),
                "string" => Ok(Self::String),
                "number" => Ok(Self::Number),
                "bool" => Ok(Self::Bool),
                "list" => Ok(Self::List(Box::new(Self::Any))),
                "map" => Ok(Self::Map(Box::new(Self::Any))),
                other => Err(format!("the keyword {other:?} is not a valid type specification")),
            },
            Expression::Parenthesis(inner) => Self::from_expression(inner),
            Expression::FuncCall(call) => {
                let name = call.name.to_string();
                Self::from_constructor(&name, &call.args)
            }
            Expression::String(_) => Err(String::from(
                "quoted type constraints are not supported; remove the quotes",
            )),
            _ => Err(String::from(
                "a type specification is either a primitive type keyword (bool, number, string) or a complex type constructor call, like list(string)",
            )),
        }
    }

    fn from_constructor(name: &str, args: &[Expression]) -> Result<Self, String> {
        let [arg] = args else {
            return Err(format!(
                "the {name} type constructor requires exactly one argument"
            ));
        };
        match name {
            "list" => Ok(Self::List(Box::new(Self::from_expression(arg)?))),
            "set" => Ok(Self::Set(Box::new(Self::from_expression(arg)?))),
            "map" => Ok(Self::Map(Box::new(Self::from_expression(arg)?))),
            "tuple" => match arg {
                Expression::Array(items) => items
                    .iter()
                    .map(Self::from_expression)
                    .collect::<Result<Vec<_>, _>>()
                    .map(Self::Tuple),
                _ => Err(String::from(
                    "the tuple type constructor requires a list of element types",
                )),
            },
            "object" => match arg {
                Expression::Object(object) => object
                    .iter()
                    .map(|(key, value)| object_attribute(object_key_name(key)?, value))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Self::Object),
                _ => Err(String::from(
                    "the object type constructor requires an object describing the attribute names and their corresponding types",
                )),
            },
            other => Err(format!("unknown type constructor {other:?}")),
        }
    }

    /// Whether the constraint is `string`, `number` or `bool`.
    #[must_use]
    pub const fn is_primitive(&self) -> bool {
        matches!(self, Self::String | Self::Number | Self::Bool)
    }

    /// Converts `value` so it conforms to this constraint.
    ///
    /// Null converts to null for every constraint.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionError`] naming the offending path when the
    /// value cannot be made to conform.
    pub fn convert(&self, value: Value) -> Result<Value, ConversionError> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        match self {
            Self::Any => Ok(value),
            Self::String => convert_string(value),
            Self::Number => convert_number(value),
            Self::Bool => convert_bool(value),
            Self::List(element) => convert_sequence(element, value, self),
            Self::Set(element) => {
                let Value::List(items) = convert_sequence(element, value, self)? else {
                    return Err(ConversionError::new(format!("{self} required")));
                };
                let mut unique: Vec<Value> = Vec::with_capacity(items.len());
                for item in items {
                    if !unique.contains(&item) {
                        unique.push(item);
                    }
                }
                Ok(Value::List(unique))
            }
            Self::Map(element) => match value {
                Value::Object(map) => map
                    .into_iter()
                    .map(|(key, item)| {
                        element
                            .convert(item)
                            .map(|converted| (key.clone(), converted))
                            .map_err(|e| e.at(&format!("[{key:?}]")))
                    })
                    .collect::<Result<BTreeMap<_, _>, _>>()
                    .map(Value::Object),
                _ => Err(ConversionError::new(format!("{self} required"))),
            },
            Self::Tuple(elements) => match value {
                Value::List(items) if items.len() == elements.len() => elements
                    .iter()
                    .zip(items)
                    .enumerate()
                    .map(|(i, (ty, item))| ty.convert(item).map_err(|e| e.at(&format!("[{i}]"))))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::List),
                Value::List(_) => Err(ConversionError::new(format!(
                    "tuple required with exactly {} elements",
                    elements.len()
                ))),
                _ => Err(ConversionError::new("tuple required")),
            },
            Self::Object(attributes) => match value {
                Value::Object(mut map) => {
                    let mut converted = BTreeMap::new();
                    for attr in attributes {
                        let item = match map.remove(&attr.name) {
                            Some(item) => item,
                            None if attr.optional => attr.default.clone().unwrap_or_default(),
                            None => {
                                return Err(ConversionError::new(format!(
                                    "attribute {:?} is required",
                                    attr.name
                                )));
                            }
                        };
                        let item = attr
                            .constraint
                            .convert(item)
                            .map_err(|e| e.at(&format!(".{}", attr.name)))?;
                        converted.insert(attr.name.clone(), item);
                    }
                    Ok(Value::Object(converted))
                }
                _ => Err(ConversionError::new("object required")),
            },
        }
    }
}

fn convert_string(value: Value) -> Result<Value, ConversionError> {
    match value {
        Value::String(_) => Ok(value),
        Value::Number(n) => Ok(Value::String(n.to_string())),
        Value::Bool(b) => Ok(Value::String(b.to_string())),
        _ => Err(ConversionError::new("string required")),
    }
}

fn convert_number(value: Value) -> Result<Value, ConversionError> {
    match value {
        Value::Number(_) => Ok(value),
        Value::String(s) => s
            .parse()
            .map(Value::Number)
            .map_err(|_| ConversionError::new("a number is required")),
        _ => Err(ConversionError::new("number required")),
    }
}

fn convert_bool(value: Value) -> Result<Value, ConversionError> {
    match value {
        Value::Bool(_) => Ok(value),
        Value::String(s) => match s.as_str() {
            "true" | "1" => Ok(Value::Bool(true)),
            "false" | "0" => Ok(Value::Bool(false)),
            _ => Err(ConversionError::new("a bool is required")),
        },
        _ => Err(ConversionError::new("bool required")),
    }
}

fn convert_sequence(
    element: &TypeConstraint,
    value: Value,
    whole: &TypeConstraint,
) -> Result<Value, ConversionError> {
    match value {
        Value::List(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| element.convert(item).map_err(|e| e.at(&format!("[{i}]"))))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        _ => Err(ConversionError::new(format!("{whole} required"))),
    }
}

fn object_key_name(key: &hcl::expr::ObjectKey) -> Result<String, String> {
    match key {
        hcl::expr::ObjectKey::Identifier(ident) => Ok(ident.to_string()),
        hcl::expr::ObjectKey::Expression(Expression::String(name)) => Ok(name.clone()),
        hcl::expr::ObjectKey::Expression(Expression::Variable(var)) => Ok(var.as_str().to_owned()),
        _ => Err(String::from("object type attribute names must be identifiers")),
    }
}

fn object_attribute(name: String, expr: &Expression) -> Result<ObjectAttribute, String> {
    if let Expression::FuncCall(call) = expr {
        if call.name.to_string() == "optional" {
            let (ty, default) = match call.args.as_slice() {
                [ty] => (ty, None),
                [ty, default] => (ty, Some(default)),
                _ => {
                    return Err(String::from(
                        "optional() takes a type and an optional default value",
                    ));
                }
            };
            let constraint = TypeConstraint::from_expression(ty)?;
            let default = default
                .map(|expr| {
                    let value = expr
                        .evaluate(&Context::new())
                        .map(Value::from)
                        .map_err(|e| e.to_string())?;
                    constraint.convert(value).map_err(|e| e.to_string())
                })
                .transpose()?;
            return Ok(ObjectAttribute {
                name,
                constraint,
                optional: true,
                default,
            });
        }
    }
    Ok(ObjectAttribute {
        name,
        constraint: TypeConstraint::from_expression(expr)?,
        optional: false,
        default: None,
    })
}

impl fmt::Display for TypeConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::String => f.write_str("string"),
            Self::Number => f.write_str("number"),
            Self::Bool => f.write_str("bool"),
            Self::List(element) => write!(f, "list of {element}"),
            Self::Set(element) => write!(f, "set of {element}"),
            Self::Map(element) => write!(f, "map of {element}"),
            Self::Tuple(_) => f.write_str("tuple"),
            Self::Object(_) => f.write_str("object"),
        }
    }
}
