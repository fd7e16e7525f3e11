//! Final values: declared defaults overlaid with collected values.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::collect::{Overlay, OverlayEntry, OverrideValue};
use crate::config::{ParsingMode, VariableDeclaration};
use crate::value::{TypeConstraint, Value};
use crate::{TfvarError, TfvarResult};

/// A variable with its final value, ready to be written out.
#[derive(Clone, Debug, PartialEq)]
pub struct Variable {
    /// Variable name.
    pub name: String,
    /// Resolved value; `Null` when there is none.
    pub value: Value,
    /// Description from the declaration.
    pub description: String,
    /// Whether the value is sensitive.
    pub sensitive: bool,
    /// How raw string overrides are read.
    pub parsing_mode: ParsingMode,
    /// Constraint every value is converted to.
    pub constraint: TypeConstraint,
    /// Whether a null value is acceptable.
    pub nullable: bool,
}

impl From<VariableDeclaration> for Variable {
    fn from(decl: VariableDeclaration) -> Self {
        Self {
            name: decl.name,
            value: decl.default.unwrap_or_default(),
            description: decl.description,
            sensitive: decl.sensitive,
            parsing_mode: decl.parsing_mode,
            constraint: decl.constraint,
            nullable: decl.nullable,
        }
    }
}

/// Replaces each variable's value with the one collected for its name.
///
/// Variables with no collected value keep their current value. Collected
/// values for undeclared names are ignored.
///
/// # Errors
///
/// Stops at the first value that cannot be read, returning
/// [`TfvarError::ExpressionEvaluation`], or
/// [`TfvarError::NullabilityViolation`] when a non-nullable variable would
/// become null.
///
/// # Examples
///
/// ```
/// use tfvar::config::{ParsingMode, VariableDeclaration};
/// use tfvar::collect::Overlay;
/// use tfvar::error::SourceLocation;
/// use tfvar::value::{TypeConstraint, Value};
/// use tfvar::{Variable, resolve};
///
/// let decl = VariableDeclaration::new("replicas", SourceLocation::new("main.tf"))
///     .with_type(TypeConstraint::Number);
/// let mut overlay = Overlay::new();
/// overlay.collect_from_string("replicas=3")?;
/// let vars = resolve(&overlay, vec![Variable::from(decl)])?;
/// assert_eq!(vars.first().map(|v| &v.value), Some(&Value::from(3)));
/// # Ok::<_, std::sync::Arc<tfvar::TfvarError>>(())
/// ```
pub fn resolve(overlay: &Overlay, variables: Vec<Variable>) -> TfvarResult<Vec<Variable>> {
    for name in overlay.iter().map(|(name, _)| name) {
        if !variables.iter().any(|var| &var.name == name) {
            debug!(%name, "value given for undeclared variable");
        }
    }
    variables
        .into_iter()
        .map(|mut var| {
            if let Some(entry) = overlay.entry(&var.name) {
                trace!(name = %var.name, provenance = %entry.provenance, "resolving override");
                var.value = resolve_value(&var, entry)?;
            }
            Ok(var)
        })
        .collect()
}

fn resolve_value(var: &Variable, entry: &OverlayEntry) -> TfvarResult<Value> {
    let fail = |message: String| match &entry.path {
        Some(path) => TfvarError::evaluation(&var.name, format!("{message} (set in {path})")),
        None => TfvarError::evaluation(&var.name, message),
    };
    let evaluated = match &entry.value {
        OverrideValue::Raw { raw, .. } => match var.parsing_mode {
            ParsingMode::Literal => Ok(Value::string(raw.as_str())),
            ParsingMode::Expression => {
                parse_expression(raw).and_then(|expr| Value::evaluate(&expr))
            }
        },
        OverrideValue::Expression(expr) => expr.evaluate(),
    }
    .map_err(fail)?;

    let value = var
        .constraint
        .convert(evaluated)
        .map_err(|e| fail(e.to_string()))?;
    if value.is_null() && !var.nullable {
        return Err(Arc::new(TfvarError::NullabilityViolation {
            name: var.name.clone(),
        }));
    }
    Ok(value)
}

/// Parses `raw` as a single native-syntax expression.
fn parse_expression(raw: &str) -> Result<hcl::Expression, String> {
    let body = hcl::parse(&format!("value = {raw}\n")).map_err(|e| e.to_string())?;
    let mut attrs = body.attributes();
    match (attrs.next(), attrs.next(), body.blocks().next()) {
        (Some(attr), None, None) => Ok(attr.expr().clone()),
        _ => Err(format!("{raw:?} is not a single expression")),
    }
}

#[cfg(test)]
mod tests {
    //! Resolution rules per parsing mode and source form.

    use anyhow::{Result, anyhow, ensure};
    use rstest::rstest;

    use super::*;
    use crate::collect::SourceExpression;
    use crate::error::SourceLocation;

    fn declared(name: &str, ty: Option<TypeConstraint>) -> Variable {
        let decl = VariableDeclaration::new(name, SourceLocation::new("variables.tf"));
        Variable::from(match ty {
            Some(ty) => decl.with_type(ty),
            None => decl,
        })
    }

    fn resolve_one(var: Variable, overlay: &Overlay) -> Result<Value> {
        let resolved = resolve(overlay, vec![var]).map_err(|e| anyhow!(e.to_string()))?;
        resolved
            .into_iter()
            .next()
            .map(|v| v.value)
            .ok_or_else(|| anyhow!("no variable resolved"))
    }

    fn raw_overlay(assignment: &str) -> Result<Overlay> {
        let mut overlay = Overlay::new();
        overlay
            .collect_from_string(assignment)
            .map_err(|e| anyhow!(e.to_string()))?;
        Ok(overlay)
    }

    #[rstest]
    #[case::untyped(None, "x=hello", Value::from("hello"))]
    #[case::string(Some(TypeConstraint::String), "x=[1]", Value::from("[1]"))]
    #[case::number(Some(TypeConstraint::Number), "x=42", Value::from(42))]
    #[case::boolean(Some(TypeConstraint::Bool), "x=true", Value::from(true))]
    #[case::list(
        Some(TypeConstraint::List(Box::new(TypeConstraint::String))),
        "x=[\"a\", \"b\"]",
        Value::from(vec!["a", "b"])
    )]
    #[case::any_expression(Some(TypeConstraint::Any), "x=1 + 2", Value::from(3))]
    fn raw_values_follow_parsing_mode(
        #[case] ty: Option<TypeConstraint>,
        #[case] assignment: &str,
        #[case] expected: Value,
    ) -> Result<()> {
        let value = resolve_one(declared("x", ty), &raw_overlay(assignment)?)?;
        ensure!(value == expected, "got {value:?}, expected {expected:?}");
        Ok(())
    }

    #[rstest]
    #[case::bad_number(Some(TypeConstraint::Number), "x=abc")]
    #[case::bad_expression(Some(TypeConstraint::Map(Box::new(TypeConstraint::String))), "x={")]
    #[case::variable_reference(Some(TypeConstraint::Any), "x=var.other")]
    fn unreadable_raw_values_are_evaluation_errors(
        #[case] ty: Option<TypeConstraint>,
        #[case] assignment: &str,
    ) -> Result<()> {
        let overlay = raw_overlay(assignment)?;
        let Err(err) = resolve(&overlay, vec![declared("x", ty)]) else {
            return Err(anyhow!("expected {assignment} to fail"));
        };
        ensure!(
            matches!(&*err, TfvarError::ExpressionEvaluation { name, .. } if name == "x"),
            "unexpected error {err}"
        );
        Ok(())
    }

    #[rstest]
    fn expression_values_ignore_parsing_mode() -> Result<()> {
        let mut overlay = Overlay::new();
        let body = hcl::parse("x = 5\n")?;
        let expr = body
            .attributes()
            .next()
            .map(|attr| attr.expr().clone())
            .ok_or_else(|| anyhow!("missing attribute"))?;
        overlay.insert(
            "x",
            OverlayEntry {
                value: OverrideValue::Expression(SourceExpression::Hcl(expr)),
                provenance: crate::collect::Provenance::VarFile,
                path: None,
            },
        );
        let value = resolve_one(declared("x", Some(TypeConstraint::String)), &overlay)?;
        ensure!(value == Value::from("5"), "got {value:?}");
        Ok(())
    }

    #[rstest]
    fn missing_values_keep_defaults() -> Result<()> {
        let decl = VariableDeclaration::new("x", SourceLocation::new("variables.tf"))
            .with_default("kept");
        let value = resolve_one(Variable::from(decl), &Overlay::new())?;
        ensure!(value == Value::from("kept"));
        Ok(())
    }

    #[rstest]
    fn null_for_non_nullable_is_rejected() -> Result<()> {
        let mut var = declared("x", Some(TypeConstraint::Any));
        var.nullable = false;
        let overlay = raw_overlay("x=null")?;
        let Err(err) = resolve(&overlay, vec![var]) else {
            return Err(anyhow!("null accepted for non-nullable variable"));
        };
        ensure!(matches!(&*err, TfvarError::NullabilityViolation { name } if name == "x"));
        Ok(())
    }

    #[rstest]
    fn undeclared_overrides_are_ignored() -> Result<()> {
        let overlay = raw_overlay("ghost=1")?;
        let vars = resolve(&overlay, vec![declared("x", None)]).map_err(|e| anyhow!(e.to_string()))?;
        ensure!(vars.len() == 1);
        ensure!(vars.first().is_some_and(|v| v.value.is_null()));
        Ok(())
    }

    #[rstest]
    fn file_values_name_their_file_on_failure() -> Result<()> {
        let mut overlay = Overlay::new();
        let body = hcl::parse("x = \"abc\"\n")?;
        let expr = body
            .attributes()
            .next()
            .map(|attr| attr.expr().clone())
            .ok_or_else(|| anyhow!("missing attribute"))?;
        overlay.insert(
            "x",
            OverlayEntry {
                value: OverrideValue::Expression(SourceExpression::Hcl(expr)),
                provenance: crate::collect::Provenance::VarFile,
                path: Some("prod.tfvars".into()),
            },
        );
        let Err(err) = resolve(&overlay, vec![declared("x", Some(TypeConstraint::Number))]) else {
            return Err(anyhow!("a string was accepted as a number"));
        };
        let message = err.to_string();
        ensure!(message.contains("(set in prod.tfvars)"), "got {message}");
        Ok(())
    }
}
