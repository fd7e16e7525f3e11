//! Tests for type constraint parsing and value conversion.

use std::collections::BTreeMap;

use anyhow::{Result, anyhow, ensure};
use rstest::rstest;

use super::*;

fn object(entries: &[(&str, Value)]) -> Value {
    Value::Object(
        entries
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect(),
    )
}

fn parse(source: &str) -> Result<TypeConstraint> {
    TypeConstraint::parse(source).map_err(|e| anyhow!(e))
}

#[rstest]
#[case::string("string", TypeConstraint::String)]
#[case::any("any", TypeConstraint::Any)]
#[case::legacy_list("list", TypeConstraint::List(Box::new(TypeConstraint::Any)))]
#[case::legacy_map("map", TypeConstraint::Map(Box::new(TypeConstraint::Any)))]
#[case::set("set(number)", TypeConstraint::Set(Box::new(TypeConstraint::Number)))]
#[case::nested(
    "map(list(bool))",
    TypeConstraint::Map(Box::new(TypeConstraint::List(Box::new(TypeConstraint::Bool))))
)]
#[case::tuple(
    "tuple([string, number])",
    TypeConstraint::Tuple(vec![TypeConstraint::String, TypeConstraint::Number])
)]
fn parses_type_expressions(#[case] source: &str, #[case] expected: TypeConstraint) -> Result<()> {
    let parsed = parse(source)?;
    ensure!(parsed == expected, "{source}: got {parsed:?}");
    Ok(())
}

#[rstest]
fn parses_object_with_optional_attributes() -> Result<()> {
    let parsed = parse(r#"object({ name = string, port = optional(number, 80) })"#)?;
    let TypeConstraint::Object(attrs) = parsed else {
        return Err(anyhow!("expected an object constraint, got {parsed:?}"));
    };
    let port = attrs
        .iter()
        .find(|a| a.name == "port")
        .ok_or_else(|| anyhow!("port attribute missing"))?;
    ensure!(port.optional);
    ensure!(port.default == Some(Value::from(80)));
    ensure!(attrs.iter().any(|a| a.name == "name" && !a.optional));
    Ok(())
}

#[rstest]
#[case::quoted("\"string\"")]
#[case::unknown_keyword("text")]
#[case::unknown_constructor("vector(string)")]
#[case::literal("42")]
fn rejects_invalid_type_expressions(#[case] source: &str) {
    assert!(TypeConstraint::parse(source).is_err(), "{source} should be rejected");
}

#[rstest]
#[case::number_to_string(TypeConstraint::String, Value::from(5), Value::from("5"))]
#[case::bool_to_string(TypeConstraint::String, Value::from(true), Value::from("true"))]
#[case::string_to_number(TypeConstraint::Number, Value::from("8300"), Value::from(8300))]
#[case::string_to_bool(TypeConstraint::Bool, Value::from("false"), Value::from(false))]
#[case::null_passes(TypeConstraint::Number, Value::Null, Value::Null)]
#[case::set_dedups(
    TypeConstraint::Set(Box::new(TypeConstraint::String)),
    Value::from(vec!["a", "b", "a"]),
    Value::from(vec!["a", "b"])
)]
fn converts_values(
    #[case] ty: TypeConstraint,
    #[case] input: Value,
    #[case] expected: Value,
) -> Result<()> {
    let converted = ty.convert(input)?;
    ensure!(converted == expected, "got {converted:?}, expected {expected:?}");
    Ok(())
}

#[rstest]
fn object_conversion_fills_optional_and_drops_extra() -> Result<()> {
    let ty = parse("object({ name = string, port = optional(number, 80), tls = optional(bool) })")?;
    let converted = ty.convert(object(&[
        ("name", Value::from("web")),
        ("extra", Value::from(1)),
    ]))?;
    let expected = object(&[
        ("name", Value::from("web")),
        ("port", Value::from(80)),
        ("tls", Value::Null),
    ]);
    ensure!(converted == expected, "got {converted:?}");
    Ok(())
}

#[rstest]
#[case::list_element(
    "list(number)",
    Value::from(vec!["1", "two"]),
    "[1]: a number is required"
)]
#[case::missing_attribute(
    "object({ name = string })",
    Value::Object(BTreeMap::new()),
    "attribute \"name\" is required"
)]
#[case::map_value(
    "map(bool)",
    object(&[("on", Value::from("maybe"))]),
    "[\"on\"]: a bool is required"
)]
#[case::wrong_shape("list(string)", Value::from("x"), "list of string required")]
fn conversion_errors_name_the_path(
    #[case] source: &str,
    #[case] input: Value,
    #[case] message: &str,
) -> Result<()> {
    let Err(err) = parse(source)?.convert(input) else {
        return Err(anyhow!("{source} conversion should fail"));
    };
    ensure!(err.to_string() == message, "got {err}");
    Ok(())
}

#[rstest]
#[case::int("42", "42")]
#[case::negative("-7", "-7")]
#[case::float("1.5", "1.5")]
#[case::whole_float("2.0", "2")]
fn numbers_parse_and_print(#[case] input: &str, #[case] printed: &str) -> Result<()> {
    let number: Number = input.parse()?;
    ensure!(number.to_string() == printed, "got {number}");
    Ok(())
}

#[rstest]
#[case::word("abc")]
#[case::infinity("inf")]
#[case::nan("NaN")]
#[case::empty("")]
fn non_numbers_are_rejected(#[case] input: &str) {
    assert!(input.parse::<Number>().is_err(), "{input} parsed as a number");
}

#[rstest]
fn json_values_convert_with_sorted_keys() -> Result<()> {
    let json: serde_json::Value = serde_json::from_str(r#"{"b": [1, true, null], "a": "x"}"#)?;
    let value = Value::from(json);
    let expected = object(&[
        ("a", Value::from("x")),
        ("b", Value::List(vec![Value::from(1), Value::from(true), Value::Null])),
    ]);
    ensure!(value == expected, "got {value:?}");
    ensure!(value.to_string() == r#"{ a = "x", b = [1, true, null] }"#, "got {value}");
    Ok(())
}

#[rstest]
fn expressions_evaluate_without_context() -> Result<()> {
    let body = hcl::parse("a = [1 + 1, \"x\"]\nb = var.other\n")?;
    let mut attrs = body.attributes();
    let (Some(a), Some(b)) = (attrs.next(), attrs.next()) else {
        return Err(anyhow!("expected two attributes"));
    };
    let value = Value::evaluate(a.expr()).map_err(|e| anyhow!(e))?;
    ensure!(value == Value::List(vec![Value::from(2), Value::from("x")]));
    ensure!(Value::evaluate(b.expr()).is_err(), "variable reference evaluated");
    Ok(())
}

#[rstest]
#[case::plain("region", true)]
#[case::dashed("eu-west-1", true)]
#[case::underscore("_private", true)]
#[case::leading_digit("1st", false)]
#[case::dotted("a.b", false)]
#[case::empty("", false)]
fn identifiers(#[case] name: &str, #[case] expected: bool) {
    assert_eq!(is_identifier(name), expected, "{name}");
}
