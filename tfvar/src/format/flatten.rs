//! Single-line rendering for shell exports and workspace payloads.

use super::render::{escape, object_key, scalar_text};
use crate::value::Value;

/// Renders `value` as native syntax on one line.
///
/// Objects become `{ key = value, other = value }` and lists `[a, b]`.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use tfvar::format::inline;
/// use tfvar::value::Value;
///
/// let ports = Value::Object(BTreeMap::from([
///     ("external".to_owned(), Value::from(8300)),
///     ("protocol".to_owned(), Value::from("tcp")),
/// ]));
/// assert_eq!(inline(&Value::from(vec![ports])), r#"[{ external = 8300, protocol = "tcp" }]"#);
/// ```
#[must_use]
pub fn inline(value: &Value) -> String {
    let mut out = String::new();
    write_inline(&mut out, value);
    out
}

fn write_inline(out: &mut String, value: &Value) {
    match value {
        Value::List(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_inline(out, item);
            }
            out.push(']');
        }
        Value::Object(map) if map.is_empty() => out.push_str("{}"),
        Value::Object(map) => {
            out.push_str("{ ");
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&object_key(key));
                out.push_str(" = ");
                write_inline(out, item);
            }
            out.push_str(" }");
        }
        scalar => out.push_str(&scalar_text(scalar).unwrap_or_default()),
    }
}

/// Renders `value` for embedding in an already quoted context.
///
/// Null becomes the empty string and a top-level string loses its
/// surrounding quotes while keeping its escapes; everything else is
/// [`inline`].
///
/// # Examples
///
/// ```
/// use tfvar::format::flatten;
/// use tfvar::value::Value;
///
/// assert_eq!(flatten(&Value::Null), "");
/// assert_eq!(flatten(&Value::from("ap-northeast-1")), "ap-northeast-1");
/// assert_eq!(flatten(&Value::from(vec!["us-west-1a"])), r#"["us-west-1a"]"#);
/// ```
#[must_use]
pub fn flatten(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => escape(text),
        other => inline(other),
    }
}
