//! Decoding of `variable` blocks from configuration files.
//!
//! Files ending in `.json` use the JSON syntax; everything else is read as
//! native block syntax. Other top-level block kinds are recognised and
//! skipped. Problems are reported as [`Diagnostics`] so that one bad block
//! does not hide the rest of the file.

use std::collections::BTreeSet;

use camino::{Utf8Path, Utf8PathBuf};
use hcl::{Block, Expression, Structure};
use serde_json::Value as JsonValue;
use tracing::{debug, trace};

use super::VariableDeclaration;
use crate::error::{Diagnostic, DiagnosticKind, Diagnostics, SourceLocation};
use crate::value::{TypeConstraint, Value, is_identifier};

/// Names with a special meaning inside module blocks.
const RESERVED_NAMES: [&str; 6] = [
    "source",
    "version",
    "count",
    "for_each",
    "depends_on",
    "providers",
];

/// Top-level block kinds that are valid but carry no variables.
const SKIPPED_BLOCKS: [&str; 12] = [
    "terraform",
    "required_providers",
    "provider",
    "locals",
    "output",
    "module",
    "resource",
    "data",
    "moved",
    "import",
    "check",
    "removed",
];

/// Comment key allowed in JSON syntax objects.
const JSON_COMMENT_KEY: &str = "//";

/// The variables declared by one configuration file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigFile {
    /// File the declarations were read from.
    pub path: Utf8PathBuf,
    /// Whether this is an override file.
    pub is_override: bool,
    /// Declarations in file order.
    pub variables: Vec<VariableDeclaration>,
}

/// Reads and decodes the file at `path`.
///
/// A read failure yields a `FileRead` diagnostic and no file. A file with
/// invalid syntax yields a `Syntax` diagnostic and no file. Problems inside
/// individual blocks are reported while the remaining declarations are
/// still returned.
///
/// # Examples
///
/// ```no_run
/// use camino::Utf8Path;
/// use tfvar::config::parse_config_file;
///
/// let (file, diags) = parse_config_file(Utf8Path::new("variables.tf"), false);
/// assert!(!diags.has_errors());
/// assert!(file.is_some());
/// ```
#[must_use]
pub fn parse_config_file(path: &Utf8Path, is_override: bool) -> (Option<ConfigFile>, Diagnostics) {
    match std::fs::read_to_string(path) {
        Ok(source) => parse_config_source(path, &source, is_override),
        Err(e) => {
            debug!(path = %path, error = %e, "configuration file unreadable");
            let diag = Diagnostic::error(
                DiagnosticKind::FileRead,
                "Failed to read file",
                format!("The configuration file \"{path}\" could not be read: {e}."),
                Some(SourceLocation::new(path)),
            );
            (None, diag.into())
        }
    }
}

/// Decodes already loaded `source` as if it were read from `path`.
#[must_use]
pub fn parse_config_source(
    path: &Utf8Path,
    source: &str,
    is_override: bool,
) -> (Option<ConfigFile>, Diagnostics) {
    let mut decoder = Decoder {
        path,
        is_override,
        diags: Diagnostics::new(),
    };
    let variables = if is_json(path) {
        decoder.decode_json(source)
    } else {
        decoder.decode_native(source)
    };
    let file = variables.map(|decls| {
        debug!(path = %path, count = decls.len(), is_override, "decoded variables");
        ConfigFile {
            path: path.to_owned(),
            is_override,
            variables: decls,
        }
    });
    (file, decoder.diags)
}

pub(crate) fn is_json(path: &Utf8Path) -> bool {
    path.extension() == Some("json")
}

struct Decoder<'a> {
    path: &'a Utf8Path,
    is_override: bool,
    diags: Diagnostics,
}

impl Decoder<'_> {
    /// Warns about the bare `list` and `map` keywords, which mean `list(any)`
    /// and `map(any)`.
    fn legacy_keyword(&mut self, keyword: &str) {
        if matches!(keyword, "list" | "map") {
            self.diags.push(Diagnostic::warning(
                DiagnosticKind::Syntax,
                "Deprecated type keyword",
                format!("The bare \"{keyword}\" keyword is deprecated. Write {keyword}(any) instead."),
                Some(SourceLocation::new(self.path)),
            ));
        }
    }

    fn syntax(&mut self, summary: &str, detail: impl Into<String>) {
        self.diags.push(Diagnostic::error(
            DiagnosticKind::Syntax,
            summary,
            detail,
            Some(SourceLocation::new(self.path)),
        ));
    }

    fn decode_native(&mut self, source: &str) -> Option<Vec<VariableDeclaration>> {
        let body = match hcl::parse(source) {
            Ok(body) => body,
            Err(e) => {
                self.syntax("Invalid configuration syntax", e.to_string());
                return None;
            }
        };
        let mut variables = Vec::new();
        for structure in body.iter() {
            match structure {
                Structure::Attribute(attr) => self.syntax(
                    "Unsupported argument",
                    format!("An argument named \"{}\" is not expected here.", attr.key()),
                ),
                Structure::Block(block) => match block.identifier() {
                    "variable" => {
                        if let Some(decl) = self.native_variable(block) {
                            variables.push(decl);
                        }
                    }
                    kind if SKIPPED_BLOCKS.contains(&kind) => {
                        trace!(path = %self.path, kind, "skipping block");
                    }
                    kind => self.syntax(
                        "Unsupported block type",
                        format!("Blocks of type \"{kind}\" are not expected here."),
                    ),
                },
            }
        }
        Some(variables)
    }

    fn native_variable(&mut self, block: &Block) -> Option<VariableDeclaration> {
        let name = match block.labels() {
            [label] => label.as_str().to_owned(),
            [] => {
                self.syntax(
                    "Missing name for variable",
                    "All variable blocks must have 1 labels (name).",
                );
                return None;
            }
            _ => {
                self.syntax(
                    "Extraneous label for variable",
                    "Only 1 labels (name) are expected for variable blocks.",
                );
                return None;
            }
        };
        let mut decl = VariableDeclaration::new(name, SourceLocation::new(self.path));
        let mut seen = BTreeSet::new();
        for structure in block.body().iter() {
            match structure {
                Structure::Attribute(attr) => {
                    let key = attr.key();
                    if !seen.insert(key) {
                        self.syntax(
                            "Duplicate argument",
                            format!("The argument \"{key}\" was already set."),
                        );
                        continue;
                    }
                    if key == "type" {
                        match TypeConstraint::from_expression(attr.expr()) {
                            Ok(ty) => {
                                if let Expression::Variable(keyword) = attr.expr() {
                                    self.legacy_keyword(keyword.as_str());
                                }
                                decl = decl.with_type(ty);
                            }
                            Err(e) => self.syntax("Invalid type specification", e),
                        }
                        continue;
                    }
                    match Value::evaluate(attr.expr()) {
                        Ok(value) => self.assign(&mut decl, key, value),
                        Err(e) => self.syntax("Invalid expression", format!("{key}: {e}")),
                    }
                }
                Structure::Block(inner) if inner.identifier() == "validation" => {}
                Structure::Block(inner) => self.syntax(
                    "Unsupported block type",
                    format!(
                        "Blocks of type \"{}\" are not expected here.",
                        inner.identifier()
                    ),
                ),
            }
        }
        self.finish(decl)
    }

    fn decode_json(&mut self, source: &str) -> Option<Vec<VariableDeclaration>> {
        let root = match serde_json::from_str::<JsonValue>(source) {
            Ok(JsonValue::Object(root)) => root,
            Ok(other) => {
                self.syntax(
                    "Invalid JSON configuration",
                    format!("The root value must be an object, not {}.", json_kind(&other)),
                );
                return None;
            }
            Err(e) => {
                self.syntax("Invalid JSON syntax", e.to_string());
                return None;
            }
        };
        let mut variables = Vec::new();
        for (kind, content) in root {
            match kind.as_str() {
                "variable" => self.json_variables(content, &mut variables),
                JSON_COMMENT_KEY => {}
                other if SKIPPED_BLOCKS.contains(&other) => {
                    trace!(path = %self.path, kind = other, "skipping block");
                }
                other => self.syntax(
                    "Unsupported block type",
                    format!("Blocks of type \"{other}\" are not expected here."),
                ),
            }
        }
        Some(variables)
    }

    fn json_variables(&mut self, content: JsonValue, out: &mut Vec<VariableDeclaration>) {
        let groups = match content {
            JsonValue::Object(map) => vec![map],
            JsonValue::Array(items) => {
                let mut maps = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        JsonValue::Object(map) => maps.push(map),
                        other => self.syntax(
                            "Invalid variable block",
                            format!("Expected an object, found {}.", json_kind(&other)),
                        ),
                    }
                }
                maps
            }
            other => {
                self.syntax(
                    "Invalid variable block",
                    format!("Expected an object or array, found {}.", json_kind(&other)),
                );
                return;
            }
        };
        for (name, body) in groups.into_iter().flatten() {
            if name == JSON_COMMENT_KEY {
                continue;
            }
            if let Some(decl) = self.json_variable(name, body) {
                out.push(decl);
            }
        }
    }

    fn json_variable(&mut self, name: String, body: JsonValue) -> Option<VariableDeclaration> {
        let JsonValue::Object(attrs) = body else {
            self.syntax(
                "Invalid variable block",
                format!("The body of variable \"{name}\" must be an object."),
            );
            return None;
        };
        let mut decl = VariableDeclaration::new(name, SourceLocation::new(self.path));
        for (key, raw) in attrs {
            match key.as_str() {
                JSON_COMMENT_KEY | "validation" => {}
                "type" => match raw {
                    JsonValue::String(text) => match TypeConstraint::parse(&text) {
                        Ok(ty) => {
                            self.legacy_keyword(text.trim());
                            decl = decl.with_type(ty);
                        }
                        Err(e) => self.syntax("Invalid type specification", e),
                    },
                    other => self.syntax(
                        "Invalid type specification",
                        format!("A type must be given as a string, not {}.", json_kind(&other)),
                    ),
                },
                _ => self.assign(&mut decl, &key, Value::from(raw)),
            }
        }
        self.finish(decl)
    }

    /// Stores an evaluated attribute on `decl`.
    fn assign(&mut self, decl: &mut VariableDeclaration, key: &str, value: Value) {
        match (key, value) {
            ("default", value) => decl.default = Some(value),
            ("description", Value::String(text)) => {
                decl.description = text;
                decl.description_set = true;
            }
            ("sensitive", Value::Bool(flag)) => {
                decl.sensitive = flag;
                decl.sensitive_set = true;
            }
            ("nullable", Value::Bool(flag)) => {
                decl.nullable = flag;
                decl.nullable_set = true;
            }
            ("nullable", Value::Null) => {}
            (attr @ "description", other) => self.syntax(
                "Incorrect attribute value type",
                format!("Inappropriate value for attribute \"{attr}\": string required, found {}.", other.kind()),
            ),
            (attr @ ("sensitive" | "nullable"), other) => self.syntax(
                "Incorrect attribute value type",
                format!("Inappropriate value for attribute \"{attr}\": bool required, found {}.", other.kind()),
            ),
            (other, _) => self.syntax(
                "Unsupported argument",
                format!("An argument named \"{other}\" is not expected here."),
            ),
        }
    }

    fn finish(&mut self, mut decl: VariableDeclaration) -> Option<VariableDeclaration> {
        if !is_identifier(&decl.name) {
            self.syntax(
                "Invalid variable name",
                "A name must start with a letter or underscore and may contain only letters, digits, underscores, and dashes.",
            );
            return None;
        }
        if RESERVED_NAMES.contains(&decl.name.as_str()) {
            self.syntax(
                "Invalid variable name",
                format!(
                    "The variable name \"{}\" is reserved due to its special meaning inside module blocks.",
                    decl.name
                ),
            );
            return None;
        }
        // Override defaults are converted once merged, against the merged type.
        let converted = match (&decl.type_constraint, &decl.default) {
            (Some(ty), Some(default)) if !self.is_override => Some(ty.convert(default.clone())),
            _ => None,
        };
        match converted {
            Some(Ok(default)) => decl.default = Some(default),
            Some(Err(e)) => self.diags.push(Diagnostic::error(
                DiagnosticKind::TypeCoercion,
                "Invalid default value for variable",
                format!("This default value is not compatible with the variable's type constraint: {e}."),
                Some(decl.location.clone()),
            )),
            None => {}
        }
        if !self.is_override && !decl.nullable && decl.default.as_ref().is_some_and(Value::is_null)
        {
            self.diags.push(Diagnostic::error(
                DiagnosticKind::NullabilityViolation,
                "Invalid default value for variable",
                "A null default value is not valid when nullable=false.",
                Some(decl.location.clone()),
            ));
        }
        trace!(name = %decl.name, path = %self.path, "decoded variable");
        Some(decl)
    }
}

const fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
