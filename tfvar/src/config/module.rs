//! Merging declarations from several files into one module.
//!
//! Primary files are appended: a name may be declared once and the first
//! declaration wins. Override files are merged field by field into the
//! declaration they name, touching only the fields they set.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use tracing::{debug, trace};

use super::{ConfigFile, VariableDeclaration};
use crate::error::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::value::Value;

/// The merged variable declarations of one configuration directory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Module {
    variables: BTreeMap<String, VariableDeclaration>,
}

impl Module {
    /// Builds a module from primary files followed by override files.
    ///
    /// Every diagnostic raised while merging is returned; the module holds
    /// whatever could be merged.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use tfvar::config::{Module, parse_config_source};
    ///
    /// let path = Utf8Path::new("main.tf");
    /// let (file, _) = parse_config_source(path, "variable \"region\" {}\n", false);
    /// let (module, diags) = Module::new(file, Vec::new());
    /// assert!(diags.is_empty());
    /// assert!(module.get("region").is_some());
    /// ```
    #[must_use]
    pub fn new(
        primary: impl IntoIterator<Item = ConfigFile>,
        overrides: impl IntoIterator<Item = ConfigFile>,
    ) -> (Self, Diagnostics) {
        let mut module = Self::default();
        let mut diags = Diagnostics::new();
        for file in primary {
            diags.extend(module.append_file(file));
        }
        for file in overrides {
            diags.extend(module.merge_file(file));
        }
        (module, diags)
    }

    /// Adds the declarations of a primary file.
    ///
    /// A name that is already declared produces a `DuplicateDeclaration`
    /// error and the earlier declaration is kept.
    pub fn append_file(&mut self, file: ConfigFile) -> Diagnostics {
        let mut diags = Diagnostics::new();
        for decl in file.variables {
            match self.variables.entry(decl.name.clone()) {
                Entry::Occupied(existing) => {
                    debug!(name = %decl.name, "duplicate variable declaration");
                    diags.push(Diagnostic::error(
                        DiagnosticKind::DuplicateDeclaration,
                        "Duplicate variable declaration",
                        format!(
                            "A variable named \"{}\" was already declared at {}. Variable names must be unique within a module.",
                            decl.name,
                            existing.get().location
                        ),
                        Some(decl.location),
                    ));
                }
                Entry::Vacant(slot) => {
                    trace!(name = %decl.name, path = %file.path, "declared variable");
                    slot.insert(decl);
                }
            }
        }
        diags
    }

    /// Applies the declarations of an override file.
    ///
    /// A name with no earlier declaration produces a
    /// `MissingBaseDeclaration` error and changes nothing.
    pub fn merge_file(&mut self, file: ConfigFile) -> Diagnostics {
        let mut diags = Diagnostics::new();
        for decl in file.variables {
            if let Some(base) = self.variables.get_mut(&decl.name) {
                trace!(name = %decl.name, path = %file.path, "overriding variable");
                diags.extend(merge_variable(base, decl));
            } else {
                diags.push(Diagnostic::error(
                    DiagnosticKind::MissingBaseDeclaration,
                    "Missing base variable declaration to override",
                    format!(
                        "There is no variable named \"{}\". An override file can only override a variable that was already declared in a primary configuration file.",
                        decl.name
                    ),
                    Some(decl.location),
                ));
            }
        }
        diags
    }

    /// Looks up a declaration by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&VariableDeclaration> {
        self.variables.get(name)
    }

    /// Iterates over declarations in name order.
    pub fn variables(&self) -> impl Iterator<Item = &VariableDeclaration> {
        self.variables.values()
    }

    /// Number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Whether the module declares no variables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Consumes the module, yielding declarations in name order.
    #[must_use]
    pub fn into_variables(self) -> Vec<VariableDeclaration> {
        self.variables.into_values().collect()
    }
}

fn merge_variable(base: &mut VariableDeclaration, over: VariableDeclaration) -> Diagnostics {
    let mut diags = Diagnostics::new();
    let type_changed = over.type_constraint.is_some();
    let default_changed = over.default.is_some();

    if over.description_set {
        base.description = over.description;
        base.description_set = true;
    }
    if over.sensitive_set {
        base.sensitive = over.sensitive;
        base.sensitive_set = true;
    }
    if let Some(default) = over.default {
        base.default = Some(default);
    }
    if let Some(ty) = over.type_constraint {
        base.constraint = ty.clone();
        base.type_constraint = Some(ty);
        base.parsing_mode = over.parsing_mode;
    }
    if over.nullable_set {
        base.nullable = over.nullable;
        base.nullable_set = true;
    }

    if let Some(default) = base.default.take() {
        match base.constraint.convert(default.clone()) {
            Ok(converted) => base.default = Some(converted),
            Err(e) => {
                let detail = match (type_changed, default_changed) {
                    (true, false) => format!(
                        "Overriding this variable's type constraint has made its default value invalid: {e}."
                    ),
                    (false, true) => format!(
                        "The overridden default value for this variable is not compatible with the variable's type constraint: {e}."
                    ),
                    _ => format!(
                        "This variable's default value is not compatible with its type constraint: {e}."
                    ),
                };
                diags.push(Diagnostic::error(
                    DiagnosticKind::TypeCoercion,
                    "Invalid default value for variable",
                    detail,
                    Some(over.location.clone()),
                ));
                base.default = Some(default);
            }
        }
    }

    if !base.nullable && base.default.as_ref().is_some_and(Value::is_null) {
        diags.push(Diagnostic::error(
            DiagnosticKind::NullabilityViolation,
            "Invalid default value for variable",
            "A null default value is not valid when nullable=false.",
            Some(over.location),
        ));
    }
    diags
}
