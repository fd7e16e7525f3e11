//! Accumulated, non-fatal diagnostics from parsing and merging.
//!
//! Loading a module keeps going after most problems so that every issue in
//! a directory is reported at once. Each problem becomes a [`Diagnostic`];
//! callers decide whether a set with errors is usable.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};

/// How serious a diagnostic is.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Severity {
    /// The result is not semantically valid.
    Error,
    /// Something questionable that does not invalidate the result.
    Warning,
}

/// Classification of a diagnostic.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum DiagnosticKind {
    /// A file could not be read.
    FileRead,
    /// Malformed or unsupported configuration text.
    Syntax,
    /// A variable was declared twice across primary files.
    DuplicateDeclaration,
    /// An override file declared a variable with no primary declaration.
    MissingBaseDeclaration,
    /// A default no longer conforms to its type constraint.
    TypeCoercion,
    /// A non-nullable variable has a null default.
    NullabilityViolation,
}

/// Where a declaration came from.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SourceLocation {
    /// File the declaration was read from.
    pub path: Utf8PathBuf,
}

impl SourceLocation {
    /// Location within `path`.
    #[must_use]
    pub fn new(path: impl AsRef<Utf8Path>) -> Self {
        Self {
            path: path.as_ref().to_owned(),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

/// A single problem found while loading configuration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Diagnostic {
    /// Error or warning.
    pub severity: Severity,
    /// Classification.
    pub kind: DiagnosticKind,
    /// One-line summary.
    pub summary: String,
    /// Longer explanation.
    pub detail: String,
    /// Location the diagnostic refers to, when known.
    pub subject: Option<SourceLocation>,
}

impl Diagnostic {
    /// Builds an error diagnostic.
    #[must_use]
    pub fn error(
        kind: DiagnosticKind,
        summary: impl Into<String>,
        detail: impl Into<String>,
        subject: Option<SourceLocation>,
    ) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            summary: summary.into(),
            detail: detail.into(),
            subject,
        }
    }

    /// Builds a warning diagnostic.
    #[must_use]
    pub fn warning(
        kind: DiagnosticKind,
        summary: impl Into<String>,
        detail: impl Into<String>,
        subject: Option<SourceLocation>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(kind, summary, detail, subject)
        }
    }

    /// Returns `true` for error diagnostics.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
        };
        if let Some(subject) = &self.subject {
            write!(f, "{subject}: ")?;
        }
        write!(f, "{label}: {}", self.summary)?;
        if !self.detail.is_empty() {
            write!(f, "; {}", self.detail)?;
        }
        Ok(())
    }
}

/// Ordered collection of [`Diagnostic`]s.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    /// Creates an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends one diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    /// Appends every diagnostic of `other`, preserving order.
    pub fn extend(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// Whether any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.0.iter().any(Diagnostic::is_error)
    }

    /// Iterate over the error diagnostics only.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|d| d.is_error())
    }

    /// Iterate over every diagnostic.
    #[must_use = "iterators should be consumed to inspect diagnostics"]
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    /// Number of diagnostics.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {d}", i + 1)?;
        }
        Ok(())
    }
}

impl From<Diagnostic> for Diagnostics {
    fn from(diagnostic: Diagnostic) -> Self {
        Self(vec![diagnostic])
    }
}

impl FromIterator<Diagnostic> for Diagnostics {
    fn from_iter<I: IntoIterator<Item = Diagnostic>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
