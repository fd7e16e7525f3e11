//! Constructors for shared [`TfvarError`] values.

use std::sync::Arc;

use camino::Utf8Path;

use super::TfvarError;

impl TfvarError {
    /// Construct a [`TfvarError::FileRead`] for `path`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tfvar::TfvarError;
    /// let io = std::io::Error::from(std::io::ErrorKind::NotFound);
    /// let e = TfvarError::file_read("missing.tfvars", io);
    /// assert!(matches!(&*e, TfvarError::FileRead { .. }));
    /// ```
    #[must_use]
    pub fn file_read(path: impl AsRef<Utf8Path>, source: std::io::Error) -> Arc<Self> {
        Arc::new(Self::FileRead {
            path: path.as_ref().to_owned(),
            source,
        })
    }

    /// Construct a [`TfvarError::Syntax`] for `path`.
    #[must_use]
    pub fn syntax(path: impl AsRef<Utf8Path>, message: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::Syntax {
            path: path.as_ref().to_owned(),
            message: message.into(),
        })
    }

    /// Construct a [`TfvarError::ExpressionEvaluation`] for variable `name`.
    #[must_use]
    pub fn evaluation(name: impl Into<String>, message: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::ExpressionEvaluation {
            name: name.into(),
            message: message.into(),
        })
    }

    /// Construct a [`TfvarError::Write`] for the named output format.
    ///
    /// # Examples
    ///
    /// ```
    /// use tfvar::TfvarError;
    /// let io = std::io::Error::from(std::io::ErrorKind::BrokenPipe);
    /// let e = TfvarError::write("tfvars", io);
    /// assert!(e.to_string().starts_with("failed to write tfvars output"));
    /// ```
    #[must_use]
    pub fn write(format: &'static str, source: std::io::Error) -> Arc<Self> {
        Arc::new(Self::Write { format, source })
    }
}
