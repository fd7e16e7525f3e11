//! Extensions for mapping I/O errors to `TfvarResult` concisely.
//!
//! These helpers reduce repetitive `.map_err(|e| TfvarError::…(…, e))`
//! patterns when converting [`std::io::Error`] into the crate's
//! `TfvarResult<T>` alias (`Result<T, Arc<TfvarError>>`).
//!
//! # Examples
//!
//! ```
//! use std::io::Write as _;
//! use tfvar::{TfvarResult, WriteResultExt};
//!
//! fn emit(out: &mut Vec<u8>) -> TfvarResult<()> {
//!     writeln!(out, "region = null").into_write_error("tfvars")
//! }
//! # emit(&mut Vec::new()).expect("writing to a Vec succeeds");
//! ```

use std::sync::Arc;

use camino::Utf8Path;

use crate::TfvarError;

/// Result alias used throughout the crate.
pub type TfvarResult<T> = Result<T, Arc<TfvarError>>;

/// Maps read failures to [`TfvarError::FileRead`].
pub trait ReadResultExt<T> {
    /// Convert `io::Result<T>` into `TfvarResult<T>` naming `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`TfvarError::FileRead`] wrapped in `Arc` when the input is `Err`.
    fn into_read_error(self, path: &Utf8Path) -> TfvarResult<T>;
}

impl<T> ReadResultExt<T> for std::io::Result<T> {
    fn into_read_error(self, path: &Utf8Path) -> TfvarResult<T> {
        self.map_err(|e| TfvarError::file_read(path, e))
    }
}

/// Maps output stream failures to [`TfvarError::Write`].
pub trait WriteResultExt<T> {
    /// Convert `io::Result<T>` into `TfvarResult<T>` for the named format.
    ///
    /// # Errors
    ///
    /// Returns a [`TfvarError::Write`] wrapped in `Arc` when the input is `Err`.
    fn into_write_error(self, format: &'static str) -> TfvarResult<T>;
}

impl<T> WriteResultExt<T> for std::io::Result<T> {
    fn into_write_error(self, format: &'static str) -> TfvarResult<T> {
        self.map_err(|e| TfvarError::write(format, e))
    }
}
