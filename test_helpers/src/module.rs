//! Temporary configuration directories.
//!
//! [`ModuleDir`] owns a temporary directory that is removed on drop. The
//! [`SAMPLE_VARIABLES`] module declares one variable of each common shape
//! and is shared by the library and binary tests.

use std::fs;

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

/// A module declaring a required variable, primitive, list, map and
/// structured defaults, and a sensitive variable with a description.
pub const SAMPLE_VARIABLES: &str = r#"variable "region" {}

variable "instance_name" {
  default = "my-instance"
}

variable "availability_zone_names" {
  type    = list(string)
  default = ["us-west-1a"]
}

variable "aws_amis" {
  type = map(string)
  default = {
    "eu-west-1" = "ami-b1cf19c6"
    "us-east-1" = "ami-de7ab6b6"
    "us-west-1" = "ami-3f75767a"
    "us-west-2" = "ami-21f78e11"
  }
}

variable "docker_ports" {
  type = list(object({
    internal = number
    external = number
    protocol = string
  }))
  default = [
    {
      internal = 8301
      external = 8300
      protocol = "tcp"
    }
  ]
}

variable "password" {
  type        = string
  description = "the root password to use with the database"
  sensitive   = true
}
"#;

/// A temporary directory holding configuration or definitions files.
#[derive(Debug)]
pub struct ModuleDir {
    path: Utf8PathBuf,
    _dir: TempDir,
}

impl ModuleDir {
    /// Creates an empty temporary directory.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory cannot be created or its path is
    /// not UTF-8.
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create temp dir")?;
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .map_err(|p| anyhow!("temp dir is not valid UTF-8: {}", p.display()))?;
        Ok(Self { path, _dir: dir })
    }

    /// Creates a directory containing `files`, given as `(name, contents)`.
    ///
    /// # Errors
    ///
    /// Returns an error when any file cannot be written.
    ///
    /// # Examples
    ///
    /// ```
    /// use test_helpers::module::ModuleDir;
    ///
    /// let dir = ModuleDir::with_files(&[("main.tf", "variable \"x\" {}\n")])?;
    /// assert!(dir.path().join("main.tf").is_file());
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn with_files(files: &[(&str, &str)]) -> Result<Self> {
        let dir = Self::new()?;
        for (name, contents) in files {
            dir.write(name, contents)?;
        }
        Ok(dir)
    }

    /// Creates a directory holding [`SAMPLE_VARIABLES`] as `variables.tf`.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be written.
    pub fn sample() -> Result<Self> {
        Self::with_files(&[("variables.tf", SAMPLE_VARIABLES)])
    }

    /// Writes `contents` to `name` inside the directory and returns the
    /// full path.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be written.
    pub fn write(&self, name: &str, contents: &str) -> Result<Utf8PathBuf> {
        let path = self.path.join(name);
        fs::write(&path, contents).with_context(|| format!("write {path}"))?;
        Ok(path)
    }

    /// The directory path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}
