//! Test helpers shared across crates in the tfvar workspace.
//!
//! - [`env`]: guards for mutating process environment variables.
//! - [`figment`]: a `figment::Jail` wrapper returning `anyhow` results.
//! - [`module`]: temporary configuration directories and the canonical
//!   sample module.

pub mod env;
pub mod figment;
pub mod module;
