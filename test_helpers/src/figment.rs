//! Running settings tests inside a `figment::Jail`.
//!
//! A jail gives the closure a private working directory and restores the
//! environment afterwards, which is what layered settings tests need to
//! place a `.tfvar.toml` and set `TFVAR_*` variables without leaking them.

use anyhow::{Result, anyhow};

/// Executes `f` inside a [`figment::Jail`] and returns its output.
///
/// The jail also takes the [`crate::env`] lock, so tests using these
/// helpers never interleave with guard-based environment tests.
///
/// # Errors
///
/// Returns an error when the closure fails; figment errors are converted
/// to `anyhow::Error`.
///
/// # Examples
///
/// ```
/// use test_helpers::figment::with_jail;
///
/// let contents = with_jail(|jail| {
///     jail.create_file(".tfvar.toml", "auto_assign = true")?;
///     Ok(std::fs::read_to_string(".tfvar.toml").map_err(|e| e.to_string())?)
/// })?;
/// assert_eq!(contents, "auto_assign = true");
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn with_jail<F, T>(f: F) -> Result<T>
where
    F: FnOnce(&mut figment::Jail) -> figment::error::Result<T>,
{
    let _env = crate::env::lock();
    let mut output = None;
    figment::Jail::try_with(|jail| {
        output = Some(f(jail)?);
        Ok(())
    })
    .map_err(|err| anyhow!(err.to_string()))?;
    output.ok_or_else(|| anyhow!("jail closure did not return a value"))
}
