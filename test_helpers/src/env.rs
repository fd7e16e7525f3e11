//! Helpers for safely mutating environment variables in tests.
//!
//! Every mutation takes a global re-entrant mutex and returns an RAII guard
//! that restores the previous state when dropped. Guards for the same key
//! restore in LIFO order. Use [`lock`] or [`scope_with`] when a test needs
//! the environment to stay untouched by other tests for its whole body, as
//! anything reading `TF_VAR_*` from the process does.
//!
//! # Examples
//!
//! ```
//! use test_helpers::env;
//!
//! let _g = env::set_var("TF_VAR_region", "eu-west-1");
//! assert_eq!(std::env::var("TF_VAR_region").ok().as_deref(), Some("eu-west-1"));
//! ```

use std::env;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::sync::LazyLock;

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

static ENV_MUTEX: LazyLock<ReentrantMutex<()>> = LazyLock::new(ReentrantMutex::default);

/// RAII guard restoring an environment variable to its prior value on drop.
#[must_use = "dropping restores the prior value"]
pub struct EnvVarGuard {
    key: String,
    original: Option<OsString>,
}

impl fmt::Debug for EnvVarGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvVarGuard")
            .field("key", &self.key)
            .field("had_original", &self.original.is_some())
            .finish_non_exhaustive()
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        let _guard = ENV_MUTEX.lock();
        match self.original.take() {
            // SAFETY: `ENV_MUTEX` is held for the restoration.
            Some(value) => unsafe { env::set_var(&self.key, value) },
            // SAFETY: `ENV_MUTEX` is held for the restoration.
            None => unsafe { env::remove_var(&self.key) },
        }
    }
}

fn mutate_locked(
    key: String,
    value: Option<&OsStr>,
    _held: &ReentrantMutexGuard<'static, ()>,
) -> EnvVarGuard {
    let original = env::var_os(&key);
    match value {
        // SAFETY: the caller holds `ENV_MUTEX`.
        Some(v) => unsafe { env::set_var(&key, v) },
        // SAFETY: the caller holds `ENV_MUTEX`.
        None => unsafe { env::remove_var(&key) },
    }
    EnvVarGuard { key, original }
}

/// RAII guard that serialises environment access for its lifetime.
#[must_use = "dropping releases the environment lock"]
pub struct EnvVarLock {
    guard: ReentrantMutexGuard<'static, ()>,
}

impl EnvVarLock {
    /// Sets an environment variable while holding the lock.
    pub fn set_var<K, V>(&self, key: K, value: V) -> EnvVarGuard
    where
        K: Into<String>,
        V: AsRef<OsStr>,
    {
        mutate_locked(key.into(), Some(value.as_ref()), &self.guard)
    }

    /// Removes an environment variable while holding the lock.
    pub fn remove_var<K: Into<String>>(&self, key: K) -> EnvVarGuard {
        mutate_locked(key.into(), None, &self.guard)
    }

    /// Removes every variable whose name starts with `prefix`.
    ///
    /// ```
    /// use test_helpers::env;
    ///
    /// let lock = env::lock();
    /// let _set = lock.set_var("TF_VAR_stale", "x");
    /// let _cleared = lock.remove_prefixed("TF_VAR_");
    /// assert!(std::env::var_os("TF_VAR_stale").is_none());
    /// ```
    pub fn remove_prefixed(&self, prefix: &str) -> Vec<EnvVarGuard> {
        let keys: Vec<String> = env::vars_os()
            .filter_map(|(key, _)| key.into_string().ok())
            .filter(|key| key.starts_with(prefix))
            .collect();
        keys.into_iter().map(|key| self.remove_var(key)).collect()
    }
}

/// Holds the environment lock while retaining guards; guards are restored
/// before the lock is released.
#[must_use = "dropping releases the environment lock and restores guards"]
pub struct EnvScope {
    guards: Vec<EnvVarGuard>,
    _lock: EnvVarLock,
}

impl fmt::Debug for EnvScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvScope")
            .field("guards", &self.guards)
            .finish_non_exhaustive()
    }
}

/// Sets an environment variable and returns a guard restoring its prior
/// value.
pub fn set_var<K, V>(key: K, value: V) -> EnvVarGuard
where
    K: Into<String>,
    V: AsRef<OsStr>,
{
    lock().set_var(key, value)
}

/// Removes an environment variable and returns a guard restoring its prior
/// value.
pub fn remove_var<K: Into<String>>(key: K) -> EnvVarGuard {
    lock().remove_var(key)
}

/// Acquires the global environment lock for the lifetime of the guard.
pub fn lock() -> EnvVarLock {
    EnvVarLock {
        guard: ENV_MUTEX.lock(),
    }
}

/// Runs `builder` under the lock and keeps both the lock and the returned
/// guards until the scope is dropped.
///
/// # Examples
///
/// ```
/// use test_helpers::env;
///
/// let _scope = env::scope_with(|lock| {
///     let mut guards = lock.remove_prefixed("TF_VAR_");
///     guards.push(lock.set_var("TF_VAR_region", "eu-west-1"));
///     guards
/// });
/// assert_eq!(std::env::var("TF_VAR_region").ok().as_deref(), Some("eu-west-1"));
/// ```
pub fn scope_with<F>(builder: F) -> EnvScope
where
    F: FnOnce(&EnvVarLock) -> Vec<EnvVarGuard>,
{
    let held = lock();
    let guards = builder(&held);
    EnvScope {
        guards,
        _lock: held,
    }
}
