//! Scoped process-environment overrides for integration tests.

use std::env;
use std::ffi::OsString;
use std::sync::{Mutex, MutexGuard, PoisonError};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Restores the overridden variables on drop.
///
/// Holding the guard also holds a process-wide lock, so tests that touch the
/// environment run one at a time.
pub struct EnvVarGuard {
    saved: Vec<(String, Option<OsString>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvVarGuard {
    /// Sets (`Some`) or removes (`None`) each variable until the guard drops.
    pub fn apply(overrides: &[(&str, Option<&str>)]) -> Self {
        let lock = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let saved = overrides
            .iter()
            .map(|(key, value)| {
                let previous = env::var_os(key);
                write_var(key, value.map(OsString::from));
                ((*key).to_owned(), previous)
            })
            .collect();

        Self { saved, _lock: lock }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        for (key, previous) in self.saved.drain(..) {
            write_var(&key, previous);
        }
    }
}

fn write_var(key: &str, value: Option<OsString>) {
    // SAFETY: ENV_LOCK serializes every environment mutation made by tests.
    unsafe {
        match value {
            Some(new_value) => env::set_var(key, new_value),
            None => env::remove_var(key),
        }
    }
}
