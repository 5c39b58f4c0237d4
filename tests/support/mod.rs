use std::sync::Mutex;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with process environment variables temporarily overridden.
///
/// Access is serialized through a lock so parallel tests touching the same
/// variables cannot race, and the previous values are restored on unwind.
///
/// Each `(key, value)` pair in `overrides` either sets the variable
/// (`Some(v)`) or removes it (`None`).
pub fn with_scoped_env<F, R>(overrides: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK poisoned");
    let _guard = EnvGuard::apply(overrides);
    f()
}

struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    fn apply(overrides: &[(&str, Option<&str>)]) -> Self {
        let mut saved = Vec::with_capacity(overrides.len());
        for (key, value) in overrides {
            if saved.iter().all(|(k, _)| k != key) {
                saved.push((key.to_string(), std::env::var(key).ok()));
            }
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in self.saved.drain(..) {
            match value {
                Some(v) => std::env::set_var(&key, v),
                None => std::env::remove_var(&key),
            }
        }
    }
}
