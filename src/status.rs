use std::panic::{self, AssertUnwindSafe};

/// Call succeeded.
pub const ISING_OK: i32 = 0;
/// Call reached a live instance but its arguments were rejected; see `get_last_error`.
pub const ISING_REJECTED: i32 = -1;
/// Handle is null, stale, or was never issued.
pub const ISING_INVALID_HANDLE: i32 = -2;
/// A panic was caught before it could unwind into the caller.
pub const ISING_PANIC: i32 = -3;

/// Run `body`, turning a panic into `default` so it never crosses the C boundary.
pub(crate) fn guard<R>(default: R, body: impl FnOnce() -> R) -> R {
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(value) => value,
        Err(_) => {
            tracing::error!("panic caught at FFI boundary");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_passes_value() {
        assert_eq!(guard(ISING_PANIC, || ISING_OK), ISING_OK);
    }

    #[test]
    fn test_guard_contains_panic() {
        let out = guard(ISING_PANIC, || -> i32 { panic!("boom") });
        assert_eq!(out, ISING_PANIC);
    }
}
