//! C-callable wrappers around [`ising_sim::Simulation`].
//!
//! # FFI Safety
//!
//! - Instances live in a generation-checked handle table; the caller only
//!   ever holds an integer [`IsingHandle`]. Null, stale, and double-freed
//!   handles are detected and turn into no-ops or zero-valued reads.
//! - Every export runs under `catch_unwind`; a panic yields the same
//!   default an invalid handle would.
//! - Rejected calls store a message retrievable through [`get_last_error`].
//!
//! Usage from C:
//! ```c
//! uint64_t h = create_ising_model(64, 1.0f, 2.269);
//! run_sweeps_ising_model(h, 100);
//! double m = get_ising_model_magnetic_moment(h);
//! delete_ising_model(h);
//! ```

use std::ffi::c_char;

use ising_sim::{SimConfig, Simulation};
use tracing::warn;

pub mod registry;
pub mod status;

pub use registry::{IsingHandle, NULL_HANDLE};
pub use status::{ISING_INVALID_HANDLE, ISING_OK, ISING_PANIC, ISING_REJECTED};

/// Bumped whenever an exported signature changes.
pub const ABI_VERSION: u32 = 1;

const NO_ERROR: &[u8] = b"No error or model not initialized.\0";

// ─── Lifecycle ──────────────────────────────────────────────────────

/// Create an `n_size × n_size` lattice with all spins up.
///
/// Returns `0` when `n_size` is not in `1..=MAX_SIZE`, the temperature is
/// negative or NaN, the coupling is not finite, or the spins cannot be allocated.
#[no_mangle]
pub extern "C" fn create_ising_model(
    n_size: i32,
    j_interaction: f32,
    temperature: f64,
) -> IsingHandle {
    status::guard(NULL_HANDLE, || {
        let config = SimConfig::new(
            usize::try_from(n_size).unwrap_or(0),
            f64::from(j_interaction),
            temperature,
        );
        match Simulation::new(&config) {
            Ok(sim) => registry::with_table(|table| table.insert(sim)),
            Err(err) => {
                warn!(n_size, %err, "create_ising_model failed");
                NULL_HANDLE
            }
        }
    })
}

/// Release the instance behind `handle`. Null and already-released handles are ignored.
#[no_mangle]
pub extern "C" fn delete_ising_model(handle: IsingHandle) {
    status::guard((), || {
        let removed = registry::with_table(|table| table.remove(handle));
        drop(removed);
    })
}

// ─── Mutation ───────────────────────────────────────────────────────

/// Run `num_sweeps` Metropolis sweeps; `num_sweeps <= 0` does nothing.
#[no_mangle]
pub extern "C" fn run_sweeps_ising_model(handle: IsingHandle, num_sweeps: i32) {
    let Ok(n_sweeps) = u64::try_from(num_sweeps) else {
        return;
    };
    if n_sweeps == 0 {
        return;
    }
    status::guard((), || {
        registry::with_table(|table| {
            if let Some(entry) = table.get_mut(handle) {
                entry.sim.advance(n_sweeps);
            }
        })
    })
}

/// Change the temperature. A negative or NaN value leaves the instance
/// untouched, returns [`ISING_REJECTED`] and records a message.
#[no_mangle]
pub extern "C" fn set_ising_model_temperature(handle: IsingHandle, temperature: f64) -> i32 {
    status::guard(ISING_PANIC, || {
        registry::with_table(|table| {
            let Some(entry) = table.get_mut(handle) else {
                return ISING_INVALID_HANDLE;
            };
            entry.clear_error();
            match entry.sim.set_temperature(temperature) {
                Ok(()) => ISING_OK,
                Err(err) => {
                    entry.record_error(&err);
                    ISING_REJECTED
                }
            }
        })
    })
}

// ─── Queries ────────────────────────────────────────────────────────

/// Copy the lattice into `out` as a row-major `{0, 1}` grid.
///
/// # Safety
///
/// `out` must be null or point to `out_len` writable, properly aligned
/// `i32` values that stay valid for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn get_ising_model_state(
    handle: IsingHandle,
    out: *mut i32,
    out_len: usize,
) -> i32 {
    status::guard(ISING_PANIC, || {
        registry::with_table(|table| {
            let Some(entry) = table.get_mut(handle) else {
                return ISING_INVALID_HANDLE;
            };
            if out.is_null() {
                return ISING_REJECTED;
            }
            // SAFETY: non-null and sized by the caller per the contract above.
            let buf = unsafe { std::slice::from_raw_parts_mut(out, out_len) };
            match entry.sim.state_bits(buf) {
                Ok(()) => ISING_OK,
                Err(err) => {
                    entry.record_error(&err);
                    ISING_REJECTED
                }
            }
        })
    })
}

fn read<R>(handle: IsingHandle, default: R, f: impl FnOnce(&Simulation) -> R) -> R {
    status::guard(None, || {
        registry::with_table(|table| table.get(handle).map(|entry| f(&entry.sim)))
    })
    .unwrap_or(default)
}

/// Lattice side length, or `0` for an invalid handle.
#[no_mangle]
pub extern "C" fn get_ising_model_size(handle: IsingHandle) -> i32 {
    read(handle, 0, |sim| i32::try_from(sim.size()).unwrap_or(i32::MAX))
}

/// Total energy, or `0.0` for an invalid handle.
#[no_mangle]
pub extern "C" fn get_ising_model_energy(handle: IsingHandle) -> f64 {
    read(handle, 0.0, Simulation::energy)
}

/// `|Σ s| / N²`, or `0.0` for an invalid handle.
#[no_mangle]
pub extern "C" fn get_ising_model_magnetic_moment(handle: IsingHandle) -> f64 {
    read(handle, 0.0, Simulation::magnetization)
}

/// Completed sweeps, or `0` for an invalid handle.
#[no_mangle]
pub extern "C" fn get_ising_model_time(handle: IsingHandle) -> u64 {
    read(handle, 0, Simulation::sweep_count)
}

/// Message of the most recent rejected call, or a fixed "no error" string.
///
/// Never null. Only `set_ising_model_temperature` clears the message: a
/// rejected `get_ising_model_state` records one, and later successful reads
/// leave it in place. A per-instance message stays valid until it is
/// replaced or cleared, or `handle` is deleted; the fallback string is static.
#[no_mangle]
pub extern "C" fn get_last_error(handle: IsingHandle) -> *const c_char {
    let fallback = NO_ERROR.as_ptr() as *const c_char;
    status::guard(fallback, || {
        registry::with_table(|table| {
            table
                .get(handle)
                .and_then(|entry| entry.last_error_ptr())
                .unwrap_or(fallback)
        })
    })
}

// ─── Loader checks ──────────────────────────────────────────────────

/// Wrapping `a + b`; lets a host confirm the library is loaded and callable.
#[no_mangle]
pub extern "C" fn native_add(a: i32, b: i32) -> i32 {
    a.wrapping_add(b)
}

#[no_mangle]
pub extern "C" fn ising_abi_version() -> u32 {
    ABI_VERSION
}
