// ── Return-convention checks ──────────────────────────────────────────────────
//
// Win32 signals failure in four distinct shapes, and the wrapped API surface
// uses all of them:
//
//   • BOOL          — nonzero means success (SetEvent, DeviceIoControl, …)
//   • handle        — null means failure   (CreateEventW, HeapAlloc, …)
//   • release       — null means SUCCESS   (LocalFree, GlobalFree)
//   • status        — the return value IS the error code (Reg* family)
//
// Each check passes the raw value through unchanged on success so call sites
// can chain it, and raises `Win32Error` on failure.
//
// Ordering invariant: the last-error slot is thread-local state overwritten
// by the next Win32 call on the same thread.  Every check that consults it
// MUST run immediately after the call it classifies, with no intervening
// Win32 call.  The `*_with` cores take the last-error source as an argument
// so the decision logic itself is pure and testable on any host.

use crate::error::{Result, Win32Error};

#[cfg(windows)]
use windows_sys::Win32::Foundation::GetLastError;

// ── Last-error capture ────────────────────────────────────────────────────────

#[cfg(windows)]
#[inline]
fn last_error_code() -> u32 {
    // SAFETY: GetLastError reads thread-local state set by the last Win32 call.
    // It is always safe to call and never fails.
    unsafe { GetLastError() }
}

/// Capture the current last-error code and wrap it in a `Win32Error`.
///
/// Call immediately after a Win32 function that signals failure — the
/// last-error slot can be overwritten by any subsequent API call.  Prefer the
/// `check_*` functions; this is for return shapes they do not cover (e.g. the
/// `INVALID_HANDLE_VALUE` sentinel of `CreateFileW`).
#[cfg(windows)]
pub fn last_error(function: &'static str) -> Win32Error {
    Win32Error::new(function, last_error_code())
}

// ── BOOL convention ───────────────────────────────────────────────────────────

/// Check a `BOOL`-returning call: nonzero means success.
///
/// Returns the value unchanged on success; on `FALSE`, captures the
/// last-error code.  Call immediately after the Win32 call being checked.
#[cfg(windows)]
pub fn check_bool(ret: i32, function: &'static str) -> Result<i32> {
    check_bool_with(ret, function, last_error_code)
}

/// `check_bool` with an explicit last-error source.
///
/// The source is only consulted on the failure path.  Useful for wrapping
/// call shapes this crate does not cover, and for exercising failure paths
/// without a real platform call.
pub fn check_bool_with(
    ret: i32,
    function: &'static str,
    last_error: impl FnOnce() -> u32,
) -> Result<i32> {
    if ret != 0 {
        Ok(ret)
    } else {
        Err(Win32Error::new(function, last_error()))
    }
}

// ── Handle convention ─────────────────────────────────────────────────────────

/// Check an acquisition call that returns a handle or pointer: null means
/// failure.
///
/// Returns the handle unchanged on success; on null, captures the last-error
/// code.  Call immediately after the Win32 call being checked.
#[cfg(windows)]
pub fn check_handle<T>(handle: *mut T, function: &'static str) -> Result<*mut T> {
    check_handle_with(handle, function, last_error_code)
}

/// `check_handle` with an explicit last-error source, consulted only on the
/// failure path.
pub fn check_handle_with<T>(
    handle: *mut T,
    function: &'static str,
    last_error: impl FnOnce() -> u32,
) -> Result<*mut T> {
    if !handle.is_null() {
        Ok(handle)
    } else {
        Err(Win32Error::new(function, last_error()))
    }
}

// ── Release convention ────────────────────────────────────────────────────────

/// Check a release call with the inverted convention: null means success.
///
/// `LocalFree` and `GlobalFree` signal failure by returning the still-valid
/// handle, not a flag.  Returns null unchanged on success; on a non-null
/// return, captures the last-error code.  Call immediately after the Win32
/// call being checked.
#[cfg(windows)]
pub fn check_release<T>(handle: *mut T, function: &'static str) -> Result<*mut T> {
    check_release_with(handle, function, last_error_code)
}

/// `check_release` with an explicit last-error source, consulted only on the
/// failure path.
pub fn check_release_with<T>(
    handle: *mut T,
    function: &'static str,
    last_error: impl FnOnce() -> u32,
) -> Result<*mut T> {
    if handle.is_null() {
        Ok(handle)
    } else {
        Err(Win32Error::new(function, last_error()))
    }
}

// ── Status convention ─────────────────────────────────────────────────────────

/// Check a call whose return value is itself the error code: zero means
/// success.
///
/// Used for the registry family, whose functions return `ERROR_SUCCESS` or
/// the failure code directly — the last-error slot is not consulted, so this
/// check is a pure function of its input.
pub fn check_status(status: u32, function: &'static str) -> Result<u32> {
    if status == 0 {
        Ok(status)
    } else {
        Err(Win32Error::new(function, status))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use core::ffi::c_void;

    /// A last-error source that must not be consulted on the success path.
    fn unreachable_code() -> u32 {
        panic!("last-error slot read on a success path");
    }

    #[test]
    fn bool_nonzero_passes_through() {
        assert_eq!(check_bool_with(1, "SetEvent", unreachable_code).unwrap(), 1);
        assert_eq!(check_bool_with(-1, "SetEvent", unreachable_code).unwrap(), -1);
    }

    #[test]
    fn bool_zero_captures_last_error() {
        let err = check_bool_with(0, "SetEvent", || 5).unwrap_err();
        assert_eq!(err.code(), 5);
        assert_eq!(err.function(), "SetEvent");
    }

    #[test]
    fn handle_nonnull_passes_through() {
        let h = 0x1000usize as *mut c_void;
        assert_eq!(check_handle_with(h, "CreateEventW", unreachable_code).unwrap(), h);
    }

    #[test]
    fn handle_null_captures_last_error() {
        let null: *mut c_void = core::ptr::null_mut();
        let err = check_handle_with(null, "HeapAlloc", || 8).unwrap_err();
        assert_eq!(err.code(), 8);
        assert_eq!(err.function(), "HeapAlloc");
    }

    #[test]
    fn release_null_passes_through() {
        let null: *mut c_void = core::ptr::null_mut();
        assert!(check_release_with(null, "LocalFree", unreachable_code)
            .unwrap()
            .is_null());
    }

    #[test]
    fn release_nonnull_captures_last_error() {
        let h = 0x2000usize as *mut c_void;
        let err = check_release_with(h, "GlobalFree", || 1454).unwrap_err();
        assert_eq!(err.code(), 1454);
    }

    #[test]
    fn status_zero_passes_through() {
        assert_eq!(check_status(0, "RegCloseKey").unwrap(), 0);
    }

    #[test]
    fn status_is_carried_as_the_code_exactly() {
        // The status convention never consults the last-error slot: the
        // return value itself is the diagnostic.
        let err = check_status(87, "RegQueryValueExW").unwrap_err();
        assert_eq!(err.code(), 87);
        assert_eq!(err.function(), "RegQueryValueExW");
    }

    #[test]
    fn checking_a_captured_value_is_idempotent() {
        // The checks are pure over an already-captured value: the same input
        // classifies the same way every time.
        let h = 0x1000usize as *mut c_void;
        for _ in 0..3 {
            assert_eq!(check_handle_with(h, "f", unreachable_code).unwrap(), h);
            assert_eq!(check_status(87, "g").unwrap_err().code(), 87);
            assert_eq!(check_bool_with(0, "h", || 5).unwrap_err().code(), 5);
        }
    }
}
