//! Checked Win32 interop for disk, device, and volume tooling.
//!
//! Win32 signals failure in four different shapes — a success `BOOL`, a
//! null handle, a null return from a release function, and a status code
//! that is itself the error.  The [`check`] module maps each shape onto a
//! uniform [`error::Result`] carrying the raw platform error code, and the
//! remaining modules are thin wrappers that route the registry, CSP, event,
//! heap, device-I/O-control, device-enumeration, and command-line surfaces
//! through those checks.
//!
//! This layer relays platform outcomes; it never retries, recovers, or
//! interprets codes.  Callers own all policy above it.

// ── Safety policy ─────────────────────────────────────────────────────────────
// This crate is an FFI boundary.  `unsafe` is confined to the Win32-facing
// modules; every unsafe block MUST carry a `// SAFETY:` comment that states
//   • which invariant makes the operation sound, and
//   • what the caller is responsible for maintaining.
//
// The last-error slot is thread-local, last-write-wins state: any check that
// reads it runs immediately after the call it classifies, with no Win32 call
// in between.  Keep it that way when adding wrappers.

pub mod check;
pub mod error;

// Only the Windows modules consume the wide-string helpers; their tests run
// everywhere.
#[cfg_attr(not(windows), allow(dead_code))]
mod wide;

#[cfg(windows)]
pub mod cmdline;
#[cfg(windows)]
pub mod crypt;
#[cfg(windows)]
pub mod device;
#[cfg(windows)]
pub mod event;
#[cfg(windows)]
pub mod heap;
#[cfg(windows)]
pub mod ioctl;
#[cfg(windows)]
pub mod registry;

pub use error::{Result, Win32Error};

pub use check::check_status;
#[cfg(windows)]
pub use check::{check_bool, check_handle, check_release, last_error};
