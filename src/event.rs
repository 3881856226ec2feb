// ── Named synchronization events ──────────────────────────────────────────────
//
// Wrappers over the CreateEventW / OpenEventW / SetEvent / ResetEvent /
// CloseHandle lifecycle.  The event handle is owned by the `Event` value from
// successful creation until drop; no pooling or sharing policy lives here.

use std::ptr;

use windows_sys::Win32::Foundation::{
    CloseHandle, HANDLE, WAIT_OBJECT_0, WAIT_TIMEOUT,
};
use windows_sys::Win32::System::Threading::{
    CreateEventW, OpenEventW, ResetEvent, SetEvent, WaitForSingleObject,
};

use crate::check::{check_bool, check_handle, last_error};
use crate::error::Result;
use crate::wide::to_wide;

// Access masks and the infinite timeout, for `open` and `wait` callers.
pub use windows_sys::Win32::System::Threading::{EVENT_ALL_ACCESS, EVENT_MODIFY_STATE, INFINITE};

// ── Event ─────────────────────────────────────────────────────────────────────

/// A Win32 event object, closed with `CloseHandle` on drop.
pub struct Event(HANDLE);

impl Event {
    /// Create an event, optionally named.
    ///
    /// `manual_reset` selects manual-reset semantics (stays signaled until
    /// `reset`); `initial_state` creates the event already signaled.  If a
    /// named event already exists, the existing object is returned with the
    /// last-error slot holding `ERROR_ALREADY_EXISTS` — that is a success
    /// path here.
    pub fn create(name: Option<&str>, manual_reset: bool, initial_state: bool) -> Result<Self> {
        let name_w = name.map(to_wide);
        let name_ptr = name_w.as_ref().map_or(ptr::null(), |w| w.as_ptr());

        // SAFETY: name_ptr is null (anonymous) or a valid null-terminated
        // UTF-16 buffer that outlives the call; default security attributes.
        let handle = unsafe {
            CreateEventW(
                ptr::null(),
                i32::from(manual_reset),
                i32::from(initial_state),
                name_ptr,
            )
        };
        let handle = check_handle(handle, "CreateEventW")?;

        Ok(Self(handle))
    }

    /// Open an existing named event with the given access mask
    /// (`EVENT_MODIFY_STATE`, `EVENT_ALL_ACCESS`, …).
    pub fn open(name: &str, access: u32) -> Result<Self> {
        let name_w = to_wide(name);

        // SAFETY: name_w is a valid null-terminated UTF-16 buffer that
        // outlives the call; the handle is not inheritable.
        let handle = unsafe { OpenEventW(access, 0, name_w.as_ptr()) };
        let handle = check_handle(handle, "OpenEventW")?;

        Ok(Self(handle))
    }

    /// Signal the event.
    pub fn signal(&self) -> Result<()> {
        // SAFETY: self.0 is a valid event handle with modify access.
        check_bool(unsafe { SetEvent(self.0) }, "SetEvent")?;
        Ok(())
    }

    /// Return a manual-reset event to the non-signaled state.
    pub fn reset(&self) -> Result<()> {
        // SAFETY: self.0 is a valid event handle with modify access.
        check_bool(unsafe { ResetEvent(self.0) }, "ResetEvent")?;
        Ok(())
    }

    /// Wait for the event to become signaled.
    ///
    /// Returns `true` if the event was signaled within `timeout_ms`
    /// milliseconds (`INFINITE` to wait forever), `false` on timeout.
    pub fn wait(&self, timeout_ms: u32) -> Result<bool> {
        // SAFETY: self.0 is a valid handle opened with synchronize access.
        let ret = unsafe { WaitForSingleObject(self.0, timeout_ms) };
        match ret {
            WAIT_OBJECT_0 => Ok(true),
            WAIT_TIMEOUT => Ok(false),
            // WAIT_FAILED; events cannot report WAIT_ABANDONED.
            _ => Err(last_error("WaitForSingleObject")),
        }
    }

    /// The underlying handle.  Valid until this `Event` is dropped.
    pub fn as_raw(&self) -> HANDLE {
        self.0
    }
}

impl Drop for Event {
    fn drop(&mut self) {
        // SAFETY: self.0 was returned by a successful CreateEventW/OpenEventW
        // and has not been closed since.  The close result is intentionally
        // ignored in Drop.
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use windows_sys::Win32::Foundation::ERROR_FILE_NOT_FOUND;

    #[test]
    fn manual_reset_signal_cycle() {
        let event = Event::create(None, true, true).expect("create");
        assert!(event.wait(0).expect("initially signaled"));

        event.reset().expect("reset");
        assert!(!event.wait(0).expect("non-signaled after reset"));

        event.signal().expect("signal");
        assert!(event.wait(0).expect("signaled again"));
        // Manual reset: the wait must not have consumed the signal.
        assert!(event.wait(0).expect("still signaled"));
    }

    #[test]
    fn auto_reset_consumes_the_signal() {
        let event = Event::create(None, false, true).expect("create");
        assert!(event.wait(0).expect("first wait"));
        assert!(!event.wait(0).expect("signal consumed"));
    }

    #[test]
    fn named_event_is_visible_through_open() {
        let name = format!("Local\\girder-event-{}", std::process::id());
        let created = Event::create(Some(&name), true, false).expect("create");

        let opened = Event::open(&name, EVENT_ALL_ACCESS).expect("open");
        opened.signal().expect("signal via opened handle");

        assert!(created.wait(0).expect("signal observed via creator handle"));
    }

    #[test]
    fn opening_a_missing_event_fails() {
        let err = Event::open("Local\\girder-no-such-event", EVENT_ALL_ACCESS).unwrap_err();
        assert_eq!(err.function(), "OpenEventW");
        assert_eq!(err.code(), ERROR_FILE_NOT_FOUND);
    }
}
