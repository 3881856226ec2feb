// ── Central error type ────────────────────────────────────────────────────────
//
// All fallible operations in girder return `error::Result<T>`.  There is
// exactly one error kind: a Win32 call signalled failure.  This layer never
// recovers, retries, or translates codes into messages — callers own policy.

/// A Win32 API call signalled failure.
///
/// `code` is the 32-bit platform error: either the value read from the
/// calling thread's last-error slot at the moment of failure, or, for the
/// registry family, the status the function itself returned.  `function`
/// names the failing call for display; it carries no semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Win32Error {
    function: &'static str,
    code: u32,
}

impl Win32Error {
    pub(crate) fn new(function: &'static str, code: u32) -> Self {
        Self { function, code }
    }

    /// The name of the Win32 function that failed.
    pub fn function(&self) -> &'static str {
        self.function
    }

    /// The raw platform error code (`GetLastError()` value or status return).
    ///
    /// Classify against the system error-code tables (`ERROR_*`); this layer
    /// attaches no meaning to the value.
    pub fn code(&self) -> u32 {
        self.code
    }
}

impl std::fmt::Display for Win32Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Self { function, code } = self;
        write!(f, "{function} failed (error {code:#010x})")
    }
}

impl std::error::Error for Win32Error {}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Win32Error>;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_function_and_hex_code() {
        let e = Win32Error::new("RegOpenKeyExW", 5);
        assert_eq!(e.to_string(), "RegOpenKeyExW failed (error 0x00000005)");
    }

    #[test]
    fn accessors_return_construction_values() {
        let e = Win32Error::new("SetEvent", 87);
        assert_eq!(e.function(), "SetEvent");
        assert_eq!(e.code(), 87);
    }
}
