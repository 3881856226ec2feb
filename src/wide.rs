// ── Wide-string plumbing ──────────────────────────────────────────────────────
//
// Win32 text crosses the FFI boundary as null-terminated UTF-16.  These
// helpers are the only place that conversion lives; every module that passes
// or receives strings goes through them.

/// Encode `s` as null-terminated UTF-16 for passing to a Win32 function.
///
/// The returned buffer must outlive the call it is passed to.
pub(crate) fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Decode a UTF-16 buffer, stopping at the first null terminator.
///
/// Win32 writes values with the terminator included in the byte count;
/// callers hand the whole buffer here and get the logical string back.
pub(crate) fn from_wide(units: &[u16]) -> String {
    let len = units.iter().position(|&u| u == 0).unwrap_or(units.len());
    String::from_utf16_lossy(&units[..len])
}

/// Decode a null-terminated UTF-16 string the OS handed back by pointer.
///
/// # Safety
///
/// `ptr` must be non-null and point to a readable, null-terminated UTF-16
/// string that stays valid for the duration of this call.
pub(crate) unsafe fn from_wide_ptr(ptr: *const u16) -> String {
    let mut len = 0usize;
    // SAFETY: the caller guarantees a terminator exists, so every index up to
    // and including it is in bounds.
    while unsafe { *ptr.add(len) } != 0 {
        len += 1;
    }
    // SAFETY: len u16s up to (not including) the terminator are readable.
    let units = unsafe { std::slice::from_raw_parts(ptr, len) };
    String::from_utf16_lossy(units)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_wide_appends_terminator() {
        let w = to_wide("C:");
        assert_eq!(w, vec![u16::from(b'C'), u16::from(b':'), 0]);
    }

    #[test]
    fn empty_string_is_just_the_terminator() {
        assert_eq!(to_wide(""), vec![0]);
    }

    #[test]
    fn from_wide_stops_at_terminator() {
        // Simulates a registry value: text, terminator, then stale buffer tail.
        let units = [0x44, 0x69, 0x73, 0x6B, 0, 0x58, 0x58];
        assert_eq!(from_wide(&units), "Disk");
    }

    #[test]
    fn from_wide_without_terminator_takes_the_whole_buffer() {
        let units = [0x61, 0x62];
        assert_eq!(from_wide(&units), "ab");
    }

    #[test]
    fn from_wide_ptr_scans_to_terminator() {
        let backing = to_wide("PhysicalDrive0");
        // SAFETY: backing is null-terminated and outlives the call.
        let s = unsafe { from_wide_ptr(backing.as_ptr()) };
        assert_eq!(s, "PhysicalDrive0");
    }

    #[test]
    fn round_trip() {
        let original = "\\Device\\HarddiskVolume1";
        assert_eq!(from_wide(&to_wide(original)), original);
    }
}
