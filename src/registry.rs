// ── Registry value loading ────────────────────────────────────────────────────
//
// Thin wrappers over the RegOpenKeyExW / RegQueryValueExW / RegCloseKey
// family.  The registry functions use the status-is-code convention: every
// return value flows through `check_status`.
//
// Read-only by design; nothing here creates or writes keys.

use std::ptr;

use windows_sys::Win32::Foundation::{ERROR_MORE_DATA, ERROR_UNSUPPORTED_TYPE};
use windows_sys::Win32::System::Registry::{
    RegCloseKey, RegOpenKeyExW, RegQueryValueExW, HKEY, KEY_READ, REG_DWORD, REG_EXPAND_SZ,
    REG_SZ,
};

use crate::check::check_status;
use crate::error::{Result, Win32Error};
use crate::wide::{from_wide, to_wide};

// Root keys callers pass to `RegKey::open`.
pub use windows_sys::Win32::System::Registry::{
    HKEY_CLASSES_ROOT, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, HKEY_USERS,
};

// ── RegKey ────────────────────────────────────────────────────────────────────

/// An open registry key, closed with `RegCloseKey` on drop.
pub struct RegKey(HKEY);

impl RegKey {
    /// Open `subkey` under `root` for reading.
    pub fn open(root: HKEY, subkey: &str) -> Result<Self> {
        Self::open_with(root, subkey, KEY_READ)
    }

    /// Open `subkey` under `root` with an explicit access mask (`KEY_*`).
    pub fn open_with(root: HKEY, subkey: &str, access: u32) -> Result<Self> {
        let subkey_w = to_wide(subkey);
        let mut hkey: HKEY = ptr::null_mut();

        // SAFETY: subkey_w is valid null-terminated UTF-16 that outlives the
        // call; hkey receives the opened key on success.
        let status = unsafe { RegOpenKeyExW(root, subkey_w.as_ptr(), 0, access, &mut hkey) };
        check_status(status, "RegOpenKeyExW")?;

        Ok(Self(hkey))
    }

    /// The underlying `HKEY`.  Valid until this `RegKey` is dropped.
    pub fn as_raw(&self) -> HKEY {
        self.0
    }

    /// Load a value's type and raw bytes.
    ///
    /// Two-call size negotiation: the first query asks for the required byte
    /// count, the second fills the buffer.  Retries if the value grows
    /// between the two calls (`ERROR_MORE_DATA`).
    pub fn raw_value(&self, name: &str) -> Result<(u32, Vec<u8>)> {
        let name_w = to_wide(name);

        loop {
            let mut vtype = 0u32;
            let mut size = 0u32;

            // SAFETY: a null data pointer asks for the required size only;
            // name_w outlives the call.
            let status = unsafe {
                RegQueryValueExW(
                    self.0,
                    name_w.as_ptr(),
                    ptr::null(),
                    &mut vtype,
                    ptr::null_mut(),
                    &mut size,
                )
            };
            check_status(status, "RegQueryValueExW")?;

            let mut data = vec![0u8; size as usize];
            let mut written = size;

            // SAFETY: data is `written` bytes of writable storage; the API
            // writes at most that many and updates `written`.
            let status = unsafe {
                RegQueryValueExW(
                    self.0,
                    name_w.as_ptr(),
                    ptr::null(),
                    &mut vtype,
                    data.as_mut_ptr(),
                    &mut written,
                )
            };
            if status == ERROR_MORE_DATA {
                // The value grew between the two calls; renegotiate.
                continue;
            }
            check_status(status, "RegQueryValueExW")?;

            data.truncate(written as usize);
            return Ok((vtype, data));
        }
    }

    /// Load a `REG_DWORD` value.
    ///
    /// A value of any other type or size fails with `ERROR_UNSUPPORTED_TYPE`,
    /// the code the platform's own `RegGetValueW` uses for this condition.
    pub fn dword_value(&self, name: &str) -> Result<u32> {
        let (vtype, data) = self.raw_value(name)?;
        if vtype != REG_DWORD || data.len() != 4 {
            return Err(Win32Error::new("RegQueryValueExW", ERROR_UNSUPPORTED_TYPE));
        }
        Ok(u32::from_le_bytes([data[0], data[1], data[2], data[3]]))
    }

    /// Load a `REG_SZ` or `REG_EXPAND_SZ` value, with the stored terminator
    /// trimmed.  Environment references in `REG_EXPAND_SZ` are returned
    /// unexpanded.
    pub fn string_value(&self, name: &str) -> Result<String> {
        let (vtype, data) = self.raw_value(name)?;
        if vtype != REG_SZ && vtype != REG_EXPAND_SZ {
            return Err(Win32Error::new("RegQueryValueExW", ERROR_UNSUPPORTED_TYPE));
        }
        let units: Vec<u16> = data
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Ok(from_wide(&units))
    }
}

impl Drop for RegKey {
    fn drop(&mut self) {
        // SAFETY: self.0 was returned by a successful RegOpenKeyExW and has
        // not been closed since.  The close status is intentionally ignored
        // in Drop.
        unsafe {
            let _ = RegCloseKey(self.0);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use windows_sys::Win32::Foundation::{ERROR_FILE_NOT_FOUND, ERROR_SUCCESS};

    const CURRENT_VERSION: &str = r"SOFTWARE\Microsoft\Windows NT\CurrentVersion";

    #[test]
    fn reads_a_string_value() {
        let key = RegKey::open(HKEY_LOCAL_MACHINE, CURRENT_VERSION).expect("open");
        let build = key.string_value("CurrentBuild").expect("CurrentBuild");
        assert!(!build.is_empty());
        assert!(build.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn missing_value_reports_the_status_code() {
        let key = RegKey::open(HKEY_LOCAL_MACHINE, CURRENT_VERSION).expect("open");
        let err = key.raw_value("girder-no-such-value").unwrap_err();
        assert_eq!(err.code(), ERROR_FILE_NOT_FOUND);
    }

    #[test]
    fn missing_key_reports_the_status_code() {
        let err = RegKey::open(HKEY_LOCAL_MACHINE, r"SOFTWARE\girder-no-such-key").unwrap_err();
        assert_ne!(err.code(), ERROR_SUCCESS);
        assert_eq!(err.function(), "RegOpenKeyExW");
    }

    #[test]
    fn string_typed_value_rejects_dword_read() {
        let key = RegKey::open(HKEY_LOCAL_MACHINE, CURRENT_VERSION).expect("open");
        let err = key.dword_value("CurrentBuild").unwrap_err();
        assert_eq!(err.code(), ERROR_UNSUPPORTED_TYPE);
    }
}
