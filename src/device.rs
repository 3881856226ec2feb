// ── Device-information-set enumeration ────────────────────────────────────────
//
// Wrappers over the SetupDi* family: build a device-information set, walk its
// members, and read per-device registry properties.  Enumeration ends on the
// documented ERROR_NO_MORE_ITEMS; anything else is a real failure and
// propagates.

use std::mem::size_of;
use std::ptr;

use windows_sys::core::GUID;
use windows_sys::Win32::Devices::DeviceAndDriverInstallation::{
    SetupDiDestroyDeviceInfoList, SetupDiEnumDeviceInfo, SetupDiGetClassDevsW,
    SetupDiGetDeviceRegistryPropertyW, HDEVINFO, SP_DEVINFO_DATA,
};
use windows_sys::Win32::Foundation::{
    ERROR_INSUFFICIENT_BUFFER, ERROR_NO_MORE_ITEMS, INVALID_HANDLE_VALUE,
};

use crate::check::{check_bool, last_error};
use crate::error::Result;
use crate::wide::from_wide;

// Filter flags and property ids callers pass through.
pub use windows_sys::Win32::Devices::DeviceAndDriverInstallation::{
    DIGCF_ALLCLASSES, DIGCF_DEVICEINTERFACE, DIGCF_PRESENT, SPDRP_CLASS, SPDRP_DEVICEDESC,
    SPDRP_FRIENDLYNAME, SPDRP_HARDWAREID,
};

// ── DeviceInfoSet ─────────────────────────────────────────────────────────────

/// A device-information set, destroyed with `SetupDiDestroyDeviceInfoList`
/// on drop.
pub struct DeviceInfoSet(HDEVINFO);

impl DeviceInfoSet {
    /// Build a set of the devices matching `class` and `flags` (`DIGCF_*`).
    ///
    /// `class` of `None` requires `DIGCF_ALLCLASSES`, per the platform
    /// contract.
    pub fn open(class: Option<&GUID>, flags: u32) -> Result<Self> {
        let class_ptr = class.map_or(ptr::null(), |g| g as *const GUID);

        // SAFETY: class_ptr is null or a valid GUID that outlives the call;
        // no enumerator string, no owner window.
        let set = unsafe { SetupDiGetClassDevsW(class_ptr, ptr::null(), ptr::null_mut(), flags) };
        // SetupDiGetClassDevsW signals failure with INVALID_HANDLE_VALUE,
        // not null — outside the four generic conventions, checked inline.
        if set == INVALID_HANDLE_VALUE {
            return Err(last_error("SetupDiGetClassDevsW"));
        }

        Ok(Self(set))
    }

    /// Iterate over the members of this set.
    pub fn devices(&self) -> Devices<'_> {
        Devices { set: self, index: 0 }
    }

    /// Read a device registry property (`SPDRP_*`) as raw bytes.
    ///
    /// Two-call size negotiation; a device that does not carry the property
    /// fails with the platform's code for that condition.
    pub fn property(&self, device: &SP_DEVINFO_DATA, property: u32) -> Result<Vec<u8>> {
        let mut needed = 0u32;

        // SAFETY: a null buffer with zero size asks for the required byte
        // count; `device` came from this set's enumeration.
        let ok = unsafe {
            SetupDiGetDeviceRegistryPropertyW(
                self.0,
                device,
                property,
                ptr::null_mut(),
                ptr::null_mut(),
                0,
                &mut needed,
            )
        };
        if ok == 0 {
            let err = last_error("SetupDiGetDeviceRegistryPropertyW");
            if err.code() != ERROR_INSUFFICIENT_BUFFER {
                return Err(err);
            }
        }

        let mut data = vec![0u8; needed as usize];

        // SAFETY: data is `needed` writable bytes; the API writes at most
        // that many and updates `needed`.
        let ok = unsafe {
            SetupDiGetDeviceRegistryPropertyW(
                self.0,
                device,
                property,
                ptr::null_mut(),
                data.as_mut_ptr(),
                needed,
                &mut needed,
            )
        };
        check_bool(ok, "SetupDiGetDeviceRegistryPropertyW")?;

        data.truncate(needed as usize);
        Ok(data)
    }

    /// Read a string-shaped property (`SPDRP_DEVICEDESC`,
    /// `SPDRP_FRIENDLYNAME`, …), with the stored terminator trimmed.
    pub fn string_property(&self, device: &SP_DEVINFO_DATA, property: u32) -> Result<String> {
        let data = self.property(device, property)?;
        let units: Vec<u16> = data
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Ok(from_wide(&units))
    }

    /// The underlying `HDEVINFO`.  Valid until this set is dropped.
    pub fn as_raw(&self) -> HDEVINFO {
        self.0
    }
}

impl Drop for DeviceInfoSet {
    fn drop(&mut self) {
        // SAFETY: self.0 was returned by a successful SetupDiGetClassDevsW
        // and has not been destroyed since.  The destroy result is
        // intentionally ignored in Drop.
        unsafe {
            let _ = SetupDiDestroyDeviceInfoList(self.0);
        }
    }
}

// ── Devices iterator ──────────────────────────────────────────────────────────

/// Iterator over the members of a `DeviceInfoSet`.
pub struct Devices<'a> {
    set: &'a DeviceInfoSet,
    index: u32,
}

impl Iterator for Devices<'_> {
    type Item = Result<SP_DEVINFO_DATA>;

    fn next(&mut self) -> Option<Self::Item> {
        // SAFETY: SP_DEVINFO_DATA is a plain C struct for which all-zero is a
        // valid initial state; cbSize is set before the call as the ABI
        // requires.
        let mut data: SP_DEVINFO_DATA = unsafe { std::mem::zeroed() };
        data.cbSize = size_of::<SP_DEVINFO_DATA>() as u32;

        // SAFETY: the set handle is live (borrowed for 'a) and data is a
        // writable, correctly sized record.
        let ok = unsafe { SetupDiEnumDeviceInfo(self.set.0, self.index, &mut data) };
        if ok == 0 {
            let err = last_error("SetupDiEnumDeviceInfo");
            if err.code() == ERROR_NO_MORE_ITEMS {
                return None;
            }
            return Some(Err(err));
        }

        self.index += 1;
        Some(Ok(data))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumerates_present_devices() {
        let set = DeviceInfoSet::open(None, DIGCF_ALLCLASSES | DIGCF_PRESENT).expect("open");
        let devices = set
            .devices()
            .collect::<Result<Vec<_>>>()
            .expect("enumerate");
        assert!(!devices.is_empty());
    }

    #[test]
    fn some_present_device_has_a_description() {
        let set = DeviceInfoSet::open(None, DIGCF_ALLCLASSES | DIGCF_PRESENT).expect("open");
        let found = set.devices().filter_map(|d| d.ok()).any(|device| {
            set.string_property(&device, SPDRP_DEVICEDESC)
                .map(|desc| !desc.is_empty())
                .unwrap_or(false)
        });
        assert!(found);
    }
}
