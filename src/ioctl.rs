// ── Volume and disk metadata queries ──────────────────────────────────────────
//
// DeviceIoControl wrappers for the metadata control codes: drive geometry,
// volume length, storage device number, and the volume→disk extent mapping.
// Handles are opened with zero desired access — the metadata codes used here
// are FILE_ANY_ACCESS, so no elevation is required to query them.

use core::ffi::c_void;
use std::mem::{size_of, MaybeUninit};
use std::ptr;

use windows_sys::Win32::Foundation::{
    CloseHandle, ERROR_INSUFFICIENT_BUFFER, ERROR_MORE_DATA, HANDLE, INVALID_HANDLE_VALUE,
};
use windows_sys::Win32::Storage::FileSystem::{
    CreateFileW, FILE_SHARE_READ, FILE_SHARE_WRITE, OPEN_EXISTING,
};
use windows_sys::Win32::System::Ioctl::{
    IOCTL_DISK_GET_DRIVE_GEOMETRY, IOCTL_DISK_GET_LENGTH_INFO,
    IOCTL_STORAGE_GET_DEVICE_NUMBER, IOCTL_VOLUME_GET_VOLUME_DISK_EXTENTS,
    GET_LENGTH_INFORMATION, VOLUME_DISK_EXTENTS,
};
use windows_sys::Win32::System::IO::DeviceIoControl;

use crate::check::{check_bool, last_error};
use crate::error::Result;
use crate::wide::to_wide;

// Output layouts, for callers that inspect the query results.
pub use windows_sys::Win32::System::Ioctl::{DISK_EXTENT, DISK_GEOMETRY, STORAGE_DEVICE_NUMBER};

// ── Volume ────────────────────────────────────────────────────────────────────

/// A metadata-query handle to a volume or disk device, closed on drop.
pub struct Volume(HANDLE);

impl Volume {
    /// Open a device path (`\\.\C:`, `\\.\PhysicalDrive0`, …) for metadata
    /// queries.
    pub fn open(path: &str) -> Result<Self> {
        let path_w = to_wide(path);

        // SAFETY: path_w is valid null-terminated UTF-16 that outlives the
        // call; zero desired access with full sharing opens the device
        // without touching its contents.
        let handle = unsafe {
            CreateFileW(
                path_w.as_ptr(),
                0,
                FILE_SHARE_READ | FILE_SHARE_WRITE,
                ptr::null(),
                OPEN_EXISTING,
                0,
                ptr::null_mut(),
            )
        };
        // CreateFileW signals failure with INVALID_HANDLE_VALUE, not null —
        // outside the four generic conventions, so checked inline.
        if handle == INVALID_HANDLE_VALUE {
            return Err(last_error("CreateFileW"));
        }

        Ok(Self(handle))
    }

    /// The drive geometry (media type, cylinder/track/sector counts).
    pub fn geometry(&self) -> Result<DISK_GEOMETRY> {
        self.query(
            IOCTL_DISK_GET_DRIVE_GEOMETRY,
            "DeviceIoControl (IOCTL_DISK_GET_DRIVE_GEOMETRY)",
        )
    }

    /// Total byte length of the volume or disk.
    pub fn length(&self) -> Result<u64> {
        let info: GET_LENGTH_INFORMATION = self.query(
            IOCTL_DISK_GET_LENGTH_INFO,
            "DeviceIoControl (IOCTL_DISK_GET_LENGTH_INFO)",
        )?;
        Ok(info.Length as u64)
    }

    /// The device type, physical device number, and partition number.
    pub fn device_number(&self) -> Result<STORAGE_DEVICE_NUMBER> {
        self.query(
            IOCTL_STORAGE_GET_DEVICE_NUMBER,
            "DeviceIoControl (IOCTL_STORAGE_GET_DEVICE_NUMBER)",
        )
    }

    /// The physical-disk extents backing this volume.
    ///
    /// The output layout is variable-length; a single-extent buffer is tried
    /// first and regrown to the reported extent count on `ERROR_MORE_DATA` /
    /// `ERROR_INSUFFICIENT_BUFFER`.
    pub fn disk_extents(&self) -> Result<Vec<DISK_EXTENT>> {
        const FUNCTION: &str = "DeviceIoControl (IOCTL_VOLUME_GET_VOLUME_DISK_EXTENTS)";
        let mut count = 1usize;

        loop {
            let byte_len =
                size_of::<VOLUME_DISK_EXTENTS>() + (count - 1) * size_of::<DISK_EXTENT>();
            // u64 backing keeps the buffer aligned for the 8-byte layout.
            let mut buf = vec![0u64; byte_len.div_ceil(8)];
            let mut bytes = 0u32;

            // SAFETY: buf provides at least byte_len writable bytes; the
            // driver writes the header and at most `count` extents.
            let ok = unsafe {
                DeviceIoControl(
                    self.0,
                    IOCTL_VOLUME_GET_VOLUME_DISK_EXTENTS,
                    ptr::null(),
                    0,
                    buf.as_mut_ptr().cast(),
                    byte_len as u32,
                    &mut bytes,
                    ptr::null_mut(),
                )
            };

            // SAFETY: the header fields are written even when the buffer was
            // too small for the extent array; buf is 8-byte aligned.
            let header = unsafe { &*buf.as_ptr().cast::<VOLUME_DISK_EXTENTS>() };

            if ok == 0 {
                let err = last_error(FUNCTION);
                let needed = header.NumberOfDiskExtents as usize;
                if (err.code() == ERROR_MORE_DATA || err.code() == ERROR_INSUFFICIENT_BUFFER)
                    && needed > count
                {
                    count = needed;
                    continue;
                }
                return Err(err);
            }

            let n = header.NumberOfDiskExtents as usize;
            let first = header.Extents.as_ptr();
            let mut extents = Vec::with_capacity(n);
            for i in 0..n {
                // SAFETY: on success the driver initialized n extents
                // starting at the header's extent array.
                extents.push(unsafe { *first.add(i) });
            }
            return Ok(extents);
        }
    }

    /// The underlying device handle.  Valid until this `Volume` is dropped.
    pub fn as_raw(&self) -> HANDLE {
        self.0
    }

    /// Issue a no-input metadata query with a fixed-size output layout.
    fn query<T: Copy>(&self, code: u32, function: &'static str) -> Result<T> {
        let mut out = MaybeUninit::<T>::uninit();
        let mut bytes = 0u32;

        // SAFETY: out provides size_of::<T>() writable, properly aligned
        // bytes; the metadata codes routed here write at most that many.
        let ok = unsafe {
            DeviceIoControl(
                self.0,
                code,
                ptr::null(),
                0,
                out.as_mut_ptr().cast::<c_void>(),
                size_of::<T>() as u32,
                &mut bytes,
                ptr::null_mut(),
            )
        };
        check_bool(ok, function)?;

        // SAFETY: the driver filled the fixed-size layout on success.
        Ok(unsafe { out.assume_init() })
    }
}

impl Drop for Volume {
    fn drop(&mut self) {
        // SAFETY: self.0 was returned by a successful CreateFileW and has not
        // been closed since.  The close result is intentionally ignored in
        // Drop.
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
    fn opening_a_missing_device_fails() {
        let err = Volume::open(r"\\.\girder-no-such-device").unwrap_err();
        assert_eq!(err.function(), "CreateFileW");
        assert_eq!(err.code(), ERROR_FILE_NOT_FOUND);
    }

    #[test]
    fn system_volume_reports_its_device_number() {
        let volume = Volume::open(r"\\.\C:").expect("open C:");
        let number = volume.device_number().expect("device number");
        // Partition 0 is the whole disk; a mounted volume is never that.
        assert_ne!(number.PartitionNumber, 0);
    }

    #[test]
    fn system_volume_has_at_least_one_extent() {
        let volume = Volume::open(r"\\.\C:").expect("open C:");
        let extents = volume.disk_extents().expect("extents");
        assert!(!extents.is_empty());
        assert!(extents[0].ExtentLength > 0);
    }
}
