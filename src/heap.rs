// ── Process, local, and global heap allocation ────────────────────────────────
//
// Wrappers over HeapAlloc/HeapFree, GlobalAlloc/GlobalFree with the
// lock/unlock protocol, and checked LocalFree.  The release functions use the
// inverted return convention (`check_release`): failure hands back the
// still-valid handle instead of a flag.
//
// A block is owned by its wrapper from successful allocation until drop or
// explicit free; nothing here pools or transfers ownership implicitly.

use core::ffi::c_void;

use windows_sys::Win32::Foundation::{HGLOBAL, HLOCAL, NO_ERROR};
use windows_sys::Win32::System::Memory::{
    GetProcessHeap, GlobalAlloc, GlobalFree, GlobalLock, GlobalUnlock, HeapAlloc, HeapFree,
    LocalFree, GMEM_MOVEABLE, GMEM_ZEROINIT, HEAP_ZERO_MEMORY,
};

use crate::check::{check_handle, check_release, last_error};
use crate::error::Result;

// ── HeapBuf ───────────────────────────────────────────────────────────────────

/// A zero-initialized block on the process heap, freed with `HeapFree` on
/// drop.
pub struct HeapBuf {
    ptr: *mut c_void,
    len: usize,
}

impl HeapBuf {
    /// Allocate `len` zeroed bytes on the process heap.
    pub fn alloc(len: usize) -> Result<Self> {
        // SAFETY: GetProcessHeap returns the default process heap, which is
        // valid for the lifetime of the process.
        let heap = check_handle(unsafe { GetProcessHeap() }, "GetProcessHeap")?;

        // SAFETY: heap is valid; HEAP_ZERO_MEMORY yields a zero-initialized
        // block of at least `len` bytes.
        let ptr = unsafe { HeapAlloc(heap, HEAP_ZERO_MEMORY, len) };
        let ptr = check_handle(ptr, "HeapAlloc")?;

        Ok(Self { ptr, len })
    }

    /// Byte length requested at allocation.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_ptr(&self) -> *const c_void {
        self.ptr
    }

    pub fn as_mut_ptr(&mut self) -> *mut c_void {
        self.ptr
    }

    /// View the block as bytes.
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: ptr is a live allocation of len bytes, zero-initialized at
        // birth and only written through as_mut_slice/as_mut_ptr since.
        unsafe { std::slice::from_raw_parts(self.ptr.cast(), self.len) }
    }

    /// View the block as writable bytes.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: ptr is a live allocation of len bytes, exclusively borrowed
        // through &mut self.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.cast(), self.len) }
    }
}

impl Drop for HeapBuf {
    fn drop(&mut self) {
        // SAFETY: ptr was returned by a successful HeapAlloc on the process
        // heap and has not been freed since.  The free result is
        // intentionally ignored in Drop.
        unsafe {
            let _ = HeapFree(GetProcessHeap(), 0, self.ptr);
        }
    }
}

// ── GlobalBuf ─────────────────────────────────────────────────────────────────

/// A movable, zero-initialized global-heap block.
///
/// Freed best-effort on drop; use `free` for a checked release or `into_raw`
/// to hand ownership to an API that consumes the handle.
pub struct GlobalBuf(HGLOBAL);

impl GlobalBuf {
    /// Allocate `len` zeroed bytes with `GMEM_MOVEABLE`.
    pub fn alloc(len: usize) -> Result<Self> {
        // SAFETY: GlobalAlloc has no pointer preconditions.
        let handle = unsafe { GlobalAlloc(GMEM_MOVEABLE | GMEM_ZEROINIT, len) };
        Ok(Self(check_handle(handle, "GlobalAlloc")?))
    }

    /// Pin the block and return its current address.
    ///
    /// Pair with `unlock`; the address is stable only while the lock count
    /// is nonzero.
    pub fn lock(&self) -> Result<*mut c_void> {
        // SAFETY: self.0 is a live global-heap handle.
        check_handle(unsafe { GlobalLock(self.0) }, "GlobalLock")
    }

    /// Release one lock taken by `lock`.
    pub fn unlock(&self) -> Result<()> {
        // SAFETY: self.0 is a live global-heap handle.
        let still_locked = unsafe { GlobalUnlock(self.0) };
        if still_locked == 0 {
            // A zero return with NO_ERROR means the lock count reached zero,
            // which is the expected outcome of the final unlock.
            let err = last_error("GlobalUnlock");
            if err.code() != NO_ERROR {
                return Err(err);
            }
        }
        Ok(())
    }

    /// Free the block, surfacing a failed release to the caller.
    pub fn free(self) -> Result<()> {
        let handle = self.0;
        std::mem::forget(self);
        // SAFETY: handle was returned by a successful GlobalAlloc and
        // ownership was just taken out of Drop's reach.
        check_release(unsafe { GlobalFree(handle) }, "GlobalFree")?;
        Ok(())
    }

    /// Give up ownership without freeing, for APIs that consume the handle.
    pub fn into_raw(self) -> HGLOBAL {
        let handle = self.0;
        std::mem::forget(self);
        handle
    }

    pub fn as_raw(&self) -> HGLOBAL {
        self.0
    }
}

impl Drop for GlobalBuf {
    fn drop(&mut self) {
        // SAFETY: self.0 was returned by a successful GlobalAlloc and has not
        // been freed since.  The free result is intentionally ignored in Drop.
        unsafe {
            let _ = GlobalFree(self.0);
        }
    }
}

// ── Local heap ────────────────────────────────────────────────────────────────

/// Checked `LocalFree`, for blocks the platform allocates on the caller's
/// behalf (the argv block of `CommandLineToArgvW`).
///
/// A null `block` is accepted and is a no-op, per the platform contract.
///
/// # Safety
///
/// `block` must be null or a local-heap handle that has not already been
/// freed; after this call it must not be used again.
pub unsafe fn local_free(block: HLOCAL) -> Result<()> {
    // SAFETY: forwarded from the caller.
    check_release(unsafe { LocalFree(block) }, "LocalFree")?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    #[test]
    fn heap_block_is_zeroed_and_writable() {
        let mut buf = HeapBuf::alloc(64).expect("alloc");
        assert_eq!(buf.len(), 64);
        assert!(buf.as_slice().iter().all(|&b| b == 0));

        buf.as_mut_slice()[0] = 0xAB;
        buf.as_mut_slice()[63] = 0xCD;
        assert_eq!(buf.as_slice()[0], 0xAB);
        assert_eq!(buf.as_slice()[63], 0xCD);
    }

    #[test]
    fn global_block_lock_unlock_free() {
        let buf = GlobalBuf::alloc(128).expect("alloc");

        let ptr = buf.lock().expect("lock");
        assert!(!ptr.is_null());
        // SAFETY: the block is locked, 128 bytes, zero-initialized.
        unsafe {
            assert_eq!(*ptr.cast::<u8>(), 0);
            *ptr.cast::<u8>() = 7;
        }
        buf.unlock().expect("unlock");

        buf.free().expect("checked free");
    }

    #[test]
    fn freeing_a_null_local_block_is_a_no_op() {
        // SAFETY: null is explicitly accepted by the contract.
        unsafe { local_free(ptr::null_mut()) }.expect("null free");
    }
}
