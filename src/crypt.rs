// ── Cryptographic service provider configuration ──────────────────────────────
//
// Thin wrappers over the CryptAcquireContextW / CryptSetProvParam /
// CryptReleaseContext lifecycle.  Nothing here performs cryptography; this
// module only acquires a provider handle and forwards parameter writes to it.

use std::ptr;

use windows_sys::Win32::Security::Cryptography::{
    CryptAcquireContextW, CryptReleaseContext, CryptSetProvParam,
};

use crate::check::check_bool;
use crate::error::Result;
use crate::wide::to_wide;

// Provider types, acquisition flags, and parameter ids callers pass through.
pub use windows_sys::Win32::Security::Cryptography::{
    CRYPT_MACHINE_KEYSET, CRYPT_SILENT, CRYPT_VERIFYCONTEXT, PP_CLIENT_HWND,
    PP_KEYEXCHANGE_PIN, PP_SIGNATURE_PIN, PROV_RSA_AES, PROV_RSA_FULL,
};

// Provider handles are pointer-sized integers in the CryptoAPI ABI, not
// kernel handles; CloseHandle does not apply to them.
type ProvHandle = usize;

// ── CryptContext ──────────────────────────────────────────────────────────────

/// An acquired cryptographic-provider context, released with
/// `CryptReleaseContext` on drop.
pub struct CryptContext(ProvHandle);

impl CryptContext {
    /// Acquire a provider context.
    ///
    /// `container`/`provider` select a named key container and provider;
    /// `None` means the platform default.  `prov_type` is a `PROV_*` value
    /// and `flags` a combination of `CRYPT_*` flags (`CRYPT_VERIFYCONTEXT`
    /// for container-less use).
    pub fn acquire(
        container: Option<&str>,
        provider: Option<&str>,
        prov_type: u32,
        flags: u32,
    ) -> Result<Self> {
        let container_w = container.map(to_wide);
        let provider_w = provider.map(to_wide);
        let container_ptr = container_w.as_ref().map_or(ptr::null(), |w| w.as_ptr());
        let provider_ptr = provider_w.as_ref().map_or(ptr::null(), |w| w.as_ptr());

        let mut hprov: ProvHandle = 0;

        // SAFETY: both name pointers are either null or valid null-terminated
        // UTF-16 buffers that outlive the call; hprov receives the handle on
        // success.
        let ok = unsafe {
            CryptAcquireContextW(&mut hprov, container_ptr, provider_ptr, prov_type, flags)
        };
        check_bool(ok, "CryptAcquireContextW")?;

        Ok(Self(hprov))
    }

    /// Set a provider parameter (`PP_*` id) to the given raw payload.
    ///
    /// The parameter id dictates the payload layout the provider reads; this
    /// layer forwards the bytes verbatim.
    pub fn set_param(&self, param: u32, data: &[u8]) -> Result<()> {
        // SAFETY: data outlives the call; the provider reads at most the
        // layout implied by `param` and never writes through the pointer.
        let ok = unsafe { CryptSetProvParam(self.0, param, data.as_ptr(), 0) };
        check_bool(ok, "CryptSetProvParam")?;
        Ok(())
    }

    /// The underlying provider handle, for calls this module does not wrap.
    pub fn as_raw(&self) -> usize {
        self.0
    }
}

impl Drop for CryptContext {
    fn drop(&mut self) {
        // SAFETY: self.0 was returned by a successful CryptAcquireContextW
        // and has not been released since.  The release flag must be zero;
        // the result is intentionally ignored in Drop.
        unsafe {
            let _ = CryptReleaseContext(self.0, 0);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquires_and_releases_a_verification_context() {
        let ctx = CryptContext::acquire(None, None, PROV_RSA_FULL, CRYPT_VERIFYCONTEXT)
            .expect("acquire verification context");
        assert_ne!(ctx.as_raw(), 0);
    }

    #[test]
    fn unknown_provider_fails_with_a_platform_code() {
        let err = CryptContext::acquire(
            None,
            Some("girder: no such provider"),
            PROV_RSA_FULL,
            CRYPT_VERIFYCONTEXT,
        )
        .unwrap_err();
        assert_eq!(err.function(), "CryptAcquireContextW");
        assert_ne!(err.code(), 0);
    }
}
