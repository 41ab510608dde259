//! Version-compatibility adapter over the linked OpenSSL
//!
//! Operations whose availability depends on the OpenSSL release:
//!
//! - ALPN selection callback registration (1.0.2+)
//! - client-side ALPN protocol advertisement (1.0.2+)
//! - retrieval of the negotiated ALPN protocol (1.0.2+)
//! - automatic ECDH curve selection (only meaningful in [1.0.2, 1.1.0))
//! - digest-signature verification finalization (all versions)
//!
//! The native or legacy backend is picked at build time from the headers
//! openssl-sys was built against (see `build.rs`). On top of that an
//! [`SslAdapter`] carries the [`Capabilities`] detected once at startup, so
//! every call site can tell "ran and did nothing" from "not available".
//! Unsupported operations never fail: they are skipped and reported as
//! [`Support::Unsupported`].

mod capabilities;

#[cfg(any(ossl102, libressl261))]
mod native;

#[cfg(not(any(ossl102, libressl261)))]
mod legacy;

#[cfg(any(ossl102, libressl261))]
use native as backend;

#[cfg(not(any(ossl102, libressl261)))]
use legacy as backend;

pub use capabilities::{Capabilities, LibraryVersion};

use foreign_types::ForeignTypeRef;
use libc::{c_int, c_long, c_uchar};
use once_cell::sync::Lazy;
use openssl::error::ErrorStack;
use openssl::md_ctx::MdCtxRef;
use openssl::ssl::{SslContextBuilder, SslRef};
use std::ptr;

/// `SSL_CTRL_SET_ECDH_AUTO` from `ssl.h`; removed from the 1.1.0 headers
const SSL_CTRL_SET_ECDH_AUTO: c_int = 94;

static CURRENT: Lazy<SslAdapter> = Lazy::new(SslAdapter::detect);

/// Result of an operation that silently degrades on older libraries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Support {
    /// The call was forwarded to the library
    Applied,
    /// The linked library lacks the feature; nothing was done
    Unsupported,
}

impl Support {
    pub fn is_applied(self) -> bool {
        self == Support::Applied
    }
}

/// Why an ALPN selection callback declined to pick a protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlpnRejection {
    /// Continue the handshake without ALPN (`SSL_TLSEXT_ERR_NOACK`)
    NoAck,
    /// Abort the handshake (`SSL_TLSEXT_ERR_ALERT_FATAL`)
    AlertFatal,
}

/// The adapter, bound to a set of capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SslAdapter {
    capabilities: Capabilities,
}

impl SslAdapter {
    /// Adapter for the library this process is linked against
    pub fn detect() -> Self {
        Self::with_capabilities(Capabilities::detect())
    }

    /// Adapter behaving as it would against another library version
    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        Self { capabilities }
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Register the server-side ALPN selection callback on `builder`.
    ///
    /// The callback receives the client's protocol list in wire format and
    /// returns a slice of it. Whatever state it needs travels in its
    /// captures. Before 1.0.2 this is a no-op and the callback is dropped.
    pub fn set_alpn_select_callback<F>(
        &self,
        builder: &mut SslContextBuilder,
        callback: F,
    ) -> Support
    where
        F: for<'a> Fn(&mut SslRef, &'a [u8]) -> Result<&'a [u8], AlpnRejection>
            + 'static
            + Sync
            + Send,
    {
        if !self.capabilities.alpn() {
            log::debug!(
                "ALPN select callback not registered: unsupported by OpenSSL {}",
                self.capabilities.version()
            );
            return Support::Unsupported;
        }
        backend::set_alpn_select_callback(builder, callback);
        Support::Applied
    }

    /// Advertise `protocols` (wire format) from the client side of `builder`.
    pub fn set_alpn_protos(
        &self,
        builder: &mut SslContextBuilder,
        protocols: &[u8],
    ) -> Result<Support, ErrorStack> {
        if !self.capabilities.alpn() {
            log::debug!(
                "ALPN protocols not advertised: unsupported by OpenSSL {}",
                self.capabilities.version()
            );
            return Ok(Support::Unsupported);
        }
        backend::set_alpn_protos(builder, protocols)?;
        Ok(Support::Applied)
    }

    /// Write the negotiated ALPN protocol of `ssl` into `out`.
    ///
    /// When supported, `out` is always overwritten (`None` when nothing was
    /// negotiated). When unsupported, `out` is left exactly as the caller
    /// initialised it.
    pub fn get0_alpn_selected<'a>(
        &self,
        ssl: &'a SslRef,
        out: &mut Option<&'a [u8]>,
    ) -> Support {
        if !self.capabilities.alpn() {
            log::debug!(
                "ALPN selection not retrieved: unsupported by OpenSSL {}",
                self.capabilities.version()
            );
            return Support::Unsupported;
        }
        backend::get0_alpn_selected(ssl, out);
        Support::Applied
    }

    /// The negotiated ALPN protocol, `None` when absent or unsupported
    pub fn selected_alpn_protocol<'a>(&self, ssl: &'a SslRef) -> Option<&'a [u8]> {
        let mut selected = None;
        self.get0_alpn_selected(ssl, &mut selected);
        selected
    }

    /// Turn on automatic ECDH curve selection for `builder`.
    ///
    /// Only 1.0.2 needs the control call: 1.1.0 and later always select
    /// curves automatically and older releases cannot.
    pub fn set_ecdh_auto(&self, builder: &mut SslContextBuilder) -> Support {
        if !self.capabilities.ecdh_auto() {
            log::debug!(
                "Auto-ECDH control skipped for OpenSSL {}",
                self.capabilities.version()
            );
            return Support::Unsupported;
        }
        let r: c_long = unsafe {
            openssl_sys::SSL_CTX_ctrl(
                builder.as_ptr(),
                SSL_CTRL_SET_ECDH_AUTO,
                1,
                ptr::null_mut(),
            )
        };
        if r != 1 {
            log::warn!("SSL_CTRL_SET_ECDH_AUTO returned {r}");
        }
        Support::Applied
    }

    /// Finalize a digest-signature verification started on `ctx`.
    ///
    /// Returns the library's own code: `1` verified, `0` signature mismatch,
    /// negative on operational error. Errors stay on the OpenSSL error stack
    /// for the caller to collect.
    pub fn digest_verify_final(&self, ctx: &mut MdCtxRef, signature: &[u8]) -> c_int {
        digest_verify_final(ctx, signature)
    }
}

impl Default for SslAdapter {
    fn default() -> Self {
        *current()
    }
}

/// The process-wide adapter, detected on first use
pub fn current() -> &'static SslAdapter {
    &CURRENT
}

/// [`SslAdapter::set_alpn_select_callback`] on the process-wide adapter
pub fn set_alpn_select_callback<F>(builder: &mut SslContextBuilder, callback: F) -> Support
where
    F: for<'a> Fn(&mut SslRef, &'a [u8]) -> Result<&'a [u8], AlpnRejection>
        + 'static
        + Sync
        + Send,
{
    current().set_alpn_select_callback(builder, callback)
}

/// [`SslAdapter::set_alpn_protos`] on the process-wide adapter
pub fn set_alpn_protos(
    builder: &mut SslContextBuilder,
    protocols: &[u8],
) -> Result<Support, ErrorStack> {
    current().set_alpn_protos(builder, protocols)
}

/// [`SslAdapter::get0_alpn_selected`] on the process-wide adapter
pub fn get0_alpn_selected<'a>(ssl: &'a SslRef, out: &mut Option<&'a [u8]>) -> Support {
    current().get0_alpn_selected(ssl, out)
}

/// [`SslAdapter::selected_alpn_protocol`] on the process-wide adapter
pub fn selected_alpn_protocol(ssl: &SslRef) -> Option<&[u8]> {
    current().selected_alpn_protocol(ssl)
}

/// [`SslAdapter::set_ecdh_auto`] on the process-wide adapter
pub fn set_ecdh_auto(builder: &mut SslContextBuilder) -> Support {
    current().set_ecdh_auto(builder)
}

/// Forward to `EVP_DigestVerifyFinal`
///
/// Headers before 1.0.2 declare the signature as mutable; the library never
/// writes through it, so one call covers both declarations.
pub fn digest_verify_final(ctx: &mut MdCtxRef, signature: &[u8]) -> c_int {
    unsafe {
        openssl_sys::EVP_DigestVerifyFinal(
            ctx.as_ptr(),
            signature.as_ptr() as *mut c_uchar,
            signature.len(),
        )
    }
}
