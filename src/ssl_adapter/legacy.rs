//! Backend for headers older than OpenSSL 1.0.2, which have no ALPN

use openssl::error::ErrorStack;
use openssl::ssl::{SslContextBuilder, SslRef};

use super::AlpnRejection;

pub const ALPN_COMPILED: bool = false;
pub const ECDH_AUTO_COMPILED: bool = false;

pub fn set_alpn_select_callback<F>(_builder: &mut SslContextBuilder, _callback: F)
where
    F: for<'a> Fn(&mut SslRef, &'a [u8]) -> Result<&'a [u8], AlpnRejection>
        + 'static
        + Sync
        + Send,
{
}

pub fn get0_alpn_selected<'a>(_ssl: &'a SslRef, _out: &mut Option<&'a [u8]>) {}

pub fn set_alpn_protos(_builder: &mut SslContextBuilder, _protocols: &[u8]) -> Result<(), ErrorStack> {
    Ok(())
}
