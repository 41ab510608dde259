//! Backend for OpenSSL 1.0.2+ and LibreSSL 2.6.1+ headers

use openssl::error::ErrorStack;
use openssl::ssl::{AlpnError, SslContextBuilder, SslRef};

use super::AlpnRejection;

pub const ALPN_COMPILED: bool = true;

/// `SSL_CTRL_SET_ECDH_AUTO` only exists in 1.0.2 headers
pub const ECDH_AUTO_COMPILED: bool = cfg!(not(any(ossl110, libressl)));

/// Forward to `SSL_CTX_set_alpn_select_cb`
pub fn set_alpn_select_callback<F>(builder: &mut SslContextBuilder, callback: F)
where
    F: for<'a> Fn(&mut SslRef, &'a [u8]) -> Result<&'a [u8], AlpnRejection>
        + 'static
        + Sync
        + Send,
{
    builder.set_alpn_select_callback(move |ssl, client| {
        callback(ssl, client).map_err(|rejection| match rejection {
            AlpnRejection::NoAck => AlpnError::NOACK,
            AlpnRejection::AlertFatal => AlpnError::ALERT_FATAL,
        })
    });
}

/// Forward to `SSL_get0_alpn_selected`, which always writes its output
pub fn get0_alpn_selected<'a>(ssl: &'a SslRef, out: &mut Option<&'a [u8]>) {
    *out = ssl.selected_alpn_protocol();
}

/// Forward to `SSL_CTX_set_alpn_protos`
pub fn set_alpn_protos(builder: &mut SslContextBuilder, protocols: &[u8]) -> Result<(), ErrorStack> {
    builder.set_alpn_protos(protocols)
}
