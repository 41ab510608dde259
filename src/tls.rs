//! TLS helpers built on the version-compatibility adapter
//!
//! Context configuration goes through [`SslAdapter`] so the same code runs
//! against libraries with and without ALPN; the async handshakes wrap
//! `tokio-openssl`.

use std::pin::Pin;

use openssl::ssl::{Ssl, SslConnector, SslContextBuilder, SslContextRef, SslRef};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_openssl::SslStream;

use crate::error::CryptorError;
use crate::ssl_adapter::{AlpnRejection, SslAdapter, Support};

/// Longest protocol name the ALPN wire format can carry
const MAX_PROTOCOL_LEN: usize = 255;

/// TLS configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsSettings {
    /// ALPN protocol names in preference order
    pub alpn_protocols: Vec<String>,
    /// Request automatic ECDH curve selection where the library needs it
    pub ecdh_auto: bool,
}

impl Default for TlsSettings {
    fn default() -> Self {
        Self {
            alpn_protocols: Vec::new(),
            ecdh_auto: true,
        }
    }
}

impl TlsSettings {
    pub fn from_json(json: &str) -> Result<Self, CryptorError> {
        let settings: Self = serde_json::from_str(json)?;
        // surface bad protocol names at load time
        settings.encoded_alpn_protocols()?;
        Ok(settings)
    }

    pub fn encoded_alpn_protocols(&self) -> Result<Vec<u8>, CryptorError> {
        encode_alpn_protocols(&self.alpn_protocols)
    }
}

/// Encode protocol names into the length-prefixed ALPN wire format
///
/// Empty names and names longer than 255 bytes are rejected.
pub fn encode_alpn_protocols<S: AsRef<str>>(protocols: &[S]) -> Result<Vec<u8>, CryptorError> {
    let mut wire = Vec::new();
    for protocol in protocols {
        let protocol = protocol.as_ref().as_bytes();
        if protocol.is_empty() || protocol.len() > MAX_PROTOCOL_LEN {
            return Err(CryptorError::ParamError(format!(
                "ALPN protocol name must be 1 to {MAX_PROTOCOL_LEN} bytes, got {}",
                protocol.len()
            )));
        }
        wire.push(protocol.len() as u8);
        wire.extend_from_slice(protocol);
    }
    Ok(wire)
}

/// Split a wire-format protocol list, `None` if it is malformed
fn parse_alpn_protocols(wire: &[u8]) -> Option<Vec<&[u8]>> {
    let mut protocols = Vec::new();
    let mut rest = wire;
    while let Some((&len, tail)) = rest.split_first() {
        let len = len as usize;
        if len == 0 || tail.len() < len {
            return None;
        }
        let (protocol, tail) = tail.split_at(len);
        protocols.push(protocol);
        rest = tail;
    }
    Some(protocols)
}

/// Pick the first server protocol the client also offers
///
/// Both lists are in wire format; the returned slice borrows from `client`.
pub fn select_protocol<'a>(server: &[u8], client: &'a [u8]) -> Option<&'a [u8]> {
    let client = parse_alpn_protocols(client)?;
    parse_alpn_protocols(server)?
        .into_iter()
        .find_map(|wanted| client.iter().copied().find(|offered| *offered == wanted))
}

/// What [`configure_acceptor`] and [`configure_connector`] applied;
/// `None` where the settings did not ask for the feature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlsSetup {
    pub alpn: Option<Support>,
    pub ecdh_auto: Option<Support>,
}

/// Apply `settings` to a server context
///
/// Installs a server-preference ALPN selection callback and requests
/// automatic ECDH, each only where the adapter supports it.
pub fn configure_acceptor(
    builder: &mut SslContextBuilder,
    settings: &TlsSettings,
    adapter: &SslAdapter,
) -> Result<TlsSetup, CryptorError> {
    let alpn = if settings.alpn_protocols.is_empty() {
        None
    } else {
        let server = settings.encoded_alpn_protocols()?;
        Some(adapter.set_alpn_select_callback(builder, move |_, client| {
            select_protocol(&server, client).ok_or(AlpnRejection::NoAck)
        }))
    };

    let ecdh_auto = settings
        .ecdh_auto
        .then(|| adapter.set_ecdh_auto(builder));

    let setup = TlsSetup { alpn, ecdh_auto };
    log::debug!("Configured TLS acceptor: {setup:?}");
    Ok(setup)
}

/// Apply `settings` to a client context, advertising the ALPN protocols
pub fn configure_connector(
    builder: &mut SslContextBuilder,
    settings: &TlsSettings,
    adapter: &SslAdapter,
) -> Result<TlsSetup, CryptorError> {
    let alpn = if settings.alpn_protocols.is_empty() {
        None
    } else {
        let client = settings.encoded_alpn_protocols()?;
        Some(adapter.set_alpn_protos(builder, &client)?)
    };

    let setup = TlsSetup {
        alpn,
        ecdh_auto: None,
    };
    log::debug!("Configured TLS connector: {setup:?}");
    Ok(setup)
}

/// Run the server side of a handshake over `stream`
pub async fn accept<S>(ctx: &SslContextRef, stream: S) -> Result<SslStream<S>, CryptorError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let ssl = Ssl::new(ctx)?;
    let mut stream = SslStream::new(ssl, stream)?;
    Pin::new(&mut stream).accept().await?;
    Ok(stream)
}

/// Run the client side of a handshake over `stream`, verifying `domain`
/// according to the connector's settings
pub async fn connect<S>(
    connector: &SslConnector,
    domain: &str,
    stream: S,
) -> Result<SslStream<S>, CryptorError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let ssl = connector.configure()?.into_ssl(domain)?;
    let mut stream = SslStream::new(ssl, stream)?;
    Pin::new(&mut stream).connect().await?;
    Ok(stream)
}

/// The ALPN protocol negotiated on `ssl`, if any
pub fn negotiated_protocol<'a>(ssl: &'a SslRef, adapter: &SslAdapter) -> Option<&'a [u8]> {
    adapter.selected_alpn_protocol(ssl)
}
