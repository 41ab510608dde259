//! OpenSSL-backed cryptography toolkit
//!
//! Digests, HMAC, PBKDF2 key derivation, block ciphers, random bytes and
//! signature verification over the `openssl` crate, together with a
//! version-compatibility adapter that lets TLS code use ALPN, automatic ECDH
//! and digest-signature finalization against any supported OpenSSL or
//! LibreSSL release.
//!
//! # Features
//!
//! - `tls` (default): async TLS handshake helpers on `tokio-openssl`
//! - `vendored`: build and statically link OpenSSL
//!
//! **Note**: the adapter backend is chosen from the OpenSSL headers at build
//! time; runtime capabilities are detected once per process.

pub mod cryptor;
pub mod digest;
pub mod error;
pub mod hmac;
pub mod key_derivation;
pub mod random;
pub mod signature;
pub mod ssl_adapter;
#[cfg(test)]
pub mod test_util;
#[cfg(feature = "tls")]
pub mod tls;
pub mod traits;
pub mod utils;

// Re-export core types
pub use error::CryptorError;
pub use traits::{CryptoDigest, Updatable};

// Re-export calculation types
pub use cryptor::{Cryptor, Operation, Options, ValidKeySize};
pub use digest::Digest;
pub use hmac::Hmac;
pub use key_derivation::{Pbkdf, PseudoRandomAlgorithm};
pub use random::Random;
pub use signature::{verify_signature, SignatureVerifier};
pub use ssl_adapter::{AlpnRejection, Capabilities, LibraryVersion, SslAdapter, Support};
pub use utils::CryptoUtils;

#[cfg(feature = "tls")]
pub use tls::{TlsSettings, TlsSetup};
