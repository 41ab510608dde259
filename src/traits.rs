//! Core trait definitions shared by the incremental calculations

use crate::digest::{Algorithm, Digest};
use crate::error::CryptorError;
use crate::utils::CryptoUtils;

/// Trait for calculations fed with incremental data buffers
///
/// Implemented by [`Digest`], [`crate::Hmac`], [`crate::Cryptor`] and
/// [`crate::SignatureVerifier`]. Each update returns the calculation itself
/// so calls can be chained with `?`.
pub trait Updatable {
    /// Update the calculation with the contents of `data`
    fn update(&mut self, data: &[u8]) -> Result<&mut Self, CryptorError>;

    /// Update the calculation with the UTF-8 bytes of `data`
    fn update_str(&mut self, data: &str) -> Result<&mut Self, CryptorError> {
        self.update(data.as_bytes())
    }
}

/// One-shot digests over a single buffer
///
/// Strings produce a lowercase hex digest, byte slices the raw digest bytes.
pub trait CryptoDigest {
    type Output;

    /// Calculate the message digest of `self` with `algorithm`
    fn digest(&self, algorithm: Algorithm) -> Result<Self::Output, CryptorError>;

    fn md5(&self) -> Result<Self::Output, CryptorError> {
        self.digest(Algorithm::Md5)
    }

    fn sha1(&self) -> Result<Self::Output, CryptorError> {
        self.digest(Algorithm::Sha1)
    }

    fn sha224(&self) -> Result<Self::Output, CryptorError> {
        self.digest(Algorithm::Sha224)
    }

    fn sha256(&self) -> Result<Self::Output, CryptorError> {
        self.digest(Algorithm::Sha256)
    }

    fn sha384(&self) -> Result<Self::Output, CryptorError> {
        self.digest(Algorithm::Sha384)
    }

    fn sha512(&self) -> Result<Self::Output, CryptorError> {
        self.digest(Algorithm::Sha512)
    }
}

impl CryptoDigest for [u8] {
    type Output = Vec<u8>;

    fn digest(&self, algorithm: Algorithm) -> Result<Vec<u8>, CryptorError> {
        let mut digest = Digest::new(algorithm)?;
        digest.update(self)?;
        digest.finish()
    }
}

impl CryptoDigest for str {
    type Output = String;

    fn digest(&self, algorithm: Algorithm) -> Result<String, CryptorError> {
        let bytes = self.as_bytes().digest(algorithm)?;
        Ok(CryptoUtils::hex_string(&bytes, false))
    }
}
