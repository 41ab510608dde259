//! Cryptographically strong random bytes

use openssl::rand::rand_bytes;

use crate::error::CryptorError;

/// Cryptographically strong random bytes from the OpenSSL CSPRNG
pub struct Random;

impl Random {
    /// Generate `count` random bytes
    pub fn generate(count: usize) -> Result<Vec<u8>, CryptorError> {
        let mut bytes = vec![0u8; count];
        Self::fill(&mut bytes)?;
        Ok(bytes)
    }

    /// Overwrite `buf` with random bytes
    pub fn fill(buf: &mut [u8]) -> Result<(), CryptorError> {
        if buf.is_empty() {
            return Ok(());
        }
        rand_bytes(buf).map_err(|e| {
            log::warn!("Random generator failed: {e}");
            CryptorError::RngFailure(e.to_string())
        })
    }
}
