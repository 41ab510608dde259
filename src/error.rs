//! Error types for cryptographic operations

use openssl::error::ErrorStack;
use thiserror::Error;

/// Errors that can occur while digesting, deriving keys, encrypting or
/// setting up TLS
#[derive(Debug, Error)]
pub enum CryptorError {
    /// The linked OpenSSL does not provide the requested algorithm or mode
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// The algorithm exists but is not implemented by this crate
    #[error("Not implemented: {0}")]
    Unimplemented(String),

    /// Invalid parameters passed
    #[error("Invalid parameters: {0}")]
    ParamError(String),

    /// Key length is not acceptable for the algorithm
    #[error("Invalid key size: {0}")]
    InvalidKeySize(String),

    /// IV length does not match the cipher block size
    #[error("Invalid IV size: {0}")]
    InvalidIvSize(String),

    /// Unpadded input is not a multiple of the block size
    #[error("Alignment error: {0}")]
    AlignmentError(String),

    /// Output buffer cannot hold the produced bytes
    #[error("Buffer too small: needed {needed} bytes, {available} available")]
    BufferTooSmall { needed: usize, available: usize },

    /// Malformed encoded input
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// Random byte generator failure
    #[error("Random byte generator error: {0}")]
    RngFailure(String),

    /// TLS handshake or I/O failure
    #[error("TLS error: {0}")]
    Tls(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error reported by the OpenSSL error stack
    #[error("OpenSSL error: {0}")]
    Library(#[from] ErrorStack),
}

impl CryptorError {
    /// Stable integer code for the error.
    ///
    /// Zero is reserved for success. Library errors report the first packed
    /// OpenSSL error code, or `-100` when the stack was empty.
    pub fn code(&self) -> i64 {
        match self {
            CryptorError::NotSupported(_) => -1,
            CryptorError::Unimplemented(_) => -2,
            CryptorError::ParamError(_) => -3,
            CryptorError::InvalidKeySize(_) => -4,
            CryptorError::InvalidIvSize(_) => -5,
            CryptorError::AlignmentError(_) => -6,
            CryptorError::BufferTooSmall { .. } => -7,
            CryptorError::DecodeError(_) => -8,
            CryptorError::RngFailure(_) => -9,
            CryptorError::Tls(_) => -10,
            CryptorError::Config(_) => -11,
            CryptorError::Library(stack) => stack
                .errors()
                .first()
                .map(|e| e.code() as i64)
                .unwrap_or(-100),
        }
    }

    /// Copy of this error suitable for replaying on a poisoned context.
    pub(crate) fn replay(&self) -> Self {
        match self {
            CryptorError::NotSupported(m) => CryptorError::NotSupported(m.clone()),
            CryptorError::Unimplemented(m) => CryptorError::Unimplemented(m.clone()),
            CryptorError::ParamError(m) => CryptorError::ParamError(m.clone()),
            CryptorError::InvalidKeySize(m) => CryptorError::InvalidKeySize(m.clone()),
            CryptorError::InvalidIvSize(m) => CryptorError::InvalidIvSize(m.clone()),
            CryptorError::AlignmentError(m) => CryptorError::AlignmentError(m.clone()),
            CryptorError::BufferTooSmall { needed, available } => CryptorError::BufferTooSmall {
                needed: *needed,
                available: *available,
            },
            CryptorError::DecodeError(m) => CryptorError::DecodeError(m.clone()),
            CryptorError::RngFailure(m) => CryptorError::RngFailure(m.clone()),
            CryptorError::Tls(m) => CryptorError::Tls(m.clone()),
            CryptorError::Config(m) => CryptorError::Config(m.clone()),
            CryptorError::Library(stack) => CryptorError::Library(stack.clone()),
        }
    }
}

impl From<openssl::ssl::Error> for CryptorError {
    fn from(err: openssl::ssl::Error) -> Self {
        match err.ssl_error() {
            Some(stack) => CryptorError::Library(stack.clone()),
            None => CryptorError::Tls(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for CryptorError {
    fn from(err: serde_json::Error) -> Self {
        CryptorError::Config(err.to_string())
    }
}

impl From<hex::FromHexError> for CryptorError {
    fn from(err: hex::FromHexError) -> Self {
        CryptorError::DecodeError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct_and_negative() {
        let errors = [
            CryptorError::NotSupported("md4".to_string()),
            CryptorError::Unimplemented("md2".to_string()),
            CryptorError::ParamError("rounds".to_string()),
            CryptorError::InvalidKeySize("48".to_string()),
            CryptorError::InvalidIvSize("17".to_string()),
            CryptorError::AlignmentError("15".to_string()),
            CryptorError::BufferTooSmall {
                needed: 16,
                available: 8,
            },
            CryptorError::DecodeError("zz".to_string()),
            CryptorError::RngFailure("entropy".to_string()),
            CryptorError::Tls("eof".to_string()),
            CryptorError::Config("json".to_string()),
        ];

        let mut codes: Vec<i64> = errors.iter().map(CryptorError::code).collect();
        assert!(codes.iter().all(|c| *c < 0));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_well_known_codes() {
        assert_eq!(CryptorError::NotSupported(String::new()).code(), -1);
        assert_eq!(CryptorError::Unimplemented(String::new()).code(), -2);
        assert_eq!(CryptorError::ParamError(String::new()).code(), -3);
    }

    #[test]
    fn test_display() {
        let err = CryptorError::BufferTooSmall {
            needed: 32,
            available: 16,
        };
        assert_eq!(
            err.to_string(),
            "Buffer too small: needed 32 bytes, 16 available"
        );
        assert_eq!(
            CryptorError::Unimplemented("MD2".to_string()).to_string(),
            "Not implemented: MD2"
        );
    }

    #[test]
    fn test_replay_keeps_kind() {
        let err = CryptorError::AlignmentError("15 bytes".to_string());
        assert!(matches!(err.replay(), CryptorError::AlignmentError(m) if m == "15 bytes"));
    }

    #[test]
    fn test_from_hex_error() {
        let err: CryptorError = hex::decode("zz").unwrap_err().into();
        assert!(matches!(err, CryptorError::DecodeError(_)));
    }
}
