//! PBKDF2 password-based key derivation

use std::time::Instant;

use openssl::hash::MessageDigest;
use openssl::pkcs5::pbkdf2_hmac;

use crate::error::CryptorError;

/// Rounds used to time the host when calibrating
const CALIBRATION_ROUNDS: u32 = 10_000;

/// Lower bound for a calibrated round count
pub const MIN_CALIBRATED_ROUNDS: u32 = 1_000;

/// Pseudo-random functions for PBKDF2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PseudoRandomAlgorithm {
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl PseudoRandomAlgorithm {
    fn message_digest(self) -> MessageDigest {
        match self {
            PseudoRandomAlgorithm::Sha1 => MessageDigest::sha1(),
            PseudoRandomAlgorithm::Sha224 => MessageDigest::sha224(),
            PseudoRandomAlgorithm::Sha256 => MessageDigest::sha256(),
            PseudoRandomAlgorithm::Sha384 => MessageDigest::sha384(),
            PseudoRandomAlgorithm::Sha512 => MessageDigest::sha512(),
        }
    }
}

/// Password-based key derivation (PBKDF2, RFC 8018)
pub struct Pbkdf;

impl Pbkdf {
    /// Derive a `key_len`-byte key from `password` and `salt`
    ///
    /// # Arguments
    ///
    /// * `password` - Password bytes, may be empty
    /// * `salt` - Salt bytes
    /// * `prf` - HMAC hash used as the pseudo-random function
    /// * `rounds` - Iteration count, must be non-zero
    /// * `key_len` - Length of the derived key, must be non-zero
    pub fn derive_key(
        password: &[u8],
        salt: &[u8],
        prf: PseudoRandomAlgorithm,
        rounds: u32,
        key_len: usize,
    ) -> Result<Vec<u8>, CryptorError> {
        if rounds == 0 {
            return Err(CryptorError::ParamError(
                "PBKDF2 round count must be non-zero".to_string(),
            ));
        }
        if key_len == 0 {
            return Err(CryptorError::ParamError(
                "PBKDF2 key length must be non-zero".to_string(),
            ));
        }

        let mut key = vec![0u8; key_len];
        pbkdf2_hmac(
            password,
            salt,
            rounds as usize,
            prf.message_digest(),
            &mut key,
        )?;
        Ok(key)
    }

    pub fn derive_key_str(
        password: &str,
        salt: &[u8],
        prf: PseudoRandomAlgorithm,
        rounds: u32,
        key_len: usize,
    ) -> Result<Vec<u8>, CryptorError> {
        Self::derive_key(password.as_bytes(), salt, prf, rounds, key_len)
    }

    /// Estimate the round count that makes one derivation take `msec`
    /// milliseconds on this host
    ///
    /// The result is never below [`MIN_CALIBRATED_ROUNDS`].
    pub fn calibrate(
        password_len: usize,
        salt_len: usize,
        prf: PseudoRandomAlgorithm,
        key_len: usize,
        msec: u32,
    ) -> Result<u32, CryptorError> {
        let password = vec![0u8; password_len];
        let salt = vec![0u8; salt_len];

        let start = Instant::now();
        Self::derive_key(&password, &salt, prf, CALIBRATION_ROUNDS, key_len)?;
        let elapsed = start.elapsed().as_secs_f64();

        let per_round = elapsed / f64::from(CALIBRATION_ROUNDS);
        let rounds = if per_round > 0.0 {
            (f64::from(msec) / 1000.0 / per_round).min(f64::from(u32::MAX)) as u32
        } else {
            u32::MAX
        };
        let rounds = rounds.max(MIN_CALIBRATED_ROUNDS);

        log::debug!("Calibrated PBKDF2 {prf:?} to {rounds} rounds for {msec}ms");
        Ok(rounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::CryptoUtils;

    fn derive_hex(password: &[u8], salt: &[u8], rounds: u32, key_len: usize) -> String {
        let key = Pbkdf::derive_key(
            password,
            salt,
            PseudoRandomAlgorithm::Sha1,
            rounds,
            key_len,
        )
        .unwrap();
        CryptoUtils::hex_string(&key, false)
    }

    #[test]
    fn test_rfc6070_vectors() {
        assert_eq!(
            derive_hex(b"password", b"salt", 1, 20),
            "0c60c80f961f0e71f3a9b524af6012062fe037a6"
        );
        assert_eq!(
            derive_hex(b"password", b"salt", 2, 20),
            "ea6c014dc72d6f8ccd1ed92ace1d41f0d8de8957"
        );
        assert_eq!(
            derive_hex(b"password", b"salt", 4096, 20),
            "4b007901b765489abead49d926f721d065a429c1"
        );
        assert_eq!(
            derive_hex(
                b"passwordPASSWORDpassword",
                b"saltSALTsaltSALTsaltSALTsaltSALTsalt",
                4096,
                25
            ),
            "3d2eec4fe41c849b80c8d83662c0e44a8b291a964cf2f07038"
        );
        assert_eq!(
            derive_hex(b"pass\0word", b"sa\0lt", 4096, 16),
            "56fa6aa75548099dcc37d7f03425e0c3"
        );
    }

    #[test]
    fn test_sha256_single_round() {
        let key = Pbkdf::derive_key_str(
            "password",
            b"salt",
            PseudoRandomAlgorithm::Sha256,
            1,
            16,
        )
        .unwrap();
        assert_eq!(
            key,
            CryptoUtils::byte_array_from_hex("120fb6cffcf8b32c43e7225256c4f837")
        );
    }

    #[test]
    fn test_other_prfs_produce_requested_length() {
        for prf in [
            PseudoRandomAlgorithm::Sha224,
            PseudoRandomAlgorithm::Sha384,
            PseudoRandomAlgorithm::Sha512,
        ] {
            let key = Pbkdf::derive_key(b"password", b"salt", prf, 2, 40).unwrap();
            assert_eq!(key.len(), 40);
        }
    }

    #[test]
    fn test_zero_rounds_rejected() {
        let result = Pbkdf::derive_key(b"password", b"salt", PseudoRandomAlgorithm::Sha1, 0, 20);
        assert!(matches!(result, Err(CryptorError::ParamError(_))));
    }

    #[test]
    fn test_zero_key_length_rejected() {
        let result = Pbkdf::derive_key(b"password", b"salt", PseudoRandomAlgorithm::Sha1, 1, 0);
        assert!(matches!(result, Err(CryptorError::ParamError(_))));
    }

    #[test]
    fn test_calibrate() {
        let rounds = Pbkdf::calibrate(8, 8, PseudoRandomAlgorithm::Sha256, 16, 10).unwrap();
        assert!(rounds >= MIN_CALIBRATED_ROUNDS);
    }
}
