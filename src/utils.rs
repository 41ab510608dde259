use crate::error::CryptorError;

/// Byte array and hex string helpers
pub struct CryptoUtils;

impl CryptoUtils {
    /// Decode a hex string into bytes
    ///
    /// Returns an empty vector when `hex` has odd length or a non-hex
    /// character; use [`CryptoUtils::try_byte_array_from_hex`] to see why.
    pub fn byte_array_from_hex(hex: &str) -> Vec<u8> {
        Self::try_byte_array_from_hex(hex).unwrap_or_default()
    }

    pub fn try_byte_array_from_hex(hex: &str) -> Result<Vec<u8>, CryptorError> {
        Ok(hex::decode(hex)?)
    }

    pub fn byte_array_from_str(s: &str) -> Vec<u8> {
        s.as_bytes().to_vec()
    }

    pub fn hex_string(bytes: &[u8], uppercase: bool) -> String {
        if uppercase {
            hex::encode_upper(bytes)
        } else {
            hex::encode(bytes)
        }
    }

    /// Format bytes as a C-style initializer list, e.g. `0xde, 0xad, `
    pub fn hex_list(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("0x{b:02x}, ")).collect()
    }

    /// Right-pad `bytes` with zeros to the next multiple of `block_size`
    ///
    /// Input that is already aligned is returned unchanged: no extra block of
    /// zeros is appended, so padding is idempotent and the result can be
    /// stripped of trailing zeros only when the plaintext never ends in zero.
    pub fn zero_pad(bytes: &[u8], block_size: usize) -> Vec<u8> {
        let mut padded = bytes.to_vec();
        if block_size == 0 {
            return padded;
        }
        let remainder = bytes.len() % block_size;
        if remainder != 0 {
            padded.resize(bytes.len() + block_size - remainder, 0);
        }
        padded
    }

    pub fn zero_pad_str(s: &str, block_size: usize) -> Vec<u8> {
        Self::zero_pad(s.as_bytes(), block_size)
    }
}
