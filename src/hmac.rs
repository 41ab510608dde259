//! Keyed-hash message authentication codes

use openssl::md_ctx::MdCtx;
use openssl::pkey::PKey;

use crate::digest;
use crate::error::CryptorError;
use crate::traits::Updatable;

/// HMAC hash functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl Algorithm {
    fn digest_algorithm(self) -> digest::Algorithm {
        match self {
            Algorithm::Md5 => digest::Algorithm::Md5,
            Algorithm::Sha1 => digest::Algorithm::Sha1,
            Algorithm::Sha224 => digest::Algorithm::Sha224,
            Algorithm::Sha256 => digest::Algorithm::Sha256,
            Algorithm::Sha384 => digest::Algorithm::Sha384,
            Algorithm::Sha512 => digest::Algorithm::Sha512,
        }
    }

    /// Length of the produced tag in bytes
    pub fn digest_length(self) -> usize {
        self.digest_algorithm().digest_length()
    }
}

/// Incremental HMAC calculation
pub struct Hmac {
    algorithm: Algorithm,
    ctx: MdCtx,
}

impl std::fmt::Debug for Hmac {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hmac")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl Hmac {
    /// Starts an HMAC calculation keyed with `key`
    pub fn new(algorithm: Algorithm, key: &[u8]) -> Result<Self, CryptorError> {
        let md = algorithm.digest_algorithm().md()?;
        // the signing context takes its own reference to the key
        let pkey = PKey::hmac(key)?;
        let mut ctx = MdCtx::new()?;
        ctx.digest_sign_init(Some(md), &pkey)?;
        Ok(Self { algorithm, ctx })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Completes the calculation and returns the tag
    pub fn finish(mut self) -> Result<Vec<u8>, CryptorError> {
        let mut tag = Vec::with_capacity(self.algorithm.digest_length());
        self.ctx.digest_sign_final_to_vec(&mut tag)?;
        Ok(tag)
    }
}

impl Updatable for Hmac {
    fn update(&mut self, data: &[u8]) -> Result<&mut Self, CryptorError> {
        self.ctx.digest_sign_update(data)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::CryptoUtils;

    // RFC 4231 test case 1
    const RFC4231_KEY: &str = "0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b";
    const RFC4231_DATA: &str = "4869205468657265";

    fn hmac_hex(algorithm: Algorithm, key: &[u8], data: &[u8]) -> String {
        let mut hmac = Hmac::new(algorithm, key).unwrap();
        hmac.update(data).unwrap();
        CryptoUtils::hex_string(&hmac.finish().unwrap(), false)
    }

    #[test]
    fn test_hmac_md5() {
        // RFC 2202 test case 1
        let key = CryptoUtils::byte_array_from_hex("0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b");
        let mut hmac = Hmac::new(Algorithm::Md5, &key).unwrap();
        hmac.update_str("Hi There").unwrap();
        assert_eq!(
            hmac.finish().unwrap(),
            CryptoUtils::byte_array_from_hex("9294727a3638bb1c13f48ef8158bfc9d")
        );
    }

    #[test]
    fn test_hmac_sha1() {
        // RFC 2202 test case 4
        let key = CryptoUtils::byte_array_from_hex("0102030405060708090a0b0c0d0e0f10111213141516171819");
        let data = [0xcdu8; 50];
        assert_eq!(
            hmac_hex(Algorithm::Sha1, &key, &data),
            "4c9007f4026250c6bc8414f9bf50c86c2d7235da"
        );
    }

    #[test]
    fn test_hmac_sha2_family() {
        let key = CryptoUtils::byte_array_from_hex(RFC4231_KEY);
        let data = CryptoUtils::byte_array_from_hex(RFC4231_DATA);

        assert_eq!(
            hmac_hex(Algorithm::Sha224, &key, &data),
            "896fb1128abbdf196832107cd49df33f47b4b1169912ba4f53684b22"
        );
        assert_eq!(
            hmac_hex(Algorithm::Sha256, &key, &data),
            "b0344c61d8db38535ca8afceaf0bf12b881dc200c9833da726e9376c2e32cff7"
        );
        assert_eq!(
            hmac_hex(Algorithm::Sha384, &key, &data),
            "afd03944d84895626b0825f4ab46907f15f9dadbe4101ec682aa034c7cebc59cfaea9ea9076ede7f4af152e8b2fa9cb6"
        );
        assert_eq!(
            hmac_hex(Algorithm::Sha512, &key, &data),
            "87aa7cdea5ef619d4ff0b4241a1d6cb02379f4e2ce4ec2787ad0b30545e17cdedaa833b7d6b8a702038b274eaea3f4e4be9d914eeb61f1702e696c203a126854"
        );
    }

    #[test]
    fn test_chunked_update_matches_single_update() {
        let key = b"Jefe";
        let data = b"what do ya want for nothing?";

        let mut chunked = Hmac::new(Algorithm::Sha256, key).unwrap();
        chunked
            .update(&data[..10])
            .unwrap()
            .update(&data[10..])
            .unwrap();

        // RFC 4231 test case 2
        assert_eq!(
            CryptoUtils::hex_string(&chunked.finish().unwrap(), false),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_tag_length() {
        for algorithm in [
            Algorithm::Md5,
            Algorithm::Sha1,
            Algorithm::Sha224,
            Algorithm::Sha256,
            Algorithm::Sha384,
            Algorithm::Sha512,
        ] {
            let hmac = Hmac::new(algorithm, b"key").unwrap();
            assert_eq!(hmac.finish().unwrap().len(), algorithm.digest_length());
        }
    }
}
