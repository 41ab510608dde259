//! Message digests

use openssl::md::{Md, MdRef};
use openssl::md_ctx::MdCtx;
use openssl::nid::Nid;

use crate::error::CryptorError;
use crate::traits::Updatable;

/// Supported digest algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Md2,
    Md4,
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl Algorithm {
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Md2 => "MD2",
            Algorithm::Md4 => "MD4",
            Algorithm::Md5 => "MD5",
            Algorithm::Sha1 => "SHA1",
            Algorithm::Sha224 => "SHA224",
            Algorithm::Sha256 => "SHA256",
            Algorithm::Sha384 => "SHA384",
            Algorithm::Sha512 => "SHA512",
        }
    }

    /// Length of the produced digest in bytes
    pub fn digest_length(self) -> usize {
        match self {
            Algorithm::Md2 | Algorithm::Md4 | Algorithm::Md5 => 16,
            Algorithm::Sha1 => 20,
            Algorithm::Sha224 => 28,
            Algorithm::Sha256 => 32,
            Algorithm::Sha384 => 48,
            Algorithm::Sha512 => 64,
        }
    }

    /// Algorithms that OpenSSL 3 only ships in the legacy provider
    pub(crate) fn is_legacy(self) -> bool {
        matches!(self, Algorithm::Md2 | Algorithm::Md4)
    }

    pub(crate) fn md(self) -> Result<&'static MdRef, CryptorError> {
        match self {
            // OpenSSL dropped MD2 from default builds long ago
            Algorithm::Md2 => Err(CryptorError::Unimplemented("MD2 digest".to_string())),
            Algorithm::Md4 => Md::from_nid(Nid::MD4).ok_or_else(|| {
                CryptorError::NotSupported("MD4 digest is not built into OpenSSL".to_string())
            }),
            Algorithm::Md5 => Ok(Md::md5()),
            Algorithm::Sha1 => Ok(Md::sha1()),
            Algorithm::Sha224 => Ok(Md::sha224()),
            Algorithm::Sha256 => Ok(Md::sha256()),
            Algorithm::Sha384 => Ok(Md::sha384()),
            Algorithm::Sha512 => Ok(Md::sha512()),
        }
    }
}

/// Incremental message digest
pub struct Digest {
    algorithm: Algorithm,
    ctx: MdCtx,
}

impl std::fmt::Debug for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Digest")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl Digest {
    /// Starts a digest calculation
    ///
    /// MD2 is [`CryptorError::Unimplemented`]; MD4 is
    /// [`CryptorError::NotSupported`] when the linked OpenSSL cannot load it.
    pub fn new(algorithm: Algorithm) -> Result<Self, CryptorError> {
        let md = algorithm.md()?;
        let mut ctx = MdCtx::new()?;
        ctx.digest_init(md).map_err(|e| {
            if algorithm.is_legacy() {
                CryptorError::NotSupported(format!("{} digest: {e}", algorithm.name()))
            } else {
                CryptorError::Library(e)
            }
        })?;
        log::trace!("Started {} digest", algorithm.name());
        Ok(Self { algorithm, ctx })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Completes the calculation and returns the digest bytes
    pub fn finish(mut self) -> Result<Vec<u8>, CryptorError> {
        let mut out = vec![0u8; self.algorithm.digest_length()];
        let written = self.ctx.digest_final(&mut out)? as usize;
        out.truncate(written);
        Ok(out)
    }
}

impl Updatable for Digest {
    fn update(&mut self, data: &[u8]) -> Result<&mut Self, CryptorError> {
        self.ctx.digest_update(data)?;
        Ok(self)
    }
}
