//! Streaming signature verification
//!
//! The final check goes through [`SslAdapter::digest_verify_final`], so the
//! same code verifies against every supported OpenSSL line.

use openssl::error::ErrorStack;
use openssl::md_ctx::MdCtx;
use openssl::pkey::{HasPublic, PKeyRef};

use crate::digest::Algorithm;
use crate::error::CryptorError;
use crate::ssl_adapter::SslAdapter;
use crate::traits::Updatable;

/// Incremental verification of a signature over streamed data
pub struct SignatureVerifier {
    algorithm: Algorithm,
    ctx: MdCtx,
    adapter: SslAdapter,
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("algorithm", &self.algorithm)
            .field("adapter", &self.adapter)
            .finish_non_exhaustive()
    }
}

impl SignatureVerifier {
    /// Starts a verification of data hashed with `algorithm` against `key`
    pub fn new<T>(algorithm: Algorithm, key: &PKeyRef<T>) -> Result<Self, CryptorError>
    where
        T: HasPublic,
    {
        let md = algorithm.md()?;
        let mut ctx = MdCtx::new()?;
        ctx.digest_verify_init(Some(md), key)?;
        Ok(Self {
            algorithm,
            ctx,
            adapter: SslAdapter::default(),
        })
    }

    /// Use `adapter` instead of the process-wide one for the final check
    pub fn with_adapter(mut self, adapter: SslAdapter) -> Self {
        self.adapter = adapter;
        self
    }

    /// Check `signature` against everything passed to [`Updatable::update`]
    ///
    /// A signature that does not match is `Ok(false)`; only library failures
    /// are errors.
    pub fn verify(mut self, signature: &[u8]) -> Result<bool, CryptorError> {
        match self.adapter.digest_verify_final(&mut self.ctx, signature) {
            1 => Ok(true),
            0 => {
                // drop the mismatch reason queued by OpenSSL
                let _ = ErrorStack::get();
                Ok(false)
            }
            code => {
                let stack = ErrorStack::get();
                if stack.errors().is_empty() {
                    log::debug!("Signature rejected by OpenSSL ({code})");
                    Ok(false)
                } else {
                    log::warn!("Signature verification failed ({code}): {stack}");
                    Err(CryptorError::Library(stack))
                }
            }
        }
    }
}

impl Updatable for SignatureVerifier {
    fn update(&mut self, data: &[u8]) -> Result<&mut Self, CryptorError> {
        self.ctx.digest_verify_update(data)?;
        Ok(self)
    }
}

/// Verify `signature` over `data` in one call
pub fn verify_signature<T>(
    algorithm: Algorithm,
    key: &PKeyRef<T>,
    data: &[u8],
    signature: &[u8],
) -> Result<bool, CryptorError>
where
    T: HasPublic,
{
    let mut verifier = SignatureVerifier::new(algorithm, key)?;
    verifier.update(data)?;
    verifier.verify(signature)
}
