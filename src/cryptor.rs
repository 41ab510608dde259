//! Block cipher encryption and decryption

use std::ops::BitOr;

use openssl::symm::{Cipher, Crypter, Mode};

use crate::error::CryptorError;
use crate::traits::Updatable;

/// Largest block size of any supported algorithm
const MAX_BLOCK_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Encrypt,
    Decrypt,
}

impl From<Operation> for Mode {
    fn from(operation: Operation) -> Self {
        match operation {
            Operation::Encrypt => Mode::Encrypt,
            Operation::Decrypt => Mode::Decrypt,
        }
    }
}

/// Key sizes accepted by an algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidKeySize {
    Fixed(usize),
    Discrete(&'static [usize]),
    Range(usize, usize),
}

impl ValidKeySize {
    pub fn is_valid(&self, size: usize) -> bool {
        match *self {
            ValidKeySize::Fixed(fixed) => size == fixed,
            ValidKeySize::Discrete(sizes) => sizes.contains(&size),
            ValidKeySize::Range(min, max) => (min..=max).contains(&size),
        }
    }

    /// Smallest valid key size that a `size`-byte key can be zero-padded to
    ///
    /// Returns `None` when `size` exceeds every valid size.
    pub fn padded_key_size(&self, size: usize) -> Option<usize> {
        match *self {
            ValidKeySize::Fixed(fixed) => (size <= fixed).then_some(fixed),
            ValidKeySize::Discrete(sizes) => sizes.iter().copied().find(|s| *s >= size),
            ValidKeySize::Range(min, max) => (size <= max).then_some(size.max(min)),
        }
    }
}

/// Supported block ciphers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Aes,
    Des,
    TripleDes,
    Cast,
    Blowfish,
}

impl Algorithm {
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Aes => "AES",
            Algorithm::Des => "DES",
            Algorithm::TripleDes => "3DES",
            Algorithm::Cast => "CAST",
            Algorithm::Blowfish => "Blowfish",
        }
    }

    pub fn block_size(self) -> usize {
        match self {
            Algorithm::Aes => 16,
            Algorithm::Des | Algorithm::TripleDes | Algorithm::Cast | Algorithm::Blowfish => 8,
        }
    }

    pub fn default_key_size(self) -> usize {
        match self {
            Algorithm::Aes => 16,
            Algorithm::Des => 8,
            Algorithm::TripleDes => 24,
            Algorithm::Cast | Algorithm::Blowfish => 16,
        }
    }

    pub fn valid_key_size(self) -> ValidKeySize {
        match self {
            Algorithm::Aes => ValidKeySize::Discrete(&[16, 24, 32]),
            Algorithm::Des => ValidKeySize::Fixed(8),
            Algorithm::TripleDes => ValidKeySize::Fixed(24),
            Algorithm::Cast => ValidKeySize::Range(5, 16),
            Algorithm::Blowfish => ValidKeySize::Range(8, 56),
        }
    }

    /// Ciphers that OpenSSL 3 only ships in the legacy provider
    fn is_legacy(self) -> bool {
        matches!(self, Algorithm::Des | Algorithm::Cast | Algorithm::Blowfish)
    }

    fn cipher(self, key_len: usize, ecb: bool) -> Result<Cipher, CryptorError> {
        let cipher = match (self, key_len, ecb) {
            (Algorithm::Aes, 16, true) => Cipher::aes_128_ecb(),
            (Algorithm::Aes, 16, false) => Cipher::aes_128_cbc(),
            (Algorithm::Aes, 24, true) => Cipher::aes_192_ecb(),
            (Algorithm::Aes, 24, false) => Cipher::aes_192_cbc(),
            (Algorithm::Aes, 32, true) => Cipher::aes_256_ecb(),
            (Algorithm::Aes, 32, false) => Cipher::aes_256_cbc(),
            (Algorithm::Des, _, true) => Cipher::des_ecb(),
            (Algorithm::Des, _, false) => Cipher::des_cbc(),
            (Algorithm::TripleDes, _, true) => Cipher::des_ede3(),
            (Algorithm::TripleDes, _, false) => Cipher::des_ede3_cbc(),
            (Algorithm::Cast, _, true) => Cipher::cast5_ecb(),
            (Algorithm::Cast, _, false) => Cipher::cast5_cbc(),
            (Algorithm::Blowfish, _, true) => Cipher::bf_ecb(),
            (Algorithm::Blowfish, _, false) => Cipher::bf_cbc(),
            (Algorithm::Aes, _, _) => {
                return Err(CryptorError::InvalidKeySize(format!(
                    "{key_len} byte key is not valid for AES"
                )))
            }
        };
        Ok(cipher)
    }
}

/// Cipher options, combined with `|`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Options(u32);

impl Options {
    /// CBC mode without padding
    pub const NONE: Options = Options(0);
    pub const PKCS7_PADDING: Options = Options(0x0001);
    pub const ECB_MODE: Options = Options(0x0002);

    pub fn contains(self, other: Options) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Options {
    type Output = Options;

    fn bitor(self, rhs: Options) -> Options {
        Options(self.0 | rhs.0)
    }
}

#[derive(Debug)]
enum State {
    Active,
    Finished,
    Failed(CryptorError),
}

/// Block cipher context for one encryption or decryption
///
/// Data can be pushed either through the caller-buffer API
/// ([`Cryptor::update_into`] / [`Cryptor::finish_into`]) or through
/// [`Updatable::update`] and [`Cryptor::finish`], which accumulate the output
/// internally. Once an operation fails every later call returns the same
/// error.
pub struct Cryptor {
    operation: Operation,
    algorithm: Algorithm,
    options: Options,
    crypter: Crypter,
    // input bytes consumed but not yet emitted
    pending: usize,
    accumulated: Vec<u8>,
    state: State,
}

impl std::fmt::Debug for Cryptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cryptor")
            .field("operation", &self.operation)
            .field("algorithm", &self.algorithm)
            .field("options", &self.options)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Cryptor {
    /// Creates a cipher context
    ///
    /// # Arguments
    ///
    /// * `key` - Shorter keys are zero-padded up to the next valid size
    /// * `iv` - Ignored in ECB mode. In CBC mode it must be empty (zero IV)
    ///   or exactly one block long
    pub fn new(
        operation: Operation,
        algorithm: Algorithm,
        options: Options,
        key: &[u8],
        iv: &[u8],
    ) -> Result<Self, CryptorError> {
        let key_size = (!key.is_empty())
            .then(|| algorithm.valid_key_size().padded_key_size(key.len()))
            .flatten()
            .ok_or_else(|| {
                CryptorError::InvalidKeySize(format!(
                    "{} byte key is not valid for {}",
                    key.len(),
                    algorithm.name()
                ))
            })?;
        let mut key = key.to_vec();
        key.resize(key_size, 0);

        let block_size = algorithm.block_size();
        let ecb = options.contains(Options::ECB_MODE);
        let iv = if ecb {
            None
        } else if iv.is_empty() {
            Some(vec![0u8; block_size])
        } else if iv.len() == block_size {
            Some(iv.to_vec())
        } else {
            return Err(CryptorError::InvalidIvSize(format!(
                "{} byte IV is not valid for {}, expected {block_size}",
                iv.len(),
                algorithm.name()
            )));
        };

        let cipher = algorithm.cipher(key_size, ecb)?;
        let mut crypter =
            Crypter::new(cipher, operation.into(), &key, iv.as_deref()).map_err(|e| {
                if algorithm.is_legacy() {
                    CryptorError::NotSupported(format!("{} cipher: {e}", algorithm.name()))
                } else {
                    CryptorError::Library(e)
                }
            })?;
        crypter.pad(options.contains(Options::PKCS7_PADDING));

        log::debug!(
            "Created {} {:?} cryptor ({} mode, {key_size} byte key)",
            algorithm.name(),
            operation,
            if ecb { "ECB" } else { "CBC" }
        );

        Ok(Self {
            operation,
            algorithm,
            options,
            crypter,
            pending: 0,
            accumulated: Vec::new(),
            state: State::Active,
        })
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn options(&self) -> Options {
        self.options
    }

    fn pads_on_finish(&self) -> bool {
        self.operation == Operation::Encrypt && self.options.contains(Options::PKCS7_PADDING)
    }

    /// Upper bound on the output of the next update (or, with `is_final`,
    /// of an update followed by finish) given `input_len` more bytes
    pub fn output_length(&self, input_len: usize, is_final: bool) -> usize {
        let block_size = self.algorithm.block_size();
        let total = self.pending + input_len;
        if !is_final {
            total / block_size * block_size
        } else if self.pads_on_finish() {
            (total / block_size + 1) * block_size
        } else {
            total
        }
    }

    fn check_active(&self) -> Result<(), CryptorError> {
        match &self.state {
            State::Active => Ok(()),
            State::Finished => Err(CryptorError::ParamError(
                "cryptor has already been finished".to_string(),
            )),
            State::Failed(err) => Err(err.replay()),
        }
    }

    fn poison(&mut self, err: CryptorError) -> CryptorError {
        log::debug!("{} cryptor failed: {err}", self.algorithm.name());
        self.state = State::Failed(err.replay());
        err
    }

    /// Process `input`, writing any completed blocks into `output`
    ///
    /// Returns the number of bytes written. Fails with
    /// [`CryptorError::BufferTooSmall`] without consuming input when
    /// `output` is shorter than [`Cryptor::output_length`].
    pub fn update_into(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, CryptorError> {
        self.check_active()?;

        let needed = self.output_length(input.len(), false);
        if output.len() < needed {
            return Err(CryptorError::BufferTooSmall {
                needed,
                available: output.len(),
            });
        }

        let mut scratch = vec![0u8; input.len() + self.algorithm.block_size()];
        let written = match self.crypter.update(input, &mut scratch) {
            Ok(written) => written,
            Err(e) => return Err(self.poison(e.into())),
        };
        self.pending = self.pending + input.len() - written;
        output[..written].copy_from_slice(&scratch[..written]);
        Ok(written)
    }

    /// Flush the final block into `output`
    pub fn finish_into(&mut self, output: &mut [u8]) -> Result<usize, CryptorError> {
        self.check_active()?;

        let block_size = self.algorithm.block_size();
        if !self.pads_on_finish() && self.pending % block_size != 0 {
            let err = CryptorError::AlignmentError(format!(
                "{} input is not a multiple of the {block_size} byte block size",
                self.algorithm.name()
            ));
            return Err(self.poison(err));
        }

        let needed = self.output_length(0, true);
        if output.len() < needed {
            return Err(CryptorError::BufferTooSmall {
                needed,
                available: output.len(),
            });
        }

        let mut scratch = [0u8; 2 * MAX_BLOCK_SIZE];
        let written = match self.crypter.finalize(&mut scratch) {
            Ok(written) => written,
            Err(e) => return Err(self.poison(e.into())),
        };
        self.pending = 0;
        self.state = State::Finished;
        output[..written].copy_from_slice(&scratch[..written]);
        Ok(written)
    }

    /// Finish the operation and return everything produced through
    /// [`Updatable::update`]
    pub fn finish(mut self) -> Result<Vec<u8>, CryptorError> {
        let mut tail = vec![0u8; self.output_length(0, true)];
        let written = self.finish_into(&mut tail)?;
        self.accumulated.extend_from_slice(&tail[..written]);
        Ok(self.accumulated)
    }

    /// One-shot helper: create a cryptor, push `data` and finish
    pub fn crypt(
        operation: Operation,
        algorithm: Algorithm,
        options: Options,
        key: &[u8],
        iv: &[u8],
        data: &[u8],
    ) -> Result<Vec<u8>, CryptorError> {
        let mut cryptor = Self::new(operation, algorithm, options, key, iv)?;
        cryptor.update(data)?;
        cryptor.finish()
    }
}

impl Updatable for Cryptor {
    fn update(&mut self, data: &[u8]) -> Result<&mut Self, CryptorError> {
        let mut out = vec![0u8; self.output_length(data.len(), false)];
        let written = self.update_into(data, &mut out)?;
        self.accumulated.extend_from_slice(&out[..written]);
        Ok(self)
    }
}
