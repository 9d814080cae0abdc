//! Whole-file content hasher with streaming reads.
//!
//! # Overview
//!
//! The [`Hasher`] computes a lowercase hexadecimal digest over the entire
//! content of a file, reading it in fixed-size chunks so memory use does not
//! grow with file size.
//!
//! # Algorithm choice
//!
//! Digest equality is what decides that two files are duplicates, and a
//! collision would silently delete a file that has no other copy. Both
//! supported algorithms produce 256-bit digests:
//!
//! - [`HashAlgorithm::Blake3`] (default): cryptographic and fast
//! - [`HashAlgorithm::Sha256`]: slower, for users who want a FIPS-listed hash
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::scanner::{HashAlgorithm, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new().with_algorithm(HashAlgorithm::Sha256);
//! let digest = hasher.full_hash(Path::new("photo.jpg")).unwrap();
//! println!("{digest}");
//! ```

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::HashError;

/// Read buffer size for streaming hashing (64 KiB).
pub const BUFFER_SIZE: usize = 64 * 1024;

/// Content hash algorithm.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// BLAKE3, 256-bit
    #[default]
    Blake3,
    /// SHA-256
    Sha256,
}

impl HashAlgorithm {
    /// Length of the hex digest produced by this algorithm.
    #[must_use]
    pub const fn hex_len(self) -> usize {
        match self {
            Self::Blake3 | Self::Sha256 => 64,
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blake3 => write!(f, "blake3"),
            Self::Sha256 => write!(f, "sha256"),
        }
    }
}

/// In-progress digest for one file.
enum DigestState {
    Blake3(Box<blake3::Hasher>),
    Sha256(Sha256),
}

impl DigestState {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Blake3 => Self::Blake3(Box::new(blake3::Hasher::new())),
            HashAlgorithm::Sha256 => Self::Sha256(Sha256::new()),
        }
    }

    fn update(&mut self, bytes: &[u8]) {
        match self {
            Self::Blake3(hasher) => {
                hasher.update(bytes);
            }
            Self::Sha256(hasher) => hasher.update(bytes),
        }
    }

    fn finalize_hex(self) -> String {
        match self {
            Self::Blake3(hasher) => hasher.finalize().to_hex().to_string(),
            Self::Sha256(hasher) => format!("{:x}", hasher.finalize()),
        }
    }
}

/// Whole-file content hasher.
///
/// `Hasher` holds no per-file state and is shared by reference across
/// worker threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hasher {
    algorithm: HashAlgorithm,
}

impl Hasher {
    /// Create a hasher using the default algorithm (BLAKE3).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the digest algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// The configured algorithm.
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Compute the digest of the entire file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read.
    pub fn full_hash(&self, path: &Path) -> Result<String, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path.to_path_buf(), e))?;
        self.hash_reader(file)
            .map_err(|e| HashError::from_io(path.to_path_buf(), e))
    }

    /// Compute the digest of everything readable from `reader`.
    ///
    /// # Errors
    ///
    /// Returns the first I/O error other than `Interrupted`.
    pub fn hash_reader<R: Read>(&self, mut reader: R) -> io::Result<String> {
        let mut state = DigestState::new(self.algorithm);
        let mut buffer = vec![0u8; BUFFER_SIZE];

        loop {
            match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => state.update(&buffer[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        Ok(state.finalize_hex())
    }

    /// Compute the digest of an in-memory buffer.
    #[must_use]
    pub fn hash_bytes(&self, bytes: &[u8]) -> String {
        let mut state = DigestState::new(self.algorithm);
        state.update(bytes);
        state.finalize_hex()
    }
}
