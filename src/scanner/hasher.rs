//! Fixed-seed fast hashing for file fingerprints.
//!
//! # Overview
//!
//! Fingerprints are only used to bucket and pre-filter candidates, so the
//! hash is fast and non-cryptographic by default (xxh64 with a fixed seed).
//! BLAKE3, keyed from the same seed, is available as an alternative.
//!
//! Hash failures never abort a scan. They surface as [`Digest::Unavailable`],
//! which buckets and compares like any other value; byte comparison remains
//! the final arbiter.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::HashError;

/// Number of leading bytes covered by the partial hash.
pub const PREHASH_SIZE: usize = 4096;

/// Default streaming buffer size for full hashes and byte comparison.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Default hash seed.
pub const DEFAULT_SEED: u64 = 42;

/// Hash function used for fingerprints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// XXH64, seeded
    #[default]
    Xxh64,
    /// BLAKE3 in keyed mode, truncated to 64 bits
    Blake3,
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HashAlgorithm::Xxh64 => write!(f, "xxh64"),
            HashAlgorithm::Blake3 => write!(f, "blake3"),
        }
    }
}

/// Result of a hash computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Digest {
    /// Successfully computed hash value.
    Computed(u64),
    /// The content could not be read; equal to every other unavailable digest.
    Unavailable,
}

impl Digest {
    /// Whether the digest was computed.
    #[must_use]
    pub fn is_computed(self) -> bool {
        matches!(self, Digest::Computed(_))
    }
}

impl From<Result<u64, HashError>> for Digest {
    fn from(result: Result<u64, HashError>) -> Self {
        match result {
            Ok(value) => Digest::Computed(value),
            Err(e) => {
                log::debug!("Hash unavailable: {}", e);
                Digest::Unavailable
            }
        }
    }
}

/// Streaming state for either algorithm.
enum State {
    Xxh64(xxhash_rust::xxh64::Xxh64),
    Blake3(Box<blake3::Hasher>),
}

impl State {
    fn update(&mut self, data: &[u8]) {
        match self {
            State::Xxh64(h) => h.update(data),
            State::Blake3(h) => {
                h.update(data);
            }
        }
    }

    fn finish(self) -> u64 {
        match self {
            State::Xxh64(h) => h.digest(),
            State::Blake3(h) => {
                let hash = h.finalize();
                let mut head = [0u8; 8];
                head.copy_from_slice(&hash.as_bytes()[..8]);
                u64::from_le_bytes(head)
            }
        }
    }
}

/// Deterministic file hasher.
///
/// Cheap to copy; one instance is shared by the walker and group builder.
#[derive(Debug, Clone, Copy)]
pub struct Hasher {
    algorithm: HashAlgorithm,
    seed: u64,
    chunk_size: usize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new(HashAlgorithm::default(), DEFAULT_SEED)
    }
}

impl Hasher {
    /// Create a hasher for the given algorithm and seed.
    #[must_use]
    pub fn new(algorithm: HashAlgorithm, seed: u64) -> Self {
        Self {
            algorithm,
            seed,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set the streaming buffer size (at least [`PREHASH_SIZE`]).
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(PREHASH_SIZE);
        self
    }

    /// Algorithm in use.
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Streaming buffer size in bytes.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    fn state(&self) -> State {
        match self.algorithm {
            HashAlgorithm::Xxh64 => State::Xxh64(xxhash_rust::xxh64::Xxh64::new(self.seed)),
            HashAlgorithm::Blake3 => {
                let mut key = [0u8; 32];
                key[..8].copy_from_slice(&self.seed.to_le_bytes());
                State::Blake3(Box::new(blake3::Hasher::new_keyed(&key)))
            }
        }
    }

    /// Hash an in-memory buffer.
    #[must_use]
    pub fn hash_bytes(&self, data: &[u8]) -> u64 {
        let mut state = self.state();
        state.update(data);
        state.finish()
    }

    /// Hash a first block as if it sat in a zero-filled [`PREHASH_SIZE`] buffer.
    ///
    /// Files shorter than the block are padded; since the file size is part
    /// of every bucket key, padding never merges files of different length.
    #[must_use]
    pub fn hash_block(&self, block: &[u8]) -> u64 {
        let mut padded = [0u8; PREHASH_SIZE];
        let n = block.len().min(PREHASH_SIZE);
        padded[..n].copy_from_slice(&block[..n]);
        self.hash_bytes(&padded)
    }

    /// Hash the entire content of a file, streaming in fixed-size chunks.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read.
    pub fn hash_file(&self, path: &Path) -> Result<u64, HashError> {
        let mut file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let mut buffer = vec![0u8; self.chunk_size];
        let mut state = self.state();

        loop {
            match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => state.update(&buffer[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io(path, e)),
            }
        }

        Ok(state.finish())
    }
}

/// Read up to [`PREHASH_SIZE`] leading bytes of a file.
///
/// # Errors
///
/// Returns [`HashError`] if the file cannot be opened or read.
pub fn read_first_block(path: &Path) -> Result<Vec<u8>, HashError> {
    let mut file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
    let mut block = vec![0u8; PREHASH_SIZE];
    let n = read_full(&mut file, &mut block).map_err(|e| HashError::from_io(path, e))?;
    block.truncate(n);
    Ok(block)
}

/// Fill `buf` as far as the reader allows, returning the byte count.
///
/// Only a short count at end of stream is returned; short reads in the
/// middle are retried.
pub(crate) fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
