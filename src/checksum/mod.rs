//! Block checksum algorithms.
//!
//! The digester is generic over [`BlockHasher`], a pure function from block
//! bytes to a [`Checksum`]. It is fallible so that plugged-in algorithms can
//! reject input; the built-in ones never fail.
//!
//! - [`Crc32`] - CRC-32 (IEEE), the default
//! - [`Blake3Prefix`] - First four bytes of BLAKE3 (requires `hash-blake3` feature)

mod crc32;

#[cfg(feature = "hash-blake3")]
mod blake3;

use std::fmt;
use std::str::FromStr;

pub use crc32::Crc32;

#[cfg(feature = "hash-blake3")]
pub use self::blake3::Blake3Prefix;

use crate::block::Checksum;
use crate::error::SignatureError;

/// Computes one checksum per block.
///
/// Implementations must be deterministic: identical bytes always give the
/// identical checksum, independent of where the block sits in the file.
pub trait BlockHasher: Send + Sync {
    /// Computes the checksum of one block.
    fn checksum(&self, data: &[u8]) -> Result<Checksum, SignatureError>;

    /// Short algorithm name used in logs and errors.
    fn name(&self) -> &'static str;
}

impl<H: BlockHasher + ?Sized> BlockHasher for Box<H> {
    fn checksum(&self, data: &[u8]) -> Result<Checksum, SignatureError> {
        (**self).checksum(data)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

impl<H: BlockHasher + ?Sized> BlockHasher for &H {
    fn checksum(&self, data: &[u8]) -> Result<Checksum, SignatureError> {
        (**self).checksum(data)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Built-in checksum algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    /// CRC-32 (IEEE polynomial).
    #[default]
    Crc32,
    /// BLAKE3 truncated to 32 bits.
    #[cfg(feature = "hash-blake3")]
    Blake3,
}

impl Algorithm {
    /// Returns a hasher implementing this algorithm.
    pub fn hasher(self) -> Box<dyn BlockHasher> {
        match self {
            Algorithm::Crc32 => Box::new(Crc32),
            #[cfg(feature = "hash-blake3")]
            Algorithm::Blake3 => Box::new(Blake3Prefix),
        }
    }

    /// Returns the algorithm name.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Crc32 => "crc32",
            #[cfg(feature = "hash-blake3")]
            Algorithm::Blake3 => "blake3",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "crc32" => Ok(Algorithm::Crc32),
            #[cfg(feature = "hash-blake3")]
            "blake3" => Ok(Algorithm::Blake3),
            _ => Err(SignatureError::InvalidConfig {
                message: "unknown checksum algorithm",
            }),
        }
    }
}
