//! BLAKE3-based block checksums.

use super::BlockHasher;
use crate::block::Checksum;
use crate::error::SignatureError;

/// BLAKE3 truncated to its first four bytes (little-endian).
///
/// Slower than [`Crc32`](super::Crc32) but with far better diffusion, which
/// matters when blocks differ only in a few bits.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3Prefix;

impl Blake3Prefix {
    /// Checksums `data` in one shot.
    pub fn hash(data: &[u8]) -> Checksum {
        let digest = blake3::hash(data);
        let bytes = digest.as_bytes();
        Checksum::from_u32(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

impl BlockHasher for Blake3Prefix {
    fn checksum(&self, data: &[u8]) -> Result<Checksum, SignatureError> {
        Ok(Self::hash(data))
    }

    fn name(&self) -> &'static str {
        "blake3"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash() {
        let hash = Blake3Prefix::hash(b"hello world");

        // Hash should be deterministic
        assert_eq!(hash, Blake3Prefix::hash(b"hello world"));

        // Different data should give different hash
        assert_ne!(hash, Blake3Prefix::hash(b"hello world!"));
    }

    #[test]
    fn test_matches_digest_prefix() {
        let full = blake3::hash(b"abc");
        let expected = u32::from_le_bytes(full.as_bytes()[..4].try_into().unwrap());
        assert_eq!(Blake3Prefix::hash(b"abc").as_u32(), expected);
    }
}
