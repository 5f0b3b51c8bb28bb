//! CRC-32 block checksums.

use super::BlockHasher;
use crate::block::Checksum;
use crate::error::SignatureError;

/// CRC-32 with the IEEE polynomial.
#[derive(Debug, Clone, Copy, Default)]
pub struct Crc32;

impl Crc32 {
    /// Checksums `data` in one shot.
    pub fn hash(data: &[u8]) -> Checksum {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(data);
        Checksum::from_u32(hasher.finalize())
    }
}

impl BlockHasher for Crc32 {
    fn checksum(&self, data: &[u8]) -> Result<Checksum, SignatureError> {
        Ok(Self::hash(data))
    }

    fn name(&self) -> &'static str {
        "crc32"
    }
}
