//! Configuration for signature generation.
//!
//! - [`SignatureConfig`] - Block size and checksum algorithm
//!
//! # Example
//!
//! ```
//! use blocksig::{Algorithm, SignatureConfig};
//!
//! // Custom block size
//! let config = SignatureConfig::new(64 * 1024)?;
//!
//! // Builder pattern
//! let config = SignatureConfig::default()
//!     .with_block_size(4096)
//!     .with_algorithm(Algorithm::Crc32);
//!
//! # Ok::<(), blocksig::SignatureError>(())
//! ```

use crate::checksum::Algorithm;
use crate::error::SignatureError;

/// Default block size (1 MiB).
pub const DEFAULT_BLOCK_SIZE: usize = 1 << 20;

/// Configuration for one signature run.
///
/// The block size must be non-zero. Every block is exactly `block_size`
/// bytes except possibly the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignatureConfig {
    block_size: usize,
    algorithm: Algorithm,
}

impl SignatureConfig {
    /// Creates a new configuration with the default algorithm.
    ///
    /// Returns error if `block_size` is zero.
    pub fn new(block_size: usize) -> Result<Self, SignatureError> {
        let config = Self {
            block_size,
            algorithm: Algorithm::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Sets the block size.
    ///
    /// Note: This does not validate the configuration. Use
    /// [`SignatureConfig::validate`] to check it.
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Sets the checksum algorithm.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Returns the block size in bytes.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Returns the checksum algorithm.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Validates the current configuration.
    pub fn validate(&self) -> Result<(), SignatureError> {
        if self.block_size == 0 {
            return Err(SignatureError::InvalidConfig {
                message: "block size must be non-zero",
            });
        }
        Ok(())
    }
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            algorithm: Algorithm::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SignatureConfig::default();
        assert_eq!(config.block_size(), 1024 * 1024);
        assert_eq!(config.algorithm(), Algorithm::Crc32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = SignatureConfig::default().with_block_size(10);
        assert_eq!(config.block_size(), 10);
    }

    #[test]
    fn test_invalid_zero_block_size() {
        assert!(SignatureConfig::new(0).is_err());
        assert!(SignatureConfig::default().with_block_size(0).validate().is_err());
    }

    #[test]
    fn test_non_power_of_two_is_fine() {
        assert_eq!(SignatureConfig::new(10).unwrap().block_size(), 10);
    }
}
