//! Block checksum type.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// A fixed-width fingerprint of one block.
///
/// Stored as a signed 32-bit integer because that is how signature files
/// spell it: unsigned algorithm output above `i32::MAX` is written with a
/// leading minus sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Checksum(i32);

impl Checksum {
    /// Creates a checksum from its signed value.
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Reinterprets unsigned algorithm output as a checksum.
    pub const fn from_u32(value: u32) -> Self {
        Self(value as i32)
    }

    /// Returns the signed value, as written to signature files.
    pub const fn as_i32(&self) -> i32 {
        self.0
    }

    /// Returns the raw bits as an unsigned value.
    pub const fn as_u32(&self) -> u32 {
        self.0 as u32
    }
}

impl From<i32> for Checksum {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Checksum {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i32>().map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_decimal() {
        assert_eq!(Checksum::new(100).to_string(), "100");
        assert_eq!(Checksum::new(-100).to_string(), "-100");
        assert_eq!(Checksum::new(0).to_string(), "0");
    }

    #[test]
    fn test_from_u32_wraps_high_values() {
        let checksum = Checksum::from_u32(0xFFFF_FFFF);
        assert_eq!(checksum.as_i32(), -1);
        assert_eq!(checksum.as_u32(), 0xFFFF_FFFF);
        assert_eq!(checksum.to_string(), "-1");
    }

    #[test]
    fn test_parse() {
        assert_eq!("112844655".parse::<Checksum>(), Ok(Checksum::new(112844655)));
        assert_eq!("-7".parse::<Checksum>(), Ok(Checksum::new(-7)));
        assert!("".parse::<Checksum>().is_err());
        assert!("0x10".parse::<Checksum>().is_err());
        assert!("4294967295".parse::<Checksum>().is_err());
    }
}
