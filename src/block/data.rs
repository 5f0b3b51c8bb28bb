//! The Block type - one fixed-size slice of the source file.

use bytes::Bytes;
use std::fmt;

/// A block of the source file.
///
/// Blocks are produced in file order by the segmenter and moved by value
/// into the digester; nothing mutates a block after it is built. Every block
/// is exactly `block_size` bytes except possibly the last one.
///
/// # Example
///
/// ```
/// use blocksig::Block;
/// use bytes::Bytes;
///
/// let block = Block::new(Bytes::from_static(b"hello world"), 2, 20);
///
/// assert_eq!(block.len(), 11);
/// assert_eq!(block.range(), 20..31);
/// ```
///
/// A block has a single owner; it cannot be cloned.
///
/// ```compile_fail
/// fn shared<T: Clone>() {}
/// shared::<blocksig::Block>();
/// ```
#[derive(Debug, PartialEq, Eq)]
pub struct Block {
    data: Bytes,
    index: u64,
    offset: u64,
}

impl Block {
    /// Creates a block from its bytes, its position in the block sequence,
    /// and its byte offset in the source.
    pub fn new(data: impl Into<Bytes>, index: u64, offset: u64) -> Self {
        Self {
            data: data.into(),
            index,
            offset,
        }
    }

    /// Returns the block bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the zero-based position of this block in the file.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Returns the byte offset of this block in the file.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns the length of the block.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the block has no data.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the byte range this block covers in the source.
    pub fn range(&self) -> std::ops::Range<u64> {
        self.offset..self.offset + self.data.len() as u64
    }

    /// Consumes the block and returns the underlying data.
    pub fn into_data(self) -> Bytes {
        self.data
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Block #{} ({} bytes @ {})",
            self.index,
            self.len(),
            self.offset
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let block = Block::new(&b"hello"[..], 0, 0);
        assert_eq!(block.len(), 5);
        assert!(!block.is_empty());
        assert_eq!(block.data(), b"hello");
    }

    #[test]
    fn test_position() {
        let block = Block::new(vec![0u8; 10], 3, 30);
        assert_eq!(block.index(), 3);
        assert_eq!(block.offset(), 30);
        assert_eq!(block.range(), 30..40);
    }

    #[test]
    fn test_into_data() {
        let block = Block::new(Bytes::from_static(b"abc"), 0, 0);
        assert_eq!(block.into_data(), Bytes::from_static(b"abc"));
    }

    #[test]
    fn test_display() {
        let s = Block::new(&b"hello"[..], 1, 100).to_string();
        assert!(s.contains("#1"));
        assert!(s.contains("5 bytes"));
        assert!(s.contains("@ 100"));
    }
}
