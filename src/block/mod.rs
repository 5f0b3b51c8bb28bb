//! Block and checksum types.
//!
//! - [`Block`] - Fixed-size slice of the source file, in file order
//! - [`Checksum`] - Signed 32-bit fingerprint of one block

mod checksum;
mod data;

pub use checksum::Checksum;
pub use data::Block;
