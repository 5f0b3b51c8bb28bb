//! blocksig
//!
//! Block-level file signatures for Rust.
//!
//! `blocksig` splits a file into fixed-size blocks, checksums every block,
//! and writes the ordered checksums to a signature file, one decimal value
//! per line. It is a building block for:
//!
//! - delta transfer (find the blocks that changed)
//! - content verification against a remembered signature
//!
//! The crate intentionally:
//! - does NOT reconstruct or sync files
//! - does NOT provide tamper-proof integrity (checksums are fingerprints)
//!
//! Reading, hashing and writing run concurrently on three threads joined by
//! FIFO handoffs. The signature is either complete and in block order, or
//! the destination is left exactly as it was.
//!
//! # Example
//!
//! ```no_run
//! use blocksig::{Pipeline, SignatureConfig, SignatureError};
//!
//! fn main() -> Result<(), SignatureError> {
//!     let pipeline = Pipeline::new(SignatureConfig::default());
//!     let summary = pipeline.generate("data.bin", "data.sig")?;
//!     println!("{} blocks", summary.blocks);
//!
//!     let checksums = blocksig::load_signature("data.sig")?;
//!     assert_eq!(checksums.len() as u64, summary.blocks);
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod block;
mod checksum;
mod config;
mod error;
mod pipeline;

pub mod handoff;

//
// Public surface
//

pub use block::{Block, Checksum};
pub use checksum::{Algorithm, BlockHasher, Crc32};
pub use config::{DEFAULT_BLOCK_SIZE, SignatureConfig};
pub use error::SignatureError;
pub use pipeline::{
    Digester, Persister, Pipeline, Segmenter, Stage, StageOutcome, Summary, generate,
    load_signature,
};

#[cfg(feature = "hash-blake3")]
pub use checksum::Blake3Prefix;
