//! The three-stage signature pipeline.
//!
//! ```text
//! Segmenter --Handoff<Block>--> Digester --Handoff<Checksum>--> Persister
//! ```
//!
//! - [`Segmenter`] - Reads the source into ordered blocks
//! - [`Digester`] - Turns blocks into checksums, in arrival order
//! - [`Persister`] - Writes the checksums once the run has succeeded
//! - [`Pipeline`] - Runs all three on their own threads and aggregates the outcome
//!
//! Failure travels downstream through the handoffs' `failed` flag; the
//! coordinator closes a failed stage's input so the stage above stops too.

mod coordinator;
mod digester;
mod persister;
mod segmenter;

use std::fmt;

pub use coordinator::{Pipeline, Summary, generate};
pub use digester::Digester;
pub use persister::{Persister, load_signature};
pub use segmenter::Segmenter;

/// Identifies a pipeline stage in errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Reads the source file into blocks.
    Segmenter,
    /// Checksums blocks.
    Digester,
    /// Writes the signature file.
    Persister,
}

impl Stage {
    /// Lowercase stage name.
    pub fn name(self) -> &'static str {
        match self {
            Stage::Segmenter => "segmenter",
            Stage::Digester => "digester",
            Stage::Persister => "persister",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a stage that did not error ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// The stage processed its whole input.
    Completed {
        /// Items produced (blocks, checksums, or lines written).
        items: u64,
        /// Bytes read, hashed, or written.
        bytes: u64,
    },
    /// The stage stopped because the run failed elsewhere.
    Aborted,
}

impl StageOutcome {
    /// Returns the byte count of a completed stage.
    pub fn bytes(&self) -> Option<u64> {
        match self {
            StageOutcome::Completed { bytes, .. } => Some(*bytes),
            StageOutcome::Aborted => None,
        }
    }

    /// Returns the item count of a completed stage.
    pub fn items(&self) -> Option<u64> {
        match self {
            StageOutcome::Completed { items, .. } => Some(*items),
            StageOutcome::Aborted => None,
        }
    }
}
