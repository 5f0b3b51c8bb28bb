//! Error types for blocksig.

use std::path::PathBuf;

use crate::pipeline::Stage;

/// Errors that can occur while generating or loading a signature.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    /// A file could not be opened (source unreadable or destination unwritable).
    #[error("couldn't open {}", path.display())]
    Open {
        /// The offending path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Reading the source failed mid-stream.
    #[error("couldn't read {}", path.display())]
    Read {
        /// The offending path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Writing the signature failed.
    #[error("couldn't write {}", path.display())]
    Write {
        /// The offending path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The checksum algorithm rejected a block.
    #[error("{algorithm} checksum failed: {message}")]
    Checksum {
        /// Name of the algorithm that failed.
        algorithm: &'static str,
        /// Description of the failure.
        message: String,
    },

    /// Invalid configuration parameter.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },

    /// A signature line is not a decimal checksum.
    #[error("{}:{line}: not a checksum: {text:?}", path.display())]
    Parse {
        /// The signature file.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// The rejected text.
        text: String,
    },

    /// A pipeline stage failed while generating the signature of `input`.
    #[error("generate error: {stage} failed for {}", input.display())]
    Stage {
        /// The stage that failed first.
        stage: Stage,
        /// The source file of the run.
        input: PathBuf,
        /// What went wrong inside the stage.
        #[source]
        source: Box<SignatureError>,
    },

    /// The run was aborted without any stage reporting an error.
    #[error("pipeline aborted")]
    Aborted,

    /// A stage thread could not be started.
    #[error("couldn't start {stage} thread")]
    Spawn {
        /// The stage that never ran.
        stage: Stage,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// A stage thread panicked.
    #[error("{stage} panicked")]
    Panicked {
        /// The stage whose thread panicked.
        stage: Stage,
    },
}

impl SignatureError {
    /// Returns the stage a wrapped error originated from.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            SignatureError::Stage { stage, .. }
            | SignatureError::Spawn { stage, .. }
            | SignatureError::Panicked { stage } => Some(*stage),
            _ => None,
        }
    }

    /// Walks the `Stage` wrappers down to the innermost error.
    pub fn root(&self) -> &SignatureError {
        let mut err = self;
        while let SignatureError::Stage { source, .. } = err {
            err = source;
        }
        err
    }

    /// Returns the underlying I/O error, if the root cause is one.
    pub fn io_error(&self) -> Option<&std::io::Error> {
        match self.root() {
            SignatureError::Open { source, .. }
            | SignatureError::Read { source, .. }
            | SignatureError::Write { source, .. } => Some(source),
            _ => None,
        }
    }
}
