//! Splits the source file into ordered fixed-size blocks.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};

use super::StageOutcome;
use crate::block::Block;
use crate::error::SignatureError;
use crate::handoff::{Signal, Sink};

/// Reads a file sequentially and hands it downstream as blocks.
///
/// Every block is exactly `block_size` bytes except possibly the last one;
/// an empty file yields no blocks. Exactly one terminal signal is raised
/// per run: `finish` on clean end of file, `fail` on any I/O error.
#[derive(Debug, Clone)]
pub struct Segmenter {
    path: PathBuf,
    block_size: usize,
}

impl Segmenter {
    /// Creates a segmenter for `path`.
    pub fn new(path: impl Into<PathBuf>, block_size: usize) -> Self {
        Self {
            path: path.into(),
            block_size,
        }
    }

    /// Returns the source path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the block size in bytes.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Opens the source and segments it into `out`.
    pub fn run<D>(&self, out: &D) -> Result<StageOutcome, SignatureError>
    where
        D: Sink<Block> + Signal + ?Sized,
    {
        if self.block_size == 0 {
            out.fail();
            return Err(SignatureError::InvalidConfig {
                message: "block size must be non-zero",
            });
        }

        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(source) => {
                warn!(path = %self.path.display(), error = %source, "segmenter: open failed");
                out.fail();
                return Err(SignatureError::Open {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        self.run_reader(file, out)
    }

    /// Segments an already-open reader into `out`.
    ///
    /// Errors are attributed to this segmenter's path.
    pub fn run_reader<R, D>(&self, mut reader: R, out: &D) -> Result<StageOutcome, SignatureError>
    where
        R: Read,
        D: Sink<Block> + Signal + ?Sized,
    {
        debug!(path = %self.path.display(), block_size = self.block_size, "segmenter: started");

        match self.segment(&mut reader, out) {
            Ok(Some((blocks, bytes))) => {
                out.finish();
                debug!(blocks, bytes, "segmenter: finished");
                Ok(StageOutcome::Completed {
                    items: blocks,
                    bytes,
                })
            }
            Ok(None) => {
                debug!("segmenter: downstream closed, stopping");
                Ok(StageOutcome::Aborted)
            }
            Err(source) => {
                warn!(path = %self.path.display(), error = %source, "segmenter: read failed");
                out.fail();
                Err(SignatureError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        }
    }

    /// Pushes blocks until EOF. Returns the block and byte counts, or
    /// `None` if downstream closed early.
    fn segment<R, D>(&self, reader: &mut R, out: &D) -> io::Result<Option<(u64, u64)>>
    where
        R: Read,
        D: Sink<Block> + ?Sized,
    {
        let mut index = 0u64;
        let mut offset = 0u64;

        loop {
            if out.is_closed() {
                return Ok(None);
            }

            let buf = read_block(reader, self.block_size)?;
            let n = buf.len();
            if n == 0 {
                break;
            }

            trace!(index, offset, len = n, "segmenter: block");
            out.push(Block::new(buf, index, offset));

            index += 1;
            offset += n as u64;

            if n < self.block_size {
                break;
            }
        }

        Ok(Some((index, offset)))
    }
}

/// Initial buffer capacity for one block. Buffers grow with the data
/// actually read, so a huge block size over a small file stays small.
const READ_CAPACITY: usize = 64 * 1024;

/// Reads up to `limit` bytes, stopping early only at EOF.
///
/// Capacity doubles as data arrives but never exceeds `limit`.
fn read_block<R: Read + ?Sized>(reader: &mut R, limit: usize) -> io::Result<Vec<u8>> {
    let mut buf = vec![0u8; limit.min(READ_CAPACITY)];
    let mut filled = 0;

    while filled < limit {
        if filled == buf.len() {
            let grow = filled.min(limit - filled);
            buf.reserve_exact(grow);
            buf.resize(filled + grow, 0);
        }

        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    buf.truncate(filled);
    Ok(buf)
}
