//! Turns blocks into checksums, preserving arrival order.

use tracing::{debug, trace, warn};

use super::StageOutcome;
use crate::block::{Block, Checksum};
use crate::checksum::BlockHasher;
use crate::error::SignatureError;
use crate::handoff::{Handoff, Next, Signal, Sink};

/// Checksums blocks one at a time, in the order they arrive.
///
/// The digester only reads its input's terminal flags; it never fails its
/// input. When the input fails it discards whatever is still queued and
/// fails its output, so the persister never mistakes an aborted run for a
/// finished one.
#[derive(Debug, Clone)]
pub struct Digester<H> {
    hasher: H,
}

impl<H: BlockHasher> Digester<H> {
    /// Creates a digester using `hasher`.
    pub fn new(hasher: H) -> Self {
        Self { hasher }
    }

    /// Returns the hasher.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Consumes `input` until it is finished or failed.
    ///
    /// On a checksum error the output is failed *and* finished before the
    /// error is returned, so the downstream wait always ends.
    pub fn run<D>(&self, input: &Handoff<Block>, out: &D) -> Result<StageOutcome, SignatureError>
    where
        D: Sink<Checksum> + Signal + ?Sized,
    {
        debug!(algorithm = self.hasher.name(), "digester: started");
        let mut forwarded = 0u64;
        let mut hashed = 0u64;

        loop {
            let block = match input.pop() {
                Next::Item(block) => block,
                Next::Finished => {
                    out.finish();
                    debug!(checksums = forwarded, "digester: finished");
                    return Ok(StageOutcome::Completed {
                        items: forwarded,
                        bytes: hashed,
                    });
                }
                Next::Failed => {
                    debug!(checksums = forwarded, "digester: upstream failed, stopping");
                    out.fail();
                    return Ok(StageOutcome::Aborted);
                }
            };

            if out.is_closed() {
                debug!(checksums = forwarded, "digester: downstream closed, stopping");
                return Ok(StageOutcome::Aborted);
            }

            match self.hasher.checksum(block.data()) {
                Ok(checksum) => {
                    trace!(index = block.index(), %checksum, "digester: checksum");
                    out.push(checksum);
                    forwarded += 1;
                    hashed += block.len() as u64;
                }
                Err(err) => {
                    warn!(index = block.index(), error = %err, "digester: checksum failed");
                    out.fail();
                    out.finish();
                    return Err(err);
                }
            }
        }
    }
}
