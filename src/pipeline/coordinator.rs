//! Runs the three stages concurrently and reports one outcome.

use std::fmt;
use std::io;
use std::path::Path;
use std::thread::{self, Scope, ScopedJoinHandle};

use tracing::{debug, info, warn};

use super::{Digester, Persister, Segmenter, Stage, StageOutcome};
use crate::block::{Block, Checksum};
use crate::checksum::BlockHasher;
use crate::config::SignatureConfig;
use crate::error::SignatureError;
use crate::handoff::{Handoff, Signal};

/// What a successful run produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    /// Blocks read from the source.
    pub blocks: u64,
    /// Bytes read from the source.
    pub bytes: u64,
    /// Checksums written to the signature.
    pub checksums: u64,
}

/// Generates block signatures.
///
/// Each [`generate`](Pipeline::generate) call builds two fresh handoffs and
/// runs the segmenter, digester and persister on their own threads. The
/// signature file is either complete and in block order, or untouched.
///
/// # Example
///
/// ```no_run
/// use blocksig::{Pipeline, SignatureConfig};
///
/// let pipeline = Pipeline::new(SignatureConfig::new(64 * 1024)?);
/// let summary = pipeline.generate("data.bin", "data.sig")?;
/// println!("{} blocks", summary.blocks);
/// # Ok::<(), blocksig::SignatureError>(())
/// ```
pub struct Pipeline<H = Box<dyn BlockHasher>> {
    config: SignatureConfig,
    hasher: H,
}

impl Pipeline {
    /// Creates a pipeline using the configured algorithm.
    pub fn new(config: SignatureConfig) -> Self {
        Self {
            config,
            hasher: config.algorithm().hasher(),
        }
    }
}

impl<H: BlockHasher> Pipeline<H> {
    /// Creates a pipeline with a custom checksum algorithm.
    ///
    /// The configured [`Algorithm`](crate::Algorithm) is ignored.
    pub fn with_hasher(config: SignatureConfig, hasher: H) -> Self {
        Self { config, hasher }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SignatureConfig {
        &self.config
    }

    /// Computes the signature of `input` and writes it to `signature`.
    ///
    /// When several stages fail, the upstream-most error is reported
    /// (segmenter, then digester, then persister), wrapped with the stage
    /// and input path.
    pub fn generate(
        &self,
        input: impl AsRef<Path>,
        signature: impl AsRef<Path>,
    ) -> Result<Summary, SignatureError> {
        self.config.validate()?;
        let input = input.as_ref();
        let signature = signature.as_ref();

        debug!(
            input = %input.display(),
            signature = %signature.display(),
            block_size = self.config.block_size(),
            algorithm = self.hasher.name(),
            "generate: starting"
        );

        let blocks: Handoff<Block> = Handoff::new();
        let checksums: Handoff<Checksum> = Handoff::new();

        let segmenter = Segmenter::new(input, self.config.block_size());
        let digester = Digester::new(&self.hasher);
        let persister = Persister::new(signature);

        // Handoffs each stage fails if it unwinds: its output, plus the
        // block handoff so the segmenter stops reading.
        let segmenter_out: [&(dyn Signal + Sync); 1] = [&blocks];
        let downstream_out: [&(dyn Signal + Sync); 2] = [&checksums, &blocks];

        let results = thread::scope(|s| {
            let handles = [
                spawn_stage(s, Stage::Segmenter, &segmenter_out, || segmenter.run(&blocks)),
                spawn_stage(s, Stage::Digester, &downstream_out, || {
                    let result = digester.run(&blocks, &checksums);
                    if result.is_err() {
                        // Stop the segmenter from reading blocks nobody will hash.
                        blocks.fail();
                    }
                    result
                }),
                spawn_stage(s, Stage::Persister, &downstream_out, || {
                    persister.run(&checksums)
                }),
            ];

            [Stage::Segmenter, Stage::Digester, Stage::Persister]
                .into_iter()
                .zip(handles)
                .map(|(stage, handle)| join_stage(stage, handle))
                .collect::<Vec<_>>()
        });

        let summary = aggregate(input, results)?;
        info!(
            input = %input.display(),
            blocks = summary.blocks,
            bytes = summary.bytes,
            "generate: signature written"
        );
        Ok(summary)
    }
}

impl<H: BlockHasher> fmt::Debug for Pipeline<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("hasher", &self.hasher.name())
            .finish()
    }
}

/// Generates the signature of `input` with the default algorithm.
///
/// # Example
///
/// ```no_run
/// blocksig::generate("data.bin", "data.sig", 1 << 20)?;
/// # Ok::<(), blocksig::SignatureError>(())
/// ```
pub fn generate(
    input: impl AsRef<Path>,
    signature: impl AsRef<Path>,
    block_size: usize,
) -> Result<Summary, SignatureError> {
    Pipeline::new(SignatureConfig::new(block_size)?).generate(input, signature)
}

type StageResult = Result<StageOutcome, SignatureError>;

/// Fails the given handoffs if the stage thread unwinds.
struct AbortOnUnwind<'a> {
    stage: Stage,
    handoffs: &'a [&'a (dyn Signal + Sync)],
}

impl Drop for AbortOnUnwind<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            warn!(stage = %self.stage, "stage panicked, aborting run");
            for handoff in self.handoffs {
                handoff.fail();
            }
        }
    }
}

fn spawn_stage<'scope, 'env, F>(
    scope: &'scope Scope<'scope, 'env>,
    stage: Stage,
    handoffs: &'env [&'env (dyn Signal + Sync)],
    run: F,
) -> io::Result<ScopedJoinHandle<'scope, StageResult>>
where
    F: FnOnce() -> StageResult + Send + 'scope,
{
    let spawned = thread::Builder::new()
        .name(format!("blocksig-{stage}"))
        .spawn_scoped(scope, move || {
            let _guard = AbortOnUnwind { stage, handoffs };
            run()
        });

    if spawned.is_err() {
        // Whichever stages did start must not wait on this one.
        for handoff in handoffs {
            handoff.fail();
        }
    }
    spawned
}

fn join_stage(
    stage: Stage,
    handle: io::Result<ScopedJoinHandle<'_, StageResult>>,
) -> (Stage, StageResult) {
    let result = match handle {
        Ok(handle) => handle
            .join()
            .unwrap_or_else(|_| Err(SignatureError::Panicked { stage })),
        Err(source) => Err(SignatureError::Spawn { stage, source }),
    };
    (stage, result)
}

/// Picks the upstream-most failure, or builds the summary.
fn aggregate(
    input: &Path,
    results: Vec<(Stage, StageResult)>,
) -> Result<Summary, SignatureError> {
    let mut summary = Summary::default();
    let mut aborted = false;

    for (stage, result) in results {
        match result {
            Ok(StageOutcome::Completed { items, bytes }) => match stage {
                Stage::Segmenter => {
                    summary.blocks = items;
                    summary.bytes = bytes;
                }
                Stage::Digester => {}
                Stage::Persister => summary.checksums = items,
            },
            Ok(StageOutcome::Aborted) => aborted = true,
            Err(err @ (SignatureError::Panicked { .. } | SignatureError::Spawn { .. })) => {
                return Err(err);
            }
            Err(source) => {
                warn!(%stage, input = %input.display(), error = %source, "generate: stage failed");
                return Err(SignatureError::Stage {
                    stage,
                    input: input.to_path_buf(),
                    source: Box::new(source),
                });
            }
        }
    }

    if aborted {
        return Err(SignatureError::Aborted);
    }
    Ok(summary)
}
