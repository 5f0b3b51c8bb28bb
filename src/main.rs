//! `blocksig` command-line tool.
//!
//! Run with:
//!     blocksig --input-file data.bin --signature-file data.sig --block-size 65536

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use blocksig::{Algorithm, Pipeline, SignatureConfig, SignatureError};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(name = "blocksig")]
#[command(about = "Write one checksum per fixed-size block of a file")]
#[command(version)]
struct Cli {
    /// File to compute the signature of
    #[arg(long)]
    input_file: PathBuf,

    /// Where to write the signature
    #[arg(long)]
    signature_file: PathBuf,

    /// Block size in bytes
    #[arg(long, default_value_t = blocksig::DEFAULT_BLOCK_SIZE, value_parser = parse_block_size)]
    block_size: usize,

    /// Checksum algorithm (crc32, blake3)
    #[arg(long, default_value = "crc32")]
    algorithm: Algorithm,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_block_size(s: &str) -> Result<usize, String> {
    let size: usize = s.parse().map_err(|e| format!("{e}"))?;
    if size == 0 {
        return Err("block size must be non-zero".to_string());
    }
    Ok(size)
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // RUST_LOG overrides -v
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("blocksig={level}")));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_names(verbosity >= 2)
        .try_init();
}

fn run(cli: &Cli) -> Result<(), SignatureError> {
    let config = SignatureConfig::new(cli.block_size)?.with_algorithm(cli.algorithm);
    Pipeline::new(config).generate(&cli.input_file, &cli.signature_file)?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            let mut cause = err.source();
            while let Some(e) = cause {
                eprintln!("  caused by: {e}");
                cause = e.source();
            }
            ExitCode::FAILURE
        }
    }
}
