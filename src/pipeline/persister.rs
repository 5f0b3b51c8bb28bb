//! Writes the signature file once every checksum is in.

use std::fs::{self, File};
use std::fmt::Write as _;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::StageOutcome;
use crate::block::Checksum;
use crate::error::SignatureError;
use crate::handoff::{Handoff, Terminal};

/// Persists the ordered checksums as a signature file.
///
/// One line per checksum, decimal, newline-terminated. Nothing is written
/// unless the run finished: the persister waits for its input to reach a
/// terminal state and returns without touching the destination on failure.
/// Writes go to a temporary file next to the destination that replaces it
/// atomically, so a failed write never leaves a partial signature behind.
#[derive(Debug, Clone)]
pub struct Persister {
    path: PathBuf,
}

impl Persister {
    /// Creates a persister writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the destination path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Waits for `input` to finish or fail, then writes the signature.
    pub fn run(&self, input: &Handoff<Checksum>) -> Result<StageOutcome, SignatureError> {
        debug!(path = %self.path.display(), "persister: waiting");

        let checksums = match input.wait_terminal() {
            Terminal::Finished(checksums) => checksums,
            Terminal::Failed => {
                debug!(path = %self.path.display(), "persister: run failed, leaving destination untouched");
                return Ok(StageOutcome::Aborted);
            }
        };

        let bytes = match self.write(&checksums) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "persister: write failed");
                return Err(err);
            }
        };

        debug!(lines = checksums.len(), bytes, "persister: finished");
        Ok(StageOutcome::Completed {
            items: checksums.len() as u64,
            bytes,
        })
    }

    /// Atomically replaces the destination with `checksums`, returning the
    /// number of bytes written.
    pub fn write<'a, I>(&self, checksums: I) -> Result<u64, SignatureError>
    where
        I: IntoIterator<Item = &'a Checksum>,
    {
        let tmp = self.create_temp()?;
        let mut writer = BufWriter::new(tmp);
        let mut line = String::new();
        let mut written = 0u64;

        for checksum in checksums {
            line.clear();
            // Infallible for String.
            let _ = writeln!(line, "{}", checksum);
            writer
                .write_all(line.as_bytes())
                .map_err(|e| self.write_error(e))?;
            written += line.len() as u64;
        }

        let tmp = writer
            .into_inner()
            .map_err(|e| self.write_error(e.into_error()))?;
        tmp.as_file().sync_all().map_err(|e| self.write_error(e))?;
        tmp.persist(&self.path)
            .map_err(|e| self.write_error(e.error))?;

        Ok(written)
    }

    /// Creates the temporary file in the destination's directory, so the
    /// final rename never crosses file systems.
    fn create_temp(&self) -> Result<NamedTempFile, SignatureError> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let tmp = tempfile::Builder::new()
            .prefix(".blocksig-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|source| SignatureError::Open {
                path: self.path.clone(),
                source,
            })?;

        // Keep an existing signature's permissions.
        if let Ok(meta) = fs::metadata(&self.path) {
            tmp.as_file()
                .set_permissions(meta.permissions())
                .map_err(|e| self.write_error(e))?;
        }

        Ok(tmp)
    }

    fn write_error(&self, source: io::Error) -> SignatureError {
        SignatureError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

/// Reads a signature file back into its checksums, in file order.
///
/// # Example
///
/// ```no_run
/// let checksums = blocksig::load_signature("data.sig")?;
/// println!("{} blocks", checksums.len());
/// # Ok::<(), blocksig::SignatureError>(())
/// ```
pub fn load_signature(path: impl AsRef<Path>) -> Result<Vec<Checksum>, SignatureError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| SignatureError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut checksums = Vec::new();
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|source| SignatureError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let checksum = line.parse::<Checksum>().map_err(|_| SignatureError::Parse {
            path: path.to_path_buf(),
            line: i + 1,
            text: line.clone(),
        })?;
        checksums.push(checksum);
    }

    Ok(checksums)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handoff::{Signal, Sink};
    use std::thread;

    fn checksums(values: &[i32]) -> Vec<Checksum> {
        values.iter().copied().map(Checksum::new).collect()
    }

    #[test]
    fn test_start_stop_writes_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.signature");
        let input = Handoff::new();
        let persister = Persister::new(&path);

        thread::scope(|s| {
            let writer = s.spawn(|| persister.run(&input));
            input.finish();
            assert_eq!(
                writer.join().unwrap().unwrap(),
                StageOutcome::Completed { items: 0, bytes: 0 }
            );
        });

        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_write_one_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.signature");
        let input = Handoff::new();
        input.push(Checksum::new(100));
        input.finish();

        let outcome = Persister::new(&path).run(&input).unwrap();

        assert_eq!(outcome, StageOutcome::Completed { items: 1, bytes: 4 });
        assert_eq!(fs::read_to_string(&path).unwrap(), "100\n");
    }

    #[test]
    fn test_write_three_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.signature");
        let input = Handoff::new();
        let persister = Persister::new(&path);

        thread::scope(|s| {
            let writer = s.spawn(|| persister.run(&input));
            for checksum in checksums(&[100, -100, 0]) {
                input.push(checksum);
            }
            input.finish();
            writer.join().unwrap().unwrap();
        });

        assert_eq!(fs::read_to_string(&path).unwrap(), "100\n-100\n0\n");
        assert_eq!(load_signature(&path).unwrap(), checksums(&[100, -100, 0]));
    }

    #[test]
    fn test_failure_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.signature");
        let input = Handoff::new();
        let persister = Persister::new(&path);

        thread::scope(|s| {
            let writer = s.spawn(|| persister.run(&input));
            input.push(Checksum::new(100));
            input.fail();
            assert_eq!(writer.join().unwrap().unwrap(), StageOutcome::Aborted);
        });

        assert!(!path.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_failure_leaves_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.signature");
        fs::write(&path, "old\n").unwrap();

        let input = Handoff::new();
        input.push(Checksum::new(1));
        input.finish();
        input.fail();

        assert_eq!(Persister::new(&path).run(&input).unwrap(), StageOutcome::Aborted);
        assert_eq!(fs::read_to_string(&path).unwrap(), "old\n");
    }

    #[test]
    fn test_replaces_existing_signature() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.signature");
        fs::write(&path, "1\n2\n3\n4\n").unwrap();

        Persister::new(&path).write(&checksums(&[7])).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "7\n");
        // No temporary files left behind
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_missing_directory_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/test.signature");

        let err = Persister::new(&path).write(&checksums(&[1])).unwrap_err();
        assert!(matches!(err, SignatureError::Open { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.signature");
        fs::write(&path, "1\nnope\n").unwrap();

        match load_signature(&path).unwrap_err() {
            SignatureError::Parse { line, text, .. } => {
                assert_eq!(line, 2);
                assert_eq!(text, "nope");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_signature(dir.path().join("missing")).unwrap_err();
        assert_eq!(
            err.io_error().map(io::Error::kind),
            Some(io::ErrorKind::NotFound)
        );
    }
}
