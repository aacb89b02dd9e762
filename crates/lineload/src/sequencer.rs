//! Source sequencing and the import run
//!
//! An [`Importer`] reads its sources strictly one after another. For each
//! source it splits chunks into lines, builds a [`Record`] per line, runs the
//! transformation hook and dispatches accepted documents to the store. The
//! next file is opened only once the previous one is fully read and every
//! one of its lines has been handed on.
//!
//! Writes are not part of that ordering: inserts dispatched for one file may
//! still be resolving while the next file is read. The run completes when the
//! last source is read and the [`CompletionBarrier`](crate::tracker::CompletionBarrier)
//! reports every write resolved.

use futures::StreamExt;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, instrument, trace};

use crate::error::{ImportError, Result};
use crate::record::{random_source_name, Record};
use crate::splitter::{Line, LineSplitter};
use crate::store::DocumentStore;
use crate::tracker::{InsertionTracker, PendingWrite, WriteSummary};
use crate::transform::{Outcome, Transform, ID_FIELD};

/// Argument selecting standard input
pub const STDIN_ARG: &str = "-";

/// Default read size per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Default cadence of the "waiting for inserts" log.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(10);

/// What a run reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSet {
    /// Standard input, with the name used in record ids
    Stdin { name: String },
    /// Files, read in the given order
    Files(Vec<PathBuf>),
}

impl SourceSet {
    /// Interpret positional arguments
    ///
    /// `-` alone reads stdin under a random name, `- prefix` uses `prefix`.
    /// Anything else is a list of files. Stdin and files never mix.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();

        match args.as_slice() {
            [] => Err(ImportError::config(
                "no sources given (use '-' to read from standard input)",
            )),
            [STDIN_ARG] => Ok(SourceSet::Stdin {
                name: random_source_name(),
            }),
            [STDIN_ARG, prefix] => {
                if prefix.is_empty() {
                    return Err(ImportError::config("id prefix must not be empty"));
                }
                Ok(SourceSet::Stdin {
                    name: prefix.to_string(),
                })
            },
            [STDIN_ARG, ..] => Err(ImportError::config(
                "standard input takes at most one id prefix",
            )),
            files => {
                if files.contains(&STDIN_ARG) {
                    return Err(ImportError::config(
                        "'-' must come first and cannot be combined with files",
                    ));
                }
                Ok(SourceSet::Files(files.iter().map(PathBuf::from).collect()))
            },
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SourceSet::Stdin { .. } => 1,
            SourceSet::Files(paths) => paths.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Per-source line counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SourceStats {
    pub lines: u64,
    pub skipped: u64,
    pub dispatched: u64,
}

impl std::ops::AddAssign for SourceStats {
    fn add_assign(&mut self, other: Self) {
        self.lines += other.lines;
        self.skipped += other.skipped;
        self.dispatched += other.dispatched;
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub sources: usize,
    pub lines: u64,
    pub skipped: u64,
    pub writes: WriteSummary,
    pub elapsed: Duration,
}

/// Drives an import from sources to store
pub struct Importer {
    store: Arc<dyn DocumentStore>,
    transform: Arc<dyn Transform>,
    chunk_size: usize,
    progress_interval: Duration,
}

impl Importer {
    pub fn new(store: Arc<dyn DocumentStore>, transform: Arc<dyn Transform>) -> Self {
        Self {
            store,
            transform,
            chunk_size: DEFAULT_CHUNK_SIZE,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// Bytes requested per read (at least 1)
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Zero disables the progress log
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Import `sources`, reading the process's stdin in stdin mode
    pub async fn run(&self, sources: &SourceSet) -> Result<RunSummary> {
        self.run_with_stdin(sources, tokio::io::stdin()).await
    }

    /// Import `sources`, with `stdin` standing in for standard input
    ///
    /// Resolves once every source is read and every dispatched write has
    /// resolved. If reading or the hook fails, the writes already dispatched
    /// are still awaited before the error is returned.
    pub async fn run_with_stdin<R>(&self, sources: &SourceSet, stdin: R) -> Result<RunSummary>
    where
        R: AsyncRead + Unpin,
    {
        let started = Instant::now();
        let tracker = InsertionTracker::new();

        let read = self.read_sources(&tracker, sources, stdin).await;
        let writes = tracker.into_barrier().wait(self.progress_interval).await;
        let totals = read?;

        let summary = RunSummary {
            sources: sources.len(),
            lines: totals.lines,
            skipped: totals.skipped,
            writes,
            elapsed: started.elapsed(),
        };

        info!(
            sources = summary.sources,
            lines = summary.lines,
            skipped = summary.skipped,
            inserted = summary.writes.succeeded,
            failed = summary.writes.failed,
            "Import complete in {:.2}s",
            summary.elapsed.as_secs_f64()
        );

        Ok(summary)
    }

    async fn read_sources<R>(
        &self,
        tracker: &InsertionTracker,
        sources: &SourceSet,
        stdin: R,
    ) -> Result<SourceStats>
    where
        R: AsyncRead + Unpin,
    {
        match sources {
            SourceSet::Stdin { name } => {
                info!("Processing stdin with id: {}", name);
                self.import_reader(tracker, name, stdin).await
            },
            SourceSet::Files(paths) => {
                let mut totals = SourceStats::default();
                for path in paths {
                    let name = path.display().to_string();
                    info!("Processing {}", name);

                    let file = tokio::fs::File::open(path)
                        .await
                        .map_err(|source| ImportError::SourceOpen {
                            path: path.clone(),
                            source,
                        })?;
                    totals += self.import_reader(tracker, &name, file).await?;
                }
                Ok(totals)
            },
        }
    }

    /// Read one source to its end, dispatching a write per accepted line
    ///
    /// Returns once the last line has been handed to the hook; the writes
    /// themselves may still be in flight on `tracker`.
    #[instrument(skip(self, tracker, reader))]
    pub async fn import_reader<R>(
        &self,
        tracker: &InsertionTracker,
        name: &str,
        reader: R,
    ) -> Result<SourceStats>
    where
        R: AsyncRead + Unpin,
    {
        let source: Arc<str> = Arc::from(name);
        let mut chunks = ReaderStream::with_capacity(reader, self.chunk_size);
        let mut splitter = LineSplitter::new();
        let mut stats = SourceStats::default();

        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(|source| ImportError::SourceRead {
                name: name.to_string(),
                source,
            })?;
            trace!(bytes = chunk.len(), "Chunk received");
            splitter.feed(&chunk, |line| {
                self.handle_line(tracker, &source, line, &mut stats)
            })?;
        }
        splitter.finish(|line| self.handle_line(tracker, &source, line, &mut stats))?;

        info!(
            lines = stats.lines,
            skipped = stats.skipped,
            dispatched = stats.dispatched,
            "Finished {}",
            name
        );
        Ok(stats)
    }

    fn handle_line(
        &self,
        tracker: &InsertionTracker,
        source: &Arc<str>,
        line: Line,
        stats: &mut SourceStats,
    ) -> Result<()> {
        let text = String::from_utf8(line.bytes)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned());
        let record = Record::build(source, line.number, text);
        stats.lines += 1;

        let outcome =
            self.transform
                .transform(&record)
                .map_err(|source_err| ImportError::Transform {
                    name: record.filename.clone(),
                    line_number: record.line_number,
                    source: source_err,
                })?;

        match outcome {
            Outcome::Skipped => {
                stats.skipped += 1;
                debug!(line = record.line_number, "Line skipped by transform");
            },
            Outcome::Accepted(document) => {
                stats.dispatched += 1;
                let id = document_id(&document).unwrap_or(record.record_id);
                tracker.dispatch(
                    Arc::clone(&self.store),
                    PendingWrite {
                        source: Arc::clone(source),
                        line_number: record.line_number,
                        text: record.text,
                        id,
                        document,
                    },
                );
            },
        }

        Ok(())
    }
}

/// Store key carried by the document itself, if any
///
/// A string `_id` is used verbatim; any other non-null `_id` by its JSON text.
fn document_id(document: &Value) -> Option<String> {
    match document.get(ID_FIELD)? {
        Value::Null => None,
        Value::String(id) => Some(id.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_id() {
        assert_eq!(document_id(&json!({"_id": "a-1"})), Some("a-1".to_string()));
        assert_eq!(document_id(&json!({"_id": 42})), Some("42".to_string()));
        assert_eq!(document_id(&json!({"_id": null})), None);
        assert_eq!(document_id(&json!({"text": "x"})), None);
        assert_eq!(document_id(&json!("bare")), None);
    }

    #[test]
    fn test_from_args_files() {
        let sources = SourceSet::from_args(&["a.txt", "logs/b.txt"]).unwrap();
        assert_eq!(
            sources,
            SourceSet::Files(vec![PathBuf::from("a.txt"), PathBuf::from("logs/b.txt")])
        );
        assert_eq!(sources.len(), 2);
    }

    #[test]
    fn test_from_args_stdin_with_prefix() {
        let sources = SourceSet::from_args(&["-", "batch7"]).unwrap();
        assert_eq!(
            sources,
            SourceSet::Stdin {
                name: "batch7".to_string()
            }
        );
    }

    #[test]
    fn test_from_args_stdin_without_prefix_generates_name() {
        match SourceSet::from_args(&["-"]).unwrap() {
            SourceSet::Stdin { name } => {
                assert_eq!(name.len(), crate::record::RANDOM_NAME_LEN);
                assert!(name.chars().all(|c| c.is_ascii_alphanumeric()));
            },
            other => panic!("expected stdin, got {:?}", other),
        }
    }

    #[test]
    fn test_from_args_rejects_bad_combinations() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            SourceSet::from_args(&empty),
            Err(ImportError::Config(_))
        ));
        assert!(SourceSet::from_args(&["-", "p", "extra"]).is_err());
        assert!(SourceSet::from_args(&["a.txt", "-"]).is_err());
        assert!(SourceSet::from_args(&["-", ""]).is_err());
    }

    #[test]
    fn test_source_stats_add() {
        let mut total = SourceStats {
            lines: 3,
            skipped: 1,
            dispatched: 2,
        };
        total += SourceStats {
            lines: 1,
            skipped: 0,
            dispatched: 1,
        };
        assert_eq!(
            total,
            SourceStats {
                lines: 4,
                skipped: 1,
                dispatched: 3
            }
        );
    }
}
