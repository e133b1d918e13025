//! Per-file outcomes and the batch summary.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, ErrorKind};

/// How processing of one file ended.
#[derive(Debug, Clone, PartialEq)]
pub enum FileStatus {
    /// A result was written.
    Succeeded {
        /// Number of outline entries.
        entries: usize,
        /// The document had no extractable text.
        empty: bool,
    },
    /// No result was written.
    Failed { kind: ErrorKind, message: String },
    /// The file was never started because the batch was cancelled.
    Cancelled,
}

/// Outcome of one input file, sent to the progress callback and the summary.
#[derive(Debug, Clone, PartialEq)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub status: FileStatus,
    /// Path of the written result, on success.
    pub output: Option<PathBuf>,
    pub elapsed: Duration,
}

impl FileOutcome {
    pub fn failed(path: PathBuf, error: &Error, elapsed: Duration) -> Self {
        Self {
            path,
            status: FileStatus::Failed {
                kind: error.kind(),
                message: error.to_string(),
            },
            output: None,
            elapsed,
        }
    }

    pub fn cancelled(path: PathBuf) -> Self {
        Self {
            path,
            status: FileStatus::Cancelled,
            output: None,
            elapsed: Duration::ZERO,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, FileStatus::Succeeded { .. })
    }
}

/// A failed file in the summary.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureRecord {
    pub path: PathBuf,
    pub kind: ErrorKind,
    pub message: String,
}

/// Counts for a whole batch run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Succeeded files without any extractable text (also counted in `succeeded`).
    pub empty: usize,
    pub cancelled: usize,
    /// Outline entries written across all files.
    pub entries: usize,
    pub elapsed: Duration,
    /// Failures sorted by path.
    pub failures: Vec<FailureRecord>,
}

impl BatchSummary {
    /// Build a summary from outcomes; failures are listed by path.
    pub fn from_outcomes(outcomes: &[FileOutcome], elapsed: Duration) -> Self {
        let mut summary = Self {
            elapsed,
            ..Self::default()
        };
        for outcome in outcomes {
            summary.record(outcome);
        }
        summary.failures.sort_by(|a, b| a.path.cmp(&b.path));
        summary
    }

    pub fn record(&mut self, outcome: &FileOutcome) {
        self.total += 1;
        match &outcome.status {
            FileStatus::Succeeded { entries, empty } => {
                self.succeeded += 1;
                self.entries += entries;
                if *empty {
                    self.empty += 1;
                }
            }
            FileStatus::Failed { kind, message } => {
                self.failed += 1;
                self.failures.push(FailureRecord {
                    path: outcome.path.clone(),
                    kind: *kind,
                    message: message.clone(),
                });
            }
            FileStatus::Cancelled => self.cancelled += 1,
        }
    }

    /// Whether every file produced a result.
    pub fn all_succeeded(&self) -> bool {
        self.succeeded == self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(path: &str, entries: usize, empty: bool) -> FileOutcome {
        FileOutcome {
            path: PathBuf::from(path),
            status: FileStatus::Succeeded { entries, empty },
            output: Some(PathBuf::from(path).with_extension("json")),
            elapsed: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_summary_counts() {
        let outcomes = vec![
            ok("b.pdf", 4, false),
            FileOutcome::failed(PathBuf::from("c.pdf"), &Error::Encrypted, Duration::ZERO),
            ok("a.pdf", 0, true),
            FileOutcome::failed(PathBuf::from("a2.pdf"), &Error::Timeout(Duration::from_secs(1)), Duration::ZERO),
            FileOutcome::cancelled(PathBuf::from("d.pdf")),
        ];
        let summary = BatchSummary::from_outcomes(&outcomes, Duration::from_secs(2));

        assert_eq!(summary.total, 5);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.empty, 1);
        assert_eq!(summary.cancelled, 1);
        assert_eq!(summary.entries, 4);
        assert!(!summary.all_succeeded());

        let kinds: Vec<ErrorKind> = summary.failures.iter().map(|f| f.kind).collect();
        assert_eq!(kinds, vec![ErrorKind::Timeout, ErrorKind::Extraction]);
    }

    #[test]
    fn test_empty_batch_is_all_succeeded() {
        assert!(BatchSummary::from_outcomes(&[], Duration::ZERO).all_succeeded());
    }
}
