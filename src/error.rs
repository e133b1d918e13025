//! Error types for pdfoutline.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for pdfoutline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while building or writing an outline.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// The extractor could not turn the file into fragments.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// An internal pipeline invariant was violated.
    #[error("Classification anomaly: {0}")]
    ClassificationAnomaly(String),

    /// The assembled result does not conform to the output schema.
    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    /// The per-file wall-clock budget was exceeded.
    #[error("Processing exceeded the {}s time budget", .0.as_secs())]
    Timeout(Duration),

    /// Processing was stopped through a cancellation token.
    #[error("Processing cancelled")]
    Cancelled,

    /// The worker processing the file panicked.
    #[error("Worker panicked: {0}")]
    Panicked(String),

    /// Another input of the batch already writes to this output path.
    #[error("Output {} is already written for another input", .0.display())]
    OutputCollision(PathBuf),

    /// JSON serialization failed.
    #[error("JSON serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Invalid configuration value or configuration file.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The input directory or file does not exist.
    #[error("Input not found: {}", .0.display())]
    InputNotFound(PathBuf),
}

/// Coarse classification of errors, used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Unreadable, encrypted or corrupted source PDF.
    Extraction,
    /// Internal invariant violated.
    ClassificationAnomaly,
    /// Assembled result failed validation.
    SchemaViolation,
    /// Per-file time budget exceeded.
    Timeout,
    /// Stopped by a cancellation request.
    Cancelled,
    /// Output could not be serialized or written.
    Output,
    /// Fatal setup problem (configuration, missing input).
    Setup,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Extraction => "extraction",
            ErrorKind::ClassificationAnomaly => "classification anomaly",
            ErrorKind::SchemaViolation => "schema violation",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Output => "output",
            ErrorKind::Setup => "setup",
        };
        f.write_str(name)
    }
}

impl Error {
    /// Classify this error for reporting.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnknownFormat
            | Error::UnsupportedVersion(_)
            | Error::Encrypted
            | Error::Extraction(_)
            | Error::Panicked(_) => ErrorKind::Extraction,
            Error::ClassificationAnomaly(_) => ErrorKind::ClassificationAnomaly,
            Error::SchemaViolation(_) => ErrorKind::SchemaViolation,
            Error::Timeout(_) => ErrorKind::Timeout,
            Error::Cancelled => ErrorKind::Cancelled,
            Error::Io(_) | Error::Serialize(_) | Error::OutputCollision(_) => ErrorKind::Output,
            Error::Config(_) | Error::InputNotFound(_) => ErrorKind::Setup,
        }
    }

    /// Whether this error should abort a whole batch run.
    ///
    /// Only setup errors are fatal; everything else is scoped to one file.
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Setup
    }

    /// Whether this error indicates a defect in the pipeline rather than in the input.
    pub fn is_defect(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::ClassificationAnomaly | ErrorKind::SchemaViolation
        )
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::Extraction(err.to_string()),
        }
    }
}
