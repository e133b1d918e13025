//! Options for batch runs.

use std::path::PathBuf;
use std::time::Duration;

use crate::output::JsonFormat;

/// Batch processing options.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Number of files processed in parallel.
    pub workers: usize,

    /// Per-file wall-clock budget; `None` disables it.
    pub timeout: Option<Duration>,

    /// Directory receiving one `<stem>.json` per input.
    pub output_dir: PathBuf,

    /// Optional directory receiving one `<stem>.log.json` per input.
    pub log_dir: Option<PathBuf>,

    pub json_format: JsonFormat,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            timeout: Some(Duration::from_secs(120)),
            output_dir: PathBuf::from("output"),
            log_dir: None,
            json_format: JsonFormat::Pretty,
        }
    }
}

impl BatchOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker count; 0 falls back to the default.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = if workers == 0 { default_workers() } else { workers };
        self
    }

    /// Set the per-file timeout; a zero duration disables it.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json_format = format;
        self
    }
}

/// One worker per CPU, leaving one for the rest of the system.
pub fn default_workers() -> usize {
    num_cpus::get().saturating_sub(1).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = BatchOptions::default();
        assert!(options.workers >= 1);
        assert_eq!(options.timeout, Some(Duration::from_secs(120)));
        assert_eq!(options.json_format, JsonFormat::Pretty);
        assert!(options.log_dir.is_none());
    }

    #[test]
    fn test_builder() {
        let options = BatchOptions::new()
            .with_workers(3)
            .with_timeout(Some(Duration::ZERO))
            .with_output_dir("out")
            .with_log_dir("logs")
            .with_json_format(JsonFormat::Compact);

        assert_eq!(options.workers, 3);
        assert_eq!(options.timeout, None);
        assert_eq!(options.output_dir, PathBuf::from("out"));
        assert_eq!(options.log_dir, Some(PathBuf::from("logs")));
        assert_eq!(options.json_format, JsonFormat::Compact);
    }

    #[test]
    fn test_zero_workers_uses_default() {
        assert_eq!(BatchOptions::new().with_workers(0).workers, default_workers());
    }
}
