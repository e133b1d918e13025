//! Atomic persistence of results and log events.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::model::DocumentResult;

use super::event::LogEvent;
use super::json::{to_json, JsonFormat};
use super::schema::SchemaValidator;

/// Output path for an input file: `<dir>/<stem><suffix>`.
pub fn output_path_for(input: &Path, dir: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    dir.join(format!("{stem}{suffix}"))
}

/// Write `contents` to `path` so readers never observe a partial file.
///
/// The data goes to a temporary file in the destination directory, is
/// flushed, and then renamed over `path`.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

/// Validates and writes results and log events for a batch.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    output_dir: PathBuf,
    log_dir: Option<PathBuf>,
    format: JsonFormat,
    validator: SchemaValidator,
}

impl OutputWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            log_dir: None,
            format: JsonFormat::default(),
            validator: SchemaValidator::new(),
        }
    }

    /// Also write one log event per input into `dir`.
    pub fn with_log_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.log_dir = dir;
        self
    }

    pub fn with_format(mut self, format: JsonFormat) -> Self {
        self.format = format;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create the output (and log) directories.
    pub fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.output_dir)?;
        if let Some(dir) = &self.log_dir {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Where the result for `input` is written.
    pub fn result_path(&self, input: &Path) -> PathBuf {
        output_path_for(input, &self.output_dir, ".json")
    }

    /// Serialize, validate and atomically write the result for `input`.
    ///
    /// Nothing is written when validation fails.
    pub fn write_result(&self, input: &Path, result: &DocumentResult) -> Result<PathBuf> {
        let value = serde_json::to_value(result)?;
        self.validator.validate(&value)?;

        let path = self.result_path(input);
        let mut json = to_json(&value, self.format)?;
        json.push('\n');
        write_atomic(&path, json.as_bytes())?;
        Ok(path)
    }

    /// Write the log event for `input`, if a log directory is configured.
    pub fn write_event(&self, input: &Path, event: &LogEvent) -> Result<Option<PathBuf>> {
        let Some(dir) = &self.log_dir else {
            return Ok(None);
        };
        let path = output_path_for(input, dir, ".log.json");
        let json = to_json(&event.wrapped(), JsonFormat::Pretty)?;
        write_atomic(&path, json.as_bytes())?;
        Ok(Some(path))
    }
}
