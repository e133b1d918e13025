//! Batch orchestration: input discovery and bounded parallel processing.
//!
//! Every file is processed independently on a pool of worker threads. A
//! failure is recorded as that file's [`FileOutcome`] and never stops the
//! batch; only setup problems (missing input, unusable output directory,
//! invalid options) make [`BatchProcessor::run`] return an error.

mod options;
mod report;
mod worker;

pub use options::{default_workers, BatchOptions};
pub use report::{BatchSummary, FailureRecord, FileOutcome, FileStatus};

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cancel::CancellationToken;
use crate::detect::has_pdf_extension;
use crate::error::{Error, Result};
use crate::extract::FragmentExtractor;
use crate::outline::OutlineOptions;
use crate::output::OutputWriter;

use worker::FileProcessor;

/// List the PDF files directly inside `dir`, sorted by path.
pub fn discover_inputs(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::InputNotFound(dir.to_path_buf()));
    }

    let mut inputs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_pdf_extension(&path) {
            inputs.push(path);
        }
    }
    inputs.sort();

    log::info!("Found {} PDF file(s) in {}", inputs.len(), dir.display());
    Ok(inputs)
}

/// Check a single input file given on the command line.
pub fn single_input(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.is_file() {
        return Err(Error::InputNotFound(path.to_path_buf()));
    }
    Ok(vec![path.to_path_buf()])
}

/// Runs the outline pipeline over many files.
pub struct BatchProcessor {
    extractor: Arc<dyn FragmentExtractor>,
    outline: Arc<OutlineOptions>,
    options: BatchOptions,
    cancel: CancellationToken,
}

impl BatchProcessor {
    pub fn new<E: FragmentExtractor + 'static>(
        extractor: E,
        outline: OutlineOptions,
        options: BatchOptions,
    ) -> Self {
        Self {
            extractor: Arc::new(extractor),
            outline: Arc::new(outline),
            options,
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally owned stop signal (e.g. one set from a SIGINT handler).
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// The token that stops dispatching new files when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Process `inputs`, calling `progress` with each outcome as it arrives.
    ///
    /// Outcomes arrive in completion order; the returned summary lists
    /// failures by path. Files not yet started when the token is cancelled
    /// are reported as [`FileStatus::Cancelled`]; files already running
    /// finish normally. An input whose output name is already taken by an
    /// earlier input (`report.pdf` and `report.PDF`, or equal stems from two
    /// directories) fails with [`Error::OutputCollision`] and is not run.
    pub fn run<F>(&self, inputs: &[PathBuf], mut progress: F) -> Result<BatchSummary>
    where
        F: FnMut(&FileOutcome),
    {
        self.outline.validate()?;

        let writer = OutputWriter::new(&self.options.output_dir)
            .with_log_dir(self.options.log_dir.clone())
            .with_format(self.options.json_format);
        writer.prepare().map_err(|e| {
            Error::Config(format!(
                "cannot create output directory {}: {}",
                self.options.output_dir.display(),
                e
            ))
        })?;

        let workers = self.options.workers.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("pdfoutline-worker-{i}"))
            .build()
            .map_err(|e| Error::Config(format!("cannot start worker pool: {e}")))?;

        log::info!(
            "Processing {} file(s) with {} worker(s) using {}",
            inputs.len(),
            workers,
            self.extractor.name()
        );

        let processor = Arc::new(FileProcessor {
            extractor: Arc::clone(&self.extractor),
            outline: Arc::clone(&self.outline),
            writer: Arc::new(writer),
            timeout: self.options.timeout,
        });

        let started = Instant::now();
        let (tx, rx) = crossbeam_channel::unbounded();

        // Output names are compared case-insensitively; the first input wins.
        let mut claimed = HashSet::with_capacity(inputs.len());

        for path in inputs {
            let target = processor.writer.result_path(path);
            if !claimed.insert(target.to_string_lossy().to_lowercase()) {
                let err = Error::OutputCollision(target);
                log::warn!("{}: {} (file skipped)", path.display(), err);
                let _ = tx.send(FileOutcome::failed(path.clone(), &err, Duration::ZERO));
                continue;
            }

            let tx = tx.clone();
            let processor = Arc::clone(&processor);
            let cancel = self.cancel.clone();
            let path = path.clone();
            pool.spawn(move || {
                let outcome = if cancel.is_cancelled() {
                    FileOutcome::cancelled(path)
                } else {
                    processor.process(&path)
                };
                let _ = tx.send(outcome);
            });
        }
        drop(tx);

        let mut outcomes = Vec::with_capacity(inputs.len());
        for outcome in rx.iter() {
            progress(&outcome);
            outcomes.push(outcome);
        }

        let summary = BatchSummary::from_outcomes(&outcomes, started.elapsed());
        if self.cancel.is_cancelled() {
            log::warn!("Batch cancelled: {} file(s) not processed", summary.cancelled);
        }
        log::info!(
            "Batch finished: {} succeeded ({} empty), {} failed in {:.2}s",
            summary.succeeded,
            summary.empty,
            summary.failed,
            summary.elapsed.as_secs_f64()
        );
        Ok(summary)
    }
}
