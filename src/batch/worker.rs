//! Processing of a single file under a time budget and a panic guard.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use crossbeam_channel::RecvTimeoutError;

use crate::cancel::CancellationToken;
use crate::error::{Error, Result};
use crate::extract::FragmentExtractor;
use crate::outline::{build_outline, OutlineOptions};
use crate::output::{LogEvent, OutputWriter};

use super::report::{FileOutcome, FileStatus};

const RUNNING: u8 = 0;
const WRITING: u8 = 1;
const ABANDONED: u8 = 2;

/// What a finished pipeline run produced.
#[derive(Debug, Clone)]
struct Processed {
    output: PathBuf,
    page_count: u32,
    entries: usize,
    empty: bool,
}

/// Runs extraction, the outline pipeline and the write for one file.
///
/// Each file runs on its own guard thread. A panic there becomes the
/// file's failure, and when the time budget runs out the thread is told to
/// stop and abandoned. An abandoned thread can no longer write: the handoff
/// between "write" and "abandon" goes through a single compare-and-swap.
pub(crate) struct FileProcessor {
    pub extractor: Arc<dyn FragmentExtractor>,
    pub outline: Arc<OutlineOptions>,
    pub writer: Arc<OutputWriter>,
    pub timeout: Option<Duration>,
}

impl FileProcessor {
    pub fn process(&self, path: &Path) -> FileOutcome {
        let started = Instant::now();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let event = LogEvent::started(filename, Utc::now());

        let result = self.run_guarded(path);
        let elapsed = started.elapsed();

        let (outcome, event) = match result {
            Ok(done) => {
                if done.empty {
                    log::warn!("{}: no extractable text, wrote empty outline", path.display());
                } else {
                    log::info!(
                        "{}: {} outline entries in {:.2}s",
                        path.display(),
                        done.entries,
                        elapsed.as_secs_f64()
                    );
                }
                let event = event.succeeded(Utc::now(), done.page_count, done.entries);
                let outcome = FileOutcome {
                    path: path.to_path_buf(),
                    status: FileStatus::Succeeded {
                        entries: done.entries,
                        empty: done.empty,
                    },
                    output: Some(done.output),
                    elapsed,
                };
                (outcome, event)
            }
            Err(err) => {
                if err.is_defect() {
                    log::error!("{}: {} (file skipped)", path.display(), err);
                } else {
                    log::warn!("{}: {} (file skipped)", path.display(), err);
                }
                let event = event.failed(Utc::now(), err.to_string());
                (FileOutcome::failed(path.to_path_buf(), &err, elapsed), event)
            }
        };

        if let Err(err) = self.writer.write_event(path, &event) {
            log::warn!("{}: could not write log event: {}", path.display(), err);
        }

        outcome
    }

    fn run_guarded(&self, path: &Path) -> Result<Processed> {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let token = CancellationToken::new();
        let state = Arc::new(AtomicU8::new(RUNNING));

        let job = Job {
            extractor: Arc::clone(&self.extractor),
            outline: Arc::clone(&self.outline),
            writer: Arc::clone(&self.writer),
            path: path.to_path_buf(),
            token: token.clone(),
            state: Arc::clone(&state),
        };

        thread::Builder::new()
            .name("pdfoutline-file".to_string())
            .spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| job.run()))
                    .unwrap_or_else(|payload| Err(Error::Panicked(panic_message(payload))));
                let _ = tx.send(result);
            })?;

        let Some(budget) = self.timeout else {
            return rx.recv().unwrap_or_else(|_| Err(disconnected()));
        };

        match rx.recv_timeout(budget) {
            Ok(result) => result,
            Err(RecvTimeoutError::Disconnected) => Err(disconnected()),
            Err(RecvTimeoutError::Timeout) => {
                token.cancel();
                match state.compare_exchange(RUNNING, ABANDONED, Ordering::AcqRel, Ordering::Acquire) {
                    Ok(_) => Err(Error::Timeout(budget)),
                    // The write already started; let it finish.
                    Err(_) => rx.recv().unwrap_or_else(|_| Err(disconnected())),
                }
            }
        }
    }
}

/// Everything the guard thread owns.
struct Job {
    extractor: Arc<dyn FragmentExtractor>,
    outline: Arc<OutlineOptions>,
    writer: Arc<OutputWriter>,
    path: PathBuf,
    token: CancellationToken,
    state: Arc<AtomicU8>,
}

impl Job {
    fn run(&self) -> Result<Processed> {
        log::debug!("{}: extracting with {}", self.path.display(), self.extractor.name());
        let doc = self.extractor.extract(&self.path, &self.token)?;
        let result = build_outline(&doc, &self.outline, Utc::now())?;

        if self
            .state
            .compare_exchange(RUNNING, WRITING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::Cancelled);
        }

        let output = self.writer.write_result(&self.path, &result)?;
        Ok(Processed {
            output,
            page_count: result.metadata.page_count,
            entries: result.outline.len(),
            empty: doc.is_empty(),
        })
    }
}

fn disconnected() -> Error {
    Error::Panicked("worker exited without reporting a result".to_string())
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
