//! # pdfoutline
//!
//! Title and heading outline extraction for PDF documents.
//!
//! The library turns a PDF into a [`DocumentResult`]: a title plus an
//! ordered, well-nested list of headings with their level and page. Heading
//! levels are inferred per document from typography (font size and weight
//! relative to the body text) and from numbering such as `2.1` or
//! `Chapter 3`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfoutline::{extract_outline, OutlineOptions};
//!
//! fn main() -> pdfoutline::Result<()> {
//!     let result = extract_outline("report.pdf", &OutlineOptions::default())?;
//!     println!("{}", result.title);
//!     for entry in &result.outline {
//!         println!("{} {} (p. {})", entry.level, entry.text, entry.page);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Batch processing
//!
//! ```no_run
//! use pdfoutline::batch::{discover_inputs, BatchOptions, BatchProcessor};
//! use pdfoutline::{LopdfExtractor, OutlineOptions};
//!
//! fn main() -> pdfoutline::Result<()> {
//!     let inputs = discover_inputs("input".as_ref())?;
//!     let options = BatchOptions::new().with_output_dir("output");
//!     let processor = BatchProcessor::new(LopdfExtractor::new(), OutlineOptions::default(), options);
//!     let summary = processor.run(&inputs, |outcome| println!("{}", outcome.path.display()))?;
//!     println!("{} of {} succeeded", summary.succeeded, summary.total);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`extract`]: PDF to positioned text fragments
//! - [`outline`]: typography profiling, heading classification, assembly, title
//! - [`output`]: schema validation and atomic JSON output
//! - [`batch`]: parallel processing of many files with per-file isolation

pub mod batch;
pub mod cancel;
pub mod detect;
pub mod error;
pub mod extract;
pub mod model;
pub mod outline;
pub mod output;
mod text;

pub use cancel::CancellationToken;
pub use error::{Error, ErrorKind, Result};
pub use extract::{FragmentExtractor, LopdfExtractor};
pub use model::{DocumentResult, ExtractedDocument, Fragment, HeadingLevel, OutlineEntry};
pub use outline::{build_outline, OutlineOptions};
pub use output::JsonFormat;

use std::path::Path;

use chrono::Utc;

/// Extract the outline of one PDF file with the lopdf backend.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::{extract_outline, OutlineOptions};
///
/// let result = extract_outline("manual.pdf", &OutlineOptions::default()).unwrap();
/// println!("{} headings", result.outline.len());
/// ```
pub fn extract_outline<P: AsRef<Path>>(path: P, options: &OutlineOptions) -> Result<DocumentResult> {
    options.validate()?;
    let doc = LopdfExtractor::new().extract(path.as_ref(), &CancellationToken::new())?;
    build_outline(&doc, options, Utc::now())
}

/// Build an outline from fragments produced by any extractor.
pub fn outline_from_fragments(
    fragments: Vec<Fragment>,
    page_count: u32,
    options: &OutlineOptions,
) -> Result<DocumentResult> {
    build_outline(&ExtractedDocument::new(fragments, page_count), options, Utc::now())
}
