//! Turning PDF files into positioned text fragments.
//!
//! The outline pipeline only ever sees [`ExtractedDocument`]s; the
//! [`FragmentExtractor`] trait is the seam where a different PDF backend can
//! be plugged in.

mod content;
mod pdf;

pub use pdf::LopdfExtractor;

use std::path::Path;

use crate::cancel::CancellationToken;
use crate::error::Result;
use crate::model::ExtractedDocument;

/// Source of fragments for one PDF file.
///
/// Implementations must return fragments in reading order with strictly
/// increasing `order_index`, and should check `cancel` between pages,
/// returning [`Error::Cancelled`](crate::Error::Cancelled) once it is set.
pub trait FragmentExtractor: Send + Sync {
    /// Extract all fragments and the page count of `path`.
    fn extract(&self, path: &Path, cancel: &CancellationToken) -> Result<ExtractedDocument>;

    /// Short backend name used in logs.
    fn name(&self) -> &str;
}
