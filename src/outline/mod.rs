//! Outline pipeline: typography profiling, heading classification, outline
//! assembly and title detection.
//!
//! Everything in here is pure, single-threaded computation over one
//! document's fragments; no I/O and no state survives a call.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use pdfoutline::model::{BBox, ExtractedDocument, FontStyle, Fragment};
//! use pdfoutline::outline::{build_outline, OutlineOptions};
//!
//! let fragments = vec![Fragment::new(
//!     "Release Notes",
//!     1,
//!     BBox::new(72.0, 100.0, 250.0, 124.0),
//!     24.0,
//!     FontStyle::default(),
//!     0,
//! )];
//! let doc = ExtractedDocument::new(fragments, 1);
//! let result = build_outline(&doc, &OutlineOptions::default(), Utc::now()).unwrap();
//! assert_eq!(result.title, "Release Notes");
//! assert!(result.outline.is_empty());
//! ```

mod assembler;
mod classifier;
mod numbering;
mod options;
mod profiler;
mod runs;
mod title;

pub use assembler::{assemble, check_nesting, LevelStack};
pub use classifier::{HeadingClassifier, Rejection, StructuralCue};
pub use numbering::{NumberingKind, NumberingMatch, NumberingMatcher};
pub use options::OutlineOptions;
pub use profiler::{profile_typography, rank_heading_styles, RankedStyle, StyleProfile, StyleStats, Typography};
pub use runs::{merge_block_runs, merge_line_runs, TextRun};
pub use title::detect_title;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::model::{DocumentResult, ExtractedDocument, Fragment, OutlineEntry};

/// Run the whole pipeline on one document.
///
/// A document without fragments is not an error: the result has an empty
/// title and outline. Broken fragment ordering and nesting violations are
/// reported as [`Error::ClassificationAnomaly`].
pub fn build_outline(
    doc: &ExtractedDocument,
    options: &OutlineOptions,
    processed_at: DateTime<Utc>,
) -> Result<DocumentResult> {
    if doc.is_empty() {
        log::warn!("Document has no extractable text ({} pages)", doc.page_count);
        return Ok(DocumentResult::empty(doc.page_count, processed_at));
    }

    check_fragment_order(&doc.fragments)?;

    let typography = profile_typography(&doc.fragments, options);
    if !typography.has_heading_styles() {
        log::debug!("No heading styles; relying on numbering only");
    }

    let runs = merge_line_runs(&doc.fragments, options.size_precision);
    let candidates = HeadingClassifier::new(options, &typography).classify(&runs);
    let headings = assemble(candidates, options.max_depth)?;

    let title = detect_title(doc, &typography, &headings, options);

    let outline: Vec<OutlineEntry> = headings
        .into_iter()
        .map(|h| OutlineEntry {
            level: h.level,
            text: h.text,
            page: h.page,
        })
        .collect();
    check_nesting(&outline, options.max_depth)?;

    log::debug!(
        "Built outline: {} entries from {} fragments, title {:?}",
        outline.len(),
        doc.fragments.len(),
        title
    );

    Ok(DocumentResult::new(title, outline, doc.page_count, processed_at))
}

/// Fragments must be strictly ordered by `order_index` with non-decreasing pages.
fn check_fragment_order(fragments: &[Fragment]) -> Result<()> {
    for pair in fragments.windows(2) {
        if pair[1].order_index <= pair[0].order_index {
            return Err(Error::ClassificationAnomaly(format!(
                "fragment order_index {} follows {}",
                pair[1].order_index, pair[0].order_index
            )));
        }
        if pair[1].page < pair[0].page {
            return Err(Error::ClassificationAnomaly(format!(
                "fragment on page {} follows page {}",
                pair[1].page, pair[0].page
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, FontStyle};
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn frag(text: &str, page: u32, y0: f32, size: f32, index: usize) -> Fragment {
        Fragment::new(
            text,
            page,
            BBox::new(72.0, y0, 300.0, y0 + size),
            size,
            FontStyle::default(),
            index,
        )
    }

    #[test]
    fn test_empty_document_yields_empty_result() {
        let doc = ExtractedDocument::new(vec![], 4);
        let result = build_outline(&doc, &OutlineOptions::default(), at()).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.metadata.page_count, 4);
    }

    #[test]
    fn test_unordered_fragments_are_anomaly() {
        let doc = ExtractedDocument::new(vec![frag("b", 1, 100.0, 10.0, 3), frag("a", 1, 120.0, 10.0, 2)], 1);
        let result = build_outline(&doc, &OutlineOptions::default(), at());
        assert!(matches!(result, Err(Error::ClassificationAnomaly(_))));
    }

    #[test]
    fn test_page_regression_is_anomaly() {
        let doc = ExtractedDocument::new(vec![frag("b", 2, 100.0, 10.0, 0), frag("a", 1, 120.0, 10.0, 1)], 2);
        let result = build_outline(&doc, &OutlineOptions::default(), at());
        assert!(matches!(result, Err(Error::ClassificationAnomaly(_))));
    }
}
