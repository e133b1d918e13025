//! Title detection.

use crate::model::{ExtractedDocument, Fragment, HeadingCandidate};
use crate::text::{collapse_whitespace, has_alphabetic, truncate_chars};

use super::profiler::Typography;
use super::runs::{merge_block_runs, merge_line_runs, TextRun};
use super::OutlineOptions;

/// Pick the document title from the leading pages.
///
/// The first page with at least one qualifying run decides; later pages are
/// only consulted when earlier ones have none, up to `title_search_pages`.
/// Level-1 headings in `outline` are excluded by position: a run sharing a
/// fragment with a level-1 heading never becomes the title.
///
/// When the document has heading styles, body-text runs never qualify and
/// wrapped lines of one heading style are joined. A single-style document
/// takes its title from single lines of body text instead.
pub fn detect_title(
    doc: &ExtractedDocument,
    typography: &Typography,
    outline: &[HeadingCandidate],
    options: &OutlineOptions,
) -> String {
    let last_page = doc.page_count.max(doc.fragments.last().map(|f| f.page).unwrap_or(0));
    let search_end = options.title_search_pages.min(last_page);
    let styled = typography.has_heading_styles();

    for page in 1..=search_end {
        let fragments: Vec<Fragment> = doc.fragments.iter().filter(|f| f.page == page).cloned().collect();
        if fragments.is_empty() {
            continue;
        }

        let band = HeaderFooterBand::for_page(doc, page, &fragments, options.header_footer_margin);
        let lines = merge_line_runs(&fragments, options.size_precision);
        let runs = if styled { merge_block_runs(&lines) } else { lines };

        let best = runs
            .iter()
            .filter(|run| !(styled && typography.profile.is_body(&run.signature)))
            .filter(|run| has_alphabetic(&run.text))
            .filter(|run| !band.contains(run))
            .filter(|run| !covers_level_one_heading(run, outline))
            .fold(None::<&TextRun>, |best, run| match best {
                Some(b) if b.font_size >= run.font_size => Some(b),
                _ => Some(run),
            });

        if let Some(run) = best {
            let title = truncate_chars(&collapse_whitespace(&run.text), options.max_title_chars);
            log::debug!("Title {:?} from page {} ({:.1}pt)", title, page, run.font_size);
            return title;
        }
    }

    String::new()
}

/// Whether the run shares any fragment with a level-1 heading.
fn covers_level_one_heading(run: &TextRun, outline: &[HeadingCandidate]) -> bool {
    outline.iter().any(|h| {
        h.level.depth() == 1 && h.order_index <= run.last_order_index && run.order_index <= h.last_order_index
    })
}

/// Running header and footer zones of one page.
struct HeaderFooterBand {
    top: f32,
    bottom: f32,
}

impl HeaderFooterBand {
    /// Bands are measured against the page geometry. When the geometry is
    /// unknown the page is taken to run from the top edge down to its lowest
    /// text.
    fn for_page(doc: &ExtractedDocument, page: u32, fragments: &[Fragment], margin: f32) -> Self {
        let height = match doc.page(page) {
            Some(geometry) => geometry.height,
            None => fragments.iter().map(|f| f.bbox.y1).fold(0.0, f32::max),
        };
        Self {
            top: height * margin,
            bottom: height - height * margin,
        }
    }

    fn contains(&self, run: &TextRun) -> bool {
        run.bbox.y1 <= self.top || run.bbox.y0 >= self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, FontStyle, HeadingLevel, PageGeometry};
    use crate::outline::profiler::profile_typography;

    fn frag(text: &str, page: u32, y0: f32, size: f32, index: usize) -> Fragment {
        Fragment::new(
            text,
            page,
            BBox::new(72.0, y0, 72.0 + text.len() as f32 * size * 0.5, y0 + size),
            size,
            FontStyle::default(),
            index,
        )
    }

    fn letter_page(doc: ExtractedDocument) -> ExtractedDocument {
        let pages = (1..=doc.page_count)
            .map(|number| PageGeometry {
                number,
                width: 612.0,
                height: 792.0,
            })
            .collect();
        doc.with_pages(pages)
    }

    fn detect(doc: &ExtractedDocument, outline: &[HeadingCandidate], options: &OutlineOptions) -> String {
        let typography = profile_typography(&doc.fragments, options);
        detect_title(doc, &typography, outline, options)
    }

    fn level_one(text: &str, order_index: usize) -> HeadingCandidate {
        HeadingCandidate {
            level: HeadingLevel::TOP,
            text: text.to_string(),
            page: 1,
            order_index,
            last_order_index: order_index,
            confidence: 0.9,
        }
    }

    #[test]
    fn test_largest_run_wins() {
        let doc = letter_page(ExtractedDocument::new(
            vec![
                frag("Quarterly Review", 1, 100.0, 28.0, 0),
                frag("Prepared by the finance team", 1, 140.0, 12.0, 1),
            ],
            1,
        ));
        assert_eq!(detect(&doc, &[], &OutlineOptions::default()), "Quarterly Review");
    }

    #[test]
    fn test_ties_go_to_first_occurrence() {
        let doc = letter_page(ExtractedDocument::new(
            vec![
                frag("only body text here", 1, 100.0, 11.0, 0),
                frag("and more body text", 1, 200.0, 11.0, 1),
            ],
            1,
        ));
        assert_eq!(detect(&doc, &[], &OutlineOptions::default()), "only body text here");
    }

    #[test]
    fn test_running_header_is_skipped() {
        let doc = letter_page(ExtractedDocument::new(
            vec![
                frag("ACME CONFIDENTIAL", 1, 8.0, 24.0, 0),
                frag("Design Notes", 1, 120.0, 20.0, 1),
                frag("Page 1", 1, 770.0, 10.0, 2),
            ],
            1,
        ));
        assert_eq!(detect(&doc, &[], &OutlineOptions::default()), "Design Notes");
    }

    #[test]
    fn test_running_header_is_skipped_without_page_geometry() {
        let doc = ExtractedDocument::new(
            vec![
                frag("DRAFT COPY", 1, 10.0, 20.0, 0),
                frag("Design Review", 1, 100.0, 18.0, 1),
                frag("The review covers the storage layer", 1, 150.0, 10.0, 2),
                frag("and the replication protocol", 1, 162.0, 10.0, 3),
                frag("Printed on recycled paper", 1, 700.0, 10.0, 4),
            ],
            1,
        );
        assert!(doc.page(1).is_none());
        assert_eq!(detect(&doc, &[], &OutlineOptions::default()), "Design Review");
    }

    #[test]
    fn test_level_one_heading_is_excluded_by_position() {
        let doc = letter_page(ExtractedDocument::new(
            vec![
                frag("Introduction", 1, 100.0, 20.0, 0),
                frag("Welcome to the guide", 1, 140.0, 14.0, 1),
                frag("This guide explains the basics", 1, 180.0, 10.0, 2),
            ],
            1,
        ));
        let outline = vec![level_one("Introduction", 0)];
        assert_eq!(detect(&doc, &outline, &OutlineOptions::default()), "Welcome to the guide");
    }

    #[test]
    fn test_wrapped_level_one_heading_is_excluded() {
        let doc = letter_page(ExtractedDocument::new(
            vec![
                frag("Guidelines for the Safe", 1, 100.0, 24.0, 0),
                frag("Handling of Things", 1, 128.0, 24.0, 1),
                frag("A field handbook", 1, 180.0, 16.0, 2),
                frag("Read the whole handbook", 1, 220.0, 10.0, 3),
                frag("before the first trip", 1, 232.0, 10.0, 4),
                frag("and keep it close", 1, 244.0, 10.0, 5),
            ],
            1,
        ));
        let outline = vec![level_one("Handling of Things", 1)];
        assert_eq!(detect(&doc, &outline, &OutlineOptions::default()), "A field handbook");
    }

    #[test]
    fn test_body_paragraph_never_becomes_title() {
        let doc = letter_page(ExtractedDocument::new(
            vec![
                frag("Annual Report", 1, 100.0, 24.0, 0),
                frag("This report covers the fiscal year", 1, 140.0, 11.0, 1),
                frag("and the work of all field offices", 1, 153.0, 11.0, 2),
                frag("across the northern region", 1, 166.0, 11.0, 3),
            ],
            1,
        ));
        let outline = vec![level_one("Annual Report", 0)];
        assert_eq!(detect(&doc, &outline, &OutlineOptions::default()), "");
        assert_eq!(detect(&doc, &[], &OutlineOptions::default()), "Annual Report");
    }

    #[test]
    fn test_falls_back_to_next_page() {
        let doc = letter_page(ExtractedDocument::new(
            vec![
                frag("12", 1, 300.0, 40.0, 0),
                frag("Field Manual", 2, 100.0, 24.0, 1),
                frag("see inside", 2, 200.0, 10.0, 2),
            ],
            3,
        ));
        assert_eq!(detect(&doc, &[], &OutlineOptions::default()), "Field Manual");

        let options = OutlineOptions::default().with_title_search_pages(1);
        assert_eq!(detect(&doc, &[], &options), "");
    }

    #[test]
    fn test_wrapped_title_is_joined_and_truncated() {
        let doc = letter_page(ExtractedDocument::new(
            vec![
                frag("Guidelines for the Safe", 1, 100.0, 24.0, 0),
                frag("Handling of Things", 1, 128.0, 24.0, 1),
                frag("Read the whole handbook", 1, 220.0, 11.0, 2),
                frag("before the first trip", 1, 233.0, 11.0, 3),
                frag("and keep it close", 1, 246.0, 11.0, 4),
            ],
            1,
        ));
        assert_eq!(
            detect(&doc, &[], &OutlineOptions::default()),
            "Guidelines for the Safe Handling of Things"
        );

        let mut options = OutlineOptions::default();
        options.max_title_chars = 15;
        assert_eq!(detect(&doc, &[], &options), "Guidelines f...");
    }

    #[test]
    fn test_empty_document_has_no_title() {
        let doc = ExtractedDocument::new(vec![], 2);
        assert_eq!(detect(&doc, &[], &OutlineOptions::default()), "");
    }
}
