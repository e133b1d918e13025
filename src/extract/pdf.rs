//! Fragment extraction backed by lopdf.

use std::path::Path;

use lopdf::{Document as LopdfDocument, Object, ObjectId};
use unicode_normalization::UnicodeNormalization;

use crate::cancel::CancellationToken;
use crate::detect::sniff_pdf_version;
use crate::error::{Error, Result};
use crate::model::{BBox, ExtractedDocument, FontStyle, Fragment, PageGeometry};

use super::content::{PageWalker, RawSpan};
use super::FragmentExtractor;

/// US Letter, used when a page has no usable MediaBox.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Share of the font size above the baseline covered by the fragment box.
const ASCENT: f32 = 0.8;
/// Share of the font size below the baseline.
const DESCENT: f32 = 0.2;

/// Extracts positioned fragments from text-based PDF files.
///
/// Glyph widths are estimated from the font size rather than read from the
/// font programs, which is precise enough to order fragments and judge line
/// membership.
#[derive(Debug, Clone, Default)]
pub struct LopdfExtractor;

impl LopdfExtractor {
    pub fn new() -> Self {
        Self
    }

    fn load(path: &Path) -> Result<LopdfDocument> {
        let version = sniff_pdf_version(path).map_err(read_error)?;
        log::debug!("{}: PDF {}", path.display(), version);

        let doc = LopdfDocument::load(path).map_err(|e| match e {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            lopdf::Error::IO(io) => read_error(Error::Io(io)),
            other => Error::Extraction(other.to_string()),
        })?;

        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        Ok(doc)
    }
}

impl FragmentExtractor for LopdfExtractor {
    fn extract(&self, path: &Path, cancel: &CancellationToken) -> Result<ExtractedDocument> {
        let doc = Self::load(path)?;
        let pages = doc.get_pages();
        let page_count = pages.len() as u32;

        let mut fragments = Vec::new();
        let mut geometry = Vec::with_capacity(pages.len());

        for (&number, &page_id) in &pages {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let media_box = media_box(&doc, page_id);
            let page = PageGeometry {
                number,
                width: media_box[2] - media_box[0],
                height: media_box[3] - media_box[1],
            };

            let spans = PageWalker::new(&doc, page_id)
                .and_then(|walker| walker.spans(page_id))
                .map_err(|e| Error::Extraction(format!("page {number}: {e}")))?;

            let mut page_fragments: Vec<Fragment> = spans
                .into_iter()
                .filter_map(|span| to_fragment(span, number, &media_box))
                .collect();
            sort_reading_order(&mut page_fragments);

            log::debug!("Page {}: {} fragments", number, page_fragments.len());
            fragments.append(&mut page_fragments);
            geometry.push(page);
        }

        for (index, fragment) in fragments.iter_mut().enumerate() {
            fragment.order_index = index;
        }

        Ok(ExtractedDocument::new(fragments, page_count).with_pages(geometry))
    }

    fn name(&self) -> &str {
        "lopdf"
    }
}

/// Errors reading the source file are extraction failures, not output failures.
fn read_error(err: Error) -> Error {
    match err {
        Error::Io(io) => Error::Extraction(format!("cannot read file: {io}")),
        other => other,
    }
}

/// MediaBox of a page, following the inheritance chain up the page tree.
fn media_box(doc: &LopdfDocument, page_id: ObjectId) -> [f32; 4] {
    let mut node = doc.get_dictionary(page_id).ok();
    while let Some(dict) = node {
        if let Ok(obj) = dict.get(b"MediaBox") {
            let obj = match obj {
                Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
                direct => direct,
            };
            if let Ok(values) = obj.as_array() {
                let numbers: Vec<f32> = values.iter().filter_map(|v| v.as_float().ok()).collect();
                if numbers.len() == 4 && numbers[2] != numbers[0] && numbers[3] != numbers[1] {
                    return [
                        numbers[0].min(numbers[2]),
                        numbers[1].min(numbers[3]),
                        numbers[0].max(numbers[2]),
                        numbers[1].max(numbers[3]),
                    ];
                }
            }
        }
        node = dict
            .get(b"Parent")
            .and_then(Object::as_reference)
            .and_then(|id| doc.get_dictionary(id))
            .ok();
    }
    DEFAULT_MEDIA_BOX
}

/// Convert a span to a top-down fragment; `order_index` is assigned later.
fn to_fragment(span: RawSpan, page: u32, media_box: &[f32; 4]) -> Option<Fragment> {
    let text: String = span.text.nfc().collect();
    if text.trim().is_empty() || span.font_size <= 0.0 {
        return None;
    }

    let top = media_box[3];
    let bbox = BBox::new(
        span.x,
        top - (span.y + span.font_size * ASCENT),
        span.x + span.width,
        top - (span.y - span.font_size * DESCENT),
    );

    Some(Fragment::new(
        text,
        page,
        bbox,
        span.font_size,
        FontStyle::from_font_name(&span.font_name),
        0,
    ))
}

/// Sort one page's fragments top-to-bottom, then left-to-right within a line.
fn sort_reading_order(fragments: &mut Vec<Fragment>) {
    fragments.sort_by(|a, b| a.bbox.center_y().total_cmp(&b.bbox.center_y()));

    let mut ordered = Vec::with_capacity(fragments.len());
    let mut line: Vec<Fragment> = Vec::new();
    let mut line_box: Option<BBox> = None;

    for fragment in fragments.drain(..) {
        match line_box {
            Some(bbox) if bbox.shares_line_with(&fragment.bbox) => {
                line_box = Some(bbox.union(&fragment.bbox));
                line.push(fragment);
            }
            _ => {
                flush_line(&mut line, &mut ordered);
                line_box = Some(fragment.bbox);
                line.push(fragment);
            }
        }
    }
    flush_line(&mut line, &mut ordered);

    *fragments = ordered;
}

fn flush_line(line: &mut Vec<Fragment>, ordered: &mut Vec<Fragment>) {
    line.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));
    ordered.append(line);
}
