//! Merging adjacent fragments into runs.
//!
//! Extractors often split one visual line into several fragments (one per
//! word, per kerning adjustment or per font switch). Headings are judged on
//! whole runs, never on such pieces.

use crate::model::{BBox, Fragment, StyleSignature};
use crate::text::needs_space;

/// Consecutive same-style fragments of one page, treated as one piece of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub page: u32,
    pub bbox: BBox,
    /// Largest font size among the merged fragments.
    pub font_size: f32,
    pub signature: StyleSignature,
    /// `order_index` of the first merged fragment.
    pub order_index: usize,
    /// `order_index` of the last merged fragment.
    pub last_order_index: usize,
    pub fragment_count: usize,
}

impl TextRun {
    fn start(fragment: &Fragment, signature: StyleSignature) -> Self {
        Self {
            text: fragment.text.clone(),
            page: fragment.page,
            bbox: fragment.bbox,
            font_size: fragment.font_size,
            signature,
            order_index: fragment.order_index,
            last_order_index: fragment.order_index,
            fragment_count: 1,
        }
    }

    /// This run with a numbering label from the same line in front of it.
    ///
    /// The result keeps this run's style and font size and takes the label's
    /// `order_index`.
    pub fn with_label(&self, label: &TextRun) -> TextRun {
        TextRun {
            text: format!("{} {}", label.text, self.text),
            page: self.page,
            bbox: label.bbox.union(&self.bbox),
            font_size: self.font_size,
            signature: self.signature,
            order_index: label.order_index,
            last_order_index: self.last_order_index,
            fragment_count: label.fragment_count + self.fragment_count,
        }
    }

    fn push_inline(&mut self, fragment: &Fragment) {
        let gap = fragment.bbox.x0 - self.bbox.x1;
        if needs_space(&self.text, &fragment.text, gap, self.font_size) {
            self.text.push(' ');
        }
        self.text.push_str(&fragment.text);
        self.absorb(fragment.bbox, fragment.font_size, fragment.order_index, 1);
    }

    fn push_line(&mut self, line: &TextRun) {
        // A trailing hyphen on a wrapped line is a word split.
        if self.text.ends_with('-') && !self.text.ends_with(" -") {
            self.text.pop();
        } else {
            self.text.push(' ');
        }
        self.text.push_str(&line.text);
        self.absorb(line.bbox, line.font_size, line.last_order_index, line.fragment_count);
    }

    fn absorb(&mut self, bbox: BBox, font_size: f32, last_order_index: usize, count: usize) {
        self.bbox = self.bbox.union(&bbox);
        self.font_size = self.font_size.max(font_size);
        self.last_order_index = last_order_index;
        self.fragment_count += count;
    }

    fn continues_line(&self, fragment: &Fragment, signature: StyleSignature) -> bool {
        fragment.page == self.page
            && signature == self.signature
            && fragment.bbox.x0 >= self.bbox.x0
            && fragment.bbox.shares_line_with(&self.bbox)
    }

    fn continues_block(&self, next: &TextRun) -> bool {
        if next.page != self.page || next.signature != self.signature {
            return false;
        }
        let gap = next.bbox.y0 - self.bbox.y1;
        next.bbox.y0 > self.bbox.y0 && gap < self.font_size && self.bbox.overlaps_horizontally(&next.bbox)
    }
}

/// Merge fragments that follow each other on the same visual line with the
/// same style. Input and output are in reading order.
pub fn merge_line_runs(fragments: &[Fragment], size_precision: f32) -> Vec<TextRun> {
    let mut runs: Vec<TextRun> = Vec::new();

    for fragment in fragments {
        let signature = StyleSignature::of(fragment, size_precision);
        match runs.last_mut() {
            Some(run) if run.continues_line(fragment, signature) => run.push_inline(fragment),
            _ => runs.push(TextRun::start(fragment, signature)),
        }
    }

    runs
}

/// Merge consecutive line runs into blocks: same page and style, each line
/// directly below the previous one with less than one font size of gap.
///
/// Used for titles, which often wrap over two or three lines.
pub fn merge_block_runs(lines: &[TextRun]) -> Vec<TextRun> {
    let mut blocks: Vec<TextRun> = Vec::new();

    for line in lines {
        match blocks.last_mut() {
            Some(block) if block.continues_block(line) => block.push_line(line),
            _ => blocks.push(line.clone()),
        }
    }

    blocks
}
