//! Heading classification.
//!
//! Line runs are accepted as headings when their style is a ranked heading
//! style or when they carry a structural cue (a numbering prefix, all-caps
//! text, a trailing colon or indentation), and they pass the length,
//! isolation and content filters. Numbering depth wins over the style rank,
//! which wins over the level implied by the other cues.

use std::ops::Range;

use regex::Regex;

use crate::model::{HeadingCandidate, HeadingLevel};
use crate::text::has_alphabetic;

use super::numbering::NumberingMatcher;
use super::profiler::Typography;
use super::runs::TextRun;
use super::OutlineOptions;

/// Runs further apart than this many font sizes on one line are in different
/// columns and do not disturb each other's isolation.
const LINE_SEGMENT_EMS: f32 = 3.0;

/// All-caps, colon and indentation cues only apply to runs this short.
const CUE_MAX_CHARS: usize = 60;

/// All-caps runs shorter than this are acronyms or labels.
const CAPS_MIN_CHARS: usize = 10;

/// Why a run was not accepted; only used for debug logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NotHeadingStyle,
    TooShort,
    TooLong,
    NoLetters,
    Boilerplate,
    NotIsolated,
    LowConfidence,
}

/// Structural evidence that a run is a heading, independent of its style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralCue {
    /// A numbering prefix of the given depth.
    Numbering(u8),
    /// Upper-case text such as "MATERIALS AND METHODS".
    AllCaps,
    /// A short lead-in ending in a colon, such as "Required equipment:".
    TrailingColon,
    /// Indented against the lines above and below it.
    Indented,
}

impl StructuralCue {
    /// Level implied by the cue when the run has no heading style.
    pub fn level(self) -> u8 {
        match self {
            StructuralCue::Numbering(depth) => depth,
            StructuralCue::AllCaps => 1,
            StructuralCue::TrailingColon | StructuralCue::Indented => 2,
        }
    }

    /// Weight of the cue in the confidence score; numbering counts fully.
    pub fn strength(self) -> f32 {
        match self {
            StructuralCue::Numbering(_) => 1.0,
            StructuralCue::AllCaps => 0.6,
            StructuralCue::TrailingColon => 0.5,
            StructuralCue::Indented => 0.4,
        }
    }
}

/// Nearest run above or below a candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Neighbour {
    gap: f32,
    x0: f32,
}

/// Vertical neighbourhood of a run; a missing side is a page edge.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Surroundings {
    above: Option<Neighbour>,
    below: Option<Neighbour>,
}

impl Surroundings {
    fn gap_above(&self) -> f32 {
        self.above.map_or(f32::INFINITY, |n| n.gap)
    }

    fn gap_below(&self) -> f32 {
        self.below.map_or(f32::INFINITY, |n| n.gap)
    }
}

/// Turns line runs into heading candidates.
#[derive(Debug, Clone)]
pub struct HeadingClassifier<'a> {
    options: &'a OutlineOptions,
    typography: &'a Typography,
    numbering: NumberingMatcher,
    boilerplate: Vec<Regex>,
    caps_version: Regex,
    clock_time: Regex,
}

impl<'a> HeadingClassifier<'a> {
    pub fn new(options: &'a OutlineOptions, typography: &'a Typography) -> Self {
        Self {
            options,
            typography,
            numbering: NumberingMatcher::new(),
            boilerplate: vec![
                Regex::new(r"(?i)copyright|©|\(c\)\s*\d{4}|all rights reserved").unwrap(),
                Regex::new(r"(?i)^(https?://|www\.)\S+$").unwrap(),
                Regex::new(r"^[\w.+-]+@[\w-]+(\.[\w-]+)+$").unwrap(),
                Regex::new(r"^\d{1,4}[/.-]\d{1,2}[/.-]\d{1,4}$").unwrap(),
                Regex::new(
                    r"(?i)^\d{1,2}\s+(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?,?\s+\d{4}$",
                )
                .unwrap(),
            ],
            caps_version: Regex::new(r"^[\p{Lu}\s]+[\d.]+[\p{Lu}\s]*$").unwrap(),
            clock_time: Regex::new(r"\d+:\d+").unwrap(),
        }
    }

    /// Classify every run, returning accepted candidates in reading order.
    ///
    /// Runs must be in reading order. Bare numbering labels set in a
    /// different style are first joined to the heading text that follows
    /// them on the same line.
    pub fn classify(&self, runs: &[TextRun]) -> Vec<HeadingCandidate> {
        let runs = self.attach_labels(runs);
        let mut candidates = Vec::new();
        for (i, run) in runs.iter().enumerate() {
            match self.classify_run(&runs, i) {
                Ok(candidate) => candidates.push(candidate),
                Err(reason) => {
                    log::debug!("Rejected {:?} on page {}: {:?}", run.text, run.page, reason);
                }
            }
        }
        candidates
    }

    /// Join each bare numbering label ("2.1", "B.", "Chapter 4") to the run
    /// directly after it on the same line.
    pub fn attach_labels(&self, runs: &[TextRun]) -> Vec<TextRun> {
        let mut out: Vec<TextRun> = Vec::with_capacity(runs.len());
        let mut i = 0;
        while i < runs.len() {
            let run = &runs[i];
            match runs.get(i + 1) {
                Some(next) if self.is_label_for(run, next) => {
                    out.push(next.with_label(run));
                    i += 2;
                }
                _ => {
                    out.push(run.clone());
                    i += 1;
                }
            }
        }
        out
    }

    fn is_label_for(&self, label: &TextRun, next: &TextRun) -> bool {
        let size = label.font_size.max(next.font_size).max(1.0);
        let gap = next.bbox.x0 - label.bbox.x1;
        label.page == next.page
            && label.bbox.shares_line_with(&next.bbox)
            && next.bbox.x0 >= label.bbox.x0
            && gap < LINE_SEGMENT_EMS * size
            && self.numbering.is_label(&label.text)
            && !self.numbering.is_label(&next.text)
            && has_alphabetic(&next.text)
    }

    /// Decide on the run at `index`, looking at its neighbours for isolation.
    ///
    /// Runs must be in reading order; only runs on the same page are
    /// consulted.
    pub fn classify_run(
        &self,
        runs: &[TextRun],
        index: usize,
    ) -> std::result::Result<HeadingCandidate, Rejection> {
        let run = &runs[index];
        let options = self.options;

        let style_rank = self.typography.rank_of(&run.signature);
        let below_body = self.is_below_body_size(run);
        let chars = run.text.chars().count();

        let text_cue = if below_body { None } else { self.text_cue(&run.text, chars) };
        let may_be_indented = !below_body && chars <= CUE_MAX_CHARS;

        if style_rank.is_none() && text_cue.is_none() && !may_be_indented {
            return Err(Rejection::NotHeadingStyle);
        }

        if chars < options.min_heading_chars {
            return Err(Rejection::TooShort);
        }
        if chars >= options.max_heading_chars {
            return Err(Rejection::TooLong);
        }
        if !has_alphabetic(&run.text) {
            return Err(Rejection::NoLetters);
        }
        if self.boilerplate.iter().any(|re| re.is_match(&run.text)) {
            return Err(Rejection::Boilerplate);
        }

        let surroundings = self.surroundings(runs, index).ok_or(Rejection::NotIsolated)?;
        let margin = self.isolation_margin_of(run, &surroundings).ok_or(Rejection::NotIsolated)?;

        let cue = text_cue.or_else(|| {
            (style_rank.is_none() && may_be_indented && self.is_indented(run, &surroundings))
                .then_some(StructuralCue::Indented)
        });
        if style_rank.is_none() && cue.is_none() {
            return Err(Rejection::NotHeadingStyle);
        }

        let raw_level = match cue {
            Some(StructuralCue::Numbering(depth)) => depth,
            _ => style_rank.or(cue.map(StructuralCue::level)).unwrap_or(1),
        }
        .min(options.max_depth);

        // Body-size runs get no credit for style.
        let rank_score = style_rank.map(|r| 1.0 / r as f32).unwrap_or(0.0);
        let confidence = options.rank_weight * rank_score
            + options.numbering_weight * cue.map(StructuralCue::strength).unwrap_or(0.0)
            + options.isolation_weight * margin;

        if confidence < options.min_confidence {
            return Err(Rejection::LowConfidence);
        }

        Ok(HeadingCandidate {
            level: HeadingLevel::saturating(raw_level),
            text: run.text.clone(),
            page: run.page,
            order_index: run.order_index,
            last_order_index: run.last_order_index,
            confidence,
        })
    }

    /// Cues read from the text alone, strongest first.
    fn text_cue(&self, text: &str, chars: usize) -> Option<StructuralCue> {
        if let Some(m) = self.numbering.detect(text) {
            return Some(StructuralCue::Numbering(m.depth));
        }
        if chars > CUE_MAX_CHARS {
            return None;
        }
        if chars >= CAPS_MIN_CHARS && is_all_caps(text) && !self.caps_version.is_match(text) {
            return Some(StructuralCue::AllCaps);
        }
        if chars > 8
            && text.ends_with(':')
            && text.matches(':').count() == 1
            && !self.clock_time.is_match(text)
            && text.chars().next().is_some_and(char::is_uppercase)
        {
            return Some(StructuralCue::TrailingColon);
        }
        None
    }

    /// Whether the run starts at least one font size right of every line
    /// around it and has clear space on both sides.
    fn is_indented(&self, run: &TextRun, surroundings: &Surroundings) -> bool {
        let required = self.options.isolation_gap_ratio * run.font_size.max(1.0);
        let neighbours = [surroundings.above, surroundings.below];
        neighbours.iter().any(Option::is_some)
            && surroundings.gap_above() >= required
            && surroundings.gap_below() >= required
            && neighbours
                .iter()
                .flatten()
                .all(|n| run.bbox.x0 - n.x0 >= run.font_size)
    }

    fn is_below_body_size(&self, run: &TextRun) -> bool {
        self.typography
            .profile
            .body
            .map(|body| run.signature.size_key < body.size_key)
            .unwrap_or(false)
    }

    /// Isolation margin of a run in `[0, 1]`, or `None` when the run is not
    /// isolated.
    ///
    /// A run is isolated when no other run shares its line segment and the
    /// larger of the gaps to its nearest neighbours above and below reaches
    /// `isolation_gap_ratio` font sizes. A page edge is an infinite gap.
    pub fn isolation_margin(&self, runs: &[TextRun], index: usize) -> Option<f32> {
        let surroundings = self.surroundings(runs, index)?;
        self.isolation_margin_of(&runs[index], &surroundings)
    }

    fn isolation_margin_of(&self, run: &TextRun, surroundings: &Surroundings) -> Option<f32> {
        let size = run.font_size.max(1.0);
        let gap = surroundings.gap_above().max(surroundings.gap_below());
        let required = self.options.isolation_gap_ratio * size;
        if gap < required {
            return None;
        }
        Some(((gap / size) - self.options.isolation_gap_ratio).clamp(0.0, 1.0))
    }

    /// Nearest horizontally overlapping runs above and below, or `None` when
    /// another run shares the line segment.
    fn surroundings(&self, runs: &[TextRun], index: usize) -> Option<Surroundings> {
        let run = &runs[index];
        let size = run.font_size.max(1.0);
        let mut found = Surroundings::default();

        for j in page_range(runs, run.page) {
            if j == index {
                continue;
            }
            let other = &runs[j];

            if other.bbox.shares_line_with(&run.bbox) {
                let h_gap = (other.bbox.x0 - run.bbox.x1).max(run.bbox.x0 - other.bbox.x1);
                if h_gap < LINE_SEGMENT_EMS * size {
                    return None;
                }
                continue;
            }

            if !other.bbox.overlaps_horizontally(&run.bbox) {
                continue;
            }

            let (slot, gap) = if other.bbox.center_y() < run.bbox.center_y() {
                (&mut found.above, (run.bbox.y0 - other.bbox.y1).max(0.0))
            } else {
                (&mut found.below, (other.bbox.y0 - run.bbox.y1).max(0.0))
            };
            if slot.map_or(true, |n| gap < n.gap) {
                *slot = Some(Neighbour { gap, x0: other.bbox.x0 });
            }
        }

        Some(found)
    }
}

/// Indices of the runs on `page`; pages never decrease in reading order.
fn page_range(runs: &[TextRun], page: u32) -> Range<usize> {
    let start = runs.partition_point(|r| r.page < page);
    let end = runs.partition_point(|r| r.page <= page);
    start..end
}

/// Every cased letter is upper case and there is at least one.
fn is_all_caps(text: &str) -> bool {
    text.chars().any(char::is_uppercase) && !text.chars().any(char::is_lowercase)
}
