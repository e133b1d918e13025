//! Tunable thresholds for the outline pipeline.

use serde::Deserialize;

use crate::error::{Error, Result};

/// Options for profiling, classification, title detection and assembly.
///
/// Every field has a default, so a configuration file only needs to list the
/// values it overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutlineOptions {
    /// Minimum share of all fragments the body style must cover to count as dominant.
    pub body_min_coverage: f32,

    /// Font-size rounding step (points) used to build style signatures.
    pub size_precision: f32,

    /// Deepest heading level ever emitted.
    pub max_depth: u8,

    /// Runs with at least this many characters are prose, not headings.
    pub max_heading_chars: usize,

    /// Runs shorter than this are never headings.
    pub min_heading_chars: usize,

    /// Required vertical gap to a neighbouring line, as a fraction of the run's font size.
    pub isolation_gap_ratio: f32,

    /// Candidates scoring below this are dropped (0 disables the filter).
    pub min_confidence: f32,

    /// Confidence weight of the inverse style rank.
    pub rank_weight: f32,

    /// Confidence weight of a numbering-pattern match.
    pub numbering_weight: f32,

    /// Confidence weight of the isolation margin.
    pub isolation_weight: f32,

    /// Fraction of the page height treated as running header/footer band.
    pub header_footer_margin: f32,

    /// How many leading pages the title search may look at.
    pub title_search_pages: u32,

    /// Longer titles are cut and suffixed with "...".
    pub max_title_chars: usize,
}

impl OutlineOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from a JSON document; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: OutlineOptions =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Set the body-style coverage threshold.
    pub fn with_body_min_coverage(mut self, coverage: f32) -> Self {
        self.body_min_coverage = coverage;
        self
    }

    /// Set the font-size rounding step.
    pub fn with_size_precision(mut self, precision: f32) -> Self {
        self.size_precision = precision;
        self
    }

    /// Set the maximum heading depth.
    pub fn with_max_depth(mut self, depth: u8) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the maximum heading length in characters.
    pub fn with_max_heading_chars(mut self, chars: usize) -> Self {
        self.max_heading_chars = chars;
        self
    }

    /// Set the isolation gap ratio.
    pub fn with_isolation_gap_ratio(mut self, ratio: f32) -> Self {
        self.isolation_gap_ratio = ratio;
        self
    }

    /// Set the minimum candidate confidence.
    pub fn with_min_confidence(mut self, confidence: f32) -> Self {
        self.min_confidence = confidence;
        self
    }

    /// Set how many leading pages the title detector may search.
    pub fn with_title_search_pages(mut self, pages: u32) -> Self {
        self.title_search_pages = pages;
        self
    }

    /// Check that every value is inside its meaningful range.
    pub fn validate(&self) -> Result<()> {
        let unit = |name: &str, value: f32| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(Error::Config(format!("{name} must be within [0, 1], got {value}")))
            }
        };

        unit("body_min_coverage", self.body_min_coverage)?;
        unit("min_confidence", self.min_confidence)?;
        if !(0.0..0.5).contains(&self.header_footer_margin) {
            return Err(Error::Config(format!(
                "header_footer_margin must be within [0, 0.5), got {}",
                self.header_footer_margin
            )));
        }
        if self.size_precision <= 0.0 {
            return Err(Error::Config("size_precision must be positive".to_string()));
        }
        if self.isolation_gap_ratio < 0.0 {
            return Err(Error::Config(
                "isolation_gap_ratio must not be negative".to_string(),
            ));
        }
        if self.max_depth == 0 {
            return Err(Error::Config("max_depth must be at least 1".to_string()));
        }
        if self.max_heading_chars <= self.min_heading_chars {
            return Err(Error::Config(
                "max_heading_chars must exceed min_heading_chars".to_string(),
            ));
        }
        if self.title_search_pages == 0 {
            return Err(Error::Config(
                "title_search_pages must be at least 1".to_string(),
            ));
        }
        if self.rank_weight < 0.0 || self.numbering_weight < 0.0 || self.isolation_weight < 0.0 {
            return Err(Error::Config(
                "confidence weights must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for OutlineOptions {
    fn default() -> Self {
        Self {
            body_min_coverage: 0.3,
            size_precision: 0.5,
            max_depth: 6,
            max_heading_chars: 200,
            min_heading_chars: 2,
            isolation_gap_ratio: 0.25,
            min_confidence: 0.0,
            rank_weight: 0.5,
            numbering_weight: 0.3,
            isolation_weight: 0.2,
            header_footer_margin: 0.05,
            title_search_pages: 3,
            max_title_chars: 200,
        }
    }
}
