//! Positioned text fragments and the typographic keys derived from them.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in top-down page space.
///
/// `y` grows downwards from the top edge of the page, so `y0 <= y1` and a
/// box with a smaller `y0` sits higher on the page.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    /// Create a box, normalizing the corner order.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Vertical midpoint.
    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Length of the vertical overlap between the two boxes (0 if disjoint).
    pub fn vertical_overlap(&self, other: &BBox) -> f32 {
        (self.y1.min(other.y1) - self.y0.max(other.y0)).max(0.0)
    }

    /// Whether the horizontal extents of the two boxes intersect.
    pub fn overlaps_horizontally(&self, other: &BBox) -> bool {
        self.x0 <= other.x1 && other.x0 <= self.x1
    }

    /// Whether both boxes sit on the same visual line: their vertical overlap
    /// covers at least half of the shorter box.
    pub fn shares_line_with(&self, other: &BBox) -> bool {
        let shorter = self.height().min(other.height());
        if shorter <= 0.0 {
            return (self.center_y() - other.center_y()).abs() < f32::EPSILON;
        }
        self.vertical_overlap(other) >= shorter * 0.5
    }
}

/// Font style attributes of a fragment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FontStyle {
    pub bold: bool,
    pub italic: bool,
    /// Font family name as reported by the extractor (opaque).
    pub family: String,
}

impl FontStyle {
    /// Derive style flags from a PDF base font name such as `"ABCDEF+Helvetica-BoldOblique"`.
    pub fn from_font_name(font_name: &str) -> Self {
        let lower = font_name.to_lowercase();
        let bold = lower.contains("bold") || lower.contains("black") || lower.contains("heavy");
        let italic = lower.contains("italic") || lower.contains("oblique");

        // Subset prefixes look like "ABCDEF+" and say nothing about the family.
        let without_subset = match font_name.split_once('+') {
            Some((prefix, rest)) if prefix.len() == 6 => rest,
            _ => font_name,
        };
        let family = without_subset
            .split(['-', ','])
            .next()
            .unwrap_or(without_subset)
            .to_string();

        Self {
            bold,
            italic,
            family,
        }
    }
}

/// One contiguous run of text on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    /// Trimmed, non-empty text content.
    pub text: String,
    /// 1-based page number.
    pub page: u32,
    pub bbox: BBox,
    /// Font size in points.
    pub font_size: f32,
    pub style: FontStyle,
    /// Position in document reading order; total across pages.
    pub order_index: usize,
}

impl Fragment {
    /// Build a fragment; `text` is trimmed.
    pub fn new(
        text: impl Into<String>,
        page: u32,
        bbox: BBox,
        font_size: f32,
        style: FontStyle,
        order_index: usize,
    ) -> Self {
        Self {
            text: text.into().trim().to_string(),
            page,
            bbox,
            font_size,
            style,
            order_index,
        }
    }
}

/// Typographic identity used to cluster fragments: rounded size plus bold flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StyleSignature {
    /// Font size divided by the rounding precision, rounded to an integer.
    pub size_key: i32,
    pub bold: bool,
}

impl StyleSignature {
    /// Signature of a font size and weight at the given rounding precision (in points).
    pub fn new(font_size: f32, bold: bool, precision: f32) -> Self {
        let precision = if precision > 0.0 { precision } else { 0.1 };
        Self {
            size_key: (font_size / precision).round() as i32,
            bold,
        }
    }

    /// Signature of a fragment.
    pub fn of(fragment: &Fragment, precision: f32) -> Self {
        Self::new(fragment.font_size, fragment.style.bold, precision)
    }
}
