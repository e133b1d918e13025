//! Typography profiling: find the body-text style and rank heading styles.
//!
//! Font sizes mean nothing in absolute terms, so every document gets its own
//! ranking relative to its dominant paragraph style.

use std::collections::BTreeMap;

use crate::model::{Fragment, StyleSignature};

use super::OutlineOptions;

/// Statistics for one style signature.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleStats {
    /// Number of fragments carrying this signature.
    pub count: usize,
    /// Mean font size of those fragments.
    pub avg_font_size: f32,
    pub is_body_text: bool,
}

/// Per-document style table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyleProfile {
    pub styles: BTreeMap<StyleSignature, StyleStats>,
    /// `None` only for documents without fragments.
    pub body: Option<StyleSignature>,
    /// Whether the body style cleared the coverage threshold rather than
    /// being picked as the fallback.
    pub body_is_dominant: bool,
    pub total_fragments: usize,
}

impl StyleProfile {
    pub fn stats(&self, signature: &StyleSignature) -> Option<&StyleStats> {
        self.styles.get(signature)
    }

    /// Mean font size of the body style.
    pub fn body_font_size(&self) -> Option<f32> {
        self.body
            .and_then(|sig| self.styles.get(&sig))
            .map(|s| s.avg_font_size)
    }

    pub fn is_body(&self, signature: &StyleSignature) -> bool {
        self.body.as_ref() == Some(signature)
    }
}

/// A heading-candidate style together with its provisional level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedStyle {
    pub signature: StyleSignature,
    pub avg_font_size: f32,
    /// 1 = largest/boldest; already capped at the maximum depth.
    pub rank: u8,
}

/// Profiler output: the profile plus ranked heading styles.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Typography {
    pub profile: StyleProfile,
    pub ranked: Vec<RankedStyle>,
}

impl Typography {
    /// Provisional level of a style, if it is a heading-candidate style.
    pub fn rank_of(&self, signature: &StyleSignature) -> Option<u8> {
        self.ranked
            .iter()
            .find(|r| r.signature == *signature)
            .map(|r| r.rank)
    }

    pub fn has_heading_styles(&self) -> bool {
        !self.ranked.is_empty()
    }
}

/// Build the style profile and heading-style ranking for a document.
pub fn profile_typography(fragments: &[Fragment], options: &OutlineOptions) -> Typography {
    if fragments.is_empty() {
        return Typography::default();
    }

    let mut sums: BTreeMap<StyleSignature, (usize, f32)> = BTreeMap::new();
    for fragment in fragments {
        let entry = sums
            .entry(StyleSignature::of(fragment, options.size_precision))
            .or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += fragment.font_size;
    }

    let total = fragments.len();

    // Highest count wins; ties go to the smaller, then the non-bold, signature.
    let body = sums
        .iter()
        .max_by(|(sig_a, (count_a, _)), (sig_b, (count_b, _))| {
            count_a.cmp(count_b).then_with(|| sig_b.cmp(sig_a))
        })
        .map(|(sig, _)| *sig);

    let body_is_dominant = body
        .and_then(|sig| sums.get(&sig))
        .map(|(count, _)| *count as f32 / total as f32 > options.body_min_coverage)
        .unwrap_or(false);

    if !body_is_dominant {
        log::debug!(
            "No style covers more than {:.0}% of fragments; using most frequent style as body",
            options.body_min_coverage * 100.0
        );
    }

    let styles: BTreeMap<StyleSignature, StyleStats> = sums
        .iter()
        .map(|(sig, (count, size_sum))| {
            (
                *sig,
                StyleStats {
                    count: *count,
                    avg_font_size: size_sum / *count as f32,
                    is_body_text: Some(*sig) == body,
                },
            )
        })
        .collect();

    let profile = StyleProfile {
        styles,
        body,
        body_is_dominant,
        total_fragments: total,
    };

    let ranked = rank_heading_styles(&profile, options.max_depth);
    log::debug!(
        "Typography: {} styles, body {:?}, {} heading styles",
        profile.styles.len(),
        profile.body,
        ranked.len()
    );

    Typography { profile, ranked }
}

/// Rank the styles that are visually stronger than the body style.
///
/// Sorted by descending size, bold before regular at equal size. Ranks are
/// 1-based and capped at `max_depth`.
pub fn rank_heading_styles(profile: &StyleProfile, max_depth: u8) -> Vec<RankedStyle> {
    let Some(body) = profile.body else {
        return Vec::new();
    };

    let mut candidates: Vec<StyleSignature> = profile
        .styles
        .keys()
        .filter(|sig| {
            sig.size_key > body.size_key || (sig.size_key == body.size_key && sig.bold && !body.bold)
        })
        .copied()
        .collect();

    candidates.sort_by(|a, b| b.size_key.cmp(&a.size_key).then_with(|| b.bold.cmp(&a.bold)));

    candidates
        .into_iter()
        .enumerate()
        .map(|(i, signature)| RankedStyle {
            signature,
            avg_font_size: profile
                .stats(&signature)
                .map(|s| s.avg_font_size)
                .unwrap_or_default(),
            rank: (i + 1).min(max_depth.max(1) as usize) as u8,
        })
        .collect()
}
