//! Structural numbering patterns ("1.", "1.2.3", "Chapter 4", "A.1", "IV.").

use regex::Regex;

/// A numbering prefix recognised at the start of a heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberingMatch {
    /// Number of numeric/letter groups, e.g. 3 for "2.1.4".
    pub depth: u8,
    pub kind: NumberingKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberingKind {
    /// "1.", "1.2", "3.1.4"
    Decimal,
    /// "A.", "B.2"
    Letter,
    /// "IV.", "XII."
    Roman,
    /// "Chapter 3", "Part II", "Appendix B", "Section 2.1"
    Keyword,
}

/// Matcher compiled once per classifier.
#[derive(Debug, Clone)]
pub struct NumberingMatcher {
    decimal: Regex,
    letter: Regex,
    lettered_decimal: Regex,
    roman: Regex,
    keyword: Regex,
    label: Regex,
}

impl NumberingMatcher {
    pub fn new() -> Self {
        Self {
            decimal: Regex::new(r"^(\d{1,3}(?:\.\d{1,3})*)\.?[)]?\s+(\S.*)$").unwrap(),
            letter: Regex::new(r"^[A-Z][.)]\s*(\S.*)$").unwrap(),
            lettered_decimal: Regex::new(r"^[A-Z]((?:\.\d{1,3})+)\.?\s+(\S.*)$").unwrap(),
            roman: Regex::new(r"^([IVXLC]{1,6})[.)]\s+(\S.*)$").unwrap(),
            keyword: Regex::new(
                r"(?i)^(chapter|part|section|appendix|annex)\s+(\d{1,3}(?:\.\d{1,3})*|[IVXLC]{1,6}|[A-Z])\b[.:)]?\s*(.*)$",
            )
            .unwrap(),
            label: Regex::new(
                r"^(?:\d{1,3}(?:\.\d{1,3})*[.)]?|[A-Z](?:\.\d{1,3})*[.)]|[IVXLC]{1,6}[.)]|(?i:chapter|part|section|appendix|annex)\s+(?:\d{1,3}(?:\.\d{1,3})*|[IVXLC]{1,6}|[A-Z])[.:)]?)$",
            )
            .unwrap(),
        }
    }

    /// Whether `text` is a bare numbering label such as `2.1`, `B.` or
    /// `Chapter 4`, with no heading text after it.
    pub fn is_label(&self, text: &str) -> bool {
        self.label.is_match(text.trim())
    }

    /// Recognise a numbering prefix, returning its depth.
    ///
    /// The text after the number must start with something other than a
    /// lowercase letter, so sentences such as "3 apples were sold" and
    /// numbered list prose are not taken for headings.
    pub fn detect(&self, text: &str) -> Option<NumberingMatch> {
        let text = text.trim();

        if let Some(caps) = self.keyword.captures(text) {
            let number = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            let rest = caps.get(3).map(|m| m.as_str()).unwrap_or_default();
            if rest.is_empty() || starts_like_title(rest) {
                return Some(NumberingMatch {
                    depth: group_count(number),
                    kind: NumberingKind::Keyword,
                });
            }
            return None;
        }

        if let Some(caps) = self.decimal.captures(text) {
            let number = &caps[1];
            let rest = &caps[2];
            if starts_like_title(rest) && !is_measurement(rest) {
                return Some(NumberingMatch {
                    depth: group_count(number),
                    kind: NumberingKind::Decimal,
                });
            }
            return None;
        }

        if let Some(caps) = self.roman.captures(text) {
            if starts_like_title(&caps[2]) {
                return Some(NumberingMatch {
                    depth: 1,
                    kind: NumberingKind::Roman,
                });
            }
        }

        if let Some(caps) = self.lettered_decimal.captures(text) {
            if starts_like_title(&caps[2]) {
                return Some(NumberingMatch {
                    depth: 1 + caps[1].matches('.').count() as u8,
                    kind: NumberingKind::Letter,
                });
            }
        }

        if let Some(caps) = self.letter.captures(text) {
            let rest = &caps[1];
            if starts_like_title(rest) && rest.chars().count() > 1 {
                return Some(NumberingMatch {
                    depth: 1,
                    kind: NumberingKind::Letter,
                });
            }
        }

        None
    }
}

impl Default for NumberingMatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn group_count(number: &str) -> u8 {
    number.split('.').filter(|g| !g.is_empty()).count().max(1) as u8
}

fn starts_like_title(rest: &str) -> bool {
    rest.chars()
        .next()
        .map(|c| !c.is_lowercase() && !c.is_ascii_digit())
        .unwrap_or(false)
}

/// "5 kg", "12 %" and similar quantity prefixes.
fn is_measurement(rest: &str) -> bool {
    let first = rest.split_whitespace().next().unwrap_or_default();
    matches!(first, "%" | "°" | "x" | "×" | "-" | "–")
}
