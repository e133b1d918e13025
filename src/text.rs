//! Small text helpers shared by the extractor and the outline pipeline.

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
pub(crate) fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and extensions A-F
    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0x20000..=0x2EBEF).contains(&code)
        // Hiragana, Katakana
        || (0x3040..=0x30FF).contains(&code)
        // CJK Symbols and Punctuation
        || (0x3000..=0x303F).contains(&code)
}

/// Whether a space belongs between two horizontally adjacent pieces of text.
///
/// `gap` is the horizontal distance between the end of `prev` and the start
/// of `next`; it must exceed a fifth of an average glyph to count as a word
/// break.
pub(crate) fn needs_space(prev: &str, next: &str, gap: f32, font_size: f32) -> bool {
    if prev.ends_with([' ', '\u{00A0}']) || next.starts_with([' ', '\u{00A0}']) {
        return false;
    }
    if gap <= font_size * 0.5 * 0.2 {
        return false;
    }
    let prev_cjk = prev.chars().last().map(is_spaceless_script_char).unwrap_or(false);
    let next_cjk = next.chars().next().map(is_spaceless_script_char).unwrap_or(false);
    !(prev_cjk && next_cjk)
}

/// Collapse every whitespace sequence to a single space and trim.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut `text` to at most `max_chars` characters, marking the cut with "...".
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.truncate(out.trim_end().len());
    out.push_str("...");
    out
}

/// At least one alphabetic character (rules out page numbers and rules).
pub(crate) fn has_alphabetic(text: &str) -> bool {
    text.chars().any(char::is_alphabetic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_space() {
        assert!(needs_space("Hello", "World", 4.0, 12.0));
        assert!(!needs_space("Hel", "lo", 0.2, 12.0));
        assert!(!needs_space("Hello ", "World", 4.0, 12.0));
        assert!(!needs_space("日本", "語", 6.0, 12.0));
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  A \n Long\tTitle "), "A Long Title");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("abcdefghij", 8), "abcde...");
        assert_eq!(truncate_chars("abc def ghi", 8), "abc d...");
        assert_eq!(truncate_chars("éééééé", 5), "éé...");
    }

    #[test]
    fn test_has_alphabetic() {
        assert!(has_alphabetic("Page 3"));
        assert!(!has_alphabetic("- 12 -"));
        assert!(!has_alphabetic("3.1.4"));
    }
}
