//! Integration tests for the outline pipeline on synthetic fragment streams.

use chrono::{DateTime, TimeZone, Utc};
use pdfoutline::model::{BBox, ExtractedDocument, FontStyle, Fragment, HeadingCandidate, HeadingLevel, PageGeometry};
use pdfoutline::outline::{assemble, build_outline, OutlineOptions};
use pdfoutline::output::{to_json, JsonFormat, SchemaValidator};
use pdfoutline::{outline_from_fragments, Error};

const BODY: &str = "The collected samples were analysed in two batches";

/// Lays out lines top to bottom on US Letter pages.
struct DocBuilder {
    fragments: Vec<Fragment>,
    page: u32,
    y: f32,
}

impl DocBuilder {
    fn new() -> Self {
        Self {
            fragments: Vec::new(),
            page: 1,
            y: 100.0,
        }
    }

    fn line(mut self, text: &str, size: f32, bold: bool, gap_after: f32) -> Self {
        let index = self.fragments.len();
        let width = text.chars().count() as f32 * size * 0.5;
        self.fragments.push(Fragment::new(
            text,
            self.page,
            BBox::new(72.0, self.y, 72.0 + width, self.y + size),
            size,
            FontStyle {
                bold,
                family: "Times".to_string(),
                ..FontStyle::default()
            },
            index,
        ));
        self.y += size + gap_after;
        self
    }

    fn heading(self, text: &str, size: f32) -> Self {
        self.line(text, size, true, 8.0)
    }

    /// A paragraph of consecutive body lines followed by a blank line.
    fn body(mut self, lines: usize) -> Self {
        for _ in 0..lines {
            self = self.line(BODY, 10.0, false, 2.0);
        }
        self.y += 12.0;
        self
    }

    fn next_page(mut self) -> Self {
        self.page += 1;
        self.y = 100.0;
        self
    }

    fn build(self) -> ExtractedDocument {
        let pages = (1..=self.page)
            .map(|number| PageGeometry {
                number,
                width: 612.0,
                height: 792.0,
            })
            .collect();
        ExtractedDocument::new(self.fragments, self.page).with_pages(pages)
    }
}

fn at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 0).unwrap()
}

fn outline_of(doc: &ExtractedDocument) -> Vec<(String, String, u32)> {
    build_outline(doc, &OutlineOptions::default(), at())
        .unwrap()
        .outline
        .into_iter()
        .map(|e| (e.level.to_string(), e.text, e.page))
        .collect()
}

fn entry(level: &str, text: &str, page: u32) -> (String, String, u32) {
    (level.to_string(), text.to_string(), page)
}

fn candidate(depth: u8, order_index: usize) -> HeadingCandidate {
    HeadingCandidate {
        level: HeadingLevel::saturating(depth),
        text: format!("Heading {order_index}"),
        page: 1,
        order_index,
        last_order_index: order_index,
        confidence: 0.5,
    }
}

fn numbered_report() -> ExtractedDocument {
    DocBuilder::new()
        .heading("1 Introduction", 12.0)
        .body(4)
        .heading("1.1 Background", 12.0)
        .body(5)
        .next_page()
        .heading("2 Methods", 12.0)
        .body(6)
        .build()
}

#[test]
fn test_single_style_document_has_no_outline() {
    let doc = DocBuilder::new()
        .line("Minutes of the planning meeting", 11.0, false, 20.0)
        .line("Attendees agreed on the schedule", 11.0, false, 20.0)
        .line("The next meeting is in autumn", 11.0, false, 20.0)
        .build();

    let result = build_outline(&doc, &OutlineOptions::default(), at()).unwrap();
    assert!(result.outline.is_empty());
    assert_eq!(result.title, "Minutes of the planning meeting");
}

#[test]
fn test_single_style_without_letters_has_no_title() {
    let doc = DocBuilder::new()
        .line("2024", 11.0, false, 20.0)
        .line("17 / 42", 11.0, false, 20.0)
        .build();

    let result = build_outline(&doc, &OutlineOptions::default(), at()).unwrap();
    assert!(result.outline.is_empty());
    assert_eq!(result.title, "");
}

#[test]
fn test_single_style_document_uses_text_cues() {
    let doc = DocBuilder::new()
        .body(3)
        .line("MATERIALS AND METHODS", 10.0, false, 12.0)
        .body(3)
        .line("Sampling procedure:", 10.0, false, 12.0)
        .body(3)
        .build();

    assert_eq!(
        outline_of(&doc),
        vec![
            entry("H1", "MATERIALS AND METHODS", 1),
            entry("H2", "Sampling procedure:", 1),
        ]
    );
}

#[test]
fn test_number_label_in_regular_weight_before_bold_heading() {
    let mut doc = DocBuilder::new().body(3).build();
    let y = 100.0 + 3.0 * 12.0 + 12.0;
    for (text, x, bold) in [("2.1", 72.0, false), ("Scope", 92.0, true)] {
        let index = doc.fragments.len();
        doc.fragments.push(Fragment::new(
            text,
            1,
            BBox::new(x, y, x + text.len() as f32 * 5.0, y + 10.0),
            10.0,
            FontStyle {
                bold,
                family: "Times".to_string(),
                ..FontStyle::default()
            },
            index,
        ));
    }
    for i in 0..3 {
        let y = y + 22.0 + i as f32 * 12.0;
        let index = doc.fragments.len();
        doc.fragments.push(Fragment::new(
            BODY,
            1,
            BBox::new(72.0, y, 322.0, y + 10.0),
            10.0,
            FontStyle {
                family: "Times".to_string(),
                ..FontStyle::default()
            },
            index,
        ));
    }

    assert_eq!(outline_of(&doc), vec![entry("H1", "2.1 Scope", 1)]);
    // Neither half of the heading may reappear as the title.
    let result = build_outline(&doc, &OutlineOptions::default(), at()).unwrap();
    assert_eq!(result.title, "");
}

#[test]
fn test_numbered_sections_follow_numbering_depth() {
    assert_eq!(
        outline_of(&numbered_report()),
        vec![
            entry("H1", "1 Introduction", 1),
            entry("H2", "1.1 Background", 1),
            entry("H1", "2 Methods", 2),
        ]
    );
}

#[test]
fn test_style_levels_are_repaired() {
    // Three heading sizes; the first subsection uses the smallest one.
    let doc = DocBuilder::new()
        .heading("Overview", 24.0)
        .body(3)
        .heading("Scope", 14.0)
        .body(3)
        .heading("Audience", 14.0)
        .body(3)
        .heading("Architecture", 18.0)
        .body(3)
        .build();

    assert_eq!(
        outline_of(&doc),
        vec![
            entry("H1", "Overview", 1),
            entry("H2", "Scope", 1),
            entry("H2", "Audience", 1),
            entry("H2", "Architecture", 1),
        ]
    );
}

#[test]
fn test_level_skip_repair() {
    let headings = assemble(
        vec![candidate(1, 0), candidate(4, 5), candidate(4, 9), candidate(2, 14)],
        6,
    )
    .unwrap();
    let depths: Vec<u8> = headings.iter().map(|h| h.level.depth()).collect();
    assert_eq!(depths, vec![1, 2, 2, 2]);
}

#[test]
fn test_assemble_rejects_out_of_order_candidates() {
    let result = assemble(vec![candidate(1, 7), candidate(2, 3)], 6);
    assert!(matches!(result, Err(Error::ClassificationAnomaly(_))));
}

#[test]
fn test_pipeline_is_deterministic() {
    let doc = numbered_report();
    let first = build_outline(&doc, &OutlineOptions::default(), at()).unwrap();
    let second = build_outline(&doc, &OutlineOptions::default(), at()).unwrap();

    assert_eq!(
        to_json(&first, JsonFormat::Compact).unwrap(),
        to_json(&second, JsonFormat::Compact).unwrap()
    );
}

#[test]
fn test_outline_preserves_reading_order_and_nesting() {
    let doc = DocBuilder::new()
        .heading("Chapter 1 Foundations", 12.0)
        .body(3)
        .heading("1.1 Terminology", 12.0)
        .body(3)
        .heading("1.1.1 Units", 12.0)
        .body(3)
        .next_page()
        .heading("1.2 Notation", 12.0)
        .body(3)
        .next_page()
        .heading("Chapter 2 Methods", 12.0)
        .body(3)
        .build();

    let result = build_outline(&doc, &OutlineOptions::default(), at()).unwrap();
    let texts: Vec<&str> = result.outline.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(
        texts,
        vec!["Chapter 1 Foundations", "1.1 Terminology", "1.1.1 Units", "1.2 Notation", "Chapter 2 Methods"]
    );

    let pages: Vec<u32> = result.outline.iter().map(|e| e.page).collect();
    assert!(pages.windows(2).all(|w| w[0] <= w[1]));

    assert_eq!(result.outline[0].level.depth(), 1);
    for pair in result.outline.windows(2) {
        assert!(pair[1].level.depth() <= pair[0].level.depth() + 1);
    }
}

#[test]
fn test_title_is_not_the_first_top_level_entry() {
    let doc = DocBuilder::new()
        .heading("Field Survey Results", 24.0)
        .line("Prepared for the regional water board", 16.0, false, 20.0)
        .body(4)
        .heading("1 Summary", 12.0)
        .body(4)
        .build();

    let result = build_outline(&doc, &OutlineOptions::default(), at()).unwrap();
    assert!(!result.title.is_empty());
    let top_level: Vec<&str> = result
        .outline
        .iter()
        .filter(|e| e.level.depth() == 1)
        .map(|e| e.text.as_str())
        .collect();
    assert!(top_level.contains(&"Field Survey Results"));
    assert!(!top_level.contains(&result.title.as_str()));
}

#[test]
fn test_results_conform_to_schema() {
    let validator = SchemaValidator::new();
    for doc in [numbered_report(), ExtractedDocument::new(Vec::new(), 3)] {
        let result = build_outline(&doc, &OutlineOptions::default(), at()).unwrap();
        let value = serde_json::to_value(&result).unwrap();
        validator.validate(&value).unwrap();
        assert_eq!(value["metadata"]["processed_at"], "2024-05-17T09:30:00Z");
        for entry in &result.outline {
            assert!(entry.page >= 1 && entry.page <= result.metadata.page_count);
        }
    }
}

#[test]
fn test_max_depth_caps_levels() {
    let doc = DocBuilder::new()
        .heading("1 Scope", 12.0)
        .body(3)
        .heading("1.1 Context", 12.0)
        .body(3)
        .heading("1.1.1 Boundaries", 12.0)
        .body(3)
        .build();

    let options = OutlineOptions::new().with_max_depth(2);
    let result = build_outline(&doc, &options, at()).unwrap();
    let levels: Vec<String> = result.outline.iter().map(|e| e.level.to_string()).collect();
    assert_eq!(levels, vec!["H1", "H2", "H2"]);
}

#[test]
fn test_outline_from_fragments() {
    let doc = numbered_report();
    let result = outline_from_fragments(doc.fragments, doc.page_count, &OutlineOptions::default()).unwrap();
    assert_eq!(result.metadata.page_count, 2);
    assert_eq!(result.outline.len(), 3);
}
