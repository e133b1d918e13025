//! Document-level types: extractor output and the persisted outline result.

use super::{Fragment, HeadingLevel};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Size of one page in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    /// 1-based page number.
    pub number: u32,
    pub width: f32,
    pub height: f32,
}

/// Everything the extractor hands to the outline pipeline for one file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedDocument {
    /// Fragments in reading order.
    pub fragments: Vec<Fragment>,
    /// Total number of pages in the file, including pages without text.
    pub page_count: u32,
    /// Page sizes, where known.
    pub pages: Vec<PageGeometry>,
}

impl ExtractedDocument {
    pub fn new(fragments: Vec<Fragment>, page_count: u32) -> Self {
        Self {
            fragments,
            page_count,
            pages: Vec::new(),
        }
    }

    /// Attach page geometry.
    pub fn with_pages(mut self, pages: Vec<PageGeometry>) -> Self {
        self.pages = pages;
        self
    }

    /// Geometry of a page, if the extractor reported it.
    pub fn page(&self, number: u32) -> Option<&PageGeometry> {
        self.pages.iter().find(|p| p.number == number)
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// One persisted heading of the outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    pub level: HeadingLevel,
    pub text: String,
    pub page: u32,
}

/// Run metadata stored next to the outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultMetadata {
    pub page_count: u32,
    #[serde(
        serialize_with = "serialize_timestamp",
        deserialize_with = "deserialize_timestamp"
    )]
    pub processed_at: DateTime<Utc>,
}

/// The outline of one input file: title, headings and metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentResult {
    pub title: String,
    pub outline: Vec<OutlineEntry>,
    pub metadata: ResultMetadata,
}

impl DocumentResult {
    pub fn new(
        title: impl Into<String>,
        outline: Vec<OutlineEntry>,
        page_count: u32,
        processed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            outline,
            metadata: ResultMetadata {
                page_count,
                processed_at,
            },
        }
    }

    /// Result for a document without any extractable text.
    pub fn empty(page_count: u32, processed_at: DateTime<Utc>) -> Self {
        Self::new(String::new(), Vec::new(), page_count, processed_at)
    }

    /// Whether neither a title nor any heading was found.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.outline.is_empty()
    }
}

fn serialize_timestamp<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Secs, true))
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let s = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_result_serialization_shape() {
        let result = DocumentResult::new(
            "Annual Report",
            vec![OutlineEntry {
                level: HeadingLevel::TOP,
                text: "Introduction".to_string(),
                page: 2,
            }],
            10,
            fixed_time(),
        );

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["title"], "Annual Report");
        assert_eq!(value["outline"][0]["level"], "H1");
        assert_eq!(value["outline"][0]["page"], 2);
        assert_eq!(value["metadata"]["page_count"], 10);
        assert_eq!(value["metadata"]["processed_at"], "2024-03-01T12:30:00Z");
    }

    #[test]
    fn test_result_deserializes_back() {
        let json = r#"{"title":"","outline":[],"metadata":{"page_count":0,"processed_at":"2024-03-01T12:30:00Z"}}"#;
        let result: DocumentResult = serde_json::from_str(json).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.metadata.processed_at, fixed_time());
    }

    #[test]
    fn test_page_lookup() {
        let doc = ExtractedDocument::new(vec![], 2).with_pages(vec![PageGeometry {
            number: 2,
            width: 612.0,
            height: 792.0,
        }]);
        assert!(doc.page(1).is_none());
        assert_eq!(doc.page(2).map(|p| p.height), Some(792.0));
        assert!(doc.is_empty());
    }
}
