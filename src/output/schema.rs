//! Structural validation of serialized results.
//!
//! Runs on the `serde_json::Value` that is about to be written, so whatever
//! reaches disk has been checked in exactly the form a consumer will read.

use chrono::DateTime;
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Validator for the outline result schema.
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    level: Regex,
}

impl SchemaValidator {
    pub fn new() -> Self {
        Self {
            level: Regex::new(r"^H[1-9][0-9]*$").unwrap(),
        }
    }

    /// Check a serialized result. Errors are [`Error::SchemaViolation`].
    pub fn validate(&self, value: &Value) -> Result<()> {
        let root = object(value, "result")?;
        exact_keys(root, "result", &["title", "outline", "metadata"])?;

        string(&root["title"], "title")?;

        let metadata = object(&root["metadata"], "metadata")?;
        exact_keys(metadata, "metadata", &["page_count", "processed_at"])?;
        let page_count = unsigned(&metadata["page_count"], "metadata.page_count")?;
        let processed_at = string(&metadata["processed_at"], "metadata.processed_at")?;
        DateTime::parse_from_rfc3339(processed_at).map_err(|e| {
            violation(format!("metadata.processed_at {processed_at:?} is not an RFC 3339 timestamp: {e}"))
        })?;

        let outline = root["outline"]
            .as_array()
            .ok_or_else(|| violation("outline must be an array"))?;
        for (i, entry) in outline.iter().enumerate() {
            let path = format!("outline[{i}]");
            let entry = object(entry, &path)?;
            exact_keys(entry, &path, &["level", "text", "page"])?;

            let level = string(&entry["level"], &format!("{path}.level"))?;
            if !self.level.is_match(level) {
                return Err(violation(format!("{path}.level {level:?} is not H<n>")));
            }
            string(&entry["text"], &format!("{path}.text"))?;

            let page = unsigned(&entry["page"], &format!("{path}.page"))?;
            if page < 1 || page > page_count {
                return Err(violation(format!(
                    "{path}.page {page} is outside [1, {page_count}]"
                )));
            }
        }

        Ok(())
    }
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn violation(message: impl Into<String>) -> Error {
    Error::SchemaViolation(message.into())
}

fn object<'v>(value: &'v Value, path: &str) -> Result<&'v Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| violation(format!("{path} must be an object")))
}

fn string<'v>(value: &'v Value, path: &str) -> Result<&'v str> {
    value
        .as_str()
        .ok_or_else(|| violation(format!("{path} must be a string")))
}

fn unsigned(value: &Value, path: &str) -> Result<u64> {
    value
        .as_u64()
        .ok_or_else(|| violation(format!("{path} must be a non-negative integer")))
}

fn exact_keys(map: &Map<String, Value>, path: &str, keys: &[&str]) -> Result<()> {
    if let Some(missing) = keys.iter().find(|k| !map.contains_key(**k)) {
        return Err(violation(format!("{path} is missing {missing:?}")));
    }
    if let Some(extra) = map.keys().find(|k| !keys.contains(&k.as_str())) {
        return Err(violation(format!("{path} has unexpected key {extra:?}")));
    }
    Ok(())
}
