//! Per-file processing log records.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// What happened to one input file, written as `<stem>.log.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEvent {
    pub filename: String,
    pub page_count: u32,
    #[serde(serialize_with = "serialize_millis")]
    pub start_time: DateTime<Utc>,
    #[serde(serialize_with = "serialize_millis")]
    pub end_time: DateTime<Utc>,
    pub duration_seconds: f64,
    pub sections_extracted: usize,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `{"log_event": {...}}` envelope.
#[derive(Serialize)]
pub struct LogEventEnvelope<'a> {
    pub log_event: &'a LogEvent,
}

impl LogEvent {
    /// An event for a file whose processing starts at `start_time`.
    pub fn started(filename: impl Into<String>, start_time: DateTime<Utc>) -> Self {
        Self {
            filename: filename.into(),
            page_count: 0,
            start_time,
            end_time: start_time,
            duration_seconds: 0.0,
            sections_extracted: 0,
            success: false,
            error: None,
        }
    }

    /// Close the event as a success.
    pub fn succeeded(mut self, end_time: DateTime<Utc>, page_count: u32, sections: usize) -> Self {
        self.finish(end_time);
        self.page_count = page_count;
        self.sections_extracted = sections;
        self.success = true;
        self
    }

    /// Close the event as a failure.
    pub fn failed(mut self, end_time: DateTime<Utc>, error: impl Into<String>) -> Self {
        self.finish(end_time);
        self.success = false;
        self.error = Some(error.into());
        self
    }

    fn finish(&mut self, end_time: DateTime<Utc>) {
        self.end_time = end_time;
        self.duration_seconds = (end_time - self.start_time)
            .to_std()
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
    }

    pub fn wrapped(&self) -> LogEventEnvelope<'_> {
        LogEventEnvelope { log_event: self }
    }
}

fn serialize_millis<S: serde::Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_event_shape() {
        let start = Utc.with_ymd_and_hms(2024, 2, 2, 8, 0, 0).unwrap();
        let event = LogEvent::started("paper.pdf", start).succeeded(start + Duration::milliseconds(1500), 12, 7);

        let value = serde_json::to_value(event.wrapped()).unwrap();
        let inner = &value["log_event"];
        assert_eq!(inner["filename"], "paper.pdf");
        assert_eq!(inner["page_count"], 12);
        assert_eq!(inner["sections_extracted"], 7);
        assert_eq!(inner["success"], true);
        assert_eq!(inner["duration_seconds"], 1.5);
        assert_eq!(inner["start_time"], "2024-02-02T08:00:00.000Z");
        assert!(inner.get("error").is_none());
    }

    #[test]
    fn test_failed_event_carries_error() {
        let start = Utc::now();
        let event = LogEvent::started("bad.pdf", start).failed(start, "Document is encrypted");
        let value = serde_json::to_value(event.wrapped()).unwrap();
        assert_eq!(value["log_event"]["success"], false);
        assert_eq!(value["log_event"]["error"], "Document is encrypted");
    }
}
