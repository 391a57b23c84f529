//! One JSON object per record (JSON Lines), for sinks that feed `jq` or a log shipper.

use super::Formatter;
use crate::record::LogRecord;
use chrono::{TimeZone, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct JsonEntry<'a> {
    /// RFC 3339, UTC.
    ts: String,
    millis: i64,
    sequence: i64,
    level: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    logger: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    class: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    method: Option<&'a str>,
    thread: i32,
    msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    thrown: Option<String>,
}

/// JSONL formatter: no head, no tail, newline after every object.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, record: &LogRecord) -> Result<String, crate::Error> {
        let ts = Utc
            .timestamp_millis_opt(record.millis())
            .single()
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();

        let entry = JsonEntry {
            ts,
            millis: record.millis(),
            sequence: record.sequence_number(),
            level: record.level().name(),
            logger: record.logger_name(),
            class: record.source_class_name(),
            method: record.source_method_name(),
            thread: record.thread_id(),
            msg: self.format_message(record),
            thrown: record.thrown().map(ToString::to_string),
        };

        let mut json = serde_json::to_string(&entry)
            .map_err(|e| crate::Error::Format(format!("JSON serialization failed: {e}")))?;
        json.push('\n');
        Ok(json)
    }
}
