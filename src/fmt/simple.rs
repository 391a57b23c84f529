//! Human-readable one-record-per-line layout.

use super::{FormatTemplate, FormatValues, Formatter};
use crate::config::Properties;
use crate::record::LogRecord;
use chrono::{Local, TimeZone};

pub(super) const DEFAULT_TEMPLATE: &str = "{timestamp} {source}\n{level}: {msg}{thrown}\n";
const DEFAULT_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Template-driven text formatter with empty head and tail.
#[derive(Debug, Clone)]
pub struct SimpleFormatter {
    template: FormatTemplate,
    timestamp_format: String,
}

impl Default for SimpleFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleFormatter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            template: FormatTemplate::parse(DEFAULT_TEMPLATE),
            timestamp_format: DEFAULT_TIMESTAMP.to_string(),
        }
    }

    /// Reads `SimpleFormatter.format` and `SimpleFormatter.timestamp_format`.
    #[must_use]
    pub fn from_properties(properties: &Properties) -> Self {
        let mut formatter = Self::new();
        if let Some(template) = properties.get("SimpleFormatter.format") {
            formatter = formatter.template(template);
        }
        if let Some(ts) = properties.get("SimpleFormatter.timestamp_format") {
            formatter = formatter.timestamp_format(ts);
        }
        formatter
    }

    #[must_use]
    pub fn template(mut self, template: &str) -> Self {
        self.template = FormatTemplate::parse(template);
        self
    }

    /// strftime pattern for `{timestamp}`.
    #[must_use]
    pub fn timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = format.into();
        self
    }

    fn timestamp(&self, millis: i64) -> String {
        Local
            .timestamp_millis_opt(millis)
            .single()
            .map(|t| t.format(&self.timestamp_format).to_string())
            .unwrap_or_default()
    }
}

impl Formatter for SimpleFormatter {
    fn format(&self, record: &LogRecord) -> Result<String, crate::Error> {
        let source = match (record.source_class_name(), record.source_method_name()) {
            (Some(class), Some(method)) => format!("{class} {method}"),
            (Some(class), None) => class.to_string(),
            _ => record.logger_name().unwrap_or_default().to_string(),
        };
        let thrown = record
            .thrown()
            .map(|e| format!("\n{e}"))
            .unwrap_or_default();

        let values = FormatValues::new()
            .timestamp(self.timestamp(record.millis()))
            .level(record.level().name())
            .logger(record.logger_name().unwrap_or_default())
            .source(source)
            .msg(self.format_message(record))
            .thrown(thrown)
            .sequence(record.sequence_number())
            .thread(record.thread_id());

        Ok(self.template.render(&values))
    }
}
