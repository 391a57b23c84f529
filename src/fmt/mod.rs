//! Turning records into text. Handlers own a [`Formatter`]; the concrete layouts here are
//! deliberately small, everything beyond them is left to user formatters.

mod format;
mod json;
pub mod message;
mod simple;

pub use format::{FormatSegment, FormatTemplate, FormatValues, Placeholder};
pub use json::JsonFormatter;
pub use message::format_message;
pub use simple::SimpleFormatter;

use crate::record::LogRecord;

/// Converts records to text, plus the preamble/postamble a stream handler writes around them.
pub trait Formatter: Send + Sync {
    /// Renders one record.
    ///
    /// # Errors
    /// Implementations may fail; stream handlers report the failure and skip the record.
    fn format(&self, record: &LogRecord) -> Result<String, crate::Error>;

    /// Text written once before the first record reaches a sink.
    fn head(&self) -> String {
        String::new()
    }

    /// Text written once when the sink is closed.
    fn tail(&self) -> String {
        String::new()
    }

    /// Localized, parameter-substituted message of `record`.
    fn format_message(&self, record: &LogRecord) -> String {
        format_message(record)
    }
}
