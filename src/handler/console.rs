//! Stream handler bound to stderr.

use super::{Handler, HandlerCore, StreamHandler};
use crate::config::HandlerContext;
use crate::fmt::SimpleFormatter;
use crate::level::Level;
use crate::record::LogRecord;
use std::sync::Arc;

/// Writes to stderr and flushes after every record. `close()` writes the tail but
/// leaves stderr open.
pub struct ConsoleHandler {
    inner: StreamHandler,
}

impl Default for ConsoleHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleHandler {
    #[must_use]
    pub fn new() -> Self {
        Self::wrap(StreamHandler::with_core(HandlerCore::new(
            Level::INFO,
            Arc::new(SimpleFormatter::new()),
        )))
    }

    /// Reads `<name>.level` (default `INFO`), `.filter`, `.formatter`, `.encoding`.
    #[must_use]
    pub fn from_config(ctx: &HandlerContext<'_>) -> Self {
        Self::wrap(StreamHandler::from_config(ctx))
    }

    fn wrap(inner: StreamHandler) -> Self {
        let inner = inner.retain_sink_on_close();
        inner.set_output_stream(std::io::stderr());
        Self { inner }
    }
}

impl Handler for ConsoleHandler {
    fn core(&self) -> &HandlerCore {
        self.inner.core()
    }

    fn publish(&self, record: &LogRecord) {
        self.inner.publish(record);
        self.inner.flush();
    }

    fn flush(&self) {
        self.inner.flush();
    }

    fn close(&self) {
        self.inner.close();
    }

    fn is_loggable(&self, record: &LogRecord) -> bool {
        self.inner.is_loggable(record)
    }

    fn set_encoding(&self, name: Option<&str>) -> Result<(), crate::Error> {
        self.inner.set_encoding(name)
    }
}
