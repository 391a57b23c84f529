//! Handlers are the sinks at the end of dispatch. Each one filters independently,
//! formats, and writes; failures inside a handler are routed to its [`ErrorManager`]
//! rather than surfacing in the logging call.

mod console;
mod encoding;
mod error_manager;
mod memory;
mod stream;

pub use console::ConsoleHandler;
pub use encoding::Encoding;
pub use error_manager::{DefaultErrorManager, ErrorCode, ErrorManager};
pub use memory::MemoryHandler;
pub use stream::StreamHandler;

use crate::config::HandlerContext;
use crate::filter::Filter;
use crate::fmt::{Formatter, SimpleFormatter};
use crate::internal;
use crate::level::Level;
use crate::record::LogRecord;
use parking_lot::RwLock;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

/// A record sink attached to one or more loggers.
///
/// Shared state (threshold, filter, formatter, encoding, error manager) lives in a
/// [`HandlerCore`]; the provided methods forward to it.
///
/// `publish` must report expected failures through [`Handler::report_error`]. A panic
/// escaping `publish` is not caught by logger dispatch: it unwinds out of
/// [`Logger::log`](crate::Logger::log) and later handlers miss that record.
pub trait Handler: Send + Sync {
    fn core(&self) -> &HandlerCore;

    /// Accepts one record, subject to [`Handler::is_loggable`].
    fn publish(&self, record: &LogRecord);

    fn flush(&self);

    /// Releases the sink. Must be safe to call more than once.
    fn close(&self);

    /// Level threshold and filter check.
    fn is_loggable(&self, record: &LogRecord) -> bool {
        self.core().is_loggable(record)
    }

    fn level(&self) -> Level {
        self.core().level()
    }

    fn set_level(&self, level: Level) {
        self.core().set_level(level);
    }

    fn filter(&self) -> Option<Arc<dyn Filter>> {
        self.core().filter()
    }

    fn set_filter(&self, filter: Option<Arc<dyn Filter>>) {
        self.core().set_filter(filter);
    }

    fn formatter(&self) -> Arc<dyn Formatter> {
        self.core().formatter()
    }

    fn set_formatter(&self, formatter: Arc<dyn Formatter>) {
        self.core().set_formatter(formatter);
    }

    fn encoding(&self) -> Option<Encoding> {
        self.core().encoding()
    }

    /// `None` selects the platform default (UTF-8).
    ///
    /// # Errors
    /// [`crate::Error::UnsupportedEncoding`]; the previous encoding stays in effect.
    fn set_encoding(&self, name: Option<&str>) -> Result<(), crate::Error> {
        self.core().set_encoding(name)
    }

    fn error_manager(&self) -> Arc<dyn ErrorManager> {
        self.core().error_manager()
    }

    fn set_error_manager(&self, manager: Arc<dyn ErrorManager>) {
        self.core().set_error_manager(manager);
    }

    /// Forwards to the error manager. Never panics.
    fn report_error(&self, message: Option<&str>, cause: Option<&crate::Error>, code: ErrorCode) {
        self.core().report_error(message, cause, code);
    }
}

struct CoreState {
    level: Level,
    filter: Option<Arc<dyn Filter>>,
    formatter: Arc<dyn Formatter>,
    encoding: Option<Encoding>,
    error_manager: Arc<dyn ErrorManager>,
}

/// State every handler carries. The formatter and error manager are always present.
pub struct HandlerCore {
    state: RwLock<CoreState>,
}

impl Default for HandlerCore {
    fn default() -> Self {
        Self::new(Level::ALL, Arc::new(SimpleFormatter::new()))
    }
}

impl HandlerCore {
    /// Core with no filter, platform encoding and a [`DefaultErrorManager`].
    #[must_use]
    pub fn new(level: Level, formatter: Arc<dyn Formatter>) -> Self {
        Self {
            state: RwLock::new(CoreState {
                level,
                filter: None,
                formatter,
                encoding: None,
                error_manager: Arc::new(DefaultErrorManager::new()),
            }),
        }
    }

    /// Reads `<name>.level`, `.filter`, `.formatter` and `.encoding`, each falling back
    /// on its own when absent or unusable.
    #[must_use]
    pub fn from_config(
        ctx: &HandlerContext<'_>,
        default_level: Level,
        default_formatter: impl FnOnce() -> Arc<dyn Formatter>,
    ) -> Self {
        let core = Self::new(
            ctx.level("level", default_level),
            ctx.formatter_or(default_formatter),
        );
        {
            let mut state = core.state.write();
            state.filter = ctx.filter();
            state.encoding = ctx.encoding();
        }
        core
    }

    /// Records below this level are not loggable.
    #[must_use]
    pub fn level(&self) -> Level {
        self.state.read().level
    }

    /// `OFF` silences the handler.
    pub fn set_level(&self, level: Level) {
        self.state.write().level = level;
    }

    /// Second gate after the level.
    #[must_use]
    pub fn filter(&self) -> Option<Arc<dyn Filter>> {
        self.state.read().filter.clone()
    }

    /// `None` removes the filter.
    pub fn set_filter(&self, filter: Option<Arc<dyn Filter>>) {
        self.state.write().filter = filter;
    }

    /// Formatter used for records, head and tail.
    #[must_use]
    pub fn formatter(&self) -> Arc<dyn Formatter> {
        Arc::clone(&self.state.read().formatter)
    }

    /// Takes effect for the next record written.
    pub fn set_formatter(&self, formatter: Arc<dyn Formatter>) {
        self.state.write().formatter = formatter;
    }

    /// `None` means UTF-8.
    #[must_use]
    pub fn encoding(&self) -> Option<Encoding> {
        self.state.read().encoding
    }

    /// # Errors
    /// [`crate::Error::UnsupportedEncoding`] leaves the current encoding unchanged.
    pub fn set_encoding(&self, name: Option<&str>) -> Result<(), crate::Error> {
        let encoding = name.map(str::parse::<Encoding>).transpose()?;
        self.state.write().encoding = encoding;
        Ok(())
    }

    /// Where write, flush, close and format failures are reported.
    #[must_use]
    pub fn error_manager(&self) -> Arc<dyn ErrorManager> {
        Arc::clone(&self.state.read().error_manager)
    }

    /// Replaces the failure sink.
    pub fn set_error_manager(&self, manager: Arc<dyn ErrorManager>) {
        self.state.write().error_manager = manager;
    }

    /// A record passes when its rank reaches the threshold and the filter, if any,
    /// accepts it. An `OFF` threshold passes nothing.
    #[must_use]
    pub fn is_loggable(&self, record: &LogRecord) -> bool {
        let (level, filter) = {
            let state = self.state.read();
            (state.level, state.filter.clone())
        };
        if level.is_off() || record.level() < level {
            return false;
        }
        filter.is_none_or(|f| f.accepts(record))
    }

    /// Routes a failure to the error manager; a panicking manager is reported to
    /// [`crate::internal`] and never reaches the caller.
    pub fn report_error(
        &self,
        message: Option<&str>,
        cause: Option<&crate::Error>,
        code: ErrorCode,
    ) {
        let manager = self.error_manager();
        if catch_unwind(AssertUnwindSafe(|| manager.error(message, cause, code))).is_err() {
            internal::error("HANDLER", &format!("error manager panicked while reporting {code}"));
        }
    }
}
