//! Handler writing formatted records to an `io::Write` sink.
//!
//! The formatter's head is written lazily, right before the first record reaches the
//! current sink. Closing writes the tail (and the head, if nothing was written yet) and
//! drops the sink.

use super::{Encoding, ErrorCode, Handler, HandlerCore};
use crate::config::HandlerContext;
use crate::fmt::{Formatter, SimpleFormatter};
use crate::level::Level;
use crate::record::LogRecord;
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;

struct SinkState {
    writer: Option<Box<dyn Write + Send>>,
    head_written: bool,
}

pub struct StreamHandler {
    core: HandlerCore,
    sink: Mutex<SinkState>,
    /// `false` keeps the writer open after `close()`; used for process streams.
    release_on_close: bool,
}

impl Default for StreamHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamHandler {
    /// Handler without a sink: publishes are ignored until one is set.
    #[must_use]
    pub fn new() -> Self {
        Self::with_core(HandlerCore::new(Level::INFO, Arc::new(SimpleFormatter::new())))
    }

    /// Handler writing to `writer` at `INFO` with `formatter`.
    #[must_use]
    pub fn with_writer(writer: impl Write + Send + 'static, formatter: Arc<dyn Formatter>) -> Self {
        let handler = Self::with_core(HandlerCore::new(Level::INFO, formatter));
        handler.sink.lock().writer = Some(Box::new(writer));
        handler
    }

    /// Builds a sink-less handler from `<name>.*` properties (level defaults to `INFO`).
    #[must_use]
    pub fn from_config(ctx: &HandlerContext<'_>) -> Self {
        Self::with_core(HandlerCore::from_config(ctx, Level::INFO, || {
            Arc::new(SimpleFormatter::from_properties(ctx.properties()))
        }))
    }

    pub(super) fn with_core(core: HandlerCore) -> Self {
        Self {
            core,
            sink: Mutex::new(SinkState {
                writer: None,
                head_written: false,
            }),
            release_on_close: true,
        }
    }

    pub(super) fn retain_sink_on_close(mut self) -> Self {
        self.release_on_close = false;
        self
    }

    /// Closes the current sink (head/tail included), then switches to `writer`.
    pub fn set_output_stream(&self, writer: impl Write + Send + 'static) {
        let mut sink = self.sink.lock();
        self.close_sink(&mut sink, true);
        sink.writer = Some(Box::new(writer));
        sink.head_written = false;
    }

    /// `false` before a sink is set and after `close()`.
    #[must_use]
    pub fn has_sink(&self) -> bool {
        self.sink.lock().writer.is_some()
    }

    fn write_text(&self, sink: &mut SinkState, text: &str, code: ErrorCode) {
        if text.is_empty() {
            return;
        }
        let Some(writer) = sink.writer.as_mut() else {
            return;
        };
        let bytes = self.core.encoding().unwrap_or(Encoding::Utf8).encode(text);
        if let Err(e) = writer.write_all(&bytes) {
            self.core.report_error(None, Some(&e.into()), code);
        }
    }

    fn ensure_head(&self, sink: &mut SinkState, code: ErrorCode) {
        if !sink.head_written {
            sink.head_written = true;
            let head = self.core.formatter().head();
            self.write_text(sink, &head, code);
        }
    }

    fn flush_sink(&self, sink: &mut SinkState, code: ErrorCode) {
        if let Some(writer) = sink.writer.as_mut()
            && let Err(e) = writer.flush()
        {
            self.core.report_error(None, Some(&e.into()), code);
        }
    }

    fn close_sink(&self, sink: &mut SinkState, release: bool) {
        if sink.writer.is_none() {
            return;
        }
        self.ensure_head(sink, ErrorCode::CloseFailure);
        let tail = self.core.formatter().tail();
        self.write_text(sink, &tail, ErrorCode::CloseFailure);
        self.flush_sink(sink, ErrorCode::CloseFailure);
        if release {
            sink.writer = None;
            sink.head_written = false;
        }
    }
}

impl Handler for StreamHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn publish(&self, record: &LogRecord) {
        let mut sink = self.sink.lock();
        if sink.writer.is_none() || !self.core.is_loggable(record) {
            return;
        }

        let text = match self.core.formatter().format(record) {
            Ok(text) => text,
            Err(e) => {
                self.core.report_error(None, Some(&e), ErrorCode::FormatFailure);
                return;
            }
        };

        self.ensure_head(&mut sink, ErrorCode::WriteFailure);
        self.write_text(&mut sink, &text, ErrorCode::WriteFailure);
    }

    fn flush(&self) {
        let mut sink = self.sink.lock();
        self.flush_sink(&mut sink, ErrorCode::FlushFailure);
    }

    fn close(&self) {
        let mut sink = self.sink.lock();
        self.close_sink(&mut sink, self.release_on_close);
    }

    /// Without a sink nothing is loggable.
    fn is_loggable(&self, record: &LogRecord) -> bool {
        self.has_sink() && self.core.is_loggable(record)
    }

    /// Pending output is flushed under the old encoding before switching.
    fn set_encoding(&self, name: Option<&str>) -> Result<(), crate::Error> {
        name.map(str::parse::<Encoding>).transpose()?;
        let mut sink = self.sink.lock();
        self.flush_sink(&mut sink, ErrorCode::FlushFailure);
        self.core.set_encoding(name)
    }
}
