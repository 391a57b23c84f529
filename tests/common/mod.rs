//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use loghive::{ErrorCode, ErrorManager, Formatter, Handler, HandlerCore, Level, LogRecord};
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory writer whose contents stay readable after it is handed to a handler.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.0.lock().clone()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writer that fails every call.
pub struct BrokenWriter;

impl Write for BrokenWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::other("broken pipe"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::other("broken pipe"))
    }
}

/// Formatter with recognizable head and tail; records render as their raw message.
pub struct MockFormatter;

pub const MOCK_HEAD: &str = "MockFormatter_Head";
pub const MOCK_TAIL: &str = "MockFormatter_Tail";

impl Formatter for MockFormatter {
    fn format(&self, record: &LogRecord) -> Result<String, loghive::Error> {
        Ok(record.message().unwrap_or_default().to_string())
    }

    fn head(&self) -> String {
        MOCK_HEAD.to_string()
    }

    fn tail(&self) -> String {
        MOCK_TAIL.to_string()
    }
}

/// Formatter that always fails.
pub struct FailingFormatter;

impl Formatter for FailingFormatter {
    fn format(&self, _record: &LogRecord) -> Result<String, loghive::Error> {
        Err(loghive::Error::Format("cannot format".to_string()))
    }
}

/// Handler that keeps every record it is given.
#[derive(Default)]
pub struct RecordingHandler {
    core: HandlerCore,
    records: Mutex<Vec<LogRecord>>,
    flushes: AtomicUsize,
    closes: AtomicUsize,
}

impl RecordingHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .map(|r| r.message().unwrap_or_default().to_string())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.records.lock().len()
    }

    pub fn flushes(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl Handler for RecordingHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn publish(&self, record: &LogRecord) {
        if self.is_loggable(record) {
            self.records.lock().push(record.clone());
        }
    }

    fn flush(&self) {
        self.flushes.fetch_add(1, Ordering::SeqCst);
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Handler whose `publish` and `close` panic.
#[derive(Default)]
pub struct PanickingHandler {
    core: HandlerCore,
}

impl Handler for PanickingHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn publish(&self, _record: &LogRecord) {
        panic!("publish exploded");
    }

    fn flush(&self) {}

    fn close(&self) {
        panic!("close exploded");
    }
}

/// Error manager that keeps every report.
#[derive(Default)]
pub struct CollectingErrorManager {
    pub reports: Mutex<Vec<(Option<String>, Option<String>, ErrorCode)>>,
}

impl CollectingErrorManager {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn codes(&self) -> Vec<ErrorCode> {
        self.reports.lock().iter().map(|(_, _, code)| *code).collect()
    }
}

impl ErrorManager for CollectingErrorManager {
    fn error(&self, message: Option<&str>, cause: Option<&loghive::Error>, code: ErrorCode) {
        self.reports.lock().push((
            message.map(str::to_string),
            cause.map(ToString::to_string),
            code,
        ));
    }
}

/// Error manager that panics on every report.
pub struct PanickingErrorManager;

impl ErrorManager for PanickingErrorManager {
    fn error(&self, _message: Option<&str>, _cause: Option<&loghive::Error>, code: ErrorCode) {
        panic!("error manager exploded on {code}");
    }
}

pub fn record(level: Level, msg: &str) -> LogRecord {
    LogRecord::new(level, msg)
}
