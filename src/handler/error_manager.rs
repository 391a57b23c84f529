//! Where handlers send the I/O and formatting failures they swallow.

use crate::internal;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Failure category passed alongside a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Generic = 0,
    WriteFailure = 1,
    FlushFailure = 2,
    CloseFailure = 3,
    OpenFailure = 4,
    FormatFailure = 5,
}

impl ErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Generic => "GENERIC_FAILURE",
            Self::WriteFailure => "WRITE_FAILURE",
            Self::FlushFailure => "FLUSH_FAILURE",
            Self::CloseFailure => "CLOSE_FAILURE",
            Self::OpenFailure => "OPEN_FAILURE",
            Self::FormatFailure => "FORMAT_FAILURE",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_str(), *self as i32)
    }
}

/// Receiver of handler-side failures. Must not panic; `HandlerCore::report_error`
/// guards against it anyway.
pub trait ErrorManager: Send + Sync {
    fn error(&self, message: Option<&str>, cause: Option<&crate::Error>, code: ErrorCode);
}

/// Reports the first failure to the diagnostic channel and drops the rest, so a broken
/// sink does not flood stderr.
#[derive(Debug, Default)]
pub struct DefaultErrorManager {
    reported: AtomicBool,
}

impl DefaultErrorManager {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            reported: AtomicBool::new(false),
        }
    }
}

impl ErrorManager for DefaultErrorManager {
    fn error(&self, message: Option<&str>, cause: Option<&crate::Error>, code: ErrorCode) {
        if self.reported.swap(true, Ordering::AcqRel) {
            return;
        }

        let mut line = format!("handler error {code}");
        if let Some(message) = message {
            line.push_str(": ");
            line.push_str(message);
        }
        if let Some(cause) = cause {
            line.push_str(&format!(" (caused by: {cause})"));
        }
        internal::error("HANDLER", &line);
    }
}
