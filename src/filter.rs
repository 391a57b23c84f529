//! Record-level veto that runs after the level check on loggers and handlers.

use crate::level::Level;
use crate::record::LogRecord;

/// Predicate consulted for every record that passed the level threshold.
pub trait Filter: Send + Sync {
    /// `false` drops the record.
    fn accepts(&self, record: &LogRecord) -> bool;
}

impl<F> Filter for F
where
    F: Fn(&LogRecord) -> bool + Send + Sync,
{
    fn accepts(&self, record: &LogRecord) -> bool {
        self(record)
    }
}

/// Accepts records whose logger name starts with a prefix.
///
/// Registered in the component table as `LoggerNameFilter`; the prefix comes from the
/// `LoggerNameFilter.prefix` property.
#[derive(Debug, Clone, Default)]
pub struct LoggerNameFilter {
    prefix: String,
}

impl LoggerNameFilter {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Filter for LoggerNameFilter {
    fn accepts(&self, record: &LogRecord) -> bool {
        record
            .logger_name()
            .is_some_and(|name| name.starts_with(&self.prefix))
    }
}

/// Accepts records strictly below a ceiling level.
///
/// Paired with a handler threshold this gives a band, e.g. `FINE..WARNING`.
#[derive(Debug, Clone, Copy)]
pub struct LevelCeilingFilter {
    ceiling: Level,
}

impl LevelCeilingFilter {
    #[must_use]
    pub const fn new(ceiling: Level) -> Self {
        Self { ceiling }
    }
}

impl Filter for LevelCeilingFilter {
    fn accepts(&self, record: &LogRecord) -> bool {
        record.level() < self.ceiling
    }
}
