//! One logging event, captured at the call site and handed by value to a logger.

use crate::level::Level;
use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicI32, AtomicI64, Ordering};
use std::sync::{Arc, OnceLock};

static NEXT_SEQUENCE: AtomicI64 = AtomicI64::new(0);
static NEXT_THREAD_ID: AtomicI32 = AtomicI32::new(10);

thread_local! {
    static THREAD_ID: Cell<i32> = const { Cell::new(0) };
}

fn current_thread_id() -> i32 {
    THREAD_ID.with(|id| {
        if id.get() == 0 {
            id.set(NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed));
        }
        id.get()
    })
}

/// Error attached to a record (the "thrown" exception).
pub type Thrown = Arc<dyn std::error::Error + Send + Sync>;

/// Caller-supplied key/value table used to localize messages.
///
/// Loading bundles from disk is outside this crate; callers build them in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceBundle {
    name: String,
    entries: HashMap<String, String>,
}

impl ResourceBundle {
    /// Empty bundle with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: HashMap::new(),
        }
    }

    /// Adds a localized entry.
    #[must_use]
    pub fn entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Localized text for `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

/// Class and method that issued a record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLocation {
    pub class_name: Option<String>,
    pub method_name: Option<String>,
}

/// Injected capability that works out who is logging.
///
/// Consulted at most once per record, and only when the source is actually read.
pub trait CallerResolver: Send + Sync {
    /// Returns the caller, or `None` when it cannot be determined.
    fn resolve(&self) -> Option<SourceLocation>;
}

impl<F> CallerResolver for F
where
    F: Fn() -> Option<SourceLocation> + Send + Sync,
{
    fn resolve(&self) -> Option<SourceLocation> {
        self()
    }
}

/// Captured data of a single logging event.
///
/// The sequence number is drawn from a process-wide counter when the record is built.
#[derive(Clone)]
pub struct LogRecord {
    level: Level,
    message: Option<String>,
    parameters: Option<Vec<String>>,
    thrown: Option<Thrown>,
    logger_name: Option<String>,
    resource_bundle: Option<Arc<ResourceBundle>>,
    resource_bundle_name: Option<String>,
    source: OnceLock<SourceLocation>,
    resolver: Option<Arc<dyn CallerResolver>>,
    sequence_number: i64,
    thread_id: i32,
    millis: i64,
}

impl LogRecord {
    /// Builds a record stamped with the current time, thread and next sequence number.
    #[must_use]
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: Some(message.into()),
            parameters: None,
            thrown: None,
            logger_name: None,
            resource_bundle: None,
            resource_bundle_name: None,
            source: OnceLock::new(),
            resolver: None,
            sequence_number: NEXT_SEQUENCE.fetch_add(1, Ordering::Relaxed),
            thread_id: current_thread_id(),
            millis: chrono::Utc::now().timestamp_millis(),
        }
    }

    #[must_use]
    pub const fn level(&self) -> Level {
        self.level
    }

    pub const fn set_level(&mut self, level: Level) {
        self.level = level;
    }

    /// Raw message or bundle key, before localization and parameter substitution.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn set_message(&mut self, message: Option<String>) {
        self.message = message;
    }

    #[must_use]
    pub fn parameters(&self) -> Option<&[String]> {
        self.parameters.as_deref()
    }

    pub fn set_parameters(&mut self, parameters: Option<Vec<String>>) {
        self.parameters = parameters;
    }

    #[must_use]
    pub fn thrown(&self) -> Option<&Thrown> {
        self.thrown.as_ref()
    }

    pub fn set_thrown(&mut self, thrown: Option<Thrown>) {
        self.thrown = thrown;
    }

    #[must_use]
    pub fn logger_name(&self) -> Option<&str> {
        self.logger_name.as_deref()
    }

    pub fn set_logger_name(&mut self, name: Option<String>) {
        self.logger_name = name;
    }

    #[must_use]
    pub const fn resource_bundle(&self) -> Option<&Arc<ResourceBundle>> {
        self.resource_bundle.as_ref()
    }

    pub fn set_resource_bundle(&mut self, bundle: Option<Arc<ResourceBundle>>) {
        self.resource_bundle = bundle;
    }

    #[must_use]
    pub fn resource_bundle_name(&self) -> Option<&str> {
        self.resource_bundle_name.as_deref()
    }

    pub fn set_resource_bundle_name(&mut self, name: Option<String>) {
        self.resource_bundle_name = name;
    }

    #[must_use]
    pub const fn sequence_number(&self) -> i64 {
        self.sequence_number
    }

    pub const fn set_sequence_number(&mut self, sequence: i64) {
        self.sequence_number = sequence;
    }

    #[must_use]
    pub const fn thread_id(&self) -> i32 {
        self.thread_id
    }

    pub const fn set_thread_id(&mut self, id: i32) {
        self.thread_id = id;
    }

    /// Event time in milliseconds since the Unix epoch.
    #[must_use]
    pub const fn millis(&self) -> i64 {
        self.millis
    }

    pub const fn set_millis(&mut self, millis: i64) {
        self.millis = millis;
    }

    /// Installs the resolver consulted the first time the source is read.
    ///
    /// Has no effect once the source has been resolved or set explicitly.
    pub fn set_caller_resolver(&mut self, resolver: Option<Arc<dyn CallerResolver>>) {
        self.resolver = resolver;
    }

    pub(crate) const fn has_caller_resolver(&self) -> bool {
        self.resolver.is_some()
    }

    /// Source class, resolving the caller on first access.
    #[must_use]
    pub fn source_class_name(&self) -> Option<&str> {
        self.source().class_name.as_deref()
    }

    /// Source method, resolving the caller on first access.
    #[must_use]
    pub fn source_method_name(&self) -> Option<&str> {
        self.source().method_name.as_deref()
    }

    pub fn set_source_class_name(&mut self, name: Option<String>) {
        let mut source = self.source.take().unwrap_or_default();
        source.class_name = name;
        self.source = OnceLock::from(source);
    }

    pub fn set_source_method_name(&mut self, name: Option<String>) {
        let mut source = self.source.take().unwrap_or_default();
        source.method_name = name;
        self.source = OnceLock::from(source);
    }

    // An unresolvable caller is remembered as an empty location.
    fn source(&self) -> &SourceLocation {
        self.source.get_or_init(|| {
            self.resolver
                .as_ref()
                .and_then(|resolver| resolver.resolve())
                .unwrap_or_default()
        })
    }
}

impl fmt::Debug for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogRecord")
            .field("level", &self.level)
            .field("message", &self.message)
            .field("parameters", &self.parameters)
            .field("thrown", &self.thrown.as_ref().map(ToString::to_string))
            .field("logger_name", &self.logger_name)
            .field("resource_bundle_name", &self.resource_bundle_name)
            .field("source", &self.source.get())
            .field("sequence_number", &self.sequence_number)
            .field("thread_id", &self.thread_id)
            .field("millis", &self.millis)
            .finish_non_exhaustive()
    }
}
