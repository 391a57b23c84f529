//! A named node in the logger tree. Each node filters records against its effective
//! level and its own filter, then hands them to its handlers and, unless told
//! otherwise, to every ancestor's handlers.

mod builder;
mod convenience;

pub use builder::LoggerBuilder;

use crate::filter::Filter;
use crate::handler::Handler;
use crate::internal;
use crate::level::Level;
use crate::record::{CallerResolver, LogRecord, ResourceBundle};
use parking_lot::RwLock;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Weak};

/// Effective level when no node up the chain carries one.
const FALLBACK_LEVEL: Level = Level::INFO;

struct LoggerState {
    level: Option<Level>,
    filter: Option<Arc<dyn Filter>>,
    handlers: Vec<Arc<dyn Handler>>,
    use_parent_handlers: bool,
    resource_bundle: Option<Arc<ResourceBundle>>,
    parent: Weak<Logger>,
    caller_resolver: Option<Arc<dyn CallerResolver>>,
}

/// Loggers are always shared through `Arc`; the parent link is weak so the tree is
/// owned by whoever registered the nodes.
pub struct Logger {
    name: Option<String>,
    state: RwLock<LoggerState>,
}

impl Logger {
    /// Unregistered logger with no parent. Use
    /// [`LogManager::get_or_create_logger`](crate::LogManager::get_or_create_logger) to
    /// get one wired into the tree.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::with_name(Some(name.into())))
    }

    /// Nameless logger. It cannot be registered.
    #[must_use]
    pub fn anonymous() -> Arc<Self> {
        Arc::new(Self::with_name(None))
    }

    /// Starts a [`LoggerBuilder`] for loggers assembled in one expression.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder::new(name)
    }

    pub(crate) fn with_name(name: Option<String>) -> Self {
        Self {
            name,
            state: RwLock::new(LoggerState {
                level: None,
                filter: None,
                handlers: Vec::new(),
                use_parent_handlers: true,
                resource_bundle: None,
                parent: Weak::new(),
                caller_resolver: None,
            }),
        }
    }

    /// `None` for anonymous loggers.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Own level; `None` inherits from the parent.
    #[must_use]
    pub fn level(&self) -> Option<Level> {
        self.state.read().level
    }

    /// `None` makes the logger inherit its parent's threshold again.
    pub fn set_level(&self, level: impl Into<Option<Level>>) {
        self.state.write().level = level.into();
    }

    /// First level found walking up from this node, or `INFO` when none is set.
    #[must_use]
    pub fn effective_level(&self) -> Level {
        if let Some(level) = self.level() {
            return level;
        }
        let mut node = self.parent();
        while let Some(current) = node {
            if let Some(level) = current.level() {
                return level;
            }
            node = current.parent();
        }
        FALLBACK_LEVEL
    }

    /// `false` when `level` is below the effective threshold or the threshold is `OFF`.
    #[must_use]
    pub fn is_loggable(&self, level: Level) -> bool {
        let threshold = self.effective_level();
        !threshold.is_off() && level >= threshold
    }

    /// Filter applied after the level check, before any handler sees the record.
    #[must_use]
    pub fn filter(&self) -> Option<Arc<dyn Filter>> {
        self.state.read().filter.clone()
    }

    /// Replaces the filter; `None` accepts everything the level admits.
    pub fn set_filter(&self, filter: Option<Arc<dyn Filter>>) {
        self.state.write().filter = filter;
    }

    /// Appends a handler. The same handler may be added more than once.
    pub fn add_handler(&self, handler: Arc<dyn Handler>) {
        self.state.write().handlers.push(handler);
    }

    /// Removes the first occurrence of `handler` (compared by identity). Returns whether
    /// anything was removed.
    pub fn remove_handler(&self, handler: &Arc<dyn Handler>) -> bool {
        let mut state = self.state.write();
        let position = state.handlers.iter().position(|h| same_handler(h, handler));
        position.map(|i| state.handlers.remove(i)).is_some()
    }

    /// Snapshot of the handler list.
    #[must_use]
    pub fn handlers(&self) -> Vec<Arc<dyn Handler>> {
        self.state.read().handlers.clone()
    }

    /// Whether records climb to the ancestors' handlers after this node's own.
    #[must_use]
    pub fn use_parent_handlers(&self) -> bool {
        self.state.read().use_parent_handlers
    }

    /// `false` stops records at this node.
    pub fn set_use_parent_handlers(&self, enabled: bool) {
        self.state.write().use_parent_handlers = enabled;
    }

    /// Own bundle only; records fall back to the nearest ancestor's bundle.
    #[must_use]
    pub fn resource_bundle(&self) -> Option<Arc<ResourceBundle>> {
        self.state.read().resource_bundle.clone()
    }

    /// Name of the own bundle, for display and configuration output.
    #[must_use]
    pub fn resource_bundle_name(&self) -> Option<String> {
        self.resource_bundle().map(|b| b.name().to_string())
    }

    /// Bundle used to localize records that arrive without one.
    pub fn set_resource_bundle(&self, bundle: Option<Arc<ResourceBundle>>) {
        self.state.write().resource_bundle = bundle;
    }

    /// Resolver handed to records built by this logger that do not carry one.
    pub fn set_caller_resolver(&self, resolver: Option<Arc<dyn CallerResolver>>) {
        self.state.write().caller_resolver = resolver;
    }

    /// `None` for the root, for unregistered loggers, and once the parent is dropped.
    #[must_use]
    pub fn parent(&self) -> Option<Arc<Self>> {
        self.state.read().parent.upgrade()
    }

    /// Re-points the parent link. Registered loggers are normally linked by the
    /// manager; calling this on them bypasses the tree's bookkeeping.
    pub fn set_parent(&self, parent: &Arc<Self>) {
        self.state.write().parent = Arc::downgrade(parent);
    }

    /// Dispatches `record` to this logger's handlers and then up the ancestor chain
    /// while `use_parent_handlers` holds.
    ///
    /// A handler that panics in `publish` is not isolated: the panic propagates to the
    /// caller and later handlers do not see the record.
    pub fn log(&self, mut record: LogRecord) {
        if !self.is_loggable(record.level()) {
            return;
        }

        let (filter, handlers, use_parent_handlers, resolver) = {
            let state = self.state.read();
            (
                state.filter.clone(),
                state.handlers.clone(),
                state.use_parent_handlers,
                state.caller_resolver.clone(),
            )
        };
        if filter.is_some_and(|f| !f.accepts(&record)) {
            return;
        }

        if record.logger_name().is_none() {
            record.set_logger_name(self.name.clone());
        }
        if record.resource_bundle().is_none()
            && let Some(bundle) = self.inherited_resource_bundle()
        {
            record.set_resource_bundle_name(Some(bundle.name().to_string()));
            record.set_resource_bundle(Some(bundle));
        }
        if !record.has_caller_resolver() && resolver.is_some() {
            record.set_caller_resolver(resolver);
        }

        for handler in &handlers {
            handler.publish(&record);
        }

        let mut climb = use_parent_handlers;
        let mut node = self.parent();
        while climb {
            let Some(current) = node else { break };
            let (handlers, uses_parent) = {
                let state = current.state.read();
                (state.handlers.clone(), state.use_parent_handlers)
            };
            for handler in &handlers {
                handler.publish(&record);
            }
            climb = uses_parent;
            node = current.parent();
        }
    }

    fn inherited_resource_bundle(&self) -> Option<Arc<ResourceBundle>> {
        if let Some(bundle) = self.resource_bundle() {
            return Some(bundle);
        }
        let mut node = self.parent();
        while let Some(current) = node {
            if let Some(bundle) = current.resource_bundle() {
                return Some(bundle);
            }
            node = current.parent();
        }
        None
    }

    /// Clears level (to `level`), filter and handlers, closing every removed handler.
    /// A panicking `close` is reported and the remaining handlers are still closed.
    pub(crate) fn reset(&self, level: Option<Level>) {
        let handlers = {
            let mut state = self.state.write();
            state.level = level;
            state.filter = None;
            std::mem::take(&mut state.handlers)
        };
        for handler in handlers {
            if catch_unwind(AssertUnwindSafe(|| handler.close())).is_err() {
                internal::error(
                    "MANAGER",
                    &format!(
                        "handler close panicked while resetting logger '{}'",
                        self.name().unwrap_or_default()
                    ),
                );
            }
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &state.level)
            .field("handlers", &state.handlers.len())
            .field("use_parent_handlers", &state.use_parent_handlers)
            .field(
                "parent",
                &state.parent.upgrade().map(|p| p.name.clone().unwrap_or_default()),
            )
            .finish_non_exhaustive()
    }
}

fn same_handler(a: &Arc<dyn Handler>, b: &Arc<dyn Handler>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
