//! Stepwise construction of a logger with its level, filter and handlers in place
//! before it is shared.

use super::Logger;
use crate::filter::Filter;
use crate::handler::Handler;
use crate::level::Level;
use crate::manager::LogManager;
use crate::record::{CallerResolver, ResourceBundle};
use std::sync::Arc;

pub struct LoggerBuilder {
    name: String,
    level: Option<Level>,
    filter: Option<Arc<dyn Filter>>,
    handlers: Vec<Arc<dyn Handler>>,
    use_parent_handlers: bool,
    resource_bundle: Option<Arc<ResourceBundle>>,
    caller_resolver: Option<Arc<dyn CallerResolver>>,
}

impl LoggerBuilder {
    /// Inherits its level and forwards to parent handlers unless told otherwise.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: None,
            filter: None,
            handlers: Vec::new(),
            use_parent_handlers: true,
            resource_bundle: None,
            caller_resolver: None,
        }
    }

    /// Own level; unset loggers inherit.
    #[must_use]
    pub const fn level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    /// Filter checked after the level.
    #[must_use]
    pub fn filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Appends a handler; may be called repeatedly.
    #[must_use]
    pub fn handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// `false` keeps records away from ancestors' handlers.
    #[must_use]
    pub const fn use_parent_handlers(mut self, enabled: bool) -> Self {
        self.use_parent_handlers = enabled;
        self
    }

    /// Bundle used to localize this logger's records.
    #[must_use]
    pub fn resource_bundle(mut self, bundle: ResourceBundle) -> Self {
        self.resource_bundle = Some(Arc::new(bundle));
        self
    }

    /// Resolver consulted once per record for its source class and method.
    #[must_use]
    pub fn caller_resolver(mut self, resolver: impl CallerResolver + 'static) -> Self {
        self.caller_resolver = Some(Arc::new(resolver));
        self
    }

    /// Unregistered logger with no parent.
    #[must_use]
    pub fn build(self) -> Arc<Logger> {
        let logger = Logger::with_name(Some(self.name));
        {
            let mut state = logger.state.write();
            state.level = self.level;
            state.filter = self.filter;
            state.handlers = self.handlers;
            state.use_parent_handlers = self.use_parent_handlers;
            state.resource_bundle = self.resource_bundle;
            state.caller_resolver = self.caller_resolver;
        }
        Arc::new(logger)
    }

    /// Builds and registers with `manager`. Loaded configuration for the name is
    /// applied on top of what was set here.
    ///
    /// # Errors
    /// [`crate::Error::InvalidArgument`] when the name is already registered.
    pub fn register(self, manager: &LogManager) -> Result<Arc<Logger>, crate::Error> {
        let logger = self.build();
        if manager.add_logger(&logger)? {
            Ok(logger)
        } else {
            Err(crate::Error::InvalidArgument(format!(
                "logger '{}' is already registered",
                logger.name().unwrap_or_default()
            )))
        }
    }
}
