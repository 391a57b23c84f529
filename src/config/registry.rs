//! String-keyed factory tables. Configuration names components by identifier
//! (`handlers = ConsoleHandler`, `ConsoleHandler.formatter = JsonFormatter`); this is
//! where those identifiers are resolved.

use super::Properties;
use crate::filter::{Filter, LevelCeilingFilter, LoggerNameFilter};
use crate::fmt::{Formatter, JsonFormatter, SimpleFormatter};
use crate::handler::{ConsoleHandler, Encoding, Handler, MemoryHandler, StreamHandler};
use crate::internal;
use crate::level::Level;
use crate::manager::LogManager;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Builds a handler from the properties under its identifier.
pub type HandlerFactory =
    Arc<dyn Fn(&HandlerContext<'_>) -> Result<Arc<dyn Handler>, crate::Error> + Send + Sync>;
/// Builds a formatter from the full property set.
pub type FormatterFactory =
    Arc<dyn Fn(&Properties) -> Result<Arc<dyn Formatter>, crate::Error> + Send + Sync>;
/// Builds a filter from the full property set.
pub type FilterFactory =
    Arc<dyn Fn(&Properties) -> Result<Arc<dyn Filter>, crate::Error> + Send + Sync>;
/// Side-effecting hook named by the `config` property.
pub type Initializer = Arc<dyn Fn(&LogManager) -> Result<(), crate::Error> + Send + Sync>;

/// Nested handler construction (`MemoryHandler.target`) stops here.
const MAX_NESTING: usize = 8;

#[derive(Clone)]
pub struct ComponentRegistry {
    handlers: IndexMap<String, HandlerFactory>,
    formatters: IndexMap<String, FormatterFactory>,
    filters: IndexMap<String, FilterFactory>,
    initializers: IndexMap<String, Initializer>,
}

impl Default for ComponentRegistry {
    /// Registry with the built-in components.
    fn default() -> Self {
        let mut registry = Self::empty();

        registry.register_handler("StreamHandler", |ctx| {
            Ok(Arc::new(StreamHandler::from_config(ctx)) as Arc<dyn Handler>)
        });
        registry.register_handler("ConsoleHandler", |ctx| {
            Ok(Arc::new(ConsoleHandler::from_config(ctx)) as Arc<dyn Handler>)
        });
        registry.register_handler("MemoryHandler", |ctx| {
            Ok(Arc::new(MemoryHandler::from_config(ctx)?) as Arc<dyn Handler>)
        });

        registry.register_formatter("SimpleFormatter", |props| {
            Ok(Arc::new(SimpleFormatter::from_properties(props)) as Arc<dyn Formatter>)
        });
        registry.register_formatter("JsonFormatter", |_| {
            Ok(Arc::new(JsonFormatter::new()) as Arc<dyn Formatter>)
        });

        registry.register_filter("LoggerNameFilter", |props| {
            let prefix = props.get("LoggerNameFilter.prefix").unwrap_or_default();
            Ok(Arc::new(LoggerNameFilter::new(prefix)) as Arc<dyn Filter>)
        });
        registry.register_filter("LevelCeilingFilter", |props| {
            let ceiling = props
                .get("LevelCeilingFilter.level")
                .map_or(Ok(Level::OFF), |text| Level::parse(text.trim()))?;
            Ok(Arc::new(LevelCeilingFilter::new(ceiling)) as Arc<dyn Filter>)
        });

        registry
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("formatters", &self.formatters.keys().collect::<Vec<_>>())
            .field("filters", &self.filters.keys().collect::<Vec<_>>())
            .field("initializers", &self.initializers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ComponentRegistry {
    /// Registry without any components, not even the built-ins.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            handlers: IndexMap::new(),
            formatters: IndexMap::new(),
            filters: IndexMap::new(),
            initializers: IndexMap::new(),
        }
    }

    /// Registers or replaces a handler factory.
    pub fn register_handler<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&HandlerContext<'_>) -> Result<Arc<dyn Handler>, crate::Error>
            + Send
            + Sync
            + 'static,
    {
        self.handlers.insert(name.into(), Arc::new(factory));
    }

    /// Registers or replaces a formatter factory.
    pub fn register_formatter<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&Properties) -> Result<Arc<dyn Formatter>, crate::Error> + Send + Sync + 'static,
    {
        self.formatters.insert(name.into(), Arc::new(factory));
    }

    /// Registers or replaces a filter factory.
    pub fn register_filter<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&Properties) -> Result<Arc<dyn Filter>, crate::Error> + Send + Sync + 'static,
    {
        self.filters.insert(name.into(), Arc::new(factory));
    }

    /// Registers or replaces a `config` initializer.
    pub fn register_initializer<F>(&mut self, name: impl Into<String>, initializer: F)
    where
        F: Fn(&LogManager) -> Result<(), crate::Error> + Send + Sync + 'static,
    {
        self.initializers.insert(name.into(), Arc::new(initializer));
    }

    /// Identifiers accepted in `handlers` lists, in registration order.
    pub fn handler_names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Identifiers accepted as `<handler>.formatter`.
    pub fn formatter_names(&self) -> impl Iterator<Item = &str> {
        self.formatters.keys().map(String::as_str)
    }

    /// Builds the handler registered as `name`, reading `<name>.*` from `properties`.
    ///
    /// # Errors
    /// [`crate::Error::UnknownComponent`] or whatever the factory returns.
    pub fn create_handler(
        &self,
        name: &str,
        properties: &Properties,
    ) -> Result<Arc<dyn Handler>, crate::Error> {
        HandlerContext::new(name, properties, self).build()
    }

    /// # Errors
    /// [`crate::Error::UnknownComponent`] or whatever the factory returns.
    pub fn create_formatter(
        &self,
        name: &str,
        properties: &Properties,
    ) -> Result<Arc<dyn Formatter>, crate::Error> {
        let factory = self.formatters.get(name).ok_or_else(|| unknown("formatter", name))?;
        factory(properties)
    }

    /// # Errors
    /// [`crate::Error::UnknownComponent`] or whatever the factory returns.
    pub fn create_filter(
        &self,
        name: &str,
        properties: &Properties,
    ) -> Result<Arc<dyn Filter>, crate::Error> {
        let factory = self.filters.get(name).ok_or_else(|| unknown("filter", name))?;
        factory(properties)
    }

    /// # Errors
    /// [`crate::Error::UnknownComponent`].
    pub fn initializer(&self, name: &str) -> Result<Initializer, crate::Error> {
        self.initializers
            .get(name)
            .cloned()
            .ok_or_else(|| unknown("initializer", name))
    }
}

fn unknown(kind: &'static str, name: &str) -> crate::Error {
    crate::Error::UnknownComponent {
        kind,
        name: name.to_string(),
    }
}

/// What a handler factory sees: its identifier, the configuration, and the registry
/// for building nested components.
pub struct HandlerContext<'a> {
    name: &'a str,
    properties: &'a Properties,
    registry: &'a ComponentRegistry,
    depth: usize,
}

impl<'a> HandlerContext<'a> {
    /// Context for a top-level handler named `name`.
    #[must_use]
    pub const fn new(
        name: &'a str,
        properties: &'a Properties,
        registry: &'a ComponentRegistry,
    ) -> Self {
        Self {
            name,
            properties,
            registry,
            depth: 0,
        }
    }

    /// Identifier the handler was requested by; also its property prefix.
    #[must_use]
    pub const fn name(&self) -> &'a str {
        self.name
    }

    #[must_use]
    pub const fn properties(&self) -> &'a Properties {
        self.properties
    }

    #[must_use]
    pub const fn registry(&self) -> &'a ComponentRegistry {
        self.registry
    }

    /// `<name>.<suffix>`, trimmed.
    #[must_use]
    pub fn property(&self, suffix: &str) -> Option<&'a str> {
        self.properties
            .get(&format!("{}.{suffix}", self.name))
            .map(str::trim)
    }

    /// Absent gives `default`; malformed gives `ALL`.
    #[must_use]
    pub fn level(&self, suffix: &str, default: Level) -> Level {
        let Some(text) = self.property(suffix) else {
            return default;
        };
        Level::parse(text).unwrap_or_else(|e| {
            internal::warn("CONFIG", &format!("{}.{suffix}: {e}, using ALL", self.name));
            Level::ALL
        })
    }

    /// Filter named by `<name>.filter`; unknown or failing identifiers give none.
    #[must_use]
    pub fn filter(&self) -> Option<Arc<dyn Filter>> {
        let id = self.property("filter")?;
        self.registry
            .create_filter(id, self.properties)
            .inspect_err(|e| internal::warn("CONFIG", &format!("{}.filter: {e}", self.name)))
            .ok()
    }

    /// Formatter named by `<name>.formatter`, else `default()`.
    pub fn formatter_or(&self, default: impl FnOnce() -> Arc<dyn Formatter>) -> Arc<dyn Formatter> {
        let Some(id) = self.property("formatter") else {
            return default();
        };
        match self.registry.create_formatter(id, self.properties) {
            Ok(formatter) => formatter,
            Err(e) => {
                internal::warn("CONFIG", &format!("{}.formatter: {e}, using default", self.name));
                default()
            }
        }
    }

    /// Encoding named by `<name>.encoding`; unsupported names give the platform default.
    #[must_use]
    pub fn encoding(&self) -> Option<Encoding> {
        let text = self.property("encoding")?;
        text.parse::<Encoding>()
            .inspect_err(|e| internal::warn("CONFIG", &format!("{}.encoding: {e}", self.name)))
            .ok()
    }

    /// Builds another handler (e.g. a delegation target) from the same configuration.
    ///
    /// # Errors
    /// Unknown identifier, factory failure, or nesting deeper than the limit.
    pub fn create_handler(&self, name: &str) -> Result<Arc<dyn Handler>, crate::Error> {
        if self.depth >= MAX_NESTING {
            return Err(crate::Error::Configuration(format!(
                "handler nesting too deep at {name}"
            )));
        }
        HandlerContext {
            name,
            properties: self.properties,
            registry: self.registry,
            depth: self.depth + 1,
        }
        .build()
    }

    fn build(&self) -> Result<Arc<dyn Handler>, crate::Error> {
        let factory = self
            .registry
            .handlers
            .get(self.name)
            .ok_or_else(|| unknown("handler", self.name))?;
        factory(self)
    }
}
