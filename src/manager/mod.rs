//! The logger registry: owns every registered node, keeps parent links consistent as
//! loggers arrive in any order, and rebuilds levels and handlers from configuration.

mod listener;

pub use listener::PropertyChangeListener;

use crate::config::{self, ComponentRegistry, HandlerContext, Properties};
use crate::filter::Filter;
use crate::fmt::Formatter;
use crate::handler::Handler;
use crate::internal;
use crate::level::Level;
use crate::logger::Logger;
use indexmap::IndexMap;
use parking_lot::{Mutex, ReentrantMutex, RwLock};
use std::path::Path;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, LazyLock};

/// Name of the root logger.
pub const ROOT: &str = "";
/// Name of the logger every default manager pre-registers under the root.
pub const GLOBAL: &str = "global";

/// Level the root is given at construction and after a reset.
const ROOT_LEVEL: Level = Level::INFO;

static PROCESS_MANAGER: LazyLock<LogManager> = LazyLock::new(LogManager::new);

struct ManagerState {
    loggers: IndexMap<String, Arc<Logger>>,
    properties: Arc<Properties>,
}

/// Registry of named loggers plus the configuration they were last built from.
///
/// Registration, configuration loads and resets are serialized; logging through the
/// registered loggers needs no coordination with the manager.
pub struct LogManager {
    state: Mutex<ManagerState>,
    config_lock: ReentrantMutex<()>,
    components: RwLock<Arc<ComponentRegistry>>,
    listeners: Mutex<Vec<Arc<dyn PropertyChangeListener>>>,
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LogManager {
    /// Manager with the root logger (level `INFO`) and `global` already registered.
    /// The root cannot be replaced.
    #[must_use]
    pub fn new() -> Self {
        let manager = Self::custom();
        {
            let mut state = manager.state.lock();
            let root = Logger::new(ROOT);
            root.set_level(ROOT_LEVEL);
            let global = Logger::new(GLOBAL);
            global.set_parent(&root);
            state.loggers.insert(ROOT.to_string(), root);
            state.loggers.insert(GLOBAL.to_string(), global);
        }
        manager
    }

    /// Manager without any loggers. The first logger registered under `""` becomes its
    /// root.
    #[must_use]
    pub fn custom() -> Self {
        Self {
            state: Mutex::new(ManagerState {
                loggers: IndexMap::new(),
                properties: Arc::new(Properties::new()),
            }),
            config_lock: ReentrantMutex::new(()),
            components: RwLock::new(Arc::new(ComponentRegistry::default())),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Replaces the component tables used for subsequent configuration loads.
    #[must_use]
    pub fn with_components(self, components: ComponentRegistry) -> Self {
        *self.components.write() = Arc::new(components);
        self
    }

    /// Process-wide default manager, created on first use. Passing a manager around
    /// explicitly is preferred; this exists for code that cannot.
    #[must_use]
    pub fn process() -> &'static Self {
        &PROCESS_MANAGER
    }

    /// Registers `logger` under its name, links it to the closest registered ancestor
    /// and re-links registered descendants that are now closer to it. Loaded
    /// configuration for the name (level, `useParentHandlers`, handlers) is applied
    /// before returning; configured handlers are appended to any the logger already has.
    ///
    /// Returns `false` without changing anything when the name is taken.
    ///
    /// # Errors
    /// [`crate::Error::NullArgument`] for an anonymous logger.
    pub fn add_logger(&self, logger: &Arc<Logger>) -> Result<bool, crate::Error> {
        let name = logger.name().ok_or(crate::Error::NullArgument("logger name"))?;

        let properties = {
            let mut state = self.state.lock();
            if state.loggers.contains_key(name) {
                return Ok(false);
            }
            if let Some(parent) = closest_ancestor(&state.loggers, name) {
                logger.set_parent(&parent);
            }
            relink_descendants(&state.loggers, logger, name);
            state.loggers.insert(name.to_string(), Arc::clone(logger));
            Arc::clone(&state.properties)
        };
        internal::trace("MANAGER", &format!("registered logger '{name}'"));

        if !properties.is_empty() {
            self.apply_properties(logger, &properties);
        }
        Ok(true)
    }

    /// Registered logger with exactly this name. Never creates one.
    #[must_use]
    pub fn get_logger(&self, name: &str) -> Option<Arc<Logger>> {
        self.state.lock().loggers.get(name).cloned()
    }

    /// Registered logger with this name, registering a fresh one if needed.
    #[must_use = "the logger stays registered; use the returned handle to log through it"]
    pub fn get_or_create_logger(&self, name: &str) -> Arc<Logger> {
        if let Some(existing) = self.get_logger(name) {
            return existing;
        }
        let logger = Logger::new(name);
        match self.add_logger(&logger) {
            Ok(true) => logger,
            _ => self.get_logger(name).unwrap_or(logger),
        }
    }

    /// Unregistered, nameless logger parented to the root.
    #[must_use]
    pub fn anonymous_logger(&self) -> Arc<Logger> {
        let logger = Logger::anonymous();
        if let Some(root) = self.root() {
            logger.set_parent(&root);
        }
        logger
    }

    /// The `""` logger; absent only on a custom manager that has not registered one.
    #[must_use]
    pub fn root(&self) -> Option<Arc<Logger>> {
        self.get_logger(ROOT)
    }

    /// The pre-registered `global` logger of a default manager.
    #[must_use]
    pub fn global_logger(&self) -> Option<Arc<Logger>> {
        self.get_logger(GLOBAL)
    }

    /// Registered names in registration order.
    #[must_use]
    pub fn logger_names(&self) -> Vec<String> {
        self.state.lock().loggers.keys().cloned().collect()
    }

    /// Value from the last loaded configuration.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<String> {
        self.state.lock().properties.get(key).map(str::to_string)
    }

    /// Snapshot of the last loaded configuration.
    #[must_use]
    pub fn properties(&self) -> Arc<Properties> {
        Arc::clone(&self.state.lock().properties)
    }

    /// Replaces the configuration and rebuilds the tree from it.
    ///
    /// Order: reset, install `properties`, rebuild the root, run the `config`
    /// initializers left to right, rebuild every other registered logger named in the
    /// properties, re-apply the root level, notify listeners once. Unknown or failing
    /// components are reported to [`crate::internal`] and skipped.
    pub fn read_configuration(&self, properties: Properties) {
        let _guard = self.config_lock.lock();
        self.reset_loggers();

        let properties = Arc::new(properties);
        self.state.lock().properties = Arc::clone(&properties);
        internal::debug(
            "CONFIG",
            &format!("applying {} configuration properties", properties.len()),
        );

        let root = self.root();
        if let Some(root) = &root {
            self.apply_properties(root, &properties);
        }

        // Loggers registered by initializers are configured as they are added.
        let others: Vec<Arc<Logger>> = {
            let state = self.state.lock();
            state
                .loggers
                .iter()
                .filter(|(name, _)| !name.is_empty())
                .map(|(_, logger)| Arc::clone(logger))
                .collect()
        };
        if let Some(list) = properties.get("config") {
            for id in split_list(list) {
                self.run_initializer(id);
            }
        }

        for logger in &others {
            if logger.name().is_some_and(|name| properties.has_prefix(name)) {
                self.apply_properties(logger, &properties);
            }
        }

        if let Some(root) = &root
            && let Some(level) = configured_level(&properties, ROOT)
        {
            root.set_level(level);
        }

        self.notify_listeners();
    }

    /// Loads a `.properties` or `.toml` file and applies it.
    ///
    /// # Errors
    /// I/O or parse errors; the current configuration stays in place.
    pub fn read_configuration_from(&self, path: impl AsRef<Path>) -> Result<(), crate::Error> {
        let properties = Properties::load(path.as_ref())?;
        internal::info(
            "CONFIG",
            &format!("configuration loaded from {}", path.as_ref().display()),
        );
        self.read_configuration(properties);
        Ok(())
    }

    /// Loads `LOGHIVE_CONFIG_FILE`, else `<config_dir>/loghive/logging.properties`,
    /// else applies the built-in defaults (console handler at `INFO`).
    ///
    /// # Errors
    /// I/O or parse errors from a file that exists.
    pub fn read_default_configuration(&self) -> Result<(), crate::Error> {
        match config::locate_config_file() {
            Some(path) => self.read_configuration_from(path),
            None => {
                internal::debug("CONFIG", "no configuration file found, using defaults");
                self.read_configuration(Properties::builtin_defaults());
                Ok(())
            }
        }
    }

    /// Clears the configuration; every registered logger loses its level (the root
    /// goes back to `INFO`), filter and handlers. Removed handlers are closed.
    /// Listeners are not notified.
    pub fn reset(&self) {
        let _guard = self.config_lock.lock();
        self.reset_loggers();
    }

    fn reset_loggers(&self) {
        let loggers: Vec<Arc<Logger>> = {
            let mut state = self.state.lock();
            state.properties = Arc::new(Properties::new());
            state.loggers.values().cloned().collect()
        };
        for logger in loggers {
            let level = logger.name().is_some_and(str::is_empty).then_some(ROOT_LEVEL);
            logger.reset(level);
        }
    }

    /// Invoked once per [`LogManager::read_configuration`]. Adding the same listener
    /// twice makes it fire twice.
    pub fn add_property_change_listener(&self, listener: Arc<dyn PropertyChangeListener>) {
        self.listeners.lock().push(listener);
    }

    /// Removes one registration of `listener`; unknown listeners are ignored.
    pub fn remove_property_change_listener(&self, listener: &Arc<dyn PropertyChangeListener>) {
        let mut listeners = self.listeners.lock();
        if let Some(i) = listeners
            .iter()
            .position(|l| std::ptr::addr_eq(Arc::as_ptr(l), Arc::as_ptr(listener)))
        {
            listeners.remove(i);
        }
    }

    /// Component tables in effect.
    #[must_use]
    pub fn components(&self) -> Arc<ComponentRegistry> {
        Arc::clone(&*self.components.read())
    }

    /// Makes `name` usable in `handlers` lists of later configuration loads.
    pub fn register_handler<F>(&self, name: impl Into<String>, factory: F)
    where
        F: Fn(&HandlerContext<'_>) -> Result<Arc<dyn Handler>, crate::Error>
            + Send
            + Sync
            + 'static,
    {
        Arc::make_mut(&mut *self.components.write()).register_handler(name, factory);
    }

    /// Makes `name` usable as a `<handler>.formatter` value.
    pub fn register_formatter<F>(&self, name: impl Into<String>, factory: F)
    where
        F: Fn(&Properties) -> Result<Arc<dyn Formatter>, crate::Error> + Send + Sync + 'static,
    {
        Arc::make_mut(&mut *self.components.write()).register_formatter(name, factory);
    }

    /// Makes `name` usable as a `<handler>.filter` value.
    pub fn register_filter<F>(&self, name: impl Into<String>, factory: F)
    where
        F: Fn(&Properties) -> Result<Arc<dyn Filter>, crate::Error> + Send + Sync + 'static,
    {
        Arc::make_mut(&mut *self.components.write()).register_filter(name, factory);
    }

    /// Registers a hook that runs when its name appears in the `config` property.
    pub fn register_initializer<F>(&self, name: impl Into<String>, initializer: F)
    where
        F: Fn(&Self) -> Result<(), crate::Error> + Send + Sync + 'static,
    {
        Arc::make_mut(&mut *self.components.write()).register_initializer(name, initializer);
    }

    /// Applies `<name>.level`, `<name>.useParentHandlers` and `<name>.handlers` (plus
    /// `handlers` for the root).
    fn apply_properties(&self, logger: &Arc<Logger>, properties: &Properties) {
        apply_settings(logger, properties);
        self.attach_configured_handlers(logger, properties);
    }

    /// Builds the handlers listed for `logger` and appends them to its list. Identifiers
    /// that fail to resolve or construct are reported and skipped.
    fn attach_configured_handlers(&self, logger: &Logger, properties: &Properties) {
        let Some(name) = logger.name() else {
            return;
        };

        let mut ids: Vec<&str> = Vec::new();
        if name.is_empty()
            && let Some(list) = properties.get("handlers")
        {
            ids.extend(split_list(list));
        }
        if let Some(list) = properties.get(&format!("{name}.handlers")) {
            ids.extend(split_list(list));
        }
        if ids.is_empty() {
            return;
        }

        let registry = self.components();
        for id in ids {
            match registry.create_handler(id, properties) {
                Ok(handler) => logger.add_handler(handler),
                Err(e) => internal::warn(
                    "CONFIG",
                    &format!("skipping handler '{id}' for logger '{name}': {e}"),
                ),
            }
        }
    }

    fn run_initializer(&self, id: &str) {
        let initializer = match self.components().initializer(id) {
            Ok(initializer) => initializer,
            Err(e) => {
                internal::warn("CONFIG", &format!("skipping initializer: {e}"));
                return;
            }
        };
        match catch_unwind(AssertUnwindSafe(|| initializer(self))) {
            Ok(Ok(())) => internal::debug("CONFIG", &format!("initializer '{id}' ran")),
            Ok(Err(e)) => internal::warn("CONFIG", &format!("initializer '{id}' failed: {e}")),
            Err(_) => internal::error("CONFIG", &format!("initializer '{id}' panicked")),
        }
    }

    fn notify_listeners(&self) {
        let listeners = self.listeners.lock().clone();
        for listener in listeners {
            if catch_unwind(AssertUnwindSafe(|| listener.properties_changed())).is_err() {
                internal::error("CONFIG", "property change listener panicked");
            }
        }
    }
}

/// `true` when `ancestor` is a proper dotted prefix of `name`. The root is an
/// ancestor of every other name.
fn is_proper_ancestor(ancestor: &str, name: &str) -> bool {
    if ancestor.is_empty() {
        return !name.is_empty();
    }
    name.len() > ancestor.len()
        && name.starts_with(ancestor)
        && name.as_bytes()[ancestor.len()] == b'.'
}

/// Longest registered proper prefix of `name`, else the registered root.
fn closest_ancestor(loggers: &IndexMap<String, Arc<Logger>>, name: &str) -> Option<Arc<Logger>> {
    if name.is_empty() {
        return None;
    }
    name.rmatch_indices('.')
        .map(|(i, _)| &name[..i])
        .find_map(|prefix| loggers.get(prefix))
        .or_else(|| loggers.get(ROOT))
        .cloned()
}

/// Points registered descendants of `name` at `logger` when it is closer than their
/// current parent.
fn relink_descendants(loggers: &IndexMap<String, Arc<Logger>>, logger: &Arc<Logger>, name: &str) {
    for (child_name, child) in loggers {
        if !is_proper_ancestor(name, child_name) {
            continue;
        }
        let closer = child.parent().is_none_or(|current| {
            current
                .name()
                .is_some_and(|current| is_proper_ancestor(current, name))
        });
        if closer {
            child.set_parent(logger);
        }
    }
}

/// `<name>.level` and `<name>.useParentHandlers`.
fn apply_settings(logger: &Logger, properties: &Properties) {
    let Some(name) = logger.name() else {
        return;
    };

    if let Some(level) = configured_level(properties, name) {
        logger.set_level(level);
    }

    let key = format!("{name}.useParentHandlers");
    if let Some(text) = properties.get(&key) {
        match parse_bool(text) {
            Some(enabled) => logger.set_use_parent_handlers(enabled),
            None => internal::warn("CONFIG", &format!("{key}: '{text}' is not a boolean")),
        }
    }
}

fn configured_level(properties: &Properties, name: &str) -> Option<Level> {
    let key = format!("{name}.level");
    let text = properties.get(&key)?.trim();
    Level::parse(text)
        .inspect_err(|e| internal::warn("CONFIG", &format!("{key}: {e}")))
        .ok()
}

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
