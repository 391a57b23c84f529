//! Tests for building the logger tree from configuration.

mod common;

use common::RecordingHandler;
use loghive::{
    Encoding, Error, Handler, JsonFormatter, Level, LogManager, LogRecord, Logger,
    MemoryHandler, Properties,
};
use parking_lot::Mutex;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn props(pairs: &[(&str, &str)]) -> Properties {
    pairs.iter().copied().collect()
}

/// Manager with a `StubHandler` component that always hands out `handler`.
fn manager_with_stub(handler: &Arc<RecordingHandler>) -> LogManager {
    let manager = LogManager::new();
    let stub = Arc::clone(handler);
    manager.register_handler("StubHandler", move |_| Ok(stub.clone() as Arc<dyn Handler>));
    manager
}

#[test]
fn root_handlers_and_level_then_reset() {
    let handler = RecordingHandler::new();
    let manager = manager_with_stub(&handler);

    manager.read_configuration(props(&[("handlers", "StubHandler"), (".level", "FINE")]));

    let root = manager.get_logger("").unwrap();
    assert_eq!(root.handlers().len(), 1);
    assert_eq!(root.level(), Some(Level::FINE));
    assert_eq!(manager.property(".level").as_deref(), Some("FINE"));

    manager.reset();
    assert!(root.handlers().is_empty());
    assert_eq!(root.level(), Some(Level::INFO));
    assert!(manager.properties().is_empty());
    assert_eq!(handler.closes(), 1);
}

#[test]
fn unknown_handler_is_skipped() {
    let handler = RecordingHandler::new();
    let manager = manager_with_stub(&handler);

    manager.read_configuration(props(&[("handlers", "NoSuchHandler, StubHandler")]));
    assert_eq!(manager.root().unwrap().handlers().len(), 1);
}

#[test]
fn root_dot_handlers_key_is_also_read() {
    let handler = RecordingHandler::new();
    let manager = manager_with_stub(&handler);

    manager.read_configuration(props(&[("handlers", "StubHandler"), (".handlers", "StubHandler")]));
    assert_eq!(manager.root().unwrap().handlers().len(), 2);
}

#[test]
fn registered_loggers_are_reconfigured() {
    let handler = RecordingHandler::new();
    let manager = manager_with_stub(&handler);
    let logger = manager.get_or_create_logger("com.example");

    manager.read_configuration(props(&[
        ("com.example.level", "FINER"),
        ("com.example.handlers", "StubHandler"),
        ("com.example.useParentHandlers", "false"),
    ]));

    assert_eq!(logger.level(), Some(Level::FINER));
    assert_eq!(logger.handlers().len(), 1);
    assert!(!logger.use_parent_handlers());

    logger.finer("configured");
    assert_eq!(handler.messages(), ["configured"]);
}

#[test]
fn loggers_created_after_load_pick_up_properties() {
    let handler = RecordingHandler::new();
    let manager = manager_with_stub(&handler);
    manager.read_configuration(props(&[
        ("late.level", "WARNING"),
        ("late.useParentHandlers", "false"),
        ("late.handlers", "StubHandler"),
    ]));

    let late = manager.get_or_create_logger("late");
    assert_eq!(late.level(), Some(Level::WARNING));
    assert!(!late.use_parent_handlers());
    assert_eq!(late.handlers().len(), 1);

    manager.read_configuration((*manager.properties()).clone());
    assert_eq!(late.handlers().len(), 1);

    let unnamed = manager.get_or_create_logger("late.child");
    assert_eq!(unnamed.level(), None);
    assert_eq!(unnamed.effective_level(), Level::WARNING);
}

#[test]
fn added_logger_keeps_its_own_handlers_and_gains_configured_ones() {
    let manager = LogManager::new();
    manager.read_configuration(props(&[
        ("foo.handlers", "StreamHandler"),
        ("foo.level", "WARNING"),
        ("StreamHandler.level", "FINE"),
    ]));

    let foo = Logger::new("foo");
    foo.set_level(Level::ALL);
    let own = RecordingHandler::new();
    foo.add_handler(own.clone());

    assert!(manager.add_logger(&foo).unwrap());
    assert_eq!(foo.level(), Some(Level::WARNING));

    let handlers = foo.handlers();
    assert_eq!(handlers.len(), 2);
    assert!(std::ptr::addr_eq(Arc::as_ptr(&handlers[0]), Arc::as_ptr(&own)));
    assert_eq!(handlers[1].level(), Level::FINE);
}

#[test]
fn new_configuration_replaces_the_old_one() {
    let manager = LogManager::new();
    let logger = manager.get_or_create_logger("replace.me");
    manager.read_configuration(props(&[("replace.me.level", "SEVERE"), ("extra", "1")]));
    assert_eq!(logger.level(), Some(Level::SEVERE));

    manager.read_configuration(props(&[("other", "2")]));
    assert_eq!(logger.level(), None);
    assert_eq!(manager.property("extra"), None);
    assert_eq!(manager.property("other").as_deref(), Some("2"));
}

#[test]
fn repeated_loads_do_not_accumulate_handlers() {
    let handler = RecordingHandler::new();
    let manager = manager_with_stub(&handler);
    let config = props(&[("handlers", "StubHandler")]);

    manager.read_configuration(config.clone());
    manager.read_configuration(config);
    assert_eq!(manager.root().unwrap().handlers().len(), 1);
}

#[test]
fn malformed_logger_level_is_ignored() {
    let manager = LogManager::new();
    let logger = manager.get_or_create_logger("bad.level");
    manager.read_configuration(props(&[("bad.level.level", "LOUD")]));
    assert_eq!(logger.level(), None);
}

#[test]
fn handler_sub_properties_are_applied() {
    let manager = LogManager::new();
    manager.read_configuration(props(&[
        ("handlers", "StreamHandler"),
        ("StreamHandler.level", "WARNING"),
        ("StreamHandler.formatter", "JsonFormatter"),
        ("StreamHandler.encoding", "UTF-16LE"),
        ("StreamHandler.filter", "LoggerNameFilter"),
        ("LoggerNameFilter.prefix", "app"),
    ]));

    let handler = manager.root().unwrap().handlers().remove(0);
    assert_eq!(handler.level(), Level::WARNING);
    assert_eq!(handler.encoding(), Some(Encoding::Utf16Le));

    let filter = handler.filter().unwrap();
    let mut record = LogRecord::new(Level::SEVERE, "x");
    record.set_logger_name(Some("app.db".to_string()));
    assert!(filter.accepts(&record));
    record.set_logger_name(Some("web".to_string()));
    assert!(!filter.accepts(&record));

    let text = handler.formatter().format(&record).unwrap();
    assert!(text.starts_with('{'));
}

#[test]
fn malformed_handler_properties_fall_back() {
    let manager = LogManager::new();
    manager.read_configuration(props(&[
        ("handlers", "StreamHandler"),
        ("StreamHandler.level", "LOUD"),
        ("StreamHandler.formatter", "NoSuchFormatter"),
        ("StreamHandler.encoding", "EBCDIC-42"),
        ("StreamHandler.filter", "NoSuchFilter"),
    ]));

    let handler = manager.root().unwrap().handlers().remove(0);
    assert_eq!(handler.level(), Level::ALL);
    assert_eq!(handler.encoding(), None);
    assert!(handler.filter().is_none());

    let text = handler
        .formatter()
        .format(&LogRecord::new(Level::INFO, "plain"))
        .unwrap();
    assert!(text.contains("INFO: plain"));
}

#[test]
fn absent_handler_properties_use_defaults() {
    let manager = LogManager::new();
    manager.read_configuration(props(&[("handlers", "StreamHandler ConsoleHandler")]));

    let handlers = manager.root().unwrap().handlers();
    assert_eq!(handlers.len(), 2);
    assert!(handlers.iter().all(|h| h.level() == Level::INFO));
    assert!(handlers.iter().all(|h| h.filter().is_none()));
}

#[test]
fn memory_handler_is_built_with_its_target() {
    let target = RecordingHandler::new();
    let manager = manager_with_stub(&target);
    let seen: Arc<Mutex<Option<Arc<MemoryHandler>>>> = Arc::default();
    let slot = Arc::clone(&seen);
    manager.register_handler("InspectableMemory", move |ctx| {
        let handler = Arc::new(MemoryHandler::from_config(ctx)?);
        *slot.lock() = Some(Arc::clone(&handler));
        Ok(handler as Arc<dyn Handler>)
    });

    manager.read_configuration(props(&[
        ("handlers", "InspectableMemory"),
        ("InspectableMemory.size", "2"),
        ("InspectableMemory.push", "WARNING"),
        ("InspectableMemory.target", "StubHandler"),
    ]));

    let memory = seen.lock().clone().unwrap();
    assert_eq!(memory.capacity(), 2);
    assert_eq!(memory.push_level(), Level::WARNING);

    let root = manager.root().unwrap();
    root.info("one");
    root.info("two");
    root.info("three");
    assert_eq!(target.count(), 0);
    root.warning("push");
    assert_eq!(target.messages(), ["three", "push"]);
}

#[test]
fn memory_handler_without_target_is_a_configuration_error() {
    let manager = LogManager::new();
    let registry = manager.components();
    let result = registry.create_handler("MemoryHandler", &props(&[("MemoryHandler.size", "10")]));
    assert!(matches!(result, Err(Error::Configuration(_))));

    manager.read_configuration(props(&[("handlers", "MemoryHandler")]));
    assert!(manager.root().unwrap().handlers().is_empty());
}

#[test]
fn memory_handler_bad_size_uses_default() {
    let manager = LogManager::new();
    let registry = manager.components();
    let config = props(&[
        ("MemoryHandler.size", "-3"),
        ("MemoryHandler.target", "StreamHandler"),
    ]);
    let ctx = loghive::HandlerContext::new("MemoryHandler", &config, &registry);
    let memory = MemoryHandler::from_config(&ctx).unwrap();
    assert_eq!(memory.capacity(), 1000);
    assert_eq!(memory.push_level(), Level::SEVERE);
}

#[test]
fn self_targeting_memory_handler_does_not_recurse_forever() {
    let manager = LogManager::new();
    manager.read_configuration(props(&[
        ("handlers", "MemoryHandler"),
        ("MemoryHandler.target", "MemoryHandler"),
    ]));
    assert!(manager.root().unwrap().handlers().is_empty());
}

#[test]
fn initializers_run_in_order_and_failures_are_skipped() {
    let manager = LogManager::new();
    let order: Arc<Mutex<Vec<&'static str>>> = Arc::default();

    let log = Arc::clone(&order);
    manager.register_initializer("First", move |_| {
        log.lock().push("first");
        Ok(())
    });
    let log = Arc::clone(&order);
    manager.register_initializer("Failing", move |_| {
        log.lock().push("failing");
        Err(Error::Configuration("nope".to_string()))
    });
    let log = Arc::clone(&order);
    manager.register_initializer("Panicking", move |_| {
        log.lock().push("panicking");
        panic!("initializer exploded");
    });
    let log = Arc::clone(&order);
    manager.register_initializer("Last", move |_| {
        log.lock().push("last");
        Ok(())
    });

    manager.read_configuration(props(&[("config", "First Failing Unknown Panicking Last")]));
    assert_eq!(*order.lock(), ["first", "failing", "panicking", "last"]);
}

#[test]
fn initializers_may_call_back_into_the_manager() {
    let handler = RecordingHandler::new();
    let manager = manager_with_stub(&handler);
    manager.register_initializer("Wire", |manager: &LogManager| {
        let logger = manager.get_or_create_logger("wired");
        assert_eq!(manager.property("wired.level").as_deref(), Some("FINE"));
        logger.set_use_parent_handlers(false);
        manager.root().unwrap().set_level(Level::SEVERE);
        Ok(())
    });

    manager.read_configuration(props(&[
        ("config", "Wire"),
        (".level", "CONFIG"),
        ("wired.level", "FINE"),
        ("wired.handlers", "StubHandler"),
    ]));

    let wired = manager.get_logger("wired").unwrap();
    assert_eq!(wired.level(), Some(Level::FINE));
    assert_eq!(wired.handlers().len(), 1);
    assert!(!wired.use_parent_handlers());
    assert_eq!(manager.root().unwrap().level(), Some(Level::CONFIG));
}

#[test]
fn properties_file_is_loaded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("logging.properties");
    fs::write(
        &path,
        "# comment\nhandlers = StubHandler\n.level = FINEST\nfile.logger.level : WARNING\n",
    )
    .unwrap();

    let handler = RecordingHandler::new();
    let manager = manager_with_stub(&handler);
    let logger = manager.get_or_create_logger("file.logger");
    manager.read_configuration_from(&path).unwrap();

    assert_eq!(manager.root().unwrap().level(), Some(Level::FINEST));
    assert_eq!(manager.root().unwrap().handlers().len(), 1);
    assert_eq!(logger.level(), Some(Level::WARNING));
}

#[test]
fn toml_file_is_loaded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("logging.toml");
    fs::write(
        &path,
        r#"
handlers = ["StubHandler"]
".level" = "FINE"

[net.http]
level = "SEVERE"
useParentHandlers = false
"#,
    )
    .unwrap();

    let handler = RecordingHandler::new();
    let manager = manager_with_stub(&handler);
    let http = manager.get_or_create_logger("net.http");
    manager.read_configuration_from(&path).unwrap();

    assert_eq!(manager.root().unwrap().level(), Some(Level::FINE));
    assert_eq!(manager.root().unwrap().handlers().len(), 1);
    assert_eq!(http.level(), Some(Level::SEVERE));
    assert!(!http.use_parent_handlers());
}

#[test]
fn missing_file_keeps_current_configuration() {
    let manager = LogManager::new();
    manager.read_configuration(props(&[("keep", "yes")]));

    let result = manager.read_configuration_from("/definitely/not/here/logging.properties");
    assert!(matches!(result, Err(Error::Io(_))));
    assert_eq!(manager.property("keep").as_deref(), Some("yes"));
}

#[test]
fn builtin_defaults_wire_a_console_handler() {
    let manager = LogManager::new();
    manager.read_configuration(Properties::builtin_defaults());

    let root = manager.root().unwrap();
    assert_eq!(root.level(), Some(Level::INFO));
    let handlers = root.handlers();
    assert_eq!(handlers.len(), 1);
    assert_eq!(handlers[0].level(), Level::INFO);
}

#[test]
fn custom_formatter_component() {
    let manager = LogManager::new();
    manager.register_formatter("Json2", |_| {
        Ok(Arc::new(JsonFormatter::new()) as Arc<dyn loghive::Formatter>)
    });
    assert!(manager.components().formatter_names().any(|n| n == "Json2"));

    manager.read_configuration(props(&[
        ("handlers", "StreamHandler"),
        ("StreamHandler.formatter", "Json2"),
    ]));
    let handler = manager.root().unwrap().handlers().remove(0);
    let text = handler.formatter().format(&LogRecord::new(Level::INFO, "j")).unwrap();
    assert!(text.contains("\"msg\":\"j\""));
}
