//! Tests for logger registration, tree linking and reset.

mod common;

use common::{PanickingHandler, RecordingHandler};
use loghive::{Error, Level, LogManager, Logger, Properties, PropertyChangeListener};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn parent_name(logger: &Logger) -> Option<String> {
    logger
        .parent()
        .map(|p| p.name().unwrap_or_default().to_string())
}

#[test]
fn default_manager_has_root_and_global() {
    let manager = LogManager::new();
    let root = manager.root().unwrap();
    assert_eq!(root.level(), Some(Level::INFO));
    assert!(root.parent().is_none());

    let global = manager.global_logger().unwrap();
    assert_eq!(parent_name(&global).as_deref(), Some(""));
    assert_eq!(manager.logger_names(), ["", "global"]);
}

#[test]
fn custom_manager_starts_empty() {
    let manager = LogManager::custom();
    assert!(manager.logger_names().is_empty());
    assert!(manager.root().is_none());
}

#[test]
fn add_logger_refuses_duplicate_names() {
    let manager = LogManager::new();
    let first = Logger::new("dup.name");
    let second = Logger::new("dup.name");

    assert!(manager.add_logger(&first).unwrap());
    assert!(!manager.add_logger(&second).unwrap());
    assert!(Arc::ptr_eq(&manager.get_logger("dup.name").unwrap(), &first));
}

#[test]
fn default_manager_rejects_new_root() {
    let manager = LogManager::new();
    let original = manager.root().unwrap();
    assert!(!manager.add_logger(&Logger::new("")).unwrap());
    assert!(Arc::ptr_eq(&manager.root().unwrap(), &original));
}

#[test]
fn anonymous_logger_cannot_be_registered() {
    let manager = LogManager::new();
    assert!(matches!(
        manager.add_logger(&Logger::anonymous()),
        Err(Error::NullArgument(_))
    ));
}

#[test]
fn get_logger_never_creates() {
    let manager = LogManager::new();
    assert!(manager.get_logger("missing").is_none());
    assert!(manager.get_logger("missing").is_none());
    assert_eq!(manager.logger_names().len(), 2);
}

#[test]
fn get_or_create_returns_the_registered_instance() {
    let manager = LogManager::new();
    let a = manager.get_or_create_logger("x.y");
    let b = manager.get_or_create_logger("x.y");
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn parent_is_longest_registered_prefix() {
    let manager = LogManager::new();
    let a = manager.get_or_create_logger("a");
    let abc = manager.get_or_create_logger("a.b.c");
    assert!(Arc::ptr_eq(&abc.parent().unwrap(), &a));
}

#[test]
fn late_parent_adopts_existing_children() {
    let manager = LogManager::new();
    let abc = manager.get_or_create_logger("a.b.c");
    let abd = manager.get_or_create_logger("a.b.d");
    assert_eq!(parent_name(&abc).as_deref(), Some(""));

    let ab = manager.get_or_create_logger("a.b");
    assert!(Arc::ptr_eq(&abc.parent().unwrap(), &ab));
    assert!(Arc::ptr_eq(&abd.parent().unwrap(), &ab));
    assert_eq!(parent_name(&ab).as_deref(), Some(""));

    let a = manager.get_or_create_logger("a");
    assert!(Arc::ptr_eq(&ab.parent().unwrap(), &a));
    assert!(Arc::ptr_eq(&abc.parent().unwrap(), &ab));
}

#[test]
fn sibling_prefix_is_not_an_ancestor() {
    let manager = LogManager::new();
    let ab = manager.get_or_create_logger("a.b");
    let _ = manager.get_or_create_logger("a.bc");
    let abcd = manager.get_or_create_logger("a.bc.d");
    assert_eq!(parent_name(&ab).as_deref(), Some(""));
    assert_eq!(parent_name(&abcd).as_deref(), Some("a.bc"));
}

#[test]
fn registration_order_does_not_change_final_links() {
    let bottom_up = LogManager::custom();
    let gc1 = bottom_up.get_or_create_logger("p.c.g");
    let _ = bottom_up.get_or_create_logger("");
    let _ = bottom_up.get_or_create_logger("p.c");
    let _ = bottom_up.get_or_create_logger("p");

    let top_down = LogManager::custom();
    let _ = top_down.get_or_create_logger("");
    let _ = top_down.get_or_create_logger("p");
    let _ = top_down.get_or_create_logger("p.c");
    let gc2 = top_down.get_or_create_logger("p.c.g");

    assert_eq!(parent_name(&gc1), parent_name(&gc2));
    for name in ["p", "p.c"] {
        let a = bottom_up.get_logger(name).unwrap();
        let b = top_down.get_logger(name).unwrap();
        assert_eq!(parent_name(&a), parent_name(&b), "parent of {name}");
    }
    assert!(bottom_up.get_logger("").unwrap().parent().is_none());
}

#[test]
fn custom_manager_accepts_root_and_relinks_orphans() {
    let manager = LogManager::custom();
    let orphan = manager.get_or_create_logger("orphan");
    assert!(orphan.parent().is_none());

    let root = Logger::new("");
    assert!(manager.add_logger(&root).unwrap());
    assert!(Arc::ptr_eq(&orphan.parent().unwrap(), &root));
}

#[test]
fn anonymous_logger_parents_to_root_but_is_not_registered() {
    let manager = LogManager::new();
    let anon = manager.anonymous_logger();
    assert!(anon.name().is_none());
    assert_eq!(parent_name(&anon).as_deref(), Some(""));
    assert_eq!(manager.logger_names().len(), 2);

    let handler = RecordingHandler::new();
    manager.root().unwrap().add_handler(handler.clone());
    anon.info("from anon");
    assert_eq!(handler.count(), 1);
    assert_eq!(handler.records()[0].logger_name(), None);
}

#[test]
fn reset_clears_state_but_keeps_identity() {
    let manager = LogManager::new();
    let child = manager.get_or_create_logger("r.child");
    let handler = RecordingHandler::new();
    child.set_level(Level::FINE);
    child.add_handler(handler.clone());
    child.set_filter(Some(Arc::new(|_: &loghive::LogRecord| true)));
    let root = manager.root().unwrap();
    root.set_level(Level::SEVERE);
    root.add_handler(handler.clone());

    manager.reset();

    assert!(Arc::ptr_eq(&manager.get_logger("r.child").unwrap(), &child));
    assert_eq!(child.level(), None);
    assert!(child.filter().is_none());
    assert!(child.handlers().is_empty());
    assert_eq!(root.level(), Some(Level::INFO));
    assert!(root.handlers().is_empty());
    assert_eq!(handler.closes(), 2);
    assert_eq!(parent_name(&child).as_deref(), Some(""));
}

#[test]
fn reset_survives_panicking_close() {
    let manager = LogManager::new();
    let logger = manager.get_or_create_logger("fragile");
    let after = RecordingHandler::new();
    logger.add_handler(Arc::new(PanickingHandler::default()));
    logger.add_handler(after.clone());

    manager.reset();

    assert!(logger.handlers().is_empty());
    assert_eq!(after.closes(), 1);
}

#[test]
fn listeners_fire_once_per_load_and_not_on_reset() {
    let manager = LogManager::new();
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    let listener: Arc<dyn PropertyChangeListener> = Arc::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    manager.add_property_change_listener(Arc::clone(&listener));
    manager.read_configuration(Properties::from_iter([("a.level", "FINE"), ("b.level", "FINE")]));
    assert_eq!(fired.load(Ordering::SeqCst), 1);

    manager.reset();
    assert_eq!(fired.load(Ordering::SeqCst), 1);

    manager.add_property_change_listener(Arc::clone(&listener));
    manager.read_configuration(Properties::new());
    assert_eq!(fired.load(Ordering::SeqCst), 3);

    manager.remove_property_change_listener(&listener);
    manager.read_configuration(Properties::new());
    assert_eq!(fired.load(Ordering::SeqCst), 4);

    manager.remove_property_change_listener(&listener);
    manager.remove_property_change_listener(&listener);
    manager.read_configuration(Properties::new());
    assert_eq!(fired.load(Ordering::SeqCst), 4);
}

#[test]
fn concurrent_registration_converges() {
    let manager = LogManager::new();
    std::thread::scope(|s| {
        for t in 0..4 {
            let manager = &manager;
            s.spawn(move || {
                for i in 0..50 {
                    let _ = manager.get_or_create_logger(&format!("t{}.n{i}", t % 2));
                    let _ = manager.get_or_create_logger(&format!("t{}", t % 2));
                }
            });
        }
    });

    assert_eq!(manager.logger_names().len(), 2 + 2 + 100);
    for t in 0..2 {
        let parent = manager.get_logger(&format!("t{t}")).unwrap();
        for i in 0..50 {
            let child = manager.get_logger(&format!("t{t}.n{i}")).unwrap();
            assert!(Arc::ptr_eq(&child.parent().unwrap(), &parent));
        }
    }
}
