//! loghive's own diagnostic channel. Configuration mistakes (unknown handler names,
//! malformed levels, failing initializers) and handler error reports end up here
//! instead of being thrown at the application.
//!
//! Lines go to stderr unless a sink is installed with [`set_sink`]. The threshold
//! defaults to `WARNING` and can be preset with `LOGHIVE_INTERNAL_LEVEL`.

use crate::level::Level;
use parking_lot::RwLock;
use std::io::Write;
use std::sync::{Arc, LazyLock};

/// Receives every diagnostic at or above the threshold.
pub type Sink = Arc<dyn Fn(Level, &str, &str) + Send + Sync>;

struct Diagnostics {
    threshold: Level,
    sink: Option<Sink>,
}

static DIAGNOSTICS: LazyLock<RwLock<Diagnostics>> = LazyLock::new(|| {
    let threshold = std::env::var("LOGHIVE_INTERNAL_LEVEL")
        .ok()
        .and_then(|v| Level::parse(v.trim()).ok())
        .unwrap_or(Level::WARNING);
    RwLock::new(Diagnostics {
        threshold,
        sink: None,
    })
});

/// Changes the threshold for subsequent diagnostics.
pub fn set_level(level: Level) {
    DIAGNOSTICS.write().threshold = level;
}

/// Current threshold for the crate's own diagnostics.
#[must_use]
pub fn level() -> Level {
    DIAGNOSTICS.read().threshold
}

/// Replaces the stderr writer; `None` restores it.
pub fn set_sink(sink: Option<Sink>) {
    DIAGNOSTICS.write().sink = sink;
}

fn log(level: Level, scope: &str, msg: &str) {
    let sink = {
        let diagnostics = DIAGNOSTICS.read();
        if diagnostics.threshold.is_off() || level < diagnostics.threshold {
            return;
        }
        diagnostics.sink.clone()
    };

    match sink {
        Some(sink) => sink(level, scope, msg),
        None => {
            let _ = writeln!(std::io::stderr(), "loghive: {level} [{scope}] {msg}");
        }
    }
}

/// Registration and other per-call detail.
pub fn trace(scope: &str, msg: &str) {
    log(Level::FINEST, scope, msg);
}

/// Configuration steps as they are applied.
pub fn debug(scope: &str, msg: &str) {
    log(Level::FINE, scope, msg);
}

/// Configuration files as they are loaded.
pub fn info(scope: &str, msg: &str) {
    log(Level::INFO, scope, msg);
}

/// Recoverable configuration problems.
pub fn warn(scope: &str, msg: &str) {
    log(Level::WARNING, scope, msg);
}

/// Failures that dropped output or configuration.
pub fn error(scope: &str, msg: &str) {
    log(Level::SEVERE, scope, msg);
}
