//! `loghive` - hierarchical, configuration-driven logger registry and record dispatch.
//!
//! - A [`LogManager`] owns a tree of named [`Logger`]s keyed by dotted names
//!   (`com.example.net`), re-linking parents as loggers are registered in any order
//! - Loggers inherit their level from the closest ancestor that has one and pass
//!   records to their own handlers and then to every ancestor's handlers
//! - Handlers ([`StreamHandler`], [`ConsoleHandler`], [`MemoryHandler`]) filter and
//!   format independently and route their I/O failures to an [`ErrorManager`]
//! - Configuration is a flat key/value set ([`Properties`]) naming components that are
//!   resolved through a [`ComponentRegistry`]
//!
//! # Example
//!
//! ```
//! use loghive::{Level, LogManager, Properties};
//!
//! let manager = LogManager::new();
//! manager.read_configuration(Properties::from_iter([
//!     ("handlers", "ConsoleHandler"),
//!     (".level", "INFO"),
//!     ("com.example.level", "FINE"),
//! ]));
//!
//! let net = manager.get_or_create_logger("com.example.net");
//! assert_eq!(net.effective_level(), Level::FINE);
//! net.fine("connecting");
//! net.log_with_param(Level::WARNING, "retrying in {0}s", 5);
//! ```

pub mod config;
pub mod error;
pub mod filter;
pub mod fmt;
pub mod handler;
pub mod internal;
pub mod level;
pub mod logger;
pub mod manager;
pub mod record;

pub use config::{ComponentRegistry, HandlerContext, Properties};
pub use error::Error;
pub use filter::{Filter, LevelCeilingFilter, LoggerNameFilter};
pub use fmt::{Formatter, JsonFormatter, SimpleFormatter};
pub use handler::{
    ConsoleHandler, DefaultErrorManager, Encoding, ErrorCode, ErrorManager, Handler, HandlerCore,
    MemoryHandler, StreamHandler,
};
pub use level::Level;
pub use logger::{Logger, LoggerBuilder};
pub use manager::{LogManager, PropertyChangeListener};
pub use record::{CallerResolver, LogRecord, ResourceBundle, SourceLocation, Thrown};
