//! Unified error type for all loghive operations.

/// Error type for loghive operations.
#[derive(Debug)]
pub enum Error {
    /// I/O error.
    Io(std::io::Error),
    /// TOML config parsing error.
    ConfigParse(toml::de::Error),
    /// Config directory not found.
    ConfigDirNotFound,
    /// Text is neither a known level name nor an integer rank.
    InvalidFormat(String),
    /// A required argument was absent.
    NullArgument(&'static str),
    /// A numeric or structural argument is out of range.
    InvalidArgument(String),
    /// Encoding name is not one of the supported charsets.
    UnsupportedEncoding(String),
    /// Mandatory configuration is missing or cannot be constructed.
    Configuration(String),
    /// No factory is registered under this identifier.
    UnknownComponent {
        /// Component family ("handler", "formatter", "filter", "initializer").
        kind: &'static str,
        /// Identifier that failed to resolve.
        name: String,
    },
    /// Formatting/serialization error.
    Format(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::ConfigParse(e) => write!(f, "parse error: {e}"),
            Self::ConfigDirNotFound => write!(f, "config directory not found"),
            Self::InvalidFormat(s) => write!(f, "invalid level: '{s}'"),
            Self::NullArgument(what) => write!(f, "{what} must not be absent"),
            Self::InvalidArgument(s) => write!(f, "invalid argument: {s}"),
            Self::UnsupportedEncoding(s) => write!(f, "unsupported encoding: {s}"),
            Self::Configuration(s) => write!(f, "configuration error: {s}"),
            Self::UnknownComponent { kind, name } => write!(f, "unknown {kind}: {name}"),
            Self::Format(s) => write!(f, "format error: {s}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::ConfigParse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Self::ConfigParse(e)
    }
}
