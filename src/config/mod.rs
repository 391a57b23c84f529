//! Key/value configuration store consumed by [`LogManager::read_configuration`], its
//! `.properties` and TOML parsers, and the component tables that turn identifiers
//! into handlers, formatters, filters and initializers.
//!
//! [`LogManager::read_configuration`]: crate::LogManager::read_configuration

mod registry;

pub use registry::{
    ComponentRegistry, FilterFactory, FormatterFactory, HandlerContext, HandlerFactory,
    Initializer,
};

use crate::internal;
use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming a configuration file that overrides the default location.
pub const CONFIG_FILE_ENV: &str = "LOGHIVE_CONFIG_FILE";

/// Configuration used when no file is found.
pub const BUILTIN_DEFAULTS: &[(&str, &str)] = &[
    ("handlers", "ConsoleHandler"),
    (".level", "INFO"),
    ("ConsoleHandler.level", "INFO"),
    ("ConsoleHandler.formatter", "SimpleFormatter"),
];

/// Insertion-ordered string map. Re-inserting a key keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: IndexMap<String, String>,
}

impl Properties {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Returns the previous value, if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.shift_remove(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `true` when some key starts with `<prefix>.`. The empty prefix matches keys
    /// beginning with a dot, which is how root properties (`.level`) are spelled.
    #[must_use]
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.keys().any(|key| {
            key.len() > prefix.len()
                && key.starts_with(prefix)
                && key.as_bytes()[prefix.len()] == b'.'
        })
    }

    /// Parses the line-oriented `.properties` format.
    ///
    /// `#` and `!` start comment lines; keys end at the first unescaped `=`, `:` or
    /// whitespace; a trailing odd backslash continues the line. Later duplicates win.
    ///
    /// # Errors
    /// [`crate::Error::Format`] on a malformed `\uXXXX` escape.
    pub fn parse(text: &str) -> Result<Self, crate::Error> {
        let mut properties = Self::new();
        for line in logical_lines(text) {
            let (key, value) = split_entry(&line);
            properties.insert(unescape(key)?, unescape(value)?);
        }
        Ok(properties)
    }

    /// Flattens a TOML document into dotted keys: `[com.example] level = "FINE"` becomes
    /// `com.example.level=FINE`. Arrays are joined with spaces.
    ///
    /// # Errors
    /// [`crate::Error::ConfigParse`] when the text is not valid TOML.
    pub fn from_toml(text: &str) -> Result<Self, crate::Error> {
        let table: toml::Table = toml::from_str(text)?;
        let mut properties = Self::new();
        flatten_table(&mut properties, None, &table);
        Ok(properties)
    }

    /// Reads a file, choosing the TOML parser for `.toml` and the properties parser
    /// otherwise. A leading `~` is expanded.
    ///
    /// # Errors
    /// I/O and parse errors.
    pub fn load(path: &Path) -> Result<Self, crate::Error> {
        let path = expand_path(path);
        internal::debug("CONFIG", &format!("Loading {}", path.display()));
        let content = fs::read_to_string(&path)?;
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            Self::from_toml(&content)
        } else {
            Self::parse(&content)
        }
    }

    /// The configuration used when no file exists.
    #[must_use]
    pub fn builtin_defaults() -> Self {
        BUILTIN_DEFAULTS.iter().copied().collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut properties = Self::new();
        for (k, v) in iter {
            properties.insert(k, v);
        }
        properties
    }
}

/// `<config_dir>/loghive/logging.properties`.
///
/// # Errors
/// [`crate::Error::ConfigDirNotFound`] when the platform has no config directory.
pub fn default_config_path() -> Result<PathBuf, crate::Error> {
    directories::BaseDirs::new()
        .map(|dirs| dirs.config_dir().join("loghive").join("logging.properties"))
        .ok_or(crate::Error::ConfigDirNotFound)
}

/// The file `read_default_configuration` should load: `LOGHIVE_CONFIG_FILE` if set,
/// else the default path if it exists.
#[must_use]
pub fn locate_config_file() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var(CONFIG_FILE_ENV)
        && !explicit.trim().is_empty()
    {
        return Some(expand_path(Path::new(explicit.trim())));
    }
    match default_config_path() {
        Ok(path) if path.exists() => Some(path),
        Ok(_) => None,
        Err(e) => {
            internal::debug("CONFIG", &format!("{e}"));
            None
        }
    }
}

fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).as_ref())
}

/// Joins continuation lines and drops blanks and comments.
fn logical_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut continuing = false;

    for raw in text.lines() {
        let line = if continuing {
            raw.trim_start()
        } else {
            let trimmed = raw.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                continue;
            }
            trimmed
        };

        let trailing = line.chars().rev().take_while(|&c| c == '\\').count();
        if trailing % 2 == 1 {
            current.push_str(&line[..line.len() - 1]);
            continuing = true;
        } else {
            current.push_str(line);
            lines.push(std::mem::take(&mut current));
            continuing = false;
        }
    }
    if continuing {
        lines.push(current);
    }
    lines
}

/// Splits at the first unescaped separator, skipping whitespace around it.
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || c.is_whitespace() {
            key_end = i;
            break;
        }
    }

    let key = &line[..key_end];
    let mut rest = line[key_end..].trim_start();
    if let Some(stripped) = rest.strip_prefix(['=', ':']) {
        rest = stripped.trim_start();
    }
    (key, rest)
}

fn unescape(text: &str) -> Result<String, crate::Error> {
    if !text.contains('\\') {
        return Ok(text.to_string());
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{000C}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = (hex.len() == 4)
                    .then(|| u32::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .and_then(char::from_u32)
                    .ok_or_else(|| crate::Error::Format(format!("malformed \\u{hex} escape")))?;
                out.push(decoded);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    Ok(out)
}

fn flatten_table(properties: &mut Properties, prefix: Option<&str>, table: &toml::Table) {
    for (key, value) in table {
        let full = prefix.map_or_else(|| key.clone(), |p| format!("{p}.{key}"));
        match value {
            toml::Value::Table(inner) => flatten_table(properties, Some(&full), inner),
            other => {
                properties.insert(full, scalar_text(other));
            }
        }
    }
}

fn scalar_text(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Array(items) => items
            .iter()
            .map(scalar_text)
            .collect::<Vec<_>>()
            .join(" "),
        other => other.to_string(),
    }
}
