//! Severity levels that gate which records reach which loggers and handlers.
//!
//! A `Level` is a cheap `Copy` handle to process-lifetime data. Every level that has
//! ever been declared or parsed is interned, so parsing the same text twice hands back
//! the very same instance (see [`Level::same`]).

use crate::Error;
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::LazyLock;

/// Bundle that localizes the predefined level names.
pub const DEFAULT_BUNDLE: &str = "loghive.resources.levels";

#[derive(Debug)]
struct LevelData {
    name: &'static str,
    value: i32,
    resource_bundle_name: Option<&'static str>,
}

static OFF_DATA: LevelData = predefined("OFF", i32::MAX);
static SEVERE_DATA: LevelData = predefined("SEVERE", 1000);
static WARNING_DATA: LevelData = predefined("WARNING", 900);
static INFO_DATA: LevelData = predefined("INFO", 800);
static CONFIG_DATA: LevelData = predefined("CONFIG", 700);
static FINE_DATA: LevelData = predefined("FINE", 500);
static FINER_DATA: LevelData = predefined("FINER", 400);
static FINEST_DATA: LevelData = predefined("FINEST", 300);
static ALL_DATA: LevelData = predefined("ALL", i32::MIN);

const fn predefined(name: &'static str, value: i32) -> LevelData {
    LevelData {
        name,
        value,
        resource_bundle_name: Some(DEFAULT_BUNDLE),
    }
}

/// Interning tables: every declared level, plus every text that `parse` has resolved.
struct Registry {
    known: Vec<Level>,
    parsed: HashMap<String, Level>,
}

static REGISTRY: LazyLock<RwLock<Registry>> = LazyLock::new(|| {
    RwLock::new(Registry {
        known: Level::predefined().to_vec(),
        parsed: HashMap::new(),
    })
});

/// Totally ordered severity. Equality, ordering and hashing look at the rank only.
#[derive(Clone, Copy)]
pub struct Level(&'static LevelData);

impl Level {
    /// Threshold meaning "accept nothing". A record at this rank is never loggable.
    pub const OFF: Self = Self(&OFF_DATA);
    /// Serious failure.
    pub const SEVERE: Self = Self(&SEVERE_DATA);
    /// Potential problem.
    pub const WARNING: Self = Self(&WARNING_DATA);
    /// Informational message; the default threshold of the root logger.
    pub const INFO: Self = Self(&INFO_DATA);
    /// Static configuration message.
    pub const CONFIG: Self = Self(&CONFIG_DATA);
    /// Tracing information.
    pub const FINE: Self = Self(&FINE_DATA);
    /// Fairly detailed tracing; used for method entry, exit and throw records.
    pub const FINER: Self = Self(&FINER_DATA);
    /// Highly detailed tracing.
    pub const FINEST: Self = Self(&FINEST_DATA);
    /// Threshold meaning "accept everything".
    pub const ALL: Self = Self(&ALL_DATA);

    /// The predefined levels, most severe first.
    #[must_use]
    pub const fn predefined() -> [Self; 9] {
        [
            Self::OFF,
            Self::SEVERE,
            Self::WARNING,
            Self::INFO,
            Self::CONFIG,
            Self::FINE,
            Self::FINER,
            Self::FINEST,
            Self::ALL,
        ]
    }

    /// Declares a custom level. Later `parse` calls find it by name or rank.
    #[must_use]
    pub fn new(name: &str, value: i32) -> Self {
        Self::declare(name, value, None)
    }

    /// Declares a custom level whose name is localized through `bundle`.
    #[must_use]
    pub fn with_resource_bundle(name: &str, value: i32, bundle: &str) -> Self {
        Self::declare(name, value, Some(bundle))
    }

    fn declare(name: &str, value: i32, bundle: Option<&str>) -> Self {
        let mut registry = REGISTRY.write();
        if let Some(existing) = registry.known.iter().find(|l| {
            l.0.name == name && l.0.value == value && l.0.resource_bundle_name == bundle
        }) {
            return *existing;
        }
        let level = Self::leak(name, value, bundle);
        registry.known.push(level);
        level
    }

    fn leak(name: &str, value: i32, bundle: Option<&str>) -> Self {
        let data = LevelData {
            name: Box::leak(name.to_owned().into_boxed_str()),
            value,
            resource_bundle_name: bundle.map(|b| &*Box::leak(b.to_owned().into_boxed_str())),
        };
        Self(Box::leak(Box::new(data)))
    }

    /// Resolves `text` to a level: a known name first, then an integer rank.
    ///
    /// A rank that matches a known level yields that level; any other rank yields a
    /// fresh level named after the numeral. Identical input text always returns the
    /// same instance.
    ///
    /// # Errors
    /// Returns [`Error::InvalidFormat`] when `text` is neither a name nor an integer.
    pub fn parse(text: &str) -> Result<Self, Error> {
        if let Some(level) = REGISTRY.read().parsed.get(text) {
            return Ok(*level);
        }

        let mut registry = REGISTRY.write();
        if let Some(level) = registry.parsed.get(text) {
            return Ok(*level);
        }

        let level = if let Some(found) = registry.known.iter().find(|l| l.0.name == text) {
            *found
        } else {
            let value: i32 = text
                .parse()
                .map_err(|_| Error::InvalidFormat(text.to_string()))?;
            if let Some(found) = registry.known.iter().find(|l| l.0.value == value) {
                *found
            } else {
                let fresh = Self::leak(text, value, None);
                registry.known.push(fresh);
                fresh
            }
        };

        registry.parsed.insert(text.to_string(), level);
        Ok(level)
    }

    /// Level name as declared, e.g. `"INFO"`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.0.name
    }

    /// Integer rank used for every comparison.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0.value
    }

    /// Bundle used to localize the name, if any.
    #[must_use]
    pub const fn resource_bundle_name(self) -> Option<&'static str> {
        self.0.resource_bundle_name
    }

    /// Identity comparison, as opposed to the rank comparison of `==`.
    #[must_use]
    pub fn same(self, other: Self) -> bool {
        std::ptr::eq(self.0, other.0)
    }

    /// True for the "accept nothing" rank.
    #[must_use]
    pub const fn is_off(self) -> bool {
        self.0.value == i32::MAX
    }
}

impl PartialEq for Level {
    fn eq(&self, other: &Self) -> bool {
        self.0.value == other.0.value
    }
}

impl Eq for Level {}

impl PartialOrd for Level {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Level {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.value.cmp(&other.0.value)
    }
}

impl Hash for Level {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.value.hash(state);
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::INFO
    }
}

impl fmt::Debug for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Level({}={})", self.0.name, self.0.value)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.name)
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
