//! Environment lookup and textual conversion.
//!
//! Flags read `<prefix><NAME>` on every resolution; nothing is cached, so changes to the
//! underlying source are visible on the next read.

use crate::value::{FlagType, FlagValue};
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::env::VarError;
use std::fmt::Debug;
use std::sync::Arc;

/// Prefix prepended to flag names to form their environment variable.
pub const DEFAULT_PREFIX: &str = "JISHAKU_";

/// Case-insensitive words that resolve a boolean flag to `true`.
pub const ENABLED_SYMBOLS: [&str; 6] = ["true", "t", "yes", "y", "on", "1"];

/// Case-insensitive words that resolve a boolean flag to `false`.
pub const DISABLED_SYMBOLS: [&str; 6] = ["false", "f", "no", "n", "off", "0"];

/// A source of environment variables.
pub trait EnvSource: Debug + Send + Sync {
    /// Returns the raw value of `key`, following [`std::env::var`]: an unset key is
    /// [`VarError::NotPresent`] and a value that is not valid Unicode is
    /// [`VarError::NotUnicode`].
    fn var(&self, key: &str) -> Result<String, VarError>;
}

/// Reads the real process environment on every lookup.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Result<String, VarError> {
        std::env::var(key)
    }
}

/// A shared in-memory environment.
///
/// Clones share the same map, so a handle kept outside the registry can change what the
/// registry sees on its next resolution.
#[derive(Debug, Default, Clone)]
pub struct MapEnv {
    vars: Arc<RwLock<FxHashMap<String, String>>>,
}

impl MapEnv {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.write().insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.vars.write().remove(key)
    }

    pub fn clear(&self) {
        self.vars.write().clear();
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let vars = iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { vars: Arc::new(RwLock::new(vars)) }
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Result<String, VarError> {
        self.vars.read().get(key).cloned().ok_or(VarError::NotPresent)
    }
}

/// Matches `raw` against the boolean vocabulary, ignoring ASCII case.
#[must_use]
pub fn parse_bool(raw: &str) -> Option<bool> {
    if ENABLED_SYMBOLS.iter().any(|s| s.eq_ignore_ascii_case(raw)) {
        Some(true)
    } else if DISABLED_SYMBOLS.iter().any(|s| s.eq_ignore_ascii_case(raw)) {
        Some(false)
    } else {
        None
    }
}

/// Converts already-trimmed text into a value of `ty`.
pub(crate) fn convert(ty: FlagType, raw: &str) -> Result<FlagValue, String> {
    match ty {
        FlagType::Bool => parse_bool(raw).map(FlagValue::Bool).ok_or_else(|| {
            format!("expected one of {} or {}", ENABLED_SYMBOLS.join("/"), DISABLED_SYMBOLS.join("/"))
        }),
        FlagType::Int => raw.parse::<i64>().map(FlagValue::Int).map_err(|e| e.to_string()),
        FlagType::Float => raw.parse::<f64>().map(FlagValue::Float).map_err(|e| e.to_string()),
        FlagType::Str => Ok(FlagValue::Str(raw.to_owned())),
    }
}
