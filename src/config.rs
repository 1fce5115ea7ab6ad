//! Container configuration.
//!
//! Settings come from code (the `with_*` setters), from any [`ConfigSource`]
//! such as the process environment, or from JSON with the `config` feature.

use std::collections::HashMap;
use std::env;
use std::str::FromStr;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::cache::DEFAULT_REFLECTION_CACHE_CAPACITY;
use crate::error::{DiError, DiResult};

/// Default recursion bound for one resolution chain.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Default environment variable prefix.
pub const DEFAULT_ENV_PREFIX: &str = "FERROUS_AUTOWIRE";

/// Order in which aliases and bindings are followed during canonicalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum Canonicalization {
    /// At every step check aliases, then bindings, until neither applies.
    #[default]
    Interleaved,
    /// Follow aliases to exhaustion, then bindings to exhaustion. A binding
    /// target that is itself an alias is not followed.
    AliasesThenMappings,
}

impl Canonicalization {
    pub fn as_str(&self) -> &'static str {
        match self {
            Canonicalization::Interleaved => "interleaved",
            Canonicalization::AliasesThenMappings => "aliases_then_mappings",
        }
    }
}

impl FromStr for Canonicalization {
    type Err = DiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "interleaved" => Ok(Canonicalization::Interleaved),
            "aliases_then_mappings" | "aliases-then-mappings" => {
                Ok(Canonicalization::AliasesThenMappings)
            }
            other => Err(DiError::InvalidConfig(format!(
                "unknown canonicalization order: {other}"
            ))),
        }
    }
}

/// Source of raw configuration values.
pub trait ConfigSource: Send + Sync + std::fmt::Debug {
    /// Raw value for `key` (lower snake case, without prefix).
    fn get(&self, key: &str) -> Option<String>;
}

/// Environment variable configuration source.
///
/// `key` is looked up as `<PREFIX>_<KEY>` in upper case.
#[derive(Debug, Clone)]
pub struct EnvironmentConfigSource {
    prefix: String,
}

impl EnvironmentConfigSource {
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_ENV_PREFIX)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn var_name(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_uppercase()
        } else {
            format!("{}_{}", self.prefix.to_uppercase(), key.to_uppercase())
        }
    }
}

impl Default for EnvironmentConfigSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigSource for EnvironmentConfigSource {
    fn get(&self, key: &str) -> Option<String> {
        env::var(self.var_name(key)).ok()
    }
}

/// In-memory source, mostly for tests and embedding hosts.
#[derive(Debug, Clone, Default)]
pub struct MapConfigSource {
    values: HashMap<String, String>,
}

impl MapConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl ConfigSource for MapConfigSource {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Tunables of a [`Container`](crate::Container).
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{Canonicalization, ContainerConfig};
///
/// let config = ContainerConfig::default()
///     .with_reflection_cache_capacity(16)
///     .with_canonicalization(Canonicalization::AliasesThenMappings);
///
/// assert_eq!(config.reflection_cache_capacity, 16);
/// assert_eq!(config.max_depth, 1024);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ContainerConfig {
    /// Descriptors kept before FIFO eviction. Zero disables caching.
    pub reflection_cache_capacity: usize,
    /// Deepest construction chain allowed on one thread.
    pub max_depth: usize,
    pub canonicalization: Canonicalization,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            reflection_cache_capacity: DEFAULT_REFLECTION_CACHE_CAPACITY,
            max_depth: DEFAULT_MAX_DEPTH,
            canonicalization: Canonicalization::default(),
        }
    }
}

impl ContainerConfig {
    pub fn with_reflection_cache_capacity(mut self, capacity: usize) -> Self {
        self.reflection_cache_capacity = capacity;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_canonicalization(mut self, canonicalization: Canonicalization) -> Self {
        self.canonicalization = canonicalization;
        self
    }

    pub fn validate(&self) -> DiResult<()> {
        if self.max_depth == 0 {
            return Err(DiError::InvalidConfig(
                "max_depth must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Loads settings from `source`, keeping defaults for absent keys.
    pub fn load(source: &dyn ConfigSource) -> DiResult<Self> {
        let mut config = Self::default();

        if let Some(raw) = source.get("reflection_cache_capacity") {
            config.reflection_cache_capacity = parse_usize("reflection_cache_capacity", &raw)?;
        }
        if let Some(raw) = source.get("max_depth") {
            config.max_depth = parse_usize("max_depth", &raw)?;
        }
        if let Some(raw) = source.get("canonicalization") {
            config.canonicalization = raw.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reads `FERROUS_AUTOWIRE_*` variables.
    pub fn from_env() -> DiResult<Self> {
        Self::load(&EnvironmentConfigSource::new())
    }

    /// Reads `<PREFIX>_REFLECTION_CACHE_CAPACITY`, `<PREFIX>_MAX_DEPTH` and
    /// `<PREFIX>_CANONICALIZATION`.
    pub fn from_env_with_prefix(prefix: &str) -> DiResult<Self> {
        Self::load(&EnvironmentConfigSource::with_prefix(prefix))
    }

    /// Parses a JSON object; missing fields keep their defaults.
    #[cfg(feature = "config")]
    pub fn from_json_str(json: &str) -> DiResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| DiError::InvalidConfig(format!("invalid JSON configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

fn parse_usize(key: &str, raw: &str) -> DiResult<usize> {
    raw.trim()
        .parse()
        .map_err(|_| DiError::InvalidConfig(format!("{key} expects an unsigned integer, got {raw:?}")))
}
