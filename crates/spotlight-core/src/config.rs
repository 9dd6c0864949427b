//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars.
//! The `[spotlight]` table is extracted into [`SpotlightConfig`]; every field
//! has a default so an absent file is a valid configuration.
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::identifier::DEFAULT_BASE_IDENTIFIER;

pub const SPOTLIGHT_KEY: &str = "spotlight";

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.spotlight()?;
        Ok(config)
    }

    /// Build from an inline TOML document. Used by tests and embedders that
    /// carry their own configuration.
    pub fn from_toml_str(toml: &str) -> Self {
        Self { figment: Figment::new().merge(Toml::string(toml)) }
    }

    /// The validated `[spotlight]` section, or defaults when it is absent.
    pub fn spotlight(&self) -> Result<SpotlightConfig> {
        if self.figment.find_value(SPOTLIGHT_KEY).is_err() {
            return Ok(SpotlightConfig::default());
        }
        let config: SpotlightConfig = self
            .figment
            .extract_inner(SPOTLIGHT_KEY)
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotlightConfig {
    /// Prefix of every unique and domain identifier.
    pub base_identifier: String,
    /// PNG used as the thumbnail of items that carry no image of their own.
    pub default_thumbnail: Option<String>,
    pub queue: QueueConfig,
    pub index: IndexConfig,
}

impl Default for SpotlightConfig {
    fn default() -> Self {
        Self {
            base_identifier: DEFAULT_BASE_IDENTIFIER.to_string(),
            default_thumbnail: None,
            queue: QueueConfig::default(),
            index: IndexConfig::default(),
        }
    }
}

impl SpotlightConfig {
    pub fn validate(&self) -> Result<()> {
        if self.base_identifier.is_empty() {
            return Err(Error::InvalidConfig("base_identifier must not be empty".into()));
        }
        if self.base_identifier.contains(['?', '&', '=']) {
            return Err(Error::InvalidConfig(format!(
                "base_identifier '{}' must not contain '?', '&' or '='",
                self.base_identifier
            )));
        }
        if self.queue.worker_threads == 0 {
            return Err(Error::InvalidConfig("queue.worker_threads must be at least 1".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    pub worker_threads: usize,
    pub thread_name: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self { worker_threads: 2, thread_name: "com.kk.spotlight.background".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// On-disk location of the local index. `None` leaves the choice to the
    /// embedding application.
    pub dir: Option<String>,
    pub writer_heap_bytes: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self { dir: None, writer_heap_bytes: 50_000_000 }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    // Expand env vars first
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    // Expand ~ at start
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
