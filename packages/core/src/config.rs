//! Runtime configuration
//!
//! Configuration is resolved from defaults plus environment overrides. The
//! default database lives in the centralized data directory:
//! - macOS/Linux: ~/.contentspace/database/content.db
//! - Windows: %USERPROFILE%\.contentspace\database\content.db

use crate::db::DEFAULT_BUSY_TIMEOUT_MS;
use crate::services::DEFAULT_MAX_ANCESTOR_DEPTH;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Override for [`ContentConfig::database_path`]
pub const ENV_DB_PATH: &str = "CONTENTSPACE_DB_PATH";
/// Override for [`ContentConfig::busy_timeout_ms`]
pub const ENV_BUSY_TIMEOUT_MS: &str = "CONTENTSPACE_BUSY_TIMEOUT_MS";
/// Override for [`ContentConfig::max_ancestor_depth`]
pub const ENV_MAX_ANCESTOR_DEPTH: &str = "CONTENTSPACE_MAX_ANCESTOR_DEPTH";

/// Configuration for the content store and service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Path to the libsql database file
    pub database_path: PathBuf,

    /// How long a connection attempt may wait on a locked database
    pub busy_timeout_ms: u64,

    /// Upper bound on the ancestor walk done by cycle detection
    pub max_ancestor_depth: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            max_ancestor_depth: DEFAULT_MAX_ANCESTOR_DEPTH,
        }
    }
}

impl ContentConfig {
    /// Defaults overlaid with `CONTENTSPACE_*` environment variables
    ///
    /// Unparsable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DB_PATH) {
            config.database_path = PathBuf::from(path);
        }

        if let Some(raw) = lookup(ENV_BUSY_TIMEOUT_MS) {
            match raw.trim().parse() {
                Ok(ms) => config.busy_timeout_ms = ms,
                Err(e) => tracing::warn!(
                    "Ignoring {}={:?}: {}; using {}",
                    ENV_BUSY_TIMEOUT_MS,
                    raw,
                    e,
                    config.busy_timeout_ms
                ),
            }
        }

        if let Some(raw) = lookup(ENV_MAX_ANCESTOR_DEPTH) {
            match raw.trim().parse() {
                Ok(depth) => config.max_ancestor_depth = depth,
                Err(e) => tracing::warn!(
                    "Ignoring {}={:?}: {}; using {}",
                    ENV_MAX_ANCESTOR_DEPTH,
                    raw,
                    e,
                    config.max_ancestor_depth
                ),
            }
        }

        config
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.database_path.as_os_str().is_empty() {
            return Err("database_path cannot be empty".to_string());
        }

        if self.max_ancestor_depth == 0 {
            return Err("max_ancestor_depth must be greater than 0".to_string());
        }

        Ok(())
    }
}

fn default_database_path() -> PathBuf {
    let base = dirs::home_dir().unwrap_or_else(|| {
        tracing::warn!("Cannot determine home directory, using the working directory");
        PathBuf::from(".")
    });

    base.join(".contentspace")
        .join("database")
        .join("content.db")
}
