//! Editor configuration.
//!
//! Merged in order from built-in defaults, `dungeon-db.toml`, `dungeon-db.local.toml`
//! and environment variables prefixed with `DUNGEON_DB_` (`__` separates sections):
//!
//! ```toml
//! [view]
//! page_size = 500
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use crate::util::error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Paging of the table data grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Number of rows requested per page
    #[serde(default = "default_page_size")]
    pub page_size: i64,

    /// Page shown when a table is opened (1-based)
    #[serde(default = "default_first_page")]
    pub first_page: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Either "text" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_page_size() -> i64 {
    1000
}
fn default_first_page() -> i64 {
    1
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "text".to_string()
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            page_size: default_page_size(),
            first_page: default_first_page(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from the default locations.
    pub fn load() -> Result<Self, error::Error> {
        let config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("dungeon-db.toml"))
            .merge(Toml::file("dungeon-db.local.toml"))
            .merge(Env::prefixed("DUNGEON_DB_").split("__"))
            .extract::<Config>()?;
        return config.validated();
    }

    /// Load configuration from a TOML string layered over the defaults.
    pub fn from_toml_str(toml: &str) -> Result<Self, error::Error> {
        let config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::string(toml))
            .extract::<Config>()?;
        return config.validated();
    }

    fn validated(self) -> Result<Self, error::Error> {
        if self.view.page_size < 1 {
            return Err(error::Error::AdhocError("view.page_size must be at least 1."));
        }
        if self.view.first_page < 1 {
            return Err(error::Error::AdhocError("view.first_page must be at least 1."));
        }
        return Ok(self);
    }
}
