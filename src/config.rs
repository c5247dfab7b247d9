//! User configuration: default sheet size and extra built-ins.
//!
//! Read from `config.toml` in the platform config directory unless a path is
//! given on the command line.

use directories::ProjectDirs;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tabula_core::SheetBuilder;
use tabula_engine::engine::{Expression, SimpleParser};
use thiserror::Error;

const CONFIG_FILE: &str = "config.toml";
const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("refusing to read {path}: file too large ({size} bytes)")]
    TooLarge { path: PathBuf, size: u64 },

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid built-in name '{0}': names must be alphanumeric")]
    BuiltinName(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub rows: usize,
    pub columns: usize,
    pub builtins: BTreeMap<String, i64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            rows: 20,
            columns: 5,
            builtins: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(content)?;
        if let Some(name) = config
            .builtins
            .keys()
            .find(|name| name.is_empty() || !name.chars().all(char::is_alphanumeric))
        {
            return Err(ConfigError::BuiltinName(name.clone()));
        }
        Ok(config)
    }

    /// Load a config file that must exist.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let read_error = |source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        };
        let size = fs::metadata(path).map_err(read_error)?.len();
        if size > MAX_CONFIG_FILE_BYTES {
            return Err(ConfigError::TooLarge {
                path: path.to_path_buf(),
                size,
            });
        }
        let content = fs::read_to_string(path).map_err(read_error)?;
        let config = Config::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load the user's config file, falling back to defaults when there is none.
    pub fn load_default() -> Result<Config, ConfigError> {
        match default_path() {
            Some(path) if path.exists() => Config::load(&path),
            _ => Ok(Config::default()),
        }
    }

    /// A builder carrying the configured built-ins, creating sheets whose
    /// cells start empty.
    pub fn builder(&self) -> SheetBuilder {
        let mut builder = SheetBuilder::new(Arc::new(SimpleParser::new()), Expression::Empty);
        for (name, value) in &self.builtins {
            builder.include_builtin(name.as_str(), Expression::constant(*value));
        }
        builder
    }
}

fn default_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("com", "tabula", "tabula")?;
    Some(proj.config_dir().join(CONFIG_FILE))
}
