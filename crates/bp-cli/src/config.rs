//! `blueprint.toml` loading with environment overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use bp_core::{DEFAULT_SENTINEL, DEFAULT_TITLE};
use bp_parser::ParseOptions;
use bp_store::StoreBackend;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "blueprint.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub parser: ParserConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub data_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::File,
            data_dir: PathBuf::from(".blueprint-data"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ParserConfig {
    pub sentinel: String,
    pub title: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            sentinel: DEFAULT_SENTINEL.to_string(),
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl Config {
    /// Explicit path must exist; otherwise `./blueprint.toml` is used when
    /// present, then defaults. Environment variables apply on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// `PORT`, `BLUEPRINT_HOST`, `BLUEPRINT_STORE`, `BLUEPRINT_DATA_DIR`.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT value: {port}"))?;
        }
        if let Some(host) = lookup("BLUEPRINT_HOST") {
            self.server.host = host;
        }
        if let Some(backend) = lookup("BLUEPRINT_STORE") {
            self.store.backend = StoreBackend::from_name(&backend)
                .with_context(|| format!("Unknown BLUEPRINT_STORE backend: {backend}"))?;
        }
        if let Some(data_dir) = lookup("BLUEPRINT_DATA_DIR") {
            self.store.data_dir = PathBuf::from(data_dir);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.parser.sentinel.trim().is_empty() {
            bail!("parser.sentinel must not be empty");
        }
        if self.server.host.trim().is_empty() {
            bail!("server.host must not be empty");
        }
        Ok(())
    }

    #[must_use]
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            sentinel: self.parser.sentinel.clone(),
            title: self.parser.title.clone(),
        }
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
