use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::Config;

const APP_DIR: &str = "worklog";

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("no {0} directory available on this platform")]
    NoPlatformDir(&'static str),
}

/// Default location of config.toml: `<config_dir>/worklog/config.toml`
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let base = dirs::config_dir().ok_or(ConfigError::NoPlatformDir("config"))?;
    Ok(base.join(APP_DIR).join("config.toml"))
}

/// Directory for the database and log file: `<data_dir>/worklog`
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base = dirs::data_dir().ok_or(ConfigError::NoPlatformDir("data"))?;
    Ok(base.join(APP_DIR))
}

/// Read the config file. A missing file yields the defaults.
pub fn read_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_config(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

pub fn parse_config(text: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(text)
}

/// Database path: explicit override, then config, then the data dir default
pub fn resolve_store_path(config: &Config, cli_override: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(p) = cli_override {
        return Ok(p.to_path_buf());
    }
    if let Some(p) = &config.store.path {
        return Ok(p.clone());
    }
    Ok(data_dir()?.join("worklog.db"))
}

/// Log file path: explicit override, then config, then the data dir default
pub fn resolve_log_path(config: &Config, cli_override: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(p) = cli_override {
        return Ok(p.to_path_buf());
    }
    if let Some(p) = &config.log.file {
        return Ok(p.clone());
    }
    Ok(data_dir()?.join("worklog.log"))
}
