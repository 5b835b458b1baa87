use std::fs;
use std::path::{Path, PathBuf};

use crate::io::atomic_write;
use crate::model::config::TrackerConfig;

pub const CONFIG_FILE: &str = "trail.toml";

/// Error type for config I/O
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse trail.toml: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("could not serialize trail.toml: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Read `trail.toml` from `dir`. A missing file yields the defaults.
pub fn read_config(dir: &Path) -> Result<TrackerConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(TrackerConfig::default());
    }
    let text = fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}

/// Write `trail.toml` into `dir`.
pub fn write_config(dir: &Path, config: &TrackerConfig) -> Result<(), ConfigError> {
    let text = toml::to_string_pretty(config)?;
    atomic_write(&dir.join(CONFIG_FILE), text.as_bytes())?;
    Ok(())
}

/// Resolve a config-relative path (absolute paths pass through).
pub fn resolve(dir: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        dir.join(p)
    }
}
