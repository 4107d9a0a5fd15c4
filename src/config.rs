//! User configuration read from `config.toml`.

use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Recalculation pass cap
    pub max_passes: Option<usize>,
    /// Rhai operation limit per formula
    pub max_operations: Option<u64>,
    /// Rhai function files loaded before any given on the command line.
    /// Relative paths are resolved against the config file's directory.
    pub functions: Vec<PathBuf>,
}

pub fn default_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "makro")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}

/// Load the config. An explicit path must exist; a missing default file
/// yields the defaults.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.is_file() => path,
            _ => return Ok(Config::default()),
        },
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config '{}'", path.display()))?;
    let mut config = parse(&content)
        .with_context(|| format!("Invalid config '{}'", path.display()))?;

    if let Some(dir) = path.parent() {
        for func in &mut config.functions {
            if func.is_relative() {
                *func = dir.join(&*func);
            }
        }
    }
    log::debug!("loaded config from {}", path.display());
    Ok(config)
}

pub fn parse(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)?;
    if config.max_passes == Some(0) {
        bail!("max_passes must be at least 1");
    }
    Ok(config)
}
