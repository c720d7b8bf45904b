//! Configuration loading

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{ConfigError, Result};

use super::types::{expand_home, Config};

/// Configuration file names, checked in order at each directory level
pub const CONFIG_FILE_NAMES: [&str; 2] = ["keychain.toml", ".keychain.toml"];

/// Load configuration from a file
pub fn load_config(path: &Path) -> Result<Config> {
    info!(path = %path.display(), "loading config");

    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: Config = toml::from_str(&content).map_err(ConfigError::TomlError)?;

    validate_config(&config)?;
    debug!(path = %path.display(), "config loaded and validated");
    Ok(config)
}

/// Find a configuration file in the directory or its parents.
/// The first match wins.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    debug!(start_dir = %start_dir.display(), "searching for config file");
    let mut current = start_dir.to_path_buf();

    loop {
        for name in CONFIG_FILE_NAMES {
            let config_path = current.join(name);
            if config_path.is_file() {
                info!(path = %config_path.display(), "found config file");
                return Some(config_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    debug!("no config file found");
    None
}

/// Load configuration from directory (searching parent directories)
pub fn load_config_from_dir(dir: &Path) -> Result<(Config, PathBuf)> {
    let config_path = find_config(dir).ok_or_else(|| ConfigError::NotFound(dir.to_path_buf()))?;

    let config = load_config(&config_path)?;
    Ok((config, config_path))
}

/// Load configuration or use defaults
pub fn load_config_or_default(dir: &Path) -> (Config, Option<PathBuf>) {
    match load_config_from_dir(dir) {
        Ok((config, path)) => (config, Some(path)),
        Err(crate::KeychainError::Config(ConfigError::NotFound(_))) => {
            debug!(dir = %dir.display(), "no config found, using defaults");
            (Config::default(), None)
        }
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "failed to load config, using defaults");
            (Config::default(), None)
        }
    }
}

/// Validate a loaded configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.security.security_path.as_os_str().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "security.security_path".to_string(),
            message: "must not be empty".to_string(),
        }
        .into());
    }

    for pattern in &config.certificates.search_patterns {
        let expanded = expand_home(pattern);
        glob::Pattern::new(&expanded.to_string_lossy()).map_err(|e| ConfigError::InvalidValue {
            field: "certificates.search_patterns".to_string(),
            message: format!("'{}' is not a valid glob: {}", pattern, e),
        })?;
    }

    Ok(())
}
