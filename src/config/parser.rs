use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// Site root URLs are normalized (trailing slashes removed) before the
/// configuration is validated.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    // Read the configuration file
    let content = std::fs::read_to_string(path)?;

    // Parse TOML
    let mut config: Config = toml::from_str(&content)?;

    // Normalize site roots: the crawler appends site-relative paths
    // (always starting with "/"), so roots must not end with one.
    for site in &mut config.sites {
        while site.url.ends_with('/') {
            site.url.pop();
        }
    }

    // Validate the configuration
    validate(&config)?;

    Ok(config)
}
