use crate::config::types::{Config, FetchConfig, IndexingConfig, ServerConfig, SiteEntry};
use crate::ConfigError;
use std::net::SocketAddr;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_server_config(&config.server)?;
    validate_fetch_config(&config.fetch)?;
    validate_indexing_config(&config.indexing)?;
    validate_sites(&config.sites)?;
    Ok(())
}

/// Validates the API listen address
fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    config
        .server_address()
        .map_err(|_| {
            ConfigError::Validation(format!(
                "server address must be host:port, got '{}'",
                config.address
            ))
        })
        .map(|_| ())
}

impl ServerConfig {
    /// Parses the configured listen address
    pub fn server_address(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.address.parse()
    }
}

/// Validates fetch identity configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.referrer.trim().is_empty() {
        return Err(ConfigError::Validation(
            "referrer cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler behavior configuration
fn validate_indexing_config(config: &IndexingConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_pages < 1 || config.max_concurrent_pages > 100 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-pages must be between 1 and 100, got {}",
            config.max_concurrent_pages
        )));
    }

    if config.database_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the configured site list
fn validate_sites(sites: &[SiteEntry]) -> Result<(), ConfigError> {
    for site in sites {
        let parsed =
            Url::parse(&site.url).map_err(|_| ConfigError::InvalidUrl(site.url.clone()))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "{} (only http and https site roots are supported)",
                site.url
            )));
        }

        if parsed.host_str().is_none() {
            return Err(ConfigError::InvalidUrl(site.url.clone()));
        }

        if site.url.ends_with('/') {
            return Err(ConfigError::InvalidUrl(format!(
                "{} (site root must not end with a slash)",
                site.url
            )));
        }

        if site.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "site {} has an empty name",
                site.url
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::Config;

    fn base_config() -> Config {
        Config {
            server: ServerConfig::default(),
            fetch: FetchConfig {
                user_agent: "TestBot/1.0".to_string(),
                referrer: "http://www.google.com".to_string(),
            },
            indexing: IndexingConfig::default(),
            sites: vec![SiteEntry {
                url: "https://example.com".to_string(),
                name: "Example".to_string(),
            }],
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&base_config()).is_ok());
    }

    #[test]
    fn test_empty_user_agent_rejected() {
        let mut config = base_config();
        config.fetch.user_agent = "  ".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_non_http_site_rejected() {
        let mut config = base_config();
        config.sites[0].url = "ftp://example.com".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_trailing_slash_rejected() {
        let mut config = base_config();
        config.sites[0].url = "https://example.com/".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_bad_concurrency_rejected() {
        let mut config = base_config();
        config.indexing.max_concurrent_pages = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_bad_address_rejected() {
        let mut config = base_config();
        config.server.address = "not-an-address".to_string();
        assert!(validate(&config).is_err());
    }
}
