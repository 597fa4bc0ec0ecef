use crate::config::types::{Config, CrawlerConfig, HttpConfig, PartitionNames, StorageConfig};
use crate::url::{canonicalize, site_id};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_storage_config(&config.storage)?;
    validate_http_config(&config.http)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    validate_seeds(&config.seeds)?;

    if config.batch_size < 1 || config.batch_size > 1000 {
        return Err(ConfigError::Validation(format!(
            "batch-size must be between 1 and 1000, got {}",
            config.batch_size
        )));
    }

    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    Ok(())
}

/// Validates that there is at least one seed and all seeds share one host
fn validate_seeds(seeds: &[String]) -> Result<(), ConfigError> {
    if seeds.is_empty() {
        return Err(ConfigError::Validation(
            "at least one seed URL is required".to_string(),
        ));
    }

    let mut site: Option<String> = None;
    for seed in seeds {
        let url = canonicalize(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;
        let host = site_id(&url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

        match &site {
            None => site = Some(host),
            Some(first) if *first != host => {
                return Err(ConfigError::Validation(format!(
                    "Seed URL '{}' is not on site '{}'",
                    seed, first
                )));
            }
            Some(_) => {}
        }
    }

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.base_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "base-path cannot be empty".to_string(),
        ));
    }

    validate_partition_names(&config.partitions)
}

/// Partition names must be non-empty and distinct
fn validate_partition_names(names: &PartitionNames) -> Result<(), ConfigError> {
    let all = [
        &names.crawled,
        &names.to_crawl,
        &names.ignore_rules,
        &names.ignored,
    ];

    let mut seen = HashSet::new();
    for name in all {
        if name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "partition names cannot be empty".to_string(),
            ));
        }
        if !seen.insert(name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "partition name '{}' is used more than once",
                name
            )));
        }
    }

    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 || config.timeout_secs > 600 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be between 1 and 600, got {}",
            config.timeout_secs
        )));
    }

    if let Some(proxy) = &config.proxy {
        Url::parse(proxy)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid proxy '{}': {}", proxy, e)))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeds(urls: &[&str]) -> Vec<String> {
        urls.iter().map(|s| s.to_string()).collect()
    }

    fn http() -> HttpConfig {
        HttpConfig {
            user_agent: "TestCrawler/1.0".to_string(),
            timeout_secs: 30,
            proxy: None,
        }
    }

    #[test]
    fn test_validate_seeds() {
        assert!(validate_seeds(&seeds(&["https://example.test/"])).is_ok());
        assert!(validate_seeds(&seeds(&["https://example.test/", "http://EXAMPLE.test/a"])).is_ok());

        assert!(matches!(
            validate_seeds(&[]),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            validate_seeds(&seeds(&["not a url"])),
            Err(ConfigError::InvalidUrl(_))
        ));
        assert!(matches!(
            validate_seeds(&seeds(&["ftp://example.test/"])),
            Err(ConfigError::InvalidUrl(_))
        ));
        assert!(matches!(
            validate_seeds(&seeds(&["https://example.test/", "https://other.test/"])),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_partition_names() {
        let mut names = PartitionNames::default();
        assert!(validate_partition_names(&names).is_ok());

        names.ignored = names.crawled.clone();
        assert!(validate_partition_names(&names).is_err());

        names.ignored = " ".to_string();
        assert!(validate_partition_names(&names).is_err());
    }

    #[test]
    fn test_validate_http_config() {
        assert!(validate_http_config(&http()).is_ok());

        let mut config = http();
        config.user_agent = String::new();
        assert!(validate_http_config(&config).is_err());

        let mut config = http();
        config.timeout_secs = 0;
        assert!(validate_http_config(&config).is_err());

        let mut config = http();
        config.proxy = Some("socks5h://localhost:9150".to_string());
        assert!(validate_http_config(&config).is_ok());

        config.proxy = Some("::not a proxy".to_string());
        assert!(matches!(
            validate_http_config(&config),
            Err(ConfigError::InvalidUrl(_))
        ));
    }
}
