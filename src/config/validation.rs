use crate::config::types::{CrawlConfig, HttpConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &CrawlConfig) -> Result<(), ConfigError> {
    validate_download_rules(config)?;
    validate_limits(config)?;
    validate_http_config(&config.http)?;
    Ok(())
}

/// At least one media type or extension is required, and each must be well formed
fn validate_download_rules(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.mime_types.is_empty() && config.file_extensions.is_empty() {
        return Err(ConfigError::Validation(
            "At least one mime type or one file extension is required".to_string(),
        ));
    }

    for mime_type in &config.mime_types {
        validate_mime_type(mime_type)?;
    }

    for extension in &config.file_extensions {
        validate_extension(extension)?;
    }

    Ok(())
}

/// Validates crawl limits; all of them must be at least one
fn validate_limits(config: &CrawlConfig) -> Result<(), ConfigError> {
    let limits = [
        ("depth", config.maximum_depth),
        ("maximum_uris", config.maximum_uris),
        ("concurrent_requests", config.concurrent_requests),
        ("concurrent_downloads", config.concurrent_downloads),
    ];

    for (name, value) in limits {
        if value < 1 {
            return Err(ConfigError::Validation(format!(
                "{} must be >= 1, got {}",
                name, value
            )));
        }
    }

    Ok(())
}

fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.referrer.trim().is_empty() {
        return Err(ConfigError::Validation(
            "referrer cannot be empty".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.retry_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "retry_attempts must be >= 1, got {}",
            config.retry_attempts
        )));
    }

    Ok(())
}

/// A media type is `type/subtype`, each made of word characters, `-` or `.`
fn validate_mime_type(mime_type: &str) -> Result<(), ConfigError> {
    let is_token = |s: &str| {
        !s.is_empty()
            && s
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
    };

    match mime_type.split_once('/') {
        Some((kind, subtype)) if is_token(kind) && is_token(subtype) => Ok(()),
        _ => Err(ConfigError::Validation(format!(
            "{} is not a valid mime type",
            mime_type
        ))),
    }
}

fn validate_extension(extension: &str) -> Result<(), ConfigError> {
    if extension.is_empty() {
        return Err(ConfigError::Validation(
            "file extension cannot be empty".to_string(),
        ));
    }

    if extension.contains(['/', '\\']) || extension.chars().any(char::is_whitespace) {
        return Err(ConfigError::Validation(format!(
            "{} is not a valid file extension",
            extension
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::normalize;

    fn create_test_config() -> CrawlConfig {
        let mut config = CrawlConfig::new(normalize("https://example.com").unwrap(), "out");
        config.mime_types.insert("text/plain".to_string());
        config
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&create_test_config()).is_ok());
    }

    #[test]
    fn test_validate_mime_type() {
        assert!(validate_mime_type("text/plain").is_ok());
        assert!(validate_mime_type("application/vnd.ms-excel").is_ok());
        assert!(validate_mime_type("image/svg_xml").is_ok());

        assert!(validate_mime_type("").is_err());
        assert!(validate_mime_type("text").is_err());
        assert!(validate_mime_type("text/").is_err());
        assert!(validate_mime_type("/plain").is_err());
        assert!(validate_mime_type("text/plain; charset=utf-8").is_err());
        assert!(validate_mime_type("text/plain/extra").is_err());
    }

    #[test]
    fn test_validate_extension() {
        assert!(validate_extension("png").is_ok());
        assert!(validate_extension("tar.gz").is_ok());

        assert!(validate_extension("").is_err());
        assert!(validate_extension("a/b").is_err());
        assert!(validate_extension("p g").is_err());
    }

    #[test]
    fn test_extensions_alone_are_enough() {
        let mut config = create_test_config();
        config.mime_types.clear();
        config.file_extensions.insert("png".to_string());
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_requires_download_rule() {
        let mut config = create_test_config();
        config.mime_types.clear();
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_zero_limits_rejected() {
        let mut config = create_test_config();
        config.maximum_depth = 0;
        assert!(validate(&config).is_err());

        let mut config = create_test_config();
        config.concurrent_downloads = 0;
        assert!(validate(&config).is_err());

        let mut config = create_test_config();
        config.maximum_uris = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_user_agent_rejected() {
        let mut config = create_test_config();
        config.http.user_agent = "  ".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_retry_attempts_rejected() {
        let mut config = create_test_config();
        config.http.retry_attempts = 0;
        assert!(validate(&config).is_err());
    }
}
