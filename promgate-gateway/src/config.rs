//! Configuration for the push gateway.

use promgate_common::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] json5::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Complete gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Address to listen on (default: "0.0.0.0:9092").
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Inbound push routes.
    #[serde(default)]
    pub routes: RoutesConfig,

    /// Where translated pushes are sent.
    #[serde(default)]
    pub downstream: DownstreamConfig,

    /// Request limits.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Inbound route prefixes. The routing token is the path segment after the prefix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutesConfig {
    /// Prefix for structured pushes, token `job` (default: "/metrics/job").
    #[serde(default = "default_structured_prefix")]
    pub structured_prefix: String,

    /// Prefix for flat pushes, token `identify` (default: "/telecom5").
    #[serde(default = "default_flat_prefix")]
    pub flat_prefix: String,
}

fn default_listen() -> String {
    "0.0.0.0:9092".to_string()
}

fn default_structured_prefix() -> String {
    "/metrics/job".to_string()
}

fn default_flat_prefix() -> String {
    "/telecom5".to_string()
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            structured_prefix: default_structured_prefix(),
            flat_prefix: default_flat_prefix(),
        }
    }
}

/// Downstream Pushgateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownstreamConfig {
    /// Base URL of the downstream (default: "http://127.0.0.1:9091").
    #[serde(default = "default_downstream_url")]
    pub url: String,

    /// Path flat pushes are rewritten to (default: "/metrics/job/telecom5").
    #[serde(default = "default_flat_target")]
    pub flat_target: String,

    /// Timeout for one forwarded request (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_downstream_url() -> String {
    "http://127.0.0.1:9091".to_string()
}

fn default_flat_target() -> String {
    "/metrics/job/telecom5".to_string()
}

fn default_timeout() -> u64 {
    10
}

impl Default for DownstreamConfig {
    fn default() -> Self {
        Self {
            url: default_downstream_url(),
            flat_target: default_flat_target(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Largest accepted request body (bytes).
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_max_body_bytes() -> usize {
    4 * 1024 * 1024
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from a JSON5 file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a JSON5 string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: GatewayConfig = json5::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listen.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "Invalid listen address: {}",
                self.listen
            )));
        }

        validate_path("routes.structured_prefix", &self.routes.structured_prefix)?;
        validate_path("routes.flat_prefix", &self.routes.flat_prefix)?;
        validate_path("downstream.flat_target", &self.downstream.flat_target)?;

        if self.routes.structured_prefix == self.routes.flat_prefix {
            return Err(ConfigError::Validation(
                "structured_prefix and flat_prefix must differ".to_string(),
            ));
        }

        let url = &self.downstream.url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "Downstream url must be http:// or https://: {}",
                self.downstream.url
            )));
        }

        if self.downstream.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "timeout_secs must be > 0".to_string(),
            ));
        }

        if self.limits.max_body_bytes == 0 {
            return Err(ConfigError::Validation(
                "max_body_bytes must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            routes: RoutesConfig::default(),
            downstream: DownstreamConfig::default(),
            limits: LimitsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn validate_path(field: &str, path: &str) -> Result<(), ConfigError> {
    if !path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "{} must start with /",
            field
        )));
    }
    if path.ends_with('/') {
        return Err(ConfigError::Validation(format!(
            "{} must not end with /",
            field
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use promgate_common::LogFormat;

    #[test]
    fn test_parse_minimal_config() {
        let config = GatewayConfig::parse("{}").unwrap();

        assert_eq!(config.listen, "0.0.0.0:9092");
        assert_eq!(config.routes.structured_prefix, "/metrics/job");
        assert_eq!(config.routes.flat_prefix, "/telecom5");
        assert_eq!(config.downstream.url, "http://127.0.0.1:9091");
        assert_eq!(config.downstream.flat_target, "/metrics/job/telecom5");
        assert_eq!(config.downstream.timeout_secs, 10);
        assert_eq!(config.limits.max_body_bytes, 4 * 1024 * 1024);
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = GatewayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.listen, "0.0.0.0:9092");
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            listen: "127.0.0.1:19092",
            routes: {
                structured_prefix: "/rbd/metrics/job",
                flat_prefix: "/push/telecom5",
            },
            downstream: {
                url: "https://pushgateway.internal:9091",
                flat_target: "/metrics/job/telecom",
                timeout_secs: 3,
            },
            limits: { max_body_bytes: 1024 },
            logging: {
                level: "debug",
                format: "json"
            }
        }"#;

        let config = GatewayConfig::parse(json).unwrap();

        assert_eq!(config.listen, "127.0.0.1:19092");
        assert_eq!(config.routes.structured_prefix, "/rbd/metrics/job");
        assert_eq!(config.routes.flat_prefix, "/push/telecom5");
        assert_eq!(config.downstream.url, "https://pushgateway.internal:9091");
        assert_eq!(config.downstream.flat_target, "/metrics/job/telecom");
        assert_eq!(config.downstream.timeout_secs, 3);
        assert_eq!(config.limits.max_body_bytes, 1024);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_validate_invalid_listen() {
        let result = GatewayConfig::parse(r#"{ listen: "not-an-address" }"#);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Invalid listen address")
        );
    }

    #[test]
    fn test_validate_invalid_prefix() {
        let result = GatewayConfig::parse(r#"{ routes: { flat_prefix: "telecom5" } }"#);
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("must start with /")
        );

        let result = GatewayConfig::parse(r#"{ routes: { structured_prefix: "/metrics/job/" } }"#);
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("must not end with /")
        );
    }

    #[test]
    fn test_validate_same_prefixes() {
        let json = r#"{ routes: { structured_prefix: "/push", flat_prefix: "/push" } }"#;
        assert!(GatewayConfig::parse(json).is_err());
    }

    #[test]
    fn test_validate_downstream_url() {
        let result = GatewayConfig::parse(r#"{ downstream: { url: "ftp://example.org" } }"#);
        assert!(result.unwrap_err().to_string().contains("http://"));
    }

    #[test]
    fn test_validate_zero_limits() {
        assert!(GatewayConfig::parse(r#"{ downstream: { timeout_secs: 0 } }"#).is_err());
        assert!(GatewayConfig::parse(r#"{ limits: { max_body_bytes: 0 } }"#).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("promgate.json5");
        std::fs::write(&path, r#"{ listen: "127.0.0.1:9999" /* local */ }"#).unwrap();

        let config = GatewayConfig::load_from_file(&path).unwrap();
        assert_eq!(config.listen, "127.0.0.1:9999");

        let missing = GatewayConfig::load_from_file(dir.path().join("missing.json5"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
