//! # Configuration Management Module
//!
//! ## Purpose
//! Centralized configuration for the gateway, supporting TOML files with
//! environment variable overrides, validation, and safe defaults so the
//! process degrades gracefully rather than crashing when settings are unset.
//!
//! ## Input/Output Specification
//! - **Input**: Configuration file (TOML), environment variables
//! - **Output**: Validated configuration structs with defaults and overrides
//! - **Validation**: Type checking, range validation
//!
//! ## Configuration Sources (in order of precedence)
//! 1. Environment variables (highest priority)
//! 2. Configuration file
//! 3. Default values (lowest priority)

use crate::errors::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure containing all gateway settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server and API configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// GitHub listing upstream settings
    #[serde(default)]
    pub github: GithubConfig,
    /// Assistant chat upstream settings
    #[serde(default)]
    pub chat: ChatConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server and API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Enable permissive CORS (all origins)
    pub enable_cors: bool,
}

/// GitHub listing upstream configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// API base URL
    pub api_url: String,
    /// Account whose repositories are listed when the request omits one
    pub default_user: String,
    /// Cache time-to-live in seconds
    pub cache_ttl_seconds: u64,
    /// Per-request timeout in seconds
    pub request_timeout_seconds: u64,
    /// Maximum repositories requested per fetch
    pub page_size: u32,
}

/// Assistant chat upstream configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Upstream base URL for the streaming chat endpoint
    pub api_url: String,
    /// Bearer credential; chat is unavailable (503) when unset
    pub api_key: Option<String>,
    /// Tenant identifier forwarded in the X-Tenant-Id header
    pub tenant_id: String,
    /// Retrieval namespace forwarded in the request body
    pub namespace: String,
    /// Timeout in seconds for opening the upstream stream (connection and
    /// response headers); the established stream itself is unbounded
    pub request_timeout_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Enable structured JSON logging
    pub json_format: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            enable_cors: true,
        }
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            default_user: "ppilafas".to_string(),
            cache_ttl_seconds: 3600,
            request_timeout_seconds: 10,
            page_size: 100,
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8001/v1".to_string(),
            api_key: None,
            tenant_id: "catalyst-widget".to_string(),
            namespace: "per4ex-kb".to_string(),
            request_timeout_seconds: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            github: GithubConfig::default(),
            chat: ChatConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::from_file("config.toml")
    }

    /// Load configuration from a specific file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| GatewayError::Config {
                message: format!("Failed to read config file {:?}: {}", path, e),
            })?;

            toml::from_str(&content).map_err(|e| GatewayError::Config {
                message: format!("Failed to parse config file {:?}: {}", path, e),
            })?
        } else {
            // No log here: main installs the subscriber only after the
            // configuration (including the log level) has been loaded
            Self::default()
        };

        // Apply environment variable overrides
        config.apply_env_overrides()?;

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        // Server configuration
        if let Ok(host) = std::env::var("GATEWAY_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("GATEWAY_PORT") {
            self.server.port = port.parse().map_err(|_| GatewayError::Config {
                message: "Invalid port number in GATEWAY_PORT".to_string(),
            })?;
        }

        // GitHub upstream
        if let Ok(api_url) = std::env::var("GATEWAY_GITHUB_API_URL") {
            self.github.api_url = api_url;
        }
        if let Ok(ttl) = std::env::var("GATEWAY_CACHE_TTL_SECONDS") {
            self.github.cache_ttl_seconds = ttl.parse().map_err(|_| GatewayError::Config {
                message: "Invalid value in GATEWAY_CACHE_TTL_SECONDS".to_string(),
            })?;
        }

        // Chat upstream
        if let Ok(api_url) = std::env::var("GATEWAY_CHAT_API_URL") {
            self.chat.api_url = api_url;
        }
        if let Ok(api_key) = std::env::var("GATEWAY_CHAT_API_KEY") {
            self.chat.api_key = Some(api_key);
        }
        if let Ok(tenant_id) = std::env::var("GATEWAY_CHAT_TENANT_ID") {
            self.chat.tenant_id = tenant_id;
        }

        Ok(())
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(GatewayError::Config {
                message: "server.port cannot be zero".to_string(),
            });
        }

        if self.github.api_url.is_empty() {
            return Err(GatewayError::Config {
                message: "github.api_url cannot be empty".to_string(),
            });
        }

        if self.github.cache_ttl_seconds == 0 {
            return Err(GatewayError::Config {
                message: "github.cache_ttl_seconds must be greater than zero".to_string(),
            });
        }

        if self.github.request_timeout_seconds == 0 {
            return Err(GatewayError::Config {
                message: "github.request_timeout_seconds must be greater than zero".to_string(),
            });
        }

        if self.chat.api_url.is_empty() {
            return Err(GatewayError::Config {
                message: "chat.api_url cannot be empty".to_string(),
            });
        }

        if self.chat.request_timeout_seconds == 0 {
            return Err(GatewayError::Config {
                message: "chat.request_timeout_seconds must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.github.cache_ttl_seconds, 3600);
        assert_eq!(config.github.request_timeout_seconds, 10);
        assert_eq!(config.github.page_size, 100);
        assert!(config.chat.api_key.is_none());
    }

    #[test]
    fn parses_partial_toml_with_section_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000
            enable_cors = false
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert!(!config.server.enable_cors);
        // Unspecified sections fall back to defaults
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.chat.tenant_id, "catalyst-widget");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::from_file("/nonexistent/portfolio-gateway.toml").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.github.cache_ttl_seconds, 3600);
    }

    #[test]
    fn rejects_zero_chat_timeout() {
        let mut config = Config::default();
        config.chat.request_timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_ttl() {
        let mut config = Config::default();
        config.github.cache_ttl_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_empty_chat_url() {
        let mut config = Config::default();
        config.chat.api_url = String::new();
        assert!(config.validate().is_err());
    }
}
