//! # Error Handling Module
//!
//! ## Purpose
//! Centralized error handling for the gateway, providing structured error
//! types shared by the upstream clients, the cache service, and the API layer.
//!
//! ## Input/Output Specification
//! - **Input**: Error conditions from configuration loading and upstream calls
//! - **Output**: Structured error types with context for logging and responses
//! - **Error Categories**: Configuration, Upstream, Parsing, Internal
//!
//! ## Key Features
//! - Crate-wide `Result` alias
//! - Automatic conversion from transport and serialization errors
//! - Category labels for structured logging

use thiserror::Error;

/// Result type used throughout the application
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Error types for the gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A required upstream is not configured for this deployment
    #[error("Service '{service}' is not configured")]
    NotConfigured { service: String },

    /// Network-related errors
    #[error("Network error: {details}")]
    Network { details: String },

    /// Upstream returned a non-success status
    #[error("Upstream returned HTTP {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    /// Data parsing errors
    #[error("Failed to parse data from {origin}: {details}")]
    DataParsing { origin: String, details: String },

    /// Internal system errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl GatewayError {
    /// Get error category for metrics and logging
    pub fn category(&self) -> &'static str {
        match self {
            GatewayError::Config { .. } | GatewayError::NotConfigured { .. } => "configuration",
            GatewayError::Network { .. } | GatewayError::UpstreamStatus { .. } => "upstream",
            GatewayError::DataParsing { .. } => "parsing",
            GatewayError::Internal { .. } => "generic",
        }
    }
}

// Conversion from common error types
impl From<std::io::Error> for GatewayError {
    fn from(err: std::io::Error) -> Self {
        GatewayError::Internal {
            message: format!("IO error: {}", err),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Network {
            details: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::DataParsing {
            origin: "JSON".to_string(),
            details: err.to_string(),
        }
    }
}
