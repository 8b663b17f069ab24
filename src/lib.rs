//! # Portfolio API Gateway
//!
//! ## Overview
//! A small backend gateway sitting in front of two upstreams: the GitHub
//! repository-listing API and a conversational assistant service. It shields
//! browser clients from upstream latency and failure, and from a streaming
//! protocol browsers cannot consume directly from the upstream.
//!
//! ## Architecture
//! - `github`: GitHub listing client and the repository projection
//! - `cache`: process-wide TTL cache of repository listings
//! - `repos`: cached listing service with stale/empty fallback
//! - `chat`: streaming relay to the assistant upstream
//! - `api`: HTTP entry layer
//! - `config`: configuration management and settings
//! - `errors`: centralized error handling and types
//!
//! The two request paths share nothing but the process lifetime: the chat
//! relay never touches the repository cache.

// Core modules
pub mod api;
pub mod cache;
pub mod chat;
pub mod config;
pub mod errors;
pub mod github;
pub mod repos;

// Re-exports for convenience
pub use config::Config;
pub use errors::{GatewayError, Result};

use std::sync::Arc;

/// Application state shared across request handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Config>,
    pub repos: Arc<repos::RepoService>,
    pub chat: Arc<chat::ChatRelay>,
}
