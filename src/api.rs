//! # API Server Module
//!
//! ## Purpose
//! HTTP entry layer for the gateway: the repository listing endpoint, the
//! streaming chat endpoint, and a health probe. Routing is a thin mechanical
//! layer; the protocol semantics live in the services it dispatches to.
//!
//! ## Input/Output Specification
//! - **Input**: HTTP requests from browser clients
//! - **Output**: JSON responses; `text/event-stream` for chat
//! - **Endpoints**: `/health`, `/api/github/repos`, `/api/chat`
//!
//! ## Key Features
//! - Always-200 repository listing per the cache service contract
//! - 503 fail-fast when the chat upstream is not configured
//! - Permissive CORS for browser frontends

use crate::chat::ChatRequest;
use crate::errors::{GatewayError, Result};
use crate::AppState;
use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use serde::Deserialize;
use tracing::error;

/// API server wrapping the shared application state
pub struct ApiServer {
    app_state: AppState,
}

/// Query parameters for the repository listing endpoint
#[derive(Debug, Deserialize)]
pub struct ReposQuery {
    pub user: Option<String>,
}

impl ApiServer {
    pub fn new(app_state: AppState) -> Self {
        Self { app_state }
    }

    /// Run the API server
    pub async fn run(self) -> Result<()> {
        let bind_addr = format!(
            "{}:{}",
            self.app_state.config.server.host, self.app_state.config.server.port
        );
        let enable_cors = self.app_state.config.server.enable_cors;

        tracing::info!("Starting API server on {}", bind_addr);

        HttpServer::new(move || {
            let cors = if enable_cors {
                Cors::permissive()
            } else {
                Cors::default()
            };

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(self.app_state.clone()))
                .route("/health", web::get().to(health_handler))
                .route("/api/github/repos", web::get().to(repos_handler))
                .route("/api/chat", web::post().to(chat_handler))
        })
        .bind(&bind_addr)
        .map_err(|e| GatewayError::Internal {
            message: format!("Failed to bind server to {}: {}", bind_addr, e),
        })?
        .run()
        .await
        .map_err(|e| GatewayError::Internal {
            message: format!("Server error: {}", e),
        })?;

        Ok(())
    }
}

/// Health check endpoint handler
async fn health_handler() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "portfolio-gateway",
    })))
}

/// Repository listing endpoint handler. Always 200: upstream failures are
/// absorbed by the cache service.
async fn repos_handler(
    app_state: web::Data<AppState>,
    query: web::Query<ReposQuery>,
) -> ActixResult<HttpResponse> {
    let user = query
        .user
        .clone()
        .unwrap_or_else(|| app_state.config.github.default_user.clone());

    let listing = app_state.repos.get_repositories(&user).await;
    Ok(HttpResponse::Ok().json(listing))
}

/// Chat endpoint handler: relays the upstream event stream to the caller
async fn chat_handler(
    app_state: web::Data<AppState>,
    request: web::Json<ChatRequest>,
) -> ActixResult<HttpResponse> {
    match app_state.chat.open(&request).await {
        Ok(stream) => Ok(HttpResponse::Ok()
            .content_type("text/event-stream")
            .insert_header(("Cache-Control", "no-cache"))
            .streaming(stream)),
        Err(e @ GatewayError::NotConfigured { .. }) => {
            Ok(HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "error": e.to_string(),
            })))
        }
        Err(e) => {
            error!(category = e.category(), "Chat relay failed: {}", e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string(),
            })))
        }
    }
}
