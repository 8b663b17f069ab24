//! # Stream Relay Module
//!
//! ## Purpose
//! Forwards a chat request to the upstream assistant service and pipes its
//! event-stream response back chunk by chunk, without buffering the whole
//! response. The upstream's own event framing is preserved byte-for-byte.
//!
//! ## Input/Output Specification
//! - **Input**: Caller message and optional session id
//! - **Output**: A live byte stream, terminated when the upstream closes
//! - **Failure modes**: missing credential (before any I/O), connect failure,
//!   non-success status at stream start, mid-stream disconnect
//!
//! ## Key Features
//! - Bearer credential and tenant header injection
//! - Synthetic error event when the upstream fails at stream start
//! - Upstream connection owned by the returned stream, so every exit path
//!   (completion, caller abort, mid-stream error) releases it

use crate::config::ChatConfig;
use crate::errors::{GatewayError, Result};
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, error};

/// Inbound chat request
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// User message; emptiness is the upstream's concern, not enforced here
    pub message: String,
    /// Session id for upstream conversational continuity
    #[serde(rename = "sessionId", alias = "session_id", default)]
    pub session_id: Option<String>,
}

/// Byte stream relayed to the caller
pub type RelayStream = BoxStream<'static, std::result::Result<Bytes, GatewayError>>;

/// Relay to the upstream assistant's streaming chat endpoint
pub struct ChatRelay {
    config: ChatConfig,
    client: Client,
}

impl ChatRelay {
    pub fn new(config: ChatConfig) -> Result<Self> {
        // No total request timeout here: that would sever long-lived streams
        // mid-relay. Only connection establishment is bounded on the client;
        // the wait for response headers is bounded in `open`.
        let client = Client::builder()
            .user_agent("portfolio-gateway/0.1")
            .connect_timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| GatewayError::Network {
                details: e.to_string(),
            })?;

        Ok(Self { config, client })
    }

    /// Whether a credential is configured (the chat endpoint advertises 503
    /// without one)
    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Open the relay: one streaming connection to the upstream, returned as
    /// a byte stream for the caller.
    ///
    /// Errors are returned only before the stream starts (missing credential,
    /// connect failure). An upstream non-success status yields a stream with
    /// exactly one synthetic error event; the response body is not read in
    /// that case.
    pub async fn open(&self, request: &ChatRequest) -> Result<RelayStream> {
        let api_key = self.config.api_key.as_ref().ok_or_else(|| {
            GatewayError::NotConfigured {
                service: "chat".to_string(),
            }
        })?;

        let url = format!("{}/chat/stream", self.config.api_url);
        let body = json!({
            "messages": [{"role": "user", "content": request.message}],
            "session_id": request.session_id,
            "config": {"namespace": self.config.namespace},
        });

        debug!(session_id = ?request.session_id, "Opening relay to {}", url);

        // Bound the initiation phase: `send` resolves once response headers
        // arrive, so this cannot cut an established stream short. An upstream
        // that accepts the connection but never answers is caught here.
        let initiation_timeout = Duration::from_secs(self.config.request_timeout_seconds);
        let response = tokio::time::timeout(
            initiation_timeout,
            self.client
                .post(&url)
                .bearer_auth(api_key)
                .header("X-Tenant-Id", &self.config.tenant_id)
                .json(&body)
                .send(),
        )
        .await
        .map_err(|_| GatewayError::Network {
            details: format!(
                "upstream did not respond within {}s",
                self.config.request_timeout_seconds
            ),
        })?
        .map_err(|e| GatewayError::Network {
            details: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            error!("Assistant upstream refused stream: HTTP {}", status);
            let event = Bytes::from(format!(
                "data: {{\"error\": \"Upstream error {}\"}}\n\n",
                status.as_u16()
            ));
            return Ok(futures::stream::once(async move { Ok(event) }).boxed());
        }

        Ok(passthrough(response.bytes_stream()))
    }
}

/// Relay an upstream byte stream unchanged: no reordering, no re-framing,
/// no buffering-for-transformation. A mid-stream upstream failure terminates
/// the relay; no trailing error event is synthesized since a partial but
/// valid message may already have been delivered.
fn passthrough<S, E>(upstream: S) -> RelayStream
where
    S: futures::Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: Into<GatewayError>,
{
    upstream.map(|chunk| chunk.map_err(Into::into)).boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn relay_for(server: &MockServer, api_key: Option<&str>) -> ChatRelay {
        let config = ChatConfig {
            api_url: server.uri(),
            api_key: api_key.map(|k| k.to_string()),
            tenant_id: "catalyst-widget".to_string(),
            namespace: "per4ex-kb".to_string(),
            request_timeout_seconds: 5,
        };
        ChatRelay::new(config).unwrap()
    }

    fn request() -> ChatRequest {
        ChatRequest {
            message: "hello".to_string(),
            session_id: Some("abc".to_string()),
        }
    }

    #[tokio::test]
    async fn passthrough_preserves_chunk_order_and_boundaries() {
        let chunks = vec![
            Bytes::from_static(b"data: one\n\n"),
            Bytes::from_static(b"data: two\n\n"),
            Bytes::from_static(b"data: three\n\n"),
        ];
        let upstream = stream::iter(
            chunks
                .clone()
                .into_iter()
                .map(Ok::<_, GatewayError>)
                .collect::<Vec<_>>(),
        );

        let relayed: Vec<Bytes> = passthrough(upstream)
            .map(|c| c.unwrap())
            .collect()
            .await;

        assert_eq!(relayed, chunks);
    }

    #[tokio::test]
    async fn passthrough_stops_at_midstream_failure_without_synthetic_event() {
        let upstream = stream::iter(vec![
            Ok::<_, GatewayError>(Bytes::from_static(b"data: partial\n\n")),
            Err(GatewayError::Network {
                details: "connection reset".to_string(),
            }),
        ]);

        let mut relayed = passthrough(upstream);
        assert_eq!(
            relayed.next().await.unwrap().unwrap(),
            Bytes::from_static(b"data: partial\n\n")
        );
        assert!(relayed.next().await.unwrap().is_err());
        assert!(relayed.next().await.is_none());
    }

    #[tokio::test]
    async fn missing_credential_fails_before_any_network_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/stream"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let relay = relay_for(&server, None);
        let result = relay.open(&request()).await;
        assert!(matches!(
            result.err(),
            Some(GatewayError::NotConfigured { .. })
        ));
    }

    #[tokio::test]
    async fn unresponsive_upstream_is_bounded_by_initiation_timeout() {
        let server = MockServer::start().await;
        // Connection is accepted but response headers are withheld far past
        // the configured timeout
        Mock::given(method("POST"))
            .and(path("/chat/stream"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
            .mount(&server)
            .await;

        let config = ChatConfig {
            api_url: server.uri(),
            api_key: Some("secret".to_string()),
            tenant_id: "catalyst-widget".to_string(),
            namespace: "per4ex-kb".to_string(),
            request_timeout_seconds: 1,
        };
        let relay = ChatRelay::new(config).unwrap();

        let started = std::time::Instant::now();
        let result = relay.open(&request()).await;
        assert!(matches!(result.err(), Some(GatewayError::Network { .. })));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn start_failure_yields_single_error_event() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/stream"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let relay = relay_for(&server, Some("secret"));
        let events: Vec<Bytes> = relay
            .open(&request())
            .await
            .unwrap()
            .map(|c| c.unwrap())
            .collect()
            .await;

        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0],
            Bytes::from_static(b"data: {\"error\": \"Upstream error 500\"}\n\n")
        );
    }

    #[tokio::test]
    async fn relays_upstream_body_with_auth_and_tenant_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/stream"))
            .and(header("Authorization", "Bearer secret"))
            .and(header("X-Tenant-Id", "catalyst-widget"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "text/event-stream")
                    .set_body_string("data: {\"delta\": \"hi\"}\n\n"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let relay = relay_for(&server, Some("secret"));
        let body: Vec<Bytes> = relay
            .open(&request())
            .await
            .unwrap()
            .map(|c| c.unwrap())
            .collect()
            .await;

        let joined: Vec<u8> = body.iter().flat_map(|b| b.iter().copied()).collect();
        assert_eq!(joined, b"data: {\"delta\": \"hi\"}\n\n");
    }

    #[test]
    fn accepts_both_session_id_spellings() {
        let camel: ChatRequest =
            serde_json::from_str(r#"{"message": "m", "sessionId": "s1"}"#).unwrap();
        assert_eq!(camel.session_id.as_deref(), Some("s1"));

        let snake: ChatRequest =
            serde_json::from_str(r#"{"message": "m", "session_id": "s2"}"#).unwrap();
        assert_eq!(snake.session_id.as_deref(), Some("s2"));

        let absent: ChatRequest = serde_json::from_str(r#"{"message": "m"}"#).unwrap();
        assert!(absent.session_id.is_none());
    }
}
