//! HTTP endpoint handlers.
//!
//! The Slack events endpoint does the ingestion work: verify the request,
//! gate on the waitlist keyword, extract signup details, and enqueue. The
//! remaining endpoints are the status surface: an HTML status page, a JSON
//! health check, and a bare liveness probe for uptime monitors.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::Config;
use crate::extract::extract_user_info;
use crate::queue::DeliveryQueue;
use crate::web::signature::{is_signature_verification_enabled, verify_slack_signature};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub queue: Arc<DeliveryQueue>,
}

impl AppState {
    pub fn new(config: Arc<Config>, queue: Arc<DeliveryQueue>) -> Self {
        Self { config, queue }
    }
}

// =============================================================================
// Slack Events Webhook
// =============================================================================

/// Outer Slack event envelope.
///
/// Only the fields this service reads; Slack sends many more.
#[derive(Debug, Deserialize)]
pub struct SlackEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub challenge: Option<String>,
    #[serde(default)]
    pub event: Option<SlackEvent>,
}

/// Inner event of an `event_callback` envelope.
#[derive(Debug, Deserialize)]
pub struct SlackEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Event acknowledgement body.
#[derive(Serialize)]
pub struct EventResponse {
    pub status: &'static str,
}

/// URL verification echo body.
#[derive(Serialize)]
pub struct ChallengeResponse {
    pub challenge: String,
}

/// Error body for rejected requests.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
}

/// Slack events endpoint.
///
/// The handler takes the raw body because signature verification must run
/// over the exact bytes Slack signed. Flow:
/// 1. Parse the envelope
/// 2. Answer the URL verification challenge (sent when the endpoint is registered)
/// 3. Verify the signature or the legacy verification token, whichever is configured
/// 4. On a keyword-matching message event, extract signup details and enqueue
pub async fn slack_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let envelope: SlackEnvelope = match serde_json::from_str(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, body_length = body.len(), "slack_payload_malformed");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "invalid payload",
                }),
            )
                .into_response();
        }
    };

    info!(event_type = %envelope.kind, "slack_event_received");

    // Handle URL verification challenge
    if envelope.kind == "url_verification" {
        info!("slack_url_verification");
        return Json(ChallengeResponse {
            challenge: envelope.challenge.unwrap_or_default(),
        })
        .into_response();
    }

    // Verify the request is from Slack
    if is_signature_verification_enabled(&state.config.slack_signing_secret) {
        let secret = state
            .config
            .slack_signing_secret
            .as_deref()
            .unwrap_or_default();
        let timestamp = headers
            .get("X-Slack-Request-Timestamp")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        let signature = headers
            .get("X-Slack-Signature")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if !verify_slack_signature(
            secret,
            timestamp,
            &body,
            signature,
            state.config.slack_signature_max_age,
        ) {
            warn!("slack_signature_invalid");
            return (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "invalid signature",
                }),
            )
                .into_response();
        }
    } else if let Some(expected) = state.config.slack_verification_token.as_deref() {
        match envelope.token.as_deref() {
            Some(token) if token == expected => {}
            _ => {
                warn!("slack_token_invalid");
                return (
                    StatusCode::UNAUTHORIZED,
                    Json(ErrorResponse {
                        error: "invalid token",
                    }),
                )
                    .into_response();
            }
        }
    } else {
        // No auth configured, allow through
        warn!("slack_auth_not_configured");
    }

    if envelope.kind == "event_callback" {
        if let Some(event) = &envelope.event {
            // Only process new messages, not edits or deletes
            if event.kind == "message" && event.subtype.is_none() {
                let text = event.text.as_deref().unwrap_or("");
                let keyword = state.config.waitlist_keyword.to_lowercase();

                if text.to_lowercase().contains(&keyword) {
                    info!("waitlist_signup_received");

                    match extract_user_info(text) {
                        Some(user) => {
                            state
                                .queue
                                .enqueue(&user.email, &user.name, state.config.initial_delay, text)
                                .await;
                            info!(email = %user.email, "waitlist_signup_enqueued");
                        }
                        None => {
                            warn!(text_length = text.len(), "waitlist_extract_failed");
                        }
                    }
                }
            }
        }
    }

    Json(EventResponse { status: "ok" }).into_response()
}

// =============================================================================
// Status Surface
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub queue_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_scheduled_at: Option<String>,
}

/// Health check endpoint with queue introspection.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let queue_size = state.queue.size().await;
    let next_scheduled_at = state
        .queue
        .next_scheduled()
        .await
        .map(|t| t.to_rfc3339());

    Json(HealthResponse {
        status: "ok",
        queue_size,
        next_scheduled_at,
    })
}

/// Human-readable status page.
pub async fn home(State(state): State<AppState>) -> Html<String> {
    let queue_size = state.queue.size().await;
    let next_line = match state.queue.next_scheduled().await {
        Some(t) => format!(
            "<p>Next email scheduled for: {}</p>",
            t.format("%Y-%m-%d %H:%M:%S")
        ),
        None => String::new(),
    };

    Html(format!(
        r#"<html>
    <head>
        <title>Waitlist Email Bot</title>
        <style>
            body {{ font-family: Arial, sans-serif; margin: 40px; line-height: 1.6; }}
            h1 {{ color: #4a90e2; }}
            .container {{ max-width: 800px; margin: 0 auto; }}
            .stats {{ background-color: #f5f5f5; padding: 20px; border-radius: 5px; margin-top: 20px; }}
        </style>
    </head>
    <body>
        <div class="container">
            <h1>Waitlist Email Bot</h1>
            <p>Status: Running</p>

            <div class="stats">
                <h2>Current Stats:</h2>
                <p>Emails in queue: {queue_size}</p>
                {next_line}
            </div>
        </div>
    </body>
</html>
"#
    ))
}

/// Bare liveness probe for uptime monitoring services.
pub async fn ping() -> &'static str {
    "pong"
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::queue::QueueStore;

    fn test_state(dir: &tempfile::TempDir, config: Config) -> AppState {
        let store = QueueStore::new(dir.path().join("queue.json"));
        let queue = DeliveryQueue::new(store, Vec::new(), config.retry_backoff);
        AppState::new(Arc::new(config), Arc::new(queue))
    }

    fn unauthenticated_config() -> Config {
        let mut config = Config::for_tests();
        config.slack_signing_secret = None;
        config.slack_verification_token = None;
        config
    }

    async fn response_body(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_envelope_deserialization() {
        let json = r#"{
            "type": "event_callback",
            "token": "tok",
            "event": {"type": "message", "text": "hello"}
        }"#;

        let envelope: SlackEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.kind, "event_callback");
        assert_eq!(envelope.token.as_deref(), Some("tok"));
        let event = envelope.event.unwrap();
        assert_eq!(event.kind, "message");
        assert!(event.subtype.is_none());
        assert_eq!(event.text.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_url_verification_echoes_challenge() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir, unauthenticated_config());

        let body = r#"{"type": "url_verification", "challenge": "abc123"}"#.to_string();
        let response = slack_events(State(state), HeaderMap::new(), body).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response_body(response).await.contains("abc123"));
    }

    #[tokio::test]
    async fn test_signup_message_is_enqueued() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir, unauthenticated_config());

        let body = serde_json::json!({
            "type": "event_callback",
            "event": {
                "type": "message",
                "text": "New waitlist signup!\nName: Jane Doe\njane@example.com"
            }
        })
        .to_string();

        let response = slack_events(State(state.clone()), HeaderMap::new(), body).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.queue.size().await, 1);
    }

    #[tokio::test]
    async fn test_message_without_keyword_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir, unauthenticated_config());

        let body = serde_json::json!({
            "type": "event_callback",
            "event": {
                "type": "message",
                "text": "Name: Jane Doe\njane@example.com"
            }
        })
        .to_string();

        let response = slack_events(State(state.clone()), HeaderMap::new(), body).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.queue.size().await, 0);
    }

    #[tokio::test]
    async fn test_unextractable_signup_is_dropped_with_ok() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir, unauthenticated_config());

        let body = serde_json::json!({
            "type": "event_callback",
            "event": {
                "type": "message",
                "text": "new waitlist signup but no contact details"
            }
        })
        .to_string();

        let response = slack_events(State(state.clone()), HeaderMap::new(), body).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.queue.size().await, 0);
    }

    #[tokio::test]
    async fn test_edited_message_subtype_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir, unauthenticated_config());

        let body = serde_json::json!({
            "type": "event_callback",
            "event": {
                "type": "message",
                "subtype": "message_changed",
                "text": "new waitlist signup\nName: Jane\njane@example.com"
            }
        })
        .to_string();

        slack_events(State(state.clone()), HeaderMap::new(), body).await;

        assert_eq!(state.queue.size().await, 0);
    }

    #[tokio::test]
    async fn test_invalid_token_is_unauthorized() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = unauthenticated_config();
        config.slack_verification_token = Some("expected-token".to_string());
        let state = test_state(&dir, config);

        let body = serde_json::json!({
            "type": "event_callback",
            "token": "wrong-token",
            "event": {"type": "message", "text": "new waitlist signup"}
        })
        .to_string();

        let response = slack_events(State(state.clone()), HeaderMap::new(), body).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(state.queue.size().await, 0);
    }

    #[tokio::test]
    async fn test_valid_token_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = unauthenticated_config();
        config.slack_verification_token = Some("expected-token".to_string());
        let state = test_state(&dir, config);

        let body = serde_json::json!({
            "type": "event_callback",
            "token": "expected-token",
            "event": {
                "type": "message",
                "text": "new waitlist signup\nName: Jane\njane@example.com"
            }
        })
        .to_string();

        let response = slack_events(State(state.clone()), HeaderMap::new(), body).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.queue.size().await, 1);
    }

    #[tokio::test]
    async fn test_missing_signature_is_unauthorized_when_secret_configured() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = unauthenticated_config();
        config.slack_signing_secret = Some("signing-secret".to_string());
        let state = test_state(&dir, config);

        let body = serde_json::json!({
            "type": "event_callback",
            "event": {"type": "message", "text": "new waitlist signup"}
        })
        .to_string();

        let response = slack_events(State(state), HeaderMap::new(), body).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir, unauthenticated_config());

        let response =
            slack_events(State(state), HeaderMap::new(), "{ not json ]".to_string()).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_health_reports_queue_state() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir, unauthenticated_config());
        state
            .queue
            .enqueue("jane@example.com", "Jane", Duration::minutes(10), "raw")
            .await;

        let Json(report) = health(State(state)).await;

        assert_eq!(report.status, "ok");
        assert_eq!(report.queue_size, 1);
        assert!(report.next_scheduled_at.is_some());
    }

    #[tokio::test]
    async fn test_home_page_shows_queue_size() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir, unauthenticated_config());

        let Html(page) = home(State(state)).await;
        assert!(page.contains("Emails in queue: 0"));
        assert!(!page.contains("Next email scheduled for"));
    }
}
