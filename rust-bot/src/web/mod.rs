//! HTTP surface: the Slack events webhook plus the status endpoints.
//!
//! Ingestion is deliberately thin — verify, keyword-gate, extract, enqueue —
//! and every scheduling decision lives in the queue and worker. The status
//! endpoints expose the queue's introspection pair for monitoring.

pub mod handlers;
pub mod signature;

pub use handlers::{
    health, home, ping, slack_events, AppState, ChallengeResponse, ErrorResponse, EventResponse,
    HealthResponse, SlackEnvelope, SlackEvent,
};
pub use signature::{is_signature_verification_enabled, verify_slack_signature};
