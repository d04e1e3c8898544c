//! Configuration module for environment variable parsing.
//!
//! Everything is read once at startup; the queue and worker receive their
//! timing parameters explicitly and never consult the environment themselves.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Path of the queue snapshot file
    pub queue_file: PathBuf,

    /// Delivery worker cadence
    pub poll_interval: Duration,

    /// Cooldown sleep after a worker cycle error
    pub cycle_cooldown: Duration,

    /// Fixed reschedule delay after a failed delivery attempt
    pub retry_backoff: chrono::Duration,

    /// Delay between a signup arriving and the first delivery attempt
    pub initial_delay: chrono::Duration,

    /// Phrase that marks a message as a waitlist signup
    pub waitlist_keyword: String,

    /// Slack signing secret for HMAC request verification
    pub slack_signing_secret: Option<String>,

    /// Legacy Slack verification token, used when no signing secret is set
    pub slack_verification_token: Option<String>,

    /// Maximum age in seconds for Slack request timestamps
    pub slack_signature_max_age: u64,

    /// Mailgun API key for sending
    pub mailgun_api_key: Option<String>,

    /// Mailgun sending domain
    pub mailgun_domain: Option<String>,

    /// Mailgun API root (region-dependent)
    pub mailgun_base_url: String,

    /// Sender address for outgoing mail
    pub from_address: Option<String>,

    /// Sender display name for outgoing mail
    pub from_name: String,

    /// Outbound HTTP request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Config {
            port: parse_env("PORT", 8080),

            queue_file: PathBuf::from(
                env::var("QUEUE_FILE").unwrap_or_else(|_| "email_queue.json".to_string()),
            ),

            poll_interval: Duration::from_secs(parse_env("POLL_INTERVAL_SECS", 30)),

            cycle_cooldown: Duration::from_secs(parse_env("CYCLE_COOLDOWN_SECS", 10)),

            retry_backoff: chrono::Duration::seconds(parse_env("RETRY_BACKOFF_SECS", 300)),

            initial_delay: chrono::Duration::seconds(parse_env("INITIAL_DELAY_SECS", 600)),

            waitlist_keyword: env::var("WAITLIST_KEYWORD")
                .unwrap_or_else(|_| "new waitlist signup".to_string()),

            slack_signing_secret: env::var("SLACK_SIGNING_SECRET").ok(),

            slack_verification_token: env::var("SLACK_VERIFICATION_TOKEN").ok(),

            slack_signature_max_age: parse_env("SLACK_SIGNATURE_MAX_AGE", 300),

            mailgun_api_key: env::var("MAILGUN_API_KEY").ok(),

            mailgun_domain: env::var("MAILGUN_DOMAIN").ok(),

            mailgun_base_url: env::var("MAILGUN_BASE_URL")
                .unwrap_or_else(|_| "https://api.mailgun.net".to_string()),

            from_address: env::var("EMAIL_FROM_ADDRESS").ok(),

            from_name: env::var("EMAIL_FROM_NAME").unwrap_or_else(|_| "Your Company".to_string()),

            request_timeout_ms: parse_env("REQUEST_TIMEOUT_MS", 8000),
        }
    }

    /// Baseline configuration for unit tests; fields are overridden per test.
    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Config {
            port: 0,
            queue_file: PathBuf::from("queue.json"),
            poll_interval: Duration::from_secs(30),
            cycle_cooldown: Duration::from_secs(10),
            retry_backoff: chrono::Duration::minutes(5),
            initial_delay: chrono::Duration::minutes(10),
            waitlist_keyword: "new waitlist signup".to_string(),
            slack_signing_secret: None,
            slack_verification_token: None,
            slack_signature_max_age: 300,
            mailgun_api_key: None,
            mailgun_domain: None,
            mailgun_base_url: "https://api.mailgun.net".to_string(),
            from_address: None,
            from_name: "Your Company".to_string(),
            request_timeout_ms: 8000,
        }
    }
}

/// Parse an environment variable, falling back to a default on absence or
/// a malformed value (the latter is logged).
fn parse_env<T: std::str::FromStr + Copy>(name: &str, default: T) -> T {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid value, using default");
            default
        }
    }
}
