//! Slack webhook signature verification.
//!
//! Slack signs event requests using HMAC-SHA256 over a versioned base string.
//! Reference: https://api.slack.com/authentication/verifying-requests-from-slack

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

/// Verify a Slack request signature.
///
/// Slack sends two headers with each event delivery:
/// - `X-Slack-Request-Timestamp`: Unix epoch seconds when the request was signed
/// - `X-Slack-Signature`: `v0=` followed by the HMAC-SHA256 hex digest of
///   `v0:{timestamp}:{body}`
///
/// # Arguments
///
/// * `signing_secret` - Your app's Slack signing secret
/// * `timestamp` - The `X-Slack-Request-Timestamp` header value
/// * `body` - The raw request body, exactly as received
/// * `signature` - The `X-Slack-Signature` header value
/// * `max_age_seconds` - Maximum allowed age of the timestamp (prevents replay attacks)
///
/// # Returns
///
/// `true` if the signature is valid and not stale, `false` otherwise.
pub fn verify_slack_signature(
    signing_secret: &str,
    timestamp: &str,
    body: &str,
    signature: &str,
    max_age_seconds: u64,
) -> bool {
    // Check for empty inputs
    if signing_secret.is_empty() || timestamp.is_empty() || signature.is_empty() {
        warn!(
            has_signing_secret = !signing_secret.is_empty(),
            has_timestamp = !timestamp.is_empty(),
            has_signature = !signature.is_empty(),
            "slack_signature_missing_fields"
        );
        return false;
    }

    // Verify timestamp is not stale (prevents replay attacks)
    let request_time: u64 = match timestamp.parse() {
        Ok(t) => t,
        Err(_) => {
            warn!(timestamp = %timestamp, "slack_signature_invalid_timestamp");
            return false;
        }
    };

    let current_time = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    let age = current_time.abs_diff(request_time);

    if age > max_age_seconds {
        warn!(
            request_time = request_time,
            current_time = current_time,
            age_seconds = age,
            max_age_seconds = max_age_seconds,
            "slack_signature_stale"
        );
        return false;
    }

    // Compute expected signature: v0= + HMAC-SHA256(secret, "v0:{timestamp}:{body}")
    let mut mac = match HmacSha256::new_from_slice(signing_secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            warn!("slack_signature_invalid_secret");
            return false;
        }
    };

    mac.update(format!("v0:{}:{}", timestamp, body).as_bytes());

    let expected_signature = format!("v0={}", hex::encode(mac.finalize().into_bytes()));

    // Constant-time comparison to prevent timing attacks
    let valid = constant_time_compare(&expected_signature, signature);

    if !valid {
        warn!(
            expected_length = expected_signature.len(),
            actual_length = signature.len(),
            "slack_signature_mismatch"
        );
    }

    valid
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

/// Check if Slack signature verification is enabled.
pub fn is_signature_verification_enabled(signing_secret: &Option<String>) -> bool {
    signing_secret
        .as_ref()
        .map(|k| !k.trim().is_empty())
        .unwrap_or(false)
}
