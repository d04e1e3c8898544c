//! Mailgun delivery via the HTTP send API.
//!
//! POSTs `v3/{domain}/messages` with basic auth and a form body. Any
//! transport error, non-success status, or missing credentials maps to
//! `Failed`; the queue retries on its own schedule.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{error, info};

use super::template::{render_welcome, WELCOME_SUBJECT};
use super::Mailer;
use crate::config::Config;
use crate::queue::DeliveryOutcome;

/// Mailgun send-API mailer.
pub struct MailgunMailer {
    client: Client,
    api_key: Option<String>,
    domain: Option<String>,
    base_url: String,
    from_address: Option<String>,
    from_name: String,
    timeout: Duration,
}

impl MailgunMailer {
    /// Build a mailer from configuration, sharing one HTTP client.
    pub fn new(config: &Config, client: Client) -> Self {
        Self {
            client,
            api_key: config.mailgun_api_key.clone(),
            domain: config.mailgun_domain.clone(),
            base_url: config.mailgun_base_url.clone(),
            from_address: config.from_address.clone(),
            from_name: config.from_name.clone(),
            timeout: Duration::from_millis(config.request_timeout_ms),
        }
    }

    fn send_url(&self, domain: &str) -> String {
        format!("{}/v3/{}/messages", self.base_url.trim_end_matches('/'), domain)
    }
}

#[async_trait]
impl Mailer for MailgunMailer {
    async fn send(&self, email: &str, name: &str) -> DeliveryOutcome {
        let (Some(api_key), Some(domain), Some(from_address)) =
            (&self.api_key, &self.domain, &self.from_address)
        else {
            error!(
                api_key_set = self.api_key.is_some(),
                domain_set = self.domain.is_some(),
                from_address_set = self.from_address.is_some(),
                "mailgun_not_configured"
            );
            return DeliveryOutcome::Failed;
        };

        let from = format!("{} <{}>", self.from_name, from_address);
        let html = render_welcome(name);
        let form = [
            ("from", from.as_str()),
            ("to", email),
            ("subject", WELCOME_SUBJECT),
            ("html", html.as_str()),
        ];

        let result = self
            .client
            .post(self.send_url(domain))
            .basic_auth("api", Some(api_key))
            .timeout(self.timeout)
            .form(&form)
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => {
                info!(email = %email, "email_sent");
                DeliveryOutcome::Delivered
            }
            Ok(resp) => {
                error!(
                    email = %email,
                    status_code = resp.status().as_u16(),
                    "email_send_rejected"
                );
                DeliveryOutcome::Failed
            }
            Err(e) => {
                if e.is_timeout() {
                    error!(email = %email, error = %e, "email_send_timeout");
                } else {
                    error!(email = %email, error = %e, "email_send_error");
                }
                DeliveryOutcome::Failed
            }
        }
    }
}
