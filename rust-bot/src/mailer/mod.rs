//! Outbound email delivery.
//!
//! The delivery worker only sees the [`Mailer`] trait; the production
//! implementation talks to the Mailgun send API over HTTP. Every failure mode
//! on the wire collapses into [`DeliveryOutcome::Failed`] so the queue can
//! reschedule — a mailer never returns a Rust error to its caller.

pub mod mailgun;
pub mod template;

use async_trait::async_trait;

use crate::queue::DeliveryOutcome;

pub use mailgun::MailgunMailer;
pub use template::{render_welcome, WELCOME_SUBJECT};

/// The delivery collaborator invoked by the worker for each due entry.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Attempt to deliver the welcome email for one entry.
    async fn send(&self, email: &str, name: &str) -> DeliveryOutcome;
}
