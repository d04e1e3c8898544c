//! Waitmail - waitlist welcome-email bot.
//!
//! A Slack events webhook feeds a persistent delayed-delivery queue; a
//! background worker drains it through the Mailgun send API.
//!
//! ## Architecture
//!
//! ```text
//! Slack webhook → extract (email, name) → Delivery Queue ⇄ snapshot file
//!                                              ↑
//!                          Delivery Worker ────┘→ Mailgun
//! ```
//!
//! The queue is the single source of truth while the process runs; the
//! snapshot file exists so pending deliveries survive a restart.

pub mod config;
pub mod extract;
pub mod mailer;
pub mod queue;
pub mod web;
pub mod worker;

// Re-export commonly used types
pub use config::Config;
pub use extract::{extract_user_info, UserInfo};
pub use mailer::{Mailer, MailgunMailer};
pub use queue::{DeliveryOutcome, DeliveryQueue, DueEntry, QueueEntry, QueueStore};
pub use web::AppState;
