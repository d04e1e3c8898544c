//! Data model for the delayed-delivery queue.
//!
//! `QueueEntry` is the persisted shape: it is exactly what the snapshot file
//! stores, one object per pending delivery. Entries carry no identity on disk;
//! duplicates (the same address enqueued twice) are legal and independent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One pending welcome-email delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    /// Recipient address, validated at creation time only.
    pub email: String,
    /// Recipient display name used for templating.
    pub name: String,
    /// Absolute wall-clock time at or after which delivery should be attempted.
    pub scheduled_at: DateTime<Utc>,
    /// Original raw message text, retained for audit only.
    pub message: String,
}

/// Process-local handle for an entry, valid until the entry is removed.
///
/// Handles never touch disk; they are reassigned on every snapshot load.
pub type EntryId = u64;

/// A due entry as seen by the delivery worker.
///
/// The worker sends outside the queue lock, so it gets a clone plus the handle
/// it needs to apply the outcome afterwards.
#[derive(Debug, Clone)]
pub struct DueEntry {
    pub id: EntryId,
    pub entry: QueueEntry,
}

/// Result of one delivery attempt. There is no partial-success state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The mail was accepted; the entry is done.
    Delivered,
    /// The attempt failed; the entry gets rescheduled with backoff.
    Failed,
}
