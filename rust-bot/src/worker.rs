//! The delivery worker.
//!
//! A single background task that wakes on a fixed cadence, scans the queue
//! for due entries, attempts each delivery, and applies the outcome back to
//! the queue. The loop has no terminal state: a cycle that errors (a snapshot
//! write failing, say) is logged and followed by a shorter cooldown sleep,
//! never a crash. A newly enqueued entry simply waits for the next poll.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::time::sleep;
use tracing::{error, info};

use crate::mailer::Mailer;
use crate::queue::DeliveryQueue;

/// Run the delivery worker until the process exits.
pub async fn run(
    queue: Arc<DeliveryQueue>,
    mailer: Arc<dyn Mailer>,
    poll_interval: Duration,
    cooldown: Duration,
) {
    info!(
        poll_interval_secs = poll_interval.as_secs(),
        cooldown_secs = cooldown.as_secs(),
        "delivery_worker_started"
    );

    loop {
        match run_cycle(&queue, mailer.as_ref()).await {
            Ok(_) => sleep(poll_interval).await,
            Err(e) => {
                error!(error = %e, "worker_cycle_error");
                sleep(cooldown).await;
            }
        }
    }
}

/// One worker cycle: scan, deliver, apply.
///
/// Each due entry is handled to completion in scan order — the send happens
/// outside the queue lock, and its outcome is applied immediately, so a
/// failure for one entry neither blocks nor skips the next. Returns the
/// number of attempted deliveries.
pub async fn run_cycle(queue: &DeliveryQueue, mailer: &dyn Mailer) -> Result<usize> {
    let now = Utc::now();
    let due = queue.due_entries(now).await;

    if due.is_empty() {
        return Ok(0);
    }

    info!(due_count = due.len(), "worker_due_scan");

    for item in &due {
        info!(email = %item.entry.email, "worker_delivery_attempt");

        let outcome = mailer.send(&item.entry.email, &item.entry.name).await;

        queue
            .apply_outcome(item.id, outcome, Utc::now())
            .await
            .context("failed to apply delivery outcome")?;
    }

    Ok(due.len())
}
