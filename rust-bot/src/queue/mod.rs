//! The delayed-delivery queue.
//!
//! This is the heart of the service: an in-memory ordered collection of
//! pending deliveries, persisted to a snapshot file after every mutation.
//! The HTTP surface enqueues into it and the delivery worker drains it; a
//! single async mutex guards all reads and writes, and the snapshot rewrite
//! happens inside that critical section. The outbound delivery call itself is
//! never made under the lock.

pub mod entry;
pub mod store;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::{info, warn};

pub use entry::{DeliveryOutcome, DueEntry, EntryId, QueueEntry};
pub use store::{QueueStore, StoreError};

/// An entry plus its process-local handle.
///
/// The handle lets the worker apply an outcome to exactly one entry even when
/// two identical duplicates are queued; it is reassigned on every load and
/// never persisted.
#[derive(Debug)]
struct Slot {
    id: EntryId,
    entry: QueueEntry,
}

#[derive(Debug)]
struct QueueInner {
    slots: Vec<Slot>,
    next_id: EntryId,
}

/// The shared delivery queue.
///
/// Invariant: the collection contains exactly the entries that have been
/// enqueued and not yet successfully delivered.
pub struct DeliveryQueue {
    store: QueueStore,
    retry_backoff: Duration,
    inner: Mutex<QueueInner>,
}

impl DeliveryQueue {
    /// Build the queue from entries loaded out of the snapshot store.
    pub fn new(store: QueueStore, loaded: Vec<QueueEntry>, retry_backoff: Duration) -> Self {
        let slots: Vec<Slot> = loaded
            .into_iter()
            .enumerate()
            .map(|(i, entry)| Slot {
                id: i as EntryId,
                entry,
            })
            .collect();
        let next_id = slots.len() as EntryId;

        Self {
            store,
            retry_backoff,
            inner: Mutex::new(QueueInner { slots, next_id }),
        }
    }

    /// Append a new pending delivery scheduled `delay` from now.
    ///
    /// The delay sign is unconstrained: zero or negative makes the entry
    /// immediately due. A snapshot write failure is logged and swallowed; the
    /// in-memory queue still reflects the enqueue and the next successful
    /// write will catch the file up.
    pub async fn enqueue(
        &self,
        email: &str,
        name: &str,
        delay: Duration,
        raw_message: &str,
    ) -> EntryId {
        let scheduled_at = Utc::now() + delay;
        let mut inner = self.inner.lock().await;

        let id = inner.next_id;
        inner.next_id += 1;
        inner.slots.push(Slot {
            id,
            entry: QueueEntry {
                email: email.to_string(),
                name: name.to_string(),
                scheduled_at,
                message: raw_message.to_string(),
            },
        });

        info!(
            email = %email,
            scheduled_at = %scheduled_at,
            queue_size = inner.slots.len(),
            "queue_entry_enqueued"
        );

        if let Err(e) = self.store.save(&snapshot(&inner)).await {
            warn!(error = %e, "queue_persist_failed");
        }

        id
    }

    /// Every entry whose scheduled time has passed, in insertion order.
    ///
    /// Side-effect free: calling it repeatedly with the same `now` and no
    /// intervening mutation returns the same set, and no entry appears twice
    /// in one scan.
    pub async fn due_entries(&self, now: DateTime<Utc>) -> Vec<DueEntry> {
        let inner = self.inner.lock().await;
        inner
            .slots
            .iter()
            .filter(|slot| slot.entry.scheduled_at <= now)
            .map(|slot| DueEntry {
                id: slot.id,
                entry: slot.entry.clone(),
            })
            .collect()
    }

    /// Apply a delivery attempt's outcome to one entry.
    ///
    /// `Delivered` removes the entry; `Failed` pushes its scheduled time to
    /// `now + retry_backoff` and leaves it in place. Both branches rewrite the
    /// snapshot; a write failure surfaces to the worker's cycle boundary while
    /// the in-memory mutation stands. An unknown id means the entry is already
    /// gone and is ignored.
    pub async fn apply_outcome(
        &self,
        id: EntryId,
        outcome: DeliveryOutcome,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;

        let Some(index) = inner.slots.iter().position(|slot| slot.id == id) else {
            warn!(entry_id = id, "queue_outcome_for_unknown_entry");
            return Ok(());
        };

        match outcome {
            DeliveryOutcome::Delivered => {
                let slot = inner.slots.remove(index);
                info!(
                    email = %slot.entry.email,
                    queue_size = inner.slots.len(),
                    "queue_entry_delivered"
                );
            }
            DeliveryOutcome::Failed => {
                let rescheduled = now + self.retry_backoff;
                inner.slots[index].entry.scheduled_at = rescheduled;
                info!(
                    email = %inner.slots[index].entry.email,
                    rescheduled_at = %rescheduled,
                    "queue_entry_rescheduled"
                );
            }
        }

        self.store.save(&snapshot(&inner)).await
    }

    /// Number of pending entries.
    pub async fn size(&self) -> usize {
        self.inner.lock().await.slots.len()
    }

    /// Earliest scheduled time across all entries, if any.
    pub async fn next_scheduled(&self) -> Option<DateTime<Utc>> {
        let inner = self.inner.lock().await;
        inner.slots.iter().map(|slot| slot.entry.scheduled_at).min()
    }

    /// Rewrite the snapshot from current state; used for the final persist on
    /// graceful shutdown.
    pub async fn persist(&self) -> Result<(), StoreError> {
        let inner = self.inner.lock().await;
        self.store.save(&snapshot(&inner)).await
    }
}

fn snapshot(inner: &QueueInner) -> Vec<QueueEntry> {
    inner.slots.iter().map(|slot| slot.entry.clone()).collect()
}
