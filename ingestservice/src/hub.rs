//! Broadcast Hub
//!
//! Registry of currently-subscribed observers and best-effort fanout of
//! accepted telemetry to all of them. Delivery is at-most-once: there is no
//! backlog and no replay, a newly joined observer only sees records broadcast
//! after it joined.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{mpsc, RwLock};

/// Handle returned by `subscribe`: the observer's registry id plus the
/// receiving end of its delivery channel. The hub closes the sender when the
/// observer is pruned, so `rx` returning `None` means the subscription is
/// gone.
pub struct Subscription {
    pub id: u64,
    pub rx: mpsc::Receiver<String>,
}

/// Observer registry with snapshot-based fanout.
///
/// Shared, process-lifetime state touched concurrently by every ingest call
/// and by each observer's connection lifecycle; all mutation goes through the
/// inner lock.
pub struct BroadcastHub {
    subscribers: RwLock<HashMap<u64, mpsc::Sender<String>>>,
    next_id: AtomicU64,
    channel_capacity: usize,
}

impl BroadcastHub {
    /// `channel_capacity` bounds each observer's in-flight backlog; an
    /// observer whose channel is full counts as a failed delivery and is
    /// pruned rather than silently skipped.
    pub fn new(channel_capacity: usize) -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            channel_capacity,
        }
    }

    /// Register a new observer and hand back its delivery channel.
    pub async fn subscribe(&self) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.channel_capacity);

        let mut subscribers = self.subscribers.write().await;
        subscribers.insert(id, tx);
        log::debug!("observer {} subscribed ({} total)", id, subscribers.len());

        Subscription { id, rx }
    }

    /// Remove an observer. Returns whether it was still registered.
    pub async fn unsubscribe(&self, id: u64) -> bool {
        let mut subscribers = self.subscribers.write().await;
        if subscribers.remove(&id).is_some() {
            log::debug!("observer {} unsubscribed ({} left)", id, subscribers.len());
            true
        } else {
            false
        }
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    /// Deliver `payload` to every observer registered at the start of the
    /// call. Iterates over a snapshot of the registry, so subscribes and
    /// unsubscribes racing this call cannot corrupt or skip entries;
    /// observers joining mid-broadcast do not receive this record.
    ///
    /// Any failed delivery (receiver dropped, or channel full because the
    /// observer cannot keep up) removes that observer from the live registry
    /// afterwards and never aborts delivery to the rest.
    ///
    /// Returns the number of successful deliveries.
    pub async fn broadcast(&self, payload: &str) -> usize {
        let snapshot: Vec<(u64, mpsc::Sender<String>)> = {
            let subscribers = self.subscribers.read().await;
            subscribers
                .iter()
                .map(|(id, tx)| (*id, tx.clone()))
                .collect()
        };

        let mut delivered = 0;
        let mut failed = Vec::new();
        for (id, tx) in snapshot {
            match tx.try_send(payload.to_string()) {
                Ok(()) => delivered += 1,
                Err(_) => failed.push(id),
            }
        }

        if !failed.is_empty() {
            let mut subscribers = self.subscribers.write().await;
            for id in failed {
                if subscribers.remove(&id).is_some() {
                    log::info!("observer {} failed delivery, pruned", id);
                }
            }
        }

        delivered
    }
}
