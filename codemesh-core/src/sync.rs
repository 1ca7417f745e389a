//! Event feed synchronization via fixed-interval polling.
//!
//! The sync loop keeps the event feed eventually consistent with the server:
//! one fetch immediately on activation, then one per period. Each successful
//! fetch replaces the feed wholesale; failures are logged and tolerated, and
//! never stop the schedule. Teardown is deterministic: [`EventSyncHandle::shutdown`]
//! stops the schedule and abandons any in-flight fetch, so no result produced
//! by the loop can arrive after shutdown resolves. (State-side, the
//! [`crate::DashboardState`] `closed` guard discards anything already queued.)
//!
//! The loop talks to the server through the [`EventSource`] seam so tests can
//! script success/failure sequences without a network.

use std::future::Future;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::Result;
use crate::types::EventRecord;

/// Something that can produce the current event collection.
pub trait EventSource: Send + Sync + 'static {
    /// Fetch the full event collection. One attempt, no retries.
    fn fetch(&self) -> impl Future<Output = Result<Vec<EventRecord>>> + Send;
}

impl EventSource for crate::client::MeshClient {
    async fn fetch(&self) -> Result<Vec<EventRecord>> {
        self.recent_events().await
    }
}

/// One delivery from the sync loop to the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncUpdate {
    /// A poll succeeded; replace the feed with exactly this collection.
    Replaced(Vec<EventRecord>),
    /// A poll failed; keep the previous feed and show it as stale.
    Failed,
}

/// Handle for the running sync loop.
pub struct EventSyncHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl EventSyncHandle {
    /// Stop the schedule. After this resolves, the loop has exited and will
    /// deliver nothing further; an in-flight fetch is abandoned, not awaited.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

/// Spawn the polling loop: fetch immediately, then once per `period`.
///
/// Updates are delivered over `tx`; the loop also exits on its own when the
/// receiver is dropped.
pub fn spawn_event_sync<S: EventSource>(
    source: S,
    period: Duration,
    tx: mpsc::Sender<SyncUpdate>,
) -> EventSyncHandle {
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        // The first tick fires immediately
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => break,
                _ = ticker.tick() => {
                    let update = tokio::select! {
                        // Shutdown during a slow fetch abandons it
                        _ = shutdown_rx.changed() => break,
                        result = source.fetch() => match result {
                            Ok(events) => {
                                tracing::debug!(count = events.len(), "Event poll succeeded");
                                SyncUpdate::Replaced(events)
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "Event poll failed, keeping previous feed");
                                SyncUpdate::Failed
                            }
                        },
                    };
                    if tx.send(update).await.is_err() {
                        // Receiver torn down; nothing left to sync for
                        break;
                    }
                }
            }
        }

        tracing::debug!("Event sync loop stopped");
    });

    EventSyncHandle {
        shutdown: shutdown_tx,
        task,
    }
}
