//! Recurring background sweep of expired records.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, info};

use crate::storage::UrlStore;

pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(600);

/// Owns the recurring sweep task. Constructed after the store, stopped
/// before teardown; tests drive `UrlStore::sweep_expired` directly instead
/// of waiting on the timer.
pub struct ExpirySweeper {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl ExpirySweeper {
    pub fn start(store: Arc<UrlStore>, interval: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            // Skip the first tick which fires immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = store.sweep_expired();
                        if removed > 0 {
                            debug!(removed, "expiry sweep removed records");
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            info!("expiry sweeper shutting down");
                            break;
                        }
                    }
                }
            }
        });

        Self {
            shutdown_tx,
            handle,
        }
    }

    /// Signal shutdown. An in-progress sweep finishes before the task exits.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Wait for the task to exit after `stop`.
    pub async fn join(self) {
        let _ = self.handle.await;
    }
}
