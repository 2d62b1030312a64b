use crate::config::PollConfig;
use crate::source::{PollError, StatusSource};
use crate::store::{PollState, SnapshotStore};
use caja_core::domain::ActivityId;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Interval-driven poller for one activity's status
///
/// Fetches on a fixed cadence, publishes the latest `PollState` through a
/// watch channel and supports manual refresh. Attempts run sequentially; the
/// store's sequence numbering keeps "last successful response wins" even if
/// a source ever completes out of order.
pub struct StatusPoller {
    state_rx: watch::Receiver<PollState>,
    refresh_tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl StatusPoller {
    /// Spawn the polling loop; the first fetch happens immediately
    pub fn spawn(
        source: Arc<dyn StatusSource>,
        activity_id: ActivityId,
        config: PollConfig,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(PollState::default());
        let (refresh_tx, mut refresh_rx) = mpsc::channel::<()>(8);

        let handle = tokio::spawn(async move {
            let mut store = SnapshotStore::new();
            let mut interval = tokio::time::interval(Duration::from_millis(config.interval_ms));
            let mut seq: u64 = 0;

            loop {
                tokio::select! {
                    _ = interval.tick() => {}
                    refresh = refresh_rx.recv() => {
                        if refresh.is_none() {
                            // Poller handle dropped
                            break;
                        }
                        tracing::debug!(%activity_id, "Manual refresh requested");
                    }
                }

                seq += 1;
                store.set_loading(true);
                let _ = state_tx.send(store.state());

                match source.fetch_status(activity_id).await {
                    Ok(snapshot) => {
                        store.record_success(seq, snapshot);
                    }
                    Err(error) => {
                        tracing::warn!(%activity_id, %error, "Status poll failed, serving stale snapshot");
                        store.record_failure(seq, error.to_string());
                    }
                }

                if state_tx.send(store.state()).is_err() {
                    // No one is watching anymore
                    break;
                }
            }
        });

        Self {
            state_rx,
            refresh_tx,
            handle,
        }
    }

    /// Latest published state
    pub fn state(&self) -> PollState {
        self.state_rx.borrow().clone()
    }

    /// Watch for state changes
    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.state_rx.clone()
    }

    /// Trigger an immediate re-fetch (the dispatcher's refresh affordance)
    pub async fn refresh(&self) -> Result<(), PollError> {
        self.refresh_tx.send(()).await.map_err(|_| PollError::Closed)
    }

    /// Stop the polling loop
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
