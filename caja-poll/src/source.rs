use async_trait::async_trait;
use caja_core::domain::{ActivityId, ActivityStatusSnapshot};

/// Polling layer errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum PollError {
    #[error("Status fetch failed: {0}")]
    Fetch(String),

    #[error("Poller is no longer running")]
    Closed,
}

/// Where status snapshots come from
///
/// Implemented over the REST backend in production and over scripted fakes
/// in tests; the poller only sees this seam.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(
        &self,
        activity_id: ActivityId,
    ) -> Result<ActivityStatusSnapshot, PollError>;
}
