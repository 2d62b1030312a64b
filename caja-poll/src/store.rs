use caja_core::domain::ActivityStatusSnapshot;

/// What consumers of the polling layer observe
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollState {
    /// Latest successful snapshot; retained across failures, `None` only
    /// until the first success (the "loading" case renderers must handle)
    pub snapshot: Option<ActivityStatusSnapshot>,

    /// An attempt is currently in flight
    pub loading: bool,

    /// Most recent error, cleared by the next success
    pub last_error: Option<String>,
}

impl PollState {
    /// A stale snapshot: the last attempt failed but an older success is
    /// still being served
    pub fn is_stale(&self) -> bool {
        self.snapshot.is_some() && self.last_error.is_some()
    }
}

/// Holds the latest snapshot with stale-while-revalidate semantics
///
/// Every attempt carries a sequence number; completions older than the
/// newest applied one are discarded, so "last successful response wins"
/// holds even for out-of-order completions.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    latest: Option<ActivityStatusSnapshot>,
    last_error: Option<String>,
    loading: bool,
    applied_seq: u64,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Apply a successful fetch; returns false when superseded
    pub fn record_success(&mut self, seq: u64, snapshot: ActivityStatusSnapshot) -> bool {
        if seq <= self.applied_seq {
            tracing::debug!(seq, applied = self.applied_seq, "Discarding superseded snapshot");
            return false;
        }

        self.applied_seq = seq;
        self.latest = Some(snapshot);
        self.last_error = None;
        self.loading = false;
        true
    }

    /// Apply a failed fetch; the previous snapshot is retained, never
    /// cleared. Returns false when superseded.
    pub fn record_failure(&mut self, seq: u64, error: String) -> bool {
        if seq <= self.applied_seq {
            return false;
        }

        self.applied_seq = seq;
        self.last_error = Some(error);
        self.loading = false;
        true
    }

    pub fn latest(&self) -> Option<&ActivityStatusSnapshot> {
        self.latest.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn state(&self) -> PollState {
        PollState {
            snapshot: self.latest.clone(),
            loading: self.loading,
            last_error: self.last_error.clone(),
        }
    }
}
