use crate::domain::{Activity, ActivityId, ActivityStatus, Timestamp};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Point-in-time read of an activity's live state, obtained via polling
///
/// Replaced wholesale on every successful poll tick; never partially merged.
/// On fetch failure the previous snapshot is retained by the polling layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ActivityStatusSnapshot {
    pub activity_id: ActivityId,

    pub status: ActivityStatus,

    /// Total responses submitted for this activity (session-wide)
    pub response_count: usize,

    /// Aggregated results payload; shape is activity-type-specific
    /// (e.g. vote tallies with percentages), `Null` when the type supplies
    /// no aggregation
    #[serde(default)]
    pub results: serde_json::Value,

    /// Legal next states, for the host admin UI to act on
    pub valid_transitions: Vec<ActivityStatus>,

    pub last_updated: Timestamp,
}

impl ActivityStatusSnapshot {
    /// Build a snapshot for an activity as of now
    pub fn capture(activity: &Activity, response_count: usize, results: serde_json::Value) -> Self {
        Self {
            activity_id: activity.id,
            status: activity.status,
            response_count,
            results,
            valid_transitions: activity.status.valid_transitions().to_vec(),
            last_updated: Timestamp::now(),
        }
    }
}
