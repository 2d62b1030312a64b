use async_trait::async_trait;
use caja_core::domain::{Activity, ActivityId, ActivityStatus, ActivityStatusSnapshot};
use caja_poll::{PollError, StatusSource};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

/// Scripted status source: serves queued outcomes, then repeats the last one
pub struct MockSource {
    script: Mutex<VecDeque<Result<ActivityStatusSnapshot, PollError>>>,
    last: Mutex<Option<Result<ActivityStatusSnapshot, PollError>>>,
    calls: AtomicUsize,
}

impl MockSource {
    pub fn new(script: Vec<Result<ActivityStatusSnapshot, PollError>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// An active snapshot with the given response count
    pub fn snapshot(activity_id: ActivityId, response_count: usize) -> ActivityStatusSnapshot {
        let mut activity = Activity::new(Uuid::new_v4(), "poll", "P");
        activity.id = activity_id;
        activity.transition_to(ActivityStatus::Active).unwrap();
        ActivityStatusSnapshot::capture(&activity, response_count, serde_json::Value::Null)
    }
}

#[async_trait]
impl StatusSource for MockSource {
    async fn fetch_status(
        &self,
        _activity_id: ActivityId,
    ) -> Result<ActivityStatusSnapshot, PollError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut script = self.script.lock().unwrap();
        if let Some(outcome) = script.pop_front() {
            *self.last.lock().unwrap() = Some(outcome.clone());
            return outcome;
        }

        self.last
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(PollError::Fetch("script exhausted".to_string())))
    }
}
