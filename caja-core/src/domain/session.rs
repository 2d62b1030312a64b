use crate::domain::{
    Activity, ActivityError, ActivityId, ActivityStatus, ActivityStatusSnapshot, Participant,
    ParticipantError, UserResponse,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Session aggregate root
///
/// Owns the participants, the ordered activity run list and the submitted
/// responses. All activity lifecycle rules are enforced here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier
    id: Uuid,

    /// Session name
    name: String,

    /// Short human-typable code participants join with
    join_code: String,

    /// Current admin's participant ID
    admin_id: Uuid,

    /// All participants (key: participant ID)
    participants: HashMap<Uuid, Participant>,

    /// Planned, running and finished activities, kept sorted by order index
    #[serde(default)]
    activities: Vec<Activity>,

    /// Submitted responses
    #[serde(default)]
    responses: Vec<UserResponse>,
}

/// Errors that can occur in session operations
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SessionError {
    #[error("Session must be created by an admin")]
    NoAdmin,

    #[error("Session already has an admin")]
    AdminAlreadyPresent,

    #[error("Participant not found: {0}")]
    ParticipantNotFound(Uuid),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Activity not found: {0}")]
    ActivityNotFound(ActivityId),

    #[error("Activity already exists: {0}")]
    ActivityAlreadyExists(ActivityId),

    #[error("Another activity is already active")]
    AnotherActivityActive,

    #[error("Activity is not accepting responses")]
    ActivityNotActive,

    #[error("Activity error: {0}")]
    Activity(#[from] ActivityError),

    #[error("Participant error: {0}")]
    Participant(#[from] ParticipantError),
}

impl Session {
    /// Create a new session with a random ID
    pub fn new(name: String, admin: Participant) -> Result<Self, SessionError> {
        Self::with_id(Uuid::new_v4(), name, admin)
    }

    /// Create a new session with a specific ID
    pub fn with_id(id: Uuid, name: String, admin: Participant) -> Result<Self, SessionError> {
        if !admin.is_admin() {
            return Err(SessionError::NoAdmin);
        }

        let admin_id = admin.id();
        let mut participants = HashMap::new();
        participants.insert(admin_id, admin);

        Ok(Session {
            id,
            name,
            join_code: Self::derive_join_code(id),
            admin_id,
            participants,
            activities: Vec::new(),
            responses: Vec::new(),
        })
    }

    /// First six hex chars of the session ID, uppercased
    fn derive_join_code(id: Uuid) -> String {
        id.simple().to_string()[..6].to_uppercase()
    }

    // ===== Getters =====

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn join_code(&self) -> &str {
        &self.join_code
    }

    pub fn admin_id(&self) -> Uuid {
        self.admin_id
    }

    pub fn participants(&self) -> &HashMap<Uuid, Participant> {
        &self.participants
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn get_activity(&self, activity_id: ActivityId) -> Option<&Activity> {
        self.activities.iter().find(|a| a.id == activity_id)
    }

    /// The currently running activity, if any (at most one)
    pub fn current_activity(&self) -> Option<&Activity> {
        self.activities
            .iter()
            .find(|a| a.status == ActivityStatus::Active)
    }

    // ===== Participant management =====

    /// Add a participant who joined via the session code
    ///
    /// Idempotent for an already-present ID; a second admin is rejected.
    pub fn add_participant(&mut self, participant: Participant) -> Result<(), SessionError> {
        if participant.is_admin() {
            return Err(SessionError::AdminAlreadyPresent);
        }

        if self.participants.contains_key(&participant.id()) {
            tracing::debug!("Participant {} already present, skipping", participant.id());
            return Ok(());
        }

        self.participants.insert(participant.id(), participant);
        Ok(())
    }

    fn require_admin(&self, requester_id: Uuid) -> Result<(), SessionError> {
        let requester = self
            .participants
            .get(&requester_id)
            .ok_or(SessionError::ParticipantNotFound(requester_id))?;

        if !requester.can_manage_session() {
            return Err(SessionError::PermissionDenied);
        }

        Ok(())
    }

    // ===== Activity management =====

    /// Admin plans an activity
    ///
    /// The activity is re-bound to this session and kept in run order.
    pub fn add_activity(
        &mut self,
        requester_id: Uuid,
        mut activity: Activity,
    ) -> Result<(), SessionError> {
        self.require_admin(requester_id)?;

        if self.activities.iter().any(|a| a.id == activity.id) {
            return Err(SessionError::ActivityAlreadyExists(activity.id));
        }

        activity.session_id = self.id;
        self.activities.push(activity);
        self.activities.sort_by_key(|a| a.order);
        Ok(())
    }

    /// Admin replaces an activity's configuration
    pub fn update_activity_config(
        &mut self,
        requester_id: Uuid,
        activity_id: ActivityId,
        config: serde_json::Value,
    ) -> Result<(), SessionError> {
        self.require_admin(requester_id)?;

        let activity = self
            .activities
            .iter_mut()
            .find(|a| a.id == activity_id)
            .ok_or(SessionError::ActivityNotFound(activity_id))?;

        activity.update_config(config)?;
        Ok(())
    }

    /// Admin moves an activity to a new lifecycle state
    ///
    /// Returns the previous state. At most one activity may be Active.
    pub fn transition_activity(
        &mut self,
        requester_id: Uuid,
        activity_id: ActivityId,
        next: ActivityStatus,
    ) -> Result<ActivityStatus, SessionError> {
        self.require_admin(requester_id)?;

        if next == ActivityStatus::Active {
            let other_active = self
                .activities
                .iter()
                .any(|a| a.status == ActivityStatus::Active && a.id != activity_id);

            if other_active {
                return Err(SessionError::AnotherActivityActive);
            }
        }

        let activity = self
            .activities
            .iter_mut()
            .find(|a| a.id == activity_id)
            .ok_or(SessionError::ActivityNotFound(activity_id))?;

        let previous = activity.status;
        activity.transition_to(next)?;
        Ok(previous)
    }

    /// Convenience: Draft -> Active
    pub fn start_activity(
        &mut self,
        requester_id: Uuid,
        activity_id: ActivityId,
    ) -> Result<ActivityStatus, SessionError> {
        self.transition_activity(requester_id, activity_id, ActivityStatus::Active)
    }

    // ===== Responses =====

    /// Participant submits a response
    ///
    /// The activity must be Active and the participant known. One response
    /// per participant is a convention, not enforced here; duplicates are
    /// logged and stored.
    pub fn submit_response(&mut self, response: UserResponse) -> Result<(), SessionError> {
        let activity = self
            .activities
            .iter()
            .find(|a| a.id == response.activity_id)
            .ok_or(SessionError::ActivityNotFound(response.activity_id))?;

        if activity.status != ActivityStatus::Active {
            tracing::warn!(
                activity_id = %response.activity_id,
                status = %activity.status,
                "Rejecting response for inactive activity"
            );
            return Err(SessionError::ActivityNotActive);
        }

        if !self.participants.contains_key(&response.participant_id) {
            return Err(SessionError::ParticipantNotFound(response.participant_id));
        }

        if self.has_submitted(response.activity_id, response.participant_id) {
            tracing::debug!(
                participant_id = %response.participant_id,
                activity_id = %response.activity_id,
                "Participant submitting again"
            );
        }

        self.responses.push(response);

        tracing::debug!(
            activity_id = %activity.id,
            total = self.responses.len(),
            "Response stored"
        );

        Ok(())
    }

    /// All responses for an activity, submission order
    pub fn responses_for(&self, activity_id: ActivityId) -> Vec<&UserResponse> {
        self.responses
            .iter()
            .filter(|r| r.activity_id == activity_id)
            .collect()
    }

    pub fn response_count(&self, activity_id: ActivityId) -> usize {
        self.responses
            .iter()
            .filter(|r| r.activity_id == activity_id)
            .count()
    }

    pub fn has_submitted(&self, activity_id: ActivityId, participant_id: Uuid) -> bool {
        self.responses
            .iter()
            .any(|r| r.activity_id == activity_id && r.participant_id == participant_id)
    }

    /// Most recent response a participant submitted for an activity
    pub fn latest_response(
        &self,
        activity_id: ActivityId,
        participant_id: Uuid,
    ) -> Option<&UserResponse> {
        self.responses
            .iter()
            .filter(|r| r.activity_id == activity_id && r.participant_id == participant_id)
            .last()
    }

    /// Assemble a status snapshot for an activity
    ///
    /// The aggregated results payload is supplied by the caller, which holds
    /// the activity-type behavior.
    pub fn snapshot(
        &self,
        activity_id: ActivityId,
        results: serde_json::Value,
    ) -> Result<ActivityStatusSnapshot, SessionError> {
        let activity = self
            .get_activity(activity_id)
            .ok_or(SessionError::ActivityNotFound(activity_id))?;

        Ok(ActivityStatusSnapshot::capture(
            activity,
            self.response_count(activity_id),
            results,
        ))
    }
}
