use caja_core::domain::{Activity, ActivityId, ActivityStatus, Participant, Session};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub name: String,
    pub admin_name: String,
}

#[derive(Debug, Deserialize)]
pub struct JoinSessionRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateActivityRequest {
    #[serde(rename = "type")]
    pub type_id: String,

    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub configuration: Option<serde_json::Value>,

    #[serde(default)]
    pub order: Option<u32>,
}

/// Partial update: replace the configuration and/or transition the status
#[derive(Debug, Deserialize)]
pub struct UpdateActivityRequest {
    #[serde(default)]
    pub configuration: Option<serde_json::Value>,

    #[serde(default)]
    pub status: Option<ActivityStatus>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitResponseRequest {
    pub participant_id: Uuid,

    /// Conventionally a `{type, version, data, metadata}` envelope; only the
    /// activity type's own hook validates it
    pub response_data: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponseResponse {
    pub response_id: Uuid,
    pub response_count: usize,
}

/// Full session detail
#[derive(Debug, Serialize)]
pub struct SessionDetail {
    pub id: Uuid,
    pub name: String,
    pub join_code: String,
    pub admin_id: Uuid,
    pub participants: Vec<Participant>,
    pub activities: Vec<Activity>,
}

impl SessionDetail {
    pub fn from_session(session: &Session) -> Self {
        let mut participants: Vec<Participant> = session.participants().values().cloned().collect();
        participants.sort_by_key(|p| p.joined_at());

        Self {
            id: session.id(),
            name: session.name().to_string(),
            join_code: session.join_code().to_string(),
            admin_id: session.admin_id(),
            participants,
            activities: session.activities().to_vec(),
        }
    }
}

/// Session-level poll target
#[derive(Debug, Serialize)]
pub struct SessionStatus {
    pub session_id: Uuid,
    pub name: String,
    pub participant_count: usize,
    pub activity_count: usize,
    pub current_activity: Option<ActivitySummary>,
}

#[derive(Debug, Serialize)]
pub struct ActivitySummary {
    pub id: ActivityId,
    #[serde(rename = "type")]
    pub type_id: String,
    pub title: String,
    pub status: ActivityStatus,
}

impl SessionStatus {
    pub fn from_session(session: &Session) -> Self {
        Self {
            session_id: session.id(),
            name: session.name().to_string(),
            participant_count: session.participant_count(),
            activity_count: session.activities().len(),
            current_activity: session.current_activity().map(|activity| ActivitySummary {
                id: activity.id,
                type_id: activity.type_id.clone(),
                title: activity.title.clone(),
                status: activity.status,
            }),
        }
    }
}
