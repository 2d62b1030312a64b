use crate::domain::{ActivityId, Timestamp};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One participant's submission against an activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub session_id: Uuid,
    pub activity_id: ActivityId,
    pub participant_id: Uuid,

    /// Response payload (opaque to the domain; by convention a
    /// `{type, version, data, metadata}` envelope)
    #[serde(default)]
    pub payload: serde_json::Value,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl UserResponse {
    pub fn new(session_id: Uuid, activity_id: ActivityId, participant_id: Uuid) -> Self {
        let now = Timestamp::now();
        Self {
            id: Uuid::new_v4(),
            session_id,
            activity_id,
            participant_id,
            payload: serde_json::Value::Null,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Mark the response as updated now
    pub fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}

/// The conventional response envelope
///
/// Nothing in the domain enforces this shape; parsing is lenient and missing
/// fields fall back to defaults. Individual activity types may reject
/// payloads through their own validation hook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResponseEnvelope {
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub data: serde_json::Value,

    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl ResponseEnvelope {
    pub fn new(kind: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            version: "1".to_string(),
            data,
            metadata: serde_json::Value::Null,
        }
    }

    /// Lenient parse: an envelope-shaped object maps field-by-field, anything
    /// else lands wholesale in `data`.
    pub fn from_value(value: &serde_json::Value) -> Self {
        match serde_json::from_value(value.clone()) {
            Ok(envelope) => envelope,
            Err(_) => Self {
                kind: String::new(),
                version: String::new(),
                data: value.clone(),
                metadata: serde_json::Value::Null,
            },
        }
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
