use crate::domain::{ActivityId, ActivityStatus};
use uuid::Uuid;

/// Commands that can be executed against the session domain
///
/// `requester_id: None` means "acting as the session admin" - the REST
/// surface is unauthenticated in this MVP and management calls are trusted.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    /// Create a new session
    CreateSession {
        session_id: Option<Uuid>,
        name: String,
        admin_name: String,
    },

    /// Join an existing session
    JoinSession {
        session_id: Uuid,
        participant_name: String,
    },

    /// Plan an activity
    AddActivity {
        session_id: Uuid,
        requester_id: Option<Uuid>,
        type_id: String,
        title: String,
        description: String,
        /// `None` takes the type's default configuration
        config: Option<serde_json::Value>,
        /// `None` appends at the end of the run order
        order: Option<u32>,
    },

    /// Replace an activity's configuration
    UpdateActivityConfig {
        session_id: Uuid,
        requester_id: Option<Uuid>,
        activity_id: ActivityId,
        config: serde_json::Value,
    },

    /// Move an activity through its lifecycle
    TransitionActivity {
        session_id: Uuid,
        requester_id: Option<Uuid>,
        activity_id: ActivityId,
        new_status: ActivityStatus,
    },

    /// Participant submits a response
    SubmitResponse {
        session_id: Uuid,
        activity_id: ActivityId,
        participant_id: Uuid,
        payload: serde_json::Value,
    },
}

impl SessionCommand {
    /// Command name, used in failure events
    pub fn name(&self) -> &'static str {
        match self {
            SessionCommand::CreateSession { .. } => "CreateSession",
            SessionCommand::JoinSession { .. } => "JoinSession",
            SessionCommand::AddActivity { .. } => "AddActivity",
            SessionCommand::UpdateActivityConfig { .. } => "UpdateActivityConfig",
            SessionCommand::TransitionActivity { .. } => "TransitionActivity",
            SessionCommand::SubmitResponse { .. } => "SubmitResponse",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_clone() {
        let cmd = SessionCommand::CreateSession {
            session_id: None,
            name: "Town Hall".to_string(),
            admin_name: "Alice".to_string(),
        };

        let cloned = cmd.clone();
        assert_eq!(cmd, cloned);
    }

    #[test]
    fn test_command_names() {
        let cmd = SessionCommand::JoinSession {
            session_id: Uuid::new_v4(),
            participant_name: "Bob".to_string(),
        };

        assert_eq!(cmd.name(), "JoinSession");
    }
}
