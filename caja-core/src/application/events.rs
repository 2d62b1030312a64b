use crate::domain::{Activity, ActivityId, ActivityStatus, Participant, Session};
use crate::traits::ConfigValidation;
use uuid::Uuid;

/// Events emitted by the domain after command execution
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Session was created
    SessionCreated { session: Session },

    /// Participant joined the session
    ParticipantJoined {
        session_id: Uuid,
        participant: Participant,
    },

    /// Activity was planned
    ActivityAdded {
        session_id: Uuid,
        activity: Activity,
    },

    /// Activity configuration was replaced
    ActivityConfigUpdated {
        session_id: Uuid,
        activity_id: ActivityId,
        validation: ConfigValidation,
    },

    /// Activity moved through its lifecycle
    ActivityTransitioned {
        session_id: Uuid,
        activity_id: ActivityId,
        from: ActivityStatus,
        to: ActivityStatus,
    },

    /// Response was stored
    ResponseSubmitted {
        session_id: Uuid,
        activity_id: ActivityId,
        response_id: Uuid,
        response_count: usize,
    },

    /// Command failed
    CommandFailed { command: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_clone() {
        let event = SessionEvent::ResponseSubmitted {
            session_id: Uuid::new_v4(),
            activity_id: Uuid::new_v4(),
            response_id: Uuid::new_v4(),
            response_count: 1,
        };

        let cloned = event.clone();
        assert_eq!(event, cloned);
    }

    #[test]
    fn test_command_failed_event() {
        let event = SessionEvent::CommandFailed {
            command: "SubmitResponse".to_string(),
            reason: "Activity is not accepting responses".to_string(),
        };

        if let SessionEvent::CommandFailed { command, reason } = event {
            assert_eq!(command, "SubmitResponse");
            assert!(reason.contains("not accepting"));
        } else {
            panic!("Expected CommandFailed");
        }
    }
}
