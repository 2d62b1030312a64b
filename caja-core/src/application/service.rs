use crate::application::{SessionCommand, SessionEvent};
use crate::domain::{
    Activity, ActivityId, ActivityStatus, ActivityStatusSnapshot, Participant, Session,
    SessionError, UserResponse,
};
use crate::registry::ActivityRegistry;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Typed failures from command execution, for callers (like the REST layer)
/// that need more than a reason string
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Configuration rejected: {0}")]
    InvalidConfig(String),

    #[error("Response rejected: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Holds every session and processes commands against them
///
/// The registry is injected, never global; it supplies default
/// configurations, validation and state-change hooks.
pub struct SessionService {
    sessions: HashMap<Uuid, Session>,
    registry: Arc<ActivityRegistry>,
}

impl SessionService {
    pub fn new(registry: Arc<ActivityRegistry>) -> Self {
        Self {
            sessions: HashMap::new(),
            registry,
        }
    }

    pub fn registry(&self) -> &ActivityRegistry {
        &self.registry
    }

    pub fn get_session(&self, session_id: Uuid) -> Option<&Session> {
        self.sessions.get(&session_id)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Insert a session directly (tests, imports)
    pub fn add_session(&mut self, session: Session) {
        self.sessions.insert(session.id(), session);
    }

    /// Process a command, mapping every failure to `CommandFailed`
    pub fn handle_command(&mut self, command: SessionCommand) -> SessionEvent {
        let name = command.name().to_string();
        match self.try_handle(command) {
            Ok(event) => event,
            Err(error) => SessionEvent::CommandFailed {
                command: name,
                reason: error.to_string(),
            },
        }
    }

    /// Process a command with typed errors
    pub fn try_handle(&mut self, command: SessionCommand) -> Result<SessionEvent, ServiceError> {
        match command {
            SessionCommand::CreateSession {
                session_id,
                name,
                admin_name,
            } => self.create_session(session_id, name, admin_name),

            SessionCommand::JoinSession {
                session_id,
                participant_name,
            } => self.join_session(session_id, participant_name),

            SessionCommand::AddActivity {
                session_id,
                requester_id,
                type_id,
                title,
                description,
                config,
                order,
            } => self.add_activity(
                session_id,
                requester_id,
                type_id,
                title,
                description,
                config,
                order,
            ),

            SessionCommand::UpdateActivityConfig {
                session_id,
                requester_id,
                activity_id,
                config,
            } => self.update_activity_config(session_id, requester_id, activity_id, config),

            SessionCommand::TransitionActivity {
                session_id,
                requester_id,
                activity_id,
                new_status,
            } => self.transition_activity(session_id, requester_id, activity_id, new_status),

            SessionCommand::SubmitResponse {
                session_id,
                activity_id,
                participant_id,
                payload,
            } => self.submit_response(session_id, activity_id, participant_id, payload),
        }
    }

    fn session_mut(&mut self, session_id: Uuid) -> Result<&mut Session, ServiceError> {
        self.sessions
            .get_mut(&session_id)
            .ok_or(ServiceError::SessionNotFound(session_id))
    }

    fn resolve_requester(
        &self,
        session_id: Uuid,
        requester_id: Option<Uuid>,
    ) -> Result<Uuid, ServiceError> {
        match requester_id {
            Some(id) => Ok(id),
            None => {
                let session = self
                    .sessions
                    .get(&session_id)
                    .ok_or(ServiceError::SessionNotFound(session_id))?;
                Ok(session.admin_id())
            }
        }
    }

    fn create_session(
        &mut self,
        session_id: Option<Uuid>,
        name: String,
        admin_name: String,
    ) -> Result<SessionEvent, ServiceError> {
        let admin = Participant::new_admin(admin_name).map_err(SessionError::from)?;

        let session = match session_id {
            Some(id) => Session::with_id(id, name, admin)?,
            None => Session::new(name, admin)?,
        };

        tracing::info!(session_id = %session.id(), name = %session.name(), "Session created");

        self.sessions.insert(session.id(), session.clone());
        Ok(SessionEvent::SessionCreated { session })
    }

    fn join_session(
        &mut self,
        session_id: Uuid,
        participant_name: String,
    ) -> Result<SessionEvent, ServiceError> {
        let participant =
            Participant::new_participant(participant_name).map_err(SessionError::from)?;

        let session = self.session_mut(session_id)?;
        session.add_participant(participant.clone())?;

        tracing::info!(
            session_id = %session_id,
            participant_id = %participant.id(),
            "Participant joined"
        );

        Ok(SessionEvent::ParticipantJoined {
            session_id,
            participant,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn add_activity(
        &mut self,
        session_id: Uuid,
        requester_id: Option<Uuid>,
        type_id: String,
        title: String,
        description: String,
        config: Option<serde_json::Value>,
        order: Option<u32>,
    ) -> Result<SessionEvent, ServiceError> {
        let requester = self.resolve_requester(session_id, requester_id)?;

        // Unknown types may still be planned; only rendering reports them
        let config = match (config, self.registry.get(&type_id)) {
            (Some(config), _) => config,
            (None, Some(definition)) => definition.behavior.default_config(),
            (None, None) => {
                tracing::warn!(%type_id, "Planning activity with unregistered type");
                serde_json::json!({})
            }
        };

        let order = match order {
            Some(order) => order,
            None => {
                let session = self
                    .sessions
                    .get(&session_id)
                    .ok_or(ServiceError::SessionNotFound(session_id))?;
                session.activities().len() as u32
            }
        };

        let activity = Activity::new(session_id, type_id, title)
            .with_description(description)
            .with_config(config)
            .with_order(order);

        let session = self.session_mut(session_id)?;
        session.add_activity(requester, activity.clone())?;

        Ok(SessionEvent::ActivityAdded {
            session_id,
            activity,
        })
    }

    fn update_activity_config(
        &mut self,
        session_id: Uuid,
        requester_id: Option<Uuid>,
        activity_id: ActivityId,
        config: serde_json::Value,
    ) -> Result<SessionEvent, ServiceError> {
        let requester = self.resolve_requester(session_id, requester_id)?;

        let session = self
            .sessions
            .get(&session_id)
            .ok_or(ServiceError::SessionNotFound(session_id))?;
        let activity = session
            .get_activity(activity_id)
            .ok_or(SessionError::ActivityNotFound(activity_id))?;

        // Saving an invalid configuration is refused; draft-local edits are
        // a client concern
        let validation = match self.registry.get(&activity.type_id) {
            Some(definition) => definition.behavior.validate_config(&config),
            None => crate::traits::ConfigValidation::ok(),
        };

        if !validation.valid {
            return Err(ServiceError::InvalidConfig(validation.errors.join("; ")));
        }

        let session = self.session_mut(session_id)?;
        session.update_activity_config(requester, activity_id, config)?;

        Ok(SessionEvent::ActivityConfigUpdated {
            session_id,
            activity_id,
            validation,
        })
    }

    fn transition_activity(
        &mut self,
        session_id: Uuid,
        requester_id: Option<Uuid>,
        activity_id: ActivityId,
        new_status: ActivityStatus,
    ) -> Result<SessionEvent, ServiceError> {
        let requester = self.resolve_requester(session_id, requester_id)?;

        let session = self.session_mut(session_id)?;
        let previous = session.transition_activity(requester, activity_id, new_status)?;
        let transitioned = session.get_activity(activity_id).cloned();

        // Notification hook only; the transition is already applied
        if let Some(activity) = transitioned {
            if let Some(definition) = self.registry.get(&activity.type_id) {
                definition
                    .behavior
                    .on_state_change(previous, new_status, &activity);
            }
        }

        tracing::info!(
            %session_id,
            %activity_id,
            from = %previous,
            to = %new_status,
            "Activity transitioned"
        );

        Ok(SessionEvent::ActivityTransitioned {
            session_id,
            activity_id,
            from: previous,
            to: new_status,
        })
    }

    fn submit_response(
        &mut self,
        session_id: Uuid,
        activity_id: ActivityId,
        participant_id: Uuid,
        payload: serde_json::Value,
    ) -> Result<SessionEvent, ServiceError> {
        let session = self
            .sessions
            .get(&session_id)
            .ok_or(ServiceError::SessionNotFound(session_id))?;
        let activity = session
            .get_activity(activity_id)
            .ok_or(SessionError::ActivityNotFound(activity_id))?;

        // The type's own validation hook; the envelope convention itself is
        // not enforced here
        if let Some(definition) = self.registry.get(&activity.type_id) {
            definition
                .behavior
                .validate_response(&activity.config, &payload)
                .map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;
        }

        let response =
            UserResponse::new(session_id, activity_id, participant_id).with_payload(payload);
        let response_id = response.id;

        let session = self.session_mut(session_id)?;
        session.submit_response(response)?;
        let response_count = session.response_count(activity_id);

        Ok(SessionEvent::ResponseSubmitted {
            session_id,
            activity_id,
            response_id,
            response_count,
        })
    }

    /// Assemble the polled snapshot for an activity, aggregating results
    /// through the type's behavior
    pub fn snapshot(
        &self,
        session_id: Uuid,
        activity_id: ActivityId,
    ) -> Result<ActivityStatusSnapshot, ServiceError> {
        let session = self
            .sessions
            .get(&session_id)
            .ok_or(ServiceError::SessionNotFound(session_id))?;
        let activity = session
            .get_activity(activity_id)
            .ok_or(SessionError::ActivityNotFound(activity_id))?;

        let results = match self.registry.get(&activity.type_id) {
            Some(definition) => {
                let responses: Vec<UserResponse> = session
                    .responses_for(activity_id)
                    .into_iter()
                    .cloned()
                    .collect();
                definition.behavior.aggregate(&activity.config, &responses)
            }
            None => serde_json::Value::Null,
        };

        Ok(session.snapshot(activity_id, results)?)
    }
}
