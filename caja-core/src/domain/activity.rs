use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Activity ID (unique within a session)
pub type ActivityId = Uuid;

/// Activity lifecycle state
///
/// Transitions are forward-only: once Completed or Cancelled, an activity is
/// never resurrected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    /// Being configured, not yet shown to participants
    Draft,
    /// Accepting responses
    Active,
    /// Finished normally
    Completed,
    /// Stopped early
    Cancelled,
}

impl ActivityStatus {
    /// States this status may legally move to
    pub fn valid_transitions(&self) -> &'static [ActivityStatus] {
        match self {
            ActivityStatus::Draft => &[ActivityStatus::Active, ActivityStatus::Cancelled],
            ActivityStatus::Active => &[ActivityStatus::Completed, ActivityStatus::Cancelled],
            ActivityStatus::Completed | ActivityStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, next: ActivityStatus) -> bool {
        self.valid_transitions().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityStatus::Draft => write!(f, "draft"),
            ActivityStatus::Active => write!(f, "active"),
            ActivityStatus::Completed => write!(f, "completed"),
            ActivityStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Errors raised by activity state handling
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ActivityError {
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: ActivityStatus,
        to: ActivityStatus,
    },

    #[error("Configuration is frozen once the activity is {0}")]
    ConfigFrozen(ActivityStatus),
}

/// One configured instance of an activity type within a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Activity {
    /// Unique ID
    pub id: ActivityId,

    /// Owning session
    pub session_id: Uuid,

    /// Activity type identifier (e.g., "poll")
    #[serde(rename = "type")]
    pub type_id: String,

    /// Display title
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Type-specific configuration (opaque to the domain)
    #[serde(default)]
    pub config: serde_json::Value,

    /// Position within the session's run order
    #[serde(default)]
    pub order: u32,

    /// Current lifecycle state
    pub status: ActivityStatus,
}

impl Activity {
    /// Create a new draft activity
    pub fn new(session_id: Uuid, type_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            type_id: type_id.into(),
            title: title.into(),
            description: String::new(),
            config: serde_json::json!({}),
            order: 0,
            status: ActivityStatus::Draft,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_config(mut self, config: serde_json::Value) -> Self {
        self.config = config;
        self
    }

    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    /// Replace the configuration
    ///
    /// Allowed while Draft or Active; frozen in terminal states.
    pub fn update_config(&mut self, config: serde_json::Value) -> Result<(), ActivityError> {
        if self.status.is_terminal() {
            return Err(ActivityError::ConfigFrozen(self.status));
        }

        self.config = config;
        Ok(())
    }

    /// Move to the next lifecycle state
    pub fn transition_to(&mut self, next: ActivityStatus) -> Result<(), ActivityError> {
        if !self.status.can_transition_to(next) {
            return Err(ActivityError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }

        self.status = next;
        Ok(())
    }
}
