use crate::dispatch::RenderProps;
use crate::domain::{Activity, ActivityStatus, UserResponse};
use crate::view::View;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Outcome of a configuration validation hook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConfigValidation {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ConfigValidation {
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    pub fn fail(errors: Vec<String>) -> Self {
        Self {
            valid: false,
            errors,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BehaviorError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Behavior hooks an activity type may override
///
/// Every hook has a safe default: configurations are accepted, the default
/// configuration is empty, the schema is empty, responses are accepted,
/// aggregation yields `Null` and state changes are ignored. Missing
/// renderers are flagged by registry validation, not here.
pub trait ActivityBehavior: Send + Sync {
    /// Validate an activity configuration
    fn validate_config(&self, config: &serde_json::Value) -> ConfigValidation {
        let _ = config;
        ConfigValidation::ok()
    }

    /// Configuration a freshly created activity starts with
    fn default_config(&self) -> serde_json::Value {
        serde_json::json!({})
    }

    /// JSON schema describing the configuration shape
    fn config_schema(&self) -> serde_json::Value {
        serde_json::json!({})
    }

    /// Validate a response payload; the envelope convention is not enforced
    /// by the core
    fn validate_response(
        &self,
        config: &serde_json::Value,
        payload: &serde_json::Value,
    ) -> Result<(), BehaviorError> {
        let _ = (config, payload);
        Ok(())
    }

    /// Aggregate submitted responses into a results payload for snapshots
    fn aggregate(&self, config: &serde_json::Value, responses: &[UserResponse]) -> serde_json::Value {
        let _ = (config, responses);
        serde_json::Value::Null
    }

    /// Notification hook for observed status transitions; never enforced
    fn on_state_change(&self, old: ActivityStatus, new: ActivityStatus, activity: &Activity) {
        let _ = (old, new, activity);
    }
}

/// Default behavior: accepts everything, aggregates nothing
pub struct DefaultBehavior;

impl ActivityBehavior for DefaultBehavior {}

/// Failure raised while producing a persona's interface
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct RenderError {
    pub message: String,
}

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Produces the interface for one persona (or any persona, when used as a
/// type's fallback)
pub trait PersonaRenderer: Send + Sync {
    fn render(&self, props: &RenderProps) -> Result<View, RenderError>;
}
