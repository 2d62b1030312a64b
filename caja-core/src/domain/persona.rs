use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rendering role an activity is presented for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    /// Configures the activity
    Admin,
    /// Read-only large-screen display
    Viewer,
    /// Submits responses
    Participant,
}

impl Persona {
    /// All personas, in dispatch order
    pub const ALL: [Persona; 3] = [Persona::Admin, Persona::Viewer, Persona::Participant];
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Persona::Admin => write!(f, "admin"),
            Persona::Viewer => write!(f, "viewer"),
            Persona::Participant => write!(f, "participant"),
        }
    }
}
