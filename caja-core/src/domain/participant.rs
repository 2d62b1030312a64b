use instant::Instant;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Role within a session - determines management authority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionRole {
    /// Creates the session, plans and advances activities
    Admin,
    /// Joined via the session code, submits responses
    Participant,
}

impl fmt::Display for SessionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionRole::Admin => write!(f, "Admin"),
            SessionRole::Participant => write!(f, "Participant"),
        }
    }
}

/// Timestamp in milliseconds since application start (monotonic)
///
/// Serializable and comparable, suitable for deterministic ordering.
/// Uses instant::Instant internally so the same code runs under WASM.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, schemars::JsonSchema,
)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Create a timestamp representing the current moment
    pub fn now() -> Self {
        // Single anchor point for all timestamps in the process
        static ANCHOR: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();
        let anchor = ANCHOR.get_or_init(Instant::now);

        let elapsed = Instant::now().duration_since(*anchor);
        Timestamp(elapsed.as_millis() as u64)
    }

    /// Get the raw milliseconds value
    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Create a timestamp from a raw milliseconds value
    pub fn from_millis(millis: u64) -> Self {
        Timestamp(millis)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Someone present in a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Unique identifier
    id: Uuid,
    /// Display name
    name: String,
    /// Role determining permissions
    role: SessionRole,
    /// When this participant joined (monotonic)
    joined_at: Timestamp,
}

/// Errors that can occur when working with participants
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParticipantError {
    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Name must be between 1 and 50 characters")]
    InvalidNameLength,
}

impl Participant {
    /// Create the session admin
    pub fn new_admin(name: String) -> Result<Self, ParticipantError> {
        Self::validate_name(&name)?;

        Ok(Participant {
            id: Uuid::new_v4(),
            name,
            role: SessionRole::Admin,
            joined_at: Timestamp::now(),
        })
    }

    /// Create a regular participant
    pub fn new_participant(name: String) -> Result<Self, ParticipantError> {
        Self::validate_name(&name)?;

        Ok(Participant {
            id: Uuid::new_v4(),
            name,
            role: SessionRole::Participant,
            joined_at: Timestamp::now(),
        })
    }

    /// Create a participant with an explicit timestamp (testing / deserialization)
    pub fn with_timestamp(
        name: String,
        role: SessionRole,
        joined_at: Timestamp,
    ) -> Result<Self, ParticipantError> {
        Self::validate_name(&name)?;

        Ok(Participant {
            id: Uuid::new_v4(),
            name,
            role,
            joined_at,
        })
    }

    fn validate_name(name: &str) -> Result<(), ParticipantError> {
        if name.is_empty() {
            return Err(ParticipantError::EmptyName);
        }

        if name.len() > 50 {
            return Err(ParticipantError::InvalidNameLength);
        }

        Ok(())
    }

    // Getters

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> SessionRole {
        self.role
    }

    pub fn joined_at(&self) -> Timestamp {
        self.joined_at
    }

    /// Check if this participant is the session admin
    pub fn is_admin(&self) -> bool {
        matches!(self.role, SessionRole::Admin)
    }

    /// Check if this participant can manage the session
    pub fn can_manage_session(&self) -> bool {
        self.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use instant::Duration;

    #[test]
    fn test_create_admin() {
        let admin = Participant::new_admin("Alice".to_string()).unwrap();

        assert_eq!(admin.name(), "Alice");
        assert_eq!(admin.role(), SessionRole::Admin);
        assert!(admin.is_admin());
        assert!(admin.can_manage_session());
    }

    #[test]
    fn test_create_participant() {
        let p = Participant::new_participant("Bob".to_string()).unwrap();

        assert_eq!(p.name(), "Bob");
        assert_eq!(p.role(), SessionRole::Participant);
        assert!(!p.is_admin());
        assert!(!p.can_manage_session());
    }

    #[test]
    fn test_empty_name_validation() {
        let result = Participant::new_participant("".to_string());

        assert_eq!(result, Err(ParticipantError::EmptyName));
    }

    #[test]
    fn test_name_length_validation() {
        let long_name = "a".repeat(51);
        let result = Participant::new_participant(long_name);

        assert_eq!(result, Err(ParticipantError::InvalidNameLength));
    }

    #[test]
    fn test_unique_ids() {
        let p1 = Participant::new_participant("Alice".to_string()).unwrap();
        let p2 = Participant::new_participant("Alice".to_string()).unwrap();

        assert_ne!(p1.id(), p2.id());
    }

    #[test]
    fn test_joined_at_ordering() {
        let p1 = Participant::new_participant("Alice".to_string()).unwrap();
        std::thread::sleep(Duration::from_millis(10));
        let p2 = Participant::new_participant("Bob".to_string()).unwrap();

        assert!(p2.joined_at() > p1.joined_at());
    }

    #[test]
    fn test_timestamp_serialization() {
        let timestamp = Timestamp::from_millis(12345);
        let json = serde_json::to_string(&timestamp).unwrap();
        assert_eq!(json, "12345");

        let deserialized: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, timestamp);
    }

    #[test]
    fn test_timestamp_display() {
        assert_eq!(Timestamp::from_millis(12345).to_string(), "12345ms");
    }

    #[test]
    fn test_timestamp_now_is_monotonic() {
        let t1 = Timestamp::now();
        std::thread::sleep(Duration::from_millis(5));
        let t2 = Timestamp::now();

        assert!(t2 > t1);
    }

    #[test]
    fn test_participant_serialization() {
        let participant = Participant::with_timestamp(
            "Alice".to_string(),
            SessionRole::Admin,
            Timestamp::from_millis(1000),
        )
        .unwrap();

        let json = serde_json::to_string(&participant).unwrap();
        let deserialized: Participant = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.name(), participant.name());
        assert_eq!(deserialized.role(), participant.role());
        assert_eq!(deserialized.joined_at(), participant.joined_at());
    }
}
