mod activity;
mod participant;
mod persona;
mod response;
mod session;
mod snapshot;

pub use activity::{Activity, ActivityError, ActivityId, ActivityStatus};
pub use participant::{Participant, ParticipantError, SessionRole, Timestamp};
pub use persona::Persona;
pub use response::{ResponseEnvelope, UserResponse};
pub use session::{Session, SessionError};
pub use snapshot::ActivityStatusSnapshot;
