pub mod activities;
pub mod application;
pub mod dispatch;
pub mod domain;
pub mod registry;
pub mod traits;
pub mod view;

pub use application::{ServiceError, SessionCommand, SessionEvent, SessionService};
pub use dispatch::{
    dispatch, try_dispatch, AdminProps, DispatchError, DispatchRequest, ParticipantProps,
    RenderProps, ViewerProps,
};
pub use domain::{
    Activity, ActivityError, ActivityId, ActivityStatus, ActivityStatusSnapshot, Participant,
    ParticipantError, Persona, ResponseEnvelope, Session, SessionError, SessionRole, Timestamp,
    UserResponse,
};
pub use registry::{
    ActivityRegistry, ActivityTypeDefinition, PersonaRenderers, ProblemKind, RegistryError,
    RegistryProblem,
};
pub use traits::{
    ActivityBehavior, BehaviorError, ConfigValidation, DefaultBehavior, PersonaRenderer,
    RenderError,
};
pub use view::{Severity, View};
