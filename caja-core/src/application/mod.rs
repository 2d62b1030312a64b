mod commands;
mod events;
mod service;

pub use commands::SessionCommand;
pub use events::SessionEvent;
pub use service::{ServiceError, SessionService};
