mod config;
mod poller;
mod source;
mod store;

pub use config::PollConfig;
pub use poller::StatusPoller;
pub use source::{PollError, StatusSource};
pub use store::{PollState, SnapshotStore};
