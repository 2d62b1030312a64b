mod error;
mod observability;

pub use error::{CliError, Result};
pub use observability::LogConfig;
