mod poll;
mod qna;
mod word_cloud;

pub use poll::{
    poll_definition, PollAdminRenderer, PollBehavior, PollConfig, PollParticipantRenderer,
    PollSelection, PollViewerRenderer,
};
pub use qna::{qna_definition, QnaBehavior, QnaBoardRenderer, QnaConfig, QnaSubmission};
pub use word_cloud::{
    word_cloud_definition, WordCloudBehavior, WordCloudConfig, WordCloudSubmission,
};

use crate::registry::{ActivityRegistry, RegistryError};

/// Register every built-in activity type
///
/// Called once during single-threaded startup, before any lookups.
pub fn register_builtins(registry: &mut ActivityRegistry) -> Result<(), RegistryError> {
    registry.register(poll_definition())?;
    registry.register(qna_definition())?;
    registry.register(word_cloud_definition())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_builtins() {
        let mut registry = ActivityRegistry::new();
        register_builtins(&mut registry).unwrap();

        assert_eq!(registry.type_ids(), vec!["poll", "qna", "word-cloud"]);
        assert!(registry.validate_all().is_empty());
    }

    #[test]
    fn test_register_builtins_twice_fails() {
        let mut registry = ActivityRegistry::new();
        register_builtins(&mut registry).unwrap();

        assert!(register_builtins(&mut registry).is_err());
        assert_eq!(registry.len(), 3);
    }
}
