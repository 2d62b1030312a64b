mod activity;

pub use activity::{
    ActivityBehavior, BehaviorError, ConfigValidation, DefaultBehavior, PersonaRenderer,
    RenderError,
};
