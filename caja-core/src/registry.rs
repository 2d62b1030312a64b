use crate::domain::Persona;
use crate::traits::{ActivityBehavior, PersonaRenderer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Per-persona renderer references for one activity type
#[derive(Clone, Default)]
pub struct PersonaRenderers {
    pub admin: Option<Arc<dyn PersonaRenderer>>,
    pub viewer: Option<Arc<dyn PersonaRenderer>>,
    pub participant: Option<Arc<dyn PersonaRenderer>>,
}

impl PersonaRenderers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_admin(mut self, renderer: Arc<dyn PersonaRenderer>) -> Self {
        self.admin = Some(renderer);
        self
    }

    pub fn with_viewer(mut self, renderer: Arc<dyn PersonaRenderer>) -> Self {
        self.viewer = Some(renderer);
        self
    }

    pub fn with_participant(mut self, renderer: Arc<dyn PersonaRenderer>) -> Self {
        self.participant = Some(renderer);
        self
    }

    pub fn get(&self, persona: Persona) -> Option<&Arc<dyn PersonaRenderer>> {
        match persona {
            Persona::Admin => self.admin.as_ref(),
            Persona::Viewer => self.viewer.as_ref(),
            Persona::Participant => self.participant.as_ref(),
        }
    }
}

/// One pluggable activity kind
///
/// Created once at startup via `ActivityRegistry::register` and never
/// mutated afterwards.
#[derive(Clone)]
pub struct ActivityTypeDefinition {
    pub type_id: String,
    pub name: String,
    pub description: String,
    pub version: String,

    /// Configuration schema descriptor; defaults to the behavior's own
    pub schema: serde_json::Value,

    pub behavior: Arc<dyn ActivityBehavior>,

    pub renderers: PersonaRenderers,

    /// Used for any persona without a specific renderer
    pub fallback: Option<Arc<dyn PersonaRenderer>>,
}

impl ActivityTypeDefinition {
    pub fn new(
        type_id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        behavior: Arc<dyn ActivityBehavior>,
    ) -> Self {
        let schema = behavior.config_schema();
        Self {
            type_id: type_id.into(),
            name: name.into(),
            description: description.into(),
            version: "0.1.0".to_string(),
            schema,
            behavior,
            renderers: PersonaRenderers::new(),
            fallback: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_schema(mut self, schema: serde_json::Value) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_renderers(mut self, renderers: PersonaRenderers) -> Self {
        self.renderers = renderers;
        self
    }

    pub fn with_fallback(mut self, renderer: Arc<dyn PersonaRenderer>) -> Self {
        self.fallback = Some(renderer);
        self
    }
}

impl fmt::Debug for ActivityTypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivityTypeDefinition")
            .field("type_id", &self.type_id)
            .field("name", &self.name)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RegistryError {
    #[error("Activity type already registered: {0}")]
    DuplicateType(String),
}

/// Advisory problem reported by `validate_all`
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryProblem {
    pub type_id: String,
    pub kind: ProblemKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProblemKind {
    /// No renderer resolves for this persona, not even via fallback
    MissingRenderer(Persona),
    MissingName,
    MissingDescription,
}

impl fmt::Display for RegistryProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ProblemKind::MissingRenderer(persona) => {
                write!(f, "{}: no renderer for persona '{}'", self.type_id, persona)
            }
            ProblemKind::MissingName => write!(f, "{}: missing display name", self.type_id),
            ProblemKind::MissingDescription => {
                write!(f, "{}: missing description", self.type_id)
            }
        }
    }
}

/// Catalog of activity types
///
/// Constructed explicitly by the host and shared by reference; there is no
/// process-global instance. Registration happens once, in a single-threaded
/// startup phase, before any lookups.
#[derive(Default)]
pub struct ActivityRegistry {
    definitions: BTreeMap<String, ActivityTypeDefinition>,
}

impl ActivityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an activity type
    ///
    /// A duplicate id is rejected and the original definition retained.
    pub fn register(&mut self, definition: ActivityTypeDefinition) -> Result<(), RegistryError> {
        if self.definitions.contains_key(&definition.type_id) {
            return Err(RegistryError::DuplicateType(definition.type_id));
        }

        tracing::debug!(type_id = %definition.type_id, "Registered activity type");
        self.definitions
            .insert(definition.type_id.clone(), definition);
        Ok(())
    }

    /// Look up a type; callers must handle the miss
    pub fn get(&self, type_id: &str) -> Option<&ActivityTypeDefinition> {
        self.definitions.get(type_id)
    }

    /// Resolve the renderer for a persona: persona-specific first, then the
    /// type's fallback, then `None`. Never fails on an unknown type either.
    pub fn persona_renderer(
        &self,
        type_id: &str,
        persona: Persona,
    ) -> Option<Arc<dyn PersonaRenderer>> {
        let definition = self.definitions.get(type_id)?;

        definition
            .renderers
            .get(persona)
            .or(definition.fallback.as_ref())
            .cloned()
    }

    /// Remove a type; intended for test isolation, not production use
    pub fn unregister(&mut self, type_id: &str) -> bool {
        self.definitions.remove(type_id).is_some()
    }

    /// Registered type ids, sorted
    pub fn type_ids(&self) -> Vec<String> {
        self.definitions.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Scan every definition for missing renderers or metadata
    ///
    /// Advisory only: problems never block registration or dispatch.
    pub fn validate_all(&self) -> Vec<RegistryProblem> {
        let mut problems = Vec::new();

        for (type_id, definition) in &self.definitions {
            if definition.name.is_empty() {
                problems.push(RegistryProblem {
                    type_id: type_id.clone(),
                    kind: ProblemKind::MissingName,
                });
            }

            if definition.description.is_empty() {
                problems.push(RegistryProblem {
                    type_id: type_id.clone(),
                    kind: ProblemKind::MissingDescription,
                });
            }

            for persona in Persona::ALL {
                if definition.renderers.get(persona).is_none() && definition.fallback.is_none() {
                    problems.push(RegistryProblem {
                        type_id: type_id.clone(),
                        kind: ProblemKind::MissingRenderer(persona),
                    });
                }
            }
        }

        problems
    }
}

impl fmt::Debug for ActivityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivityRegistry")
            .field("types", &self.type_ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::RenderProps;
    use crate::traits::{DefaultBehavior, RenderError};
    use crate::view::View;

    struct StubRenderer(&'static str);

    impl PersonaRenderer for StubRenderer {
        fn render(&self, _props: &RenderProps) -> Result<View, RenderError> {
            Ok(View::panel(self.0))
        }
    }

    fn definition(type_id: &str) -> ActivityTypeDefinition {
        ActivityTypeDefinition::new(type_id, "Test Type", "A test type", Arc::new(DefaultBehavior))
    }

    fn render_heading(renderer: &Arc<dyn PersonaRenderer>) -> String {
        let activity = crate::domain::Activity::new(uuid::Uuid::new_v4(), "x", "X");
        let props = RenderProps::participant_for_test(activity);
        renderer.render(&props).unwrap().heading
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = ActivityRegistry::new();
        registry.register(definition("poll")).unwrap();

        assert!(registry.get("poll").is_some());
        assert!(registry.get("nonexistent").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_registration_rejected_original_retained() {
        let mut registry = ActivityRegistry::new();

        let first = definition("poll")
            .with_fallback(Arc::new(StubRenderer("first")))
            .with_version("1.0.0");
        registry.register(first).unwrap();

        let second = definition("poll")
            .with_fallback(Arc::new(StubRenderer("second")))
            .with_version("2.0.0");
        let result = registry.register(second);

        assert_eq!(result, Err(RegistryError::DuplicateType("poll".to_string())));

        // Original definition unchanged
        let kept = registry.get("poll").unwrap();
        assert_eq!(kept.version, "1.0.0");
        let renderer = registry
            .persona_renderer("poll", Persona::Viewer)
            .unwrap();
        assert_eq!(render_heading(&renderer), "first");
    }

    #[test]
    fn test_persona_renderer_prefers_specific_over_fallback() {
        let mut registry = ActivityRegistry::new();

        let def = definition("poll")
            .with_renderers(
                PersonaRenderers::new().with_admin(Arc::new(StubRenderer("admin-specific"))),
            )
            .with_fallback(Arc::new(StubRenderer("fallback")));
        registry.register(def).unwrap();

        let admin = registry.persona_renderer("poll", Persona::Admin).unwrap();
        assert_eq!(render_heading(&admin), "admin-specific");

        let viewer = registry.persona_renderer("poll", Persona::Viewer).unwrap();
        assert_eq!(render_heading(&viewer), "fallback");
    }

    #[test]
    fn test_persona_renderer_none_without_fallback() {
        let mut registry = ActivityRegistry::new();

        let def = definition("poll").with_renderers(
            PersonaRenderers::new().with_admin(Arc::new(StubRenderer("admin-only"))),
        );
        registry.register(def).unwrap();

        assert!(registry.persona_renderer("poll", Persona::Viewer).is_none());
        assert!(registry
            .persona_renderer("unknown-type", Persona::Admin)
            .is_none());
    }

    #[test]
    fn test_unregister() {
        let mut registry = ActivityRegistry::new();
        registry.register(definition("poll")).unwrap();

        assert!(registry.unregister("poll"));
        assert!(!registry.unregister("poll"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_type_ids_sorted() {
        let mut registry = ActivityRegistry::new();
        registry.register(definition("word-cloud")).unwrap();
        registry.register(definition("poll")).unwrap();
        registry.register(definition("qna")).unwrap();

        assert_eq!(registry.type_ids(), vec!["poll", "qna", "word-cloud"]);
    }

    #[test]
    fn test_validate_all_flags_missing_viewer_renderer() {
        let mut registry = ActivityRegistry::new();

        // Admin and participant renderers, no viewer, no fallback
        let def = definition("poll").with_renderers(
            PersonaRenderers::new()
                .with_admin(Arc::new(StubRenderer("a")))
                .with_participant(Arc::new(StubRenderer("p"))),
        );
        registry.register(def).unwrap();

        let problems = registry.validate_all();
        assert_eq!(
            problems,
            vec![RegistryProblem {
                type_id: "poll".to_string(),
                kind: ProblemKind::MissingRenderer(Persona::Viewer),
            }]
        );

        // Type remains registered and usable for the other personas
        assert!(registry.persona_renderer("poll", Persona::Admin).is_some());
        assert!(registry
            .persona_renderer("poll", Persona::Participant)
            .is_some());
    }

    #[test]
    fn test_validate_all_flags_missing_metadata() {
        let mut registry = ActivityRegistry::new();

        let def =
            ActivityTypeDefinition::new("mystery", "", "", Arc::new(DefaultBehavior))
                .with_fallback(Arc::new(StubRenderer("f")));
        registry.register(def).unwrap();

        let problems = registry.validate_all();
        let kinds: Vec<_> = problems.iter().map(|p| p.kind.clone()).collect();
        assert!(kinds.contains(&ProblemKind::MissingName));
        assert!(kinds.contains(&ProblemKind::MissingDescription));
    }

    #[test]
    fn test_validate_all_clean_registry() {
        let mut registry = ActivityRegistry::new();
        let def = definition("poll").with_fallback(Arc::new(StubRenderer("f")));
        registry.register(def).unwrap();

        assert!(registry.validate_all().is_empty());
    }

    #[test]
    fn test_problem_display() {
        let problem = RegistryProblem {
            type_id: "poll".to_string(),
            kind: ProblemKind::MissingRenderer(Persona::Viewer),
        };
        assert_eq!(problem.to_string(), "poll: no renderer for persona 'viewer'");
    }
}
