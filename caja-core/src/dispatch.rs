use crate::domain::{Activity, ActivityStatus, ActivityStatusSnapshot, Persona, Timestamp};
use crate::registry::ActivityRegistry;
use crate::traits::ConfigValidation;
use crate::view::View;

/// Props handed to an admin renderer
#[derive(Debug, Clone, PartialEq)]
pub struct AdminProps {
    pub activity: Activity,

    /// Current configuration (copy of the activity's)
    pub config: serde_json::Value,

    /// Validation summary, present when a status snapshot was supplied
    pub validation: Option<ConfigValidation>,

    pub busy: bool,
}

/// Props handed to a viewer renderer
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerProps {
    pub activity: Activity,

    /// Always empty; results are carried by the snapshot, not fetched here
    pub responses: Vec<crate::domain::UserResponse>,

    /// Aggregated results payload from the latest snapshot
    pub results: Option<serde_json::Value>,

    pub last_updated: Option<Timestamp>,

    /// Results update live via polling; always true
    pub live_results: bool,

    /// A manual-refresh affordance is available
    pub can_refresh: bool,

    pub busy: bool,
}

/// Props handed to a participant renderer
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantProps {
    pub activity: Activity,

    /// Submission allowed iff the snapshot status is Active
    pub can_submit: bool,

    /// Coarse approximation: any response counts as "submitted" because the
    /// snapshot carries no per-participant attribution
    pub has_submitted: bool,

    /// Last known own response; not carried by snapshots, hosts may fill it
    pub last_response: Option<serde_json::Value>,

    pub busy: bool,
}

/// Persona-specific input assembled by the dispatcher
#[derive(Debug, Clone, PartialEq)]
pub enum RenderProps {
    Admin(AdminProps),
    Viewer(ViewerProps),
    Participant(ParticipantProps),
}

impl RenderProps {
    pub fn persona(&self) -> Persona {
        match self {
            RenderProps::Admin(_) => Persona::Admin,
            RenderProps::Viewer(_) => Persona::Viewer,
            RenderProps::Participant(_) => Persona::Participant,
        }
    }

    #[cfg(test)]
    pub(crate) fn participant_for_test(activity: Activity) -> Self {
        RenderProps::Participant(ParticipantProps {
            activity,
            can_submit: false,
            has_submitted: false,
            last_response: None,
            busy: false,
        })
    }
}

/// One dispatch: an activity, the latest snapshot (if any) and a persona
#[derive(Debug, Clone)]
pub struct DispatchRequest<'a> {
    pub activity: &'a Activity,
    pub snapshot: Option<&'a ActivityStatusSnapshot>,
    pub persona: Persona,
    pub busy: bool,
}

impl<'a> DispatchRequest<'a> {
    pub fn new(activity: &'a Activity, persona: Persona) -> Self {
        Self {
            activity,
            snapshot: None,
            persona,
            busy: false,
        }
    }

    pub fn with_snapshot(mut self, snapshot: &'a ActivityStatusSnapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    pub fn with_busy(mut self, busy: bool) -> Self {
        self.busy = busy;
        self
    }
}

/// The three enumerable dispatch failures
///
/// All are local rendering fallbacks; retry is simply dispatching again.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DispatchError {
    #[error("unknown activity type: {attempted}")]
    UnknownType {
        attempted: String,
        /// Registry id set at dispatch time, diagnostic aid only
        known: Vec<String>,
    },

    #[error("no renderer for type '{type_id}', persona '{persona}'")]
    MissingRenderer { type_id: String, persona: Persona },

    #[error("rendering failed for type '{type_id}', persona '{persona}': {reason}")]
    RenderFailed {
        type_id: String,
        persona: Persona,
        reason: String,
    },
}

/// Dispatch, surfacing failures as typed errors
pub fn try_dispatch(
    registry: &ActivityRegistry,
    request: &DispatchRequest<'_>,
) -> Result<View, DispatchError> {
    let type_id = request.activity.type_id.as_str();

    let definition = registry.get(type_id).ok_or_else(|| {
        tracing::warn!(type_id, "Dispatch for unregistered activity type");
        DispatchError::UnknownType {
            attempted: type_id.to_string(),
            known: registry.type_ids(),
        }
    })?;

    let renderer = registry
        .persona_renderer(type_id, request.persona)
        .ok_or_else(|| DispatchError::MissingRenderer {
            type_id: type_id.to_string(),
            persona: request.persona,
        })?;

    let props = assemble_props(definition.behavior.as_ref(), request);

    renderer
        .render(&props)
        .map_err(|e| DispatchError::RenderFailed {
            type_id: type_id.to_string(),
            persona: request.persona,
            reason: e.message,
        })
}

/// Total dispatch: every failure becomes a distinct error panel
pub fn dispatch(registry: &ActivityRegistry, request: &DispatchRequest<'_>) -> View {
    match try_dispatch(registry, request) {
        Ok(view) => view,
        Err(error) => error_view(&error),
    }
}

fn assemble_props(
    behavior: &dyn crate::traits::ActivityBehavior,
    request: &DispatchRequest<'_>,
) -> RenderProps {
    let activity = request.activity.clone();

    match request.persona {
        Persona::Admin => {
            // Validation summary only when live status was supplied
            let validation = request
                .snapshot
                .map(|_| behavior.validate_config(&activity.config));

            RenderProps::Admin(AdminProps {
                config: activity.config.clone(),
                activity,
                validation,
                busy: request.busy,
            })
        }
        Persona::Viewer => RenderProps::Viewer(ViewerProps {
            responses: Vec::new(),
            results: request.snapshot.map(|s| s.results.clone()),
            last_updated: request.snapshot.map(|s| s.last_updated),
            live_results: true,
            can_refresh: true,
            busy: request.busy,
            activity,
        }),
        Persona::Participant => {
            let can_submit = request
                .snapshot
                .map(|s| s.status == ActivityStatus::Active)
                .unwrap_or(false);
            let has_submitted = request
                .snapshot
                .map(|s| s.response_count > 0)
                .unwrap_or(false);

            RenderProps::Participant(ParticipantProps {
                activity,
                can_submit,
                has_submitted,
                last_response: None,
                busy: request.busy,
            })
        }
    }
}

fn error_view(error: &DispatchError) -> View {
    match error {
        DispatchError::UnknownType { attempted, known } => View::error("Unknown Activity Type")
            .with_line(format!("Requested type: {attempted}"))
            .with_line("This type is not registered. Known types:")
            .with_items(known.clone()),

        DispatchError::MissingRenderer { type_id, persona } => View::error("Renderer Not Found")
            .with_line(format!(
                "Type '{type_id}' has no renderer for persona '{persona}' and no fallback."
            )),

        DispatchError::RenderFailed {
            type_id,
            persona,
            reason,
        } => View::error("Rendering Error")
            .with_line(format!("Type '{type_id}' failed to render for '{persona}'."))
            .with_line(format!("Reason: {reason}"))
            .with_line("Retry re-attempts the same dispatch."),
    }
}
