use crate::dispatch::RenderProps;
use crate::domain::{Activity, ActivityStatus, ResponseEnvelope, UserResponse};
use crate::registry::{ActivityTypeDefinition, PersonaRenderers};
use crate::traits::{
    ActivityBehavior, BehaviorError, ConfigValidation, PersonaRenderer, RenderError,
};
use crate::view::View;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Poll - participants vote on predefined options
///
/// Results aggregate to vote counts and percentages.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PollConfig {
    /// The question being voted on
    pub question: String,

    /// Available options (at least two)
    pub options: Vec<String>,

    /// Whether a participant may select more than one option
    #[serde(default)]
    pub allow_multiple: bool,
}

impl PollConfig {
    pub fn new(question: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            question: question.into(),
            options,
            allow_multiple: false,
        }
    }

    pub fn with_multiple(mut self) -> Self {
        self.allow_multiple = true;
        self
    }

    pub fn to_config(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    pub fn from_config(config: &serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(config.clone())
    }
}

/// Selected options a participant submitted, carried in the envelope's data
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PollSelection {
    pub selected: Vec<String>,
}

impl PollSelection {
    pub fn one(option: impl Into<String>) -> Self {
        Self {
            selected: vec![option.into()],
        }
    }

    /// Wrap into the conventional response envelope
    pub fn to_payload(&self) -> serde_json::Value {
        ResponseEnvelope::new(
            "poll",
            serde_json::to_value(self).unwrap_or(serde_json::Value::Null),
        )
        .to_value()
    }
}

pub struct PollBehavior;

impl ActivityBehavior for PollBehavior {
    fn validate_config(&self, config: &serde_json::Value) -> ConfigValidation {
        let parsed = match PollConfig::from_config(config) {
            Ok(parsed) => parsed,
            Err(e) => return ConfigValidation::fail(vec![format!("not a poll configuration: {e}")]),
        };

        let mut errors = Vec::new();

        if parsed.question.trim().is_empty() {
            errors.push("question must not be empty".to_string());
        }

        if parsed.options.len() < 2 {
            errors.push("poll needs at least two options".to_string());
        }

        let mut seen = std::collections::HashSet::new();
        for option in &parsed.options {
            if !seen.insert(option) {
                errors.push(format!("duplicate option: {option}"));
            }
        }

        if errors.is_empty() {
            ConfigValidation::ok()
        } else {
            ConfigValidation::fail(errors)
        }
    }

    fn default_config(&self) -> serde_json::Value {
        PollConfig::new("", Vec::new()).to_config()
    }

    fn config_schema(&self) -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(PollConfig))
            .unwrap_or(serde_json::Value::Null)
    }

    fn validate_response(
        &self,
        config: &serde_json::Value,
        payload: &serde_json::Value,
    ) -> Result<(), BehaviorError> {
        let poll = PollConfig::from_config(config)
            .map_err(|e| BehaviorError::InvalidConfig(e.to_string()))?;

        let envelope = ResponseEnvelope::from_value(payload);
        let selection: PollSelection = serde_json::from_value(envelope.data)
            .map_err(|e| BehaviorError::InvalidResponse(format!("bad selection: {e}")))?;

        if selection.selected.is_empty() {
            return Err(BehaviorError::InvalidResponse(
                "no option selected".to_string(),
            ));
        }

        if selection.selected.len() > 1 && !poll.allow_multiple {
            return Err(BehaviorError::InvalidResponse(
                "multiple selections are not allowed".to_string(),
            ));
        }

        for option in &selection.selected {
            if !poll.options.contains(option) {
                return Err(BehaviorError::InvalidResponse(format!(
                    "unknown option: {option}"
                )));
            }
        }

        Ok(())
    }

    fn aggregate(&self, config: &serde_json::Value, responses: &[UserResponse]) -> serde_json::Value {
        let Ok(poll) = PollConfig::from_config(config) else {
            return serde_json::Value::Null;
        };

        let mut counts: BTreeMap<String, u64> = poll
            .options
            .iter()
            .map(|option| (option.clone(), 0))
            .collect();

        let mut total_votes = 0u64;
        for response in responses {
            let envelope = ResponseEnvelope::from_value(&response.payload);
            let Ok(selection) = serde_json::from_value::<PollSelection>(envelope.data) else {
                continue;
            };

            for option in selection.selected {
                if let Some(count) = counts.get_mut(&option) {
                    *count += 1;
                    total_votes += 1;
                }
            }
        }

        let percentages: BTreeMap<String, f64> = counts
            .iter()
            .map(|(option, &count)| {
                let pct = if total_votes == 0 {
                    0.0
                } else {
                    (count as f64 * 1000.0 / total_votes as f64).round() / 10.0
                };
                (option.clone(), pct)
            })
            .collect();

        serde_json::json!({
            "vote_counts": counts,
            "percentages": percentages,
            "total_responses": responses.len(),
        })
    }

    fn on_state_change(&self, old: ActivityStatus, new: ActivityStatus, activity: &Activity) {
        tracing::info!(
            activity_id = %activity.id,
            %old,
            %new,
            "Poll state changed"
        );
    }
}

pub struct PollAdminRenderer;

impl PersonaRenderer for PollAdminRenderer {
    fn render(&self, props: &RenderProps) -> Result<View, RenderError> {
        let RenderProps::Admin(p) = props else {
            return Err(RenderError::new("poll admin renderer received wrong props"));
        };

        let poll = PollConfig::from_config(&p.config)
            .map_err(|e| RenderError::new(format!("unreadable poll configuration: {e}")))?;

        let mut view = View::panel(format!("Configure: {}", p.activity.title))
            .with_line(format!("Question: {}", poll.question))
            .with_items(poll.options);

        if let Some(validation) = &p.validation {
            if validation.valid {
                view = view.with_line("Configuration is valid.".to_string());
            } else {
                for error in &validation.errors {
                    view = view.with_line(format!("Problem: {error}"));
                }
            }
        }

        Ok(view)
    }
}

pub struct PollViewerRenderer;

impl PersonaRenderer for PollViewerRenderer {
    fn render(&self, props: &RenderProps) -> Result<View, RenderError> {
        let RenderProps::Viewer(p) = props else {
            return Err(RenderError::new("poll viewer renderer received wrong props"));
        };

        let poll = PollConfig::from_config(&p.activity.config)
            .map_err(|e| RenderError::new(format!("unreadable poll configuration: {e}")))?;

        let mut view = View::panel(p.activity.title.clone()).with_line(poll.question.clone());

        match &p.results {
            Some(results) if !results.is_null() => {
                let items = poll
                    .options
                    .iter()
                    .map(|option| {
                        let count = results["vote_counts"][option].as_u64().unwrap_or(0);
                        let pct = results["percentages"][option].as_f64().unwrap_or(0.0);
                        format!("{option}: {count} ({pct}%)")
                    })
                    .collect();
                view = view.with_items(items);

                if let Some(total) = results["total_responses"].as_u64() {
                    view = view.with_line(format!("{total} responses"));
                }
            }
            _ => {
                view = view.with_line("Waiting for results...".to_string());
            }
        }

        if p.live_results {
            view = view.with_line("Results update live.".to_string());
        }

        Ok(view)
    }
}

pub struct PollParticipantRenderer;

impl PersonaRenderer for PollParticipantRenderer {
    fn render(&self, props: &RenderProps) -> Result<View, RenderError> {
        let RenderProps::Participant(p) = props else {
            return Err(RenderError::new(
                "poll participant renderer received wrong props",
            ));
        };

        let poll = PollConfig::from_config(&p.activity.config)
            .map_err(|e| RenderError::new(format!("unreadable poll configuration: {e}")))?;

        let mut view = View::panel(p.activity.title.clone())
            .with_line(poll.question.clone())
            .with_items(poll.options);

        if p.can_submit {
            if poll.allow_multiple {
                view = view.with_line("Select one or more options.".to_string());
            } else {
                view = view.with_line("Select one option.".to_string());
            }
        } else {
            view = view.with_line("Voting is closed.".to_string());
        }

        if p.has_submitted {
            view = view.with_line("A vote has already been recorded.".to_string());
        }

        Ok(view)
    }
}

/// Registry entry for the built-in poll type
pub fn poll_definition() -> ActivityTypeDefinition {
    ActivityTypeDefinition::new(
        "poll",
        "Poll",
        "Participants vote on predefined options",
        Arc::new(PollBehavior),
    )
    .with_version("1.0.0")
    .with_renderers(
        PersonaRenderers::new()
            .with_admin(Arc::new(PollAdminRenderer))
            .with_viewer(Arc::new(PollViewerRenderer))
            .with_participant(Arc::new(PollParticipantRenderer)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn two_options() -> PollConfig {
        PollConfig::new("Lunch?", vec!["Tacos".to_string(), "Ramen".to_string()])
    }

    fn response_for(activity_id: Uuid, option: &str) -> UserResponse {
        UserResponse::new(Uuid::new_v4(), activity_id, Uuid::new_v4())
            .with_payload(PollSelection::one(option).to_payload())
    }

    #[test]
    fn test_config_roundtrip() {
        let config = two_options().with_multiple();

        let value = config.to_config();
        let parsed = PollConfig::from_config(&value).unwrap();

        assert_eq!(parsed.question, "Lunch?");
        assert_eq!(parsed.options.len(), 2);
        assert!(parsed.allow_multiple);
    }

    #[test]
    fn test_validate_config() {
        let behavior = PollBehavior;

        assert!(behavior.validate_config(&two_options().to_config()).valid);

        let empty = PollConfig::new("", vec!["A".to_string()]);
        let validation = behavior.validate_config(&empty.to_config());
        assert!(!validation.valid);
        assert_eq!(validation.errors.len(), 2);

        let dupes = PollConfig::new("Q", vec!["A".to_string(), "A".to_string()]);
        let validation = behavior.validate_config(&dupes.to_config());
        assert!(!validation.valid);
        assert!(validation.errors[0].contains("duplicate"));
    }

    #[test]
    fn test_validate_response() {
        let behavior = PollBehavior;
        let config = two_options().to_config();

        assert!(behavior
            .validate_response(&config, &PollSelection::one("Tacos").to_payload())
            .is_ok());

        let unknown = PollSelection::one("Pizza").to_payload();
        assert!(behavior.validate_response(&config, &unknown).is_err());

        let multiple = PollSelection {
            selected: vec!["Tacos".to_string(), "Ramen".to_string()],
        };
        assert!(behavior
            .validate_response(&config, &multiple.to_payload())
            .is_err());

        let multi_config = two_options().with_multiple().to_config();
        assert!(behavior
            .validate_response(&multi_config, &multiple.to_payload())
            .is_ok());
    }

    #[test]
    fn test_aggregate_counts_and_percentages() {
        let behavior = PollBehavior;
        let config = two_options().to_config();
        let activity_id = Uuid::new_v4();

        let responses = vec![
            response_for(activity_id, "Tacos"),
            response_for(activity_id, "Tacos"),
            response_for(activity_id, "Tacos"),
            response_for(activity_id, "Ramen"),
        ];

        let results = behavior.aggregate(&config, &responses);

        assert_eq!(results["vote_counts"]["Tacos"], 3);
        assert_eq!(results["vote_counts"]["Ramen"], 1);
        assert_eq!(results["percentages"]["Tacos"], 75.0);
        assert_eq!(results["percentages"]["Ramen"], 25.0);
        assert_eq!(results["total_responses"], 4);
    }

    #[test]
    fn test_aggregate_ignores_unknown_options() {
        let behavior = PollBehavior;
        let config = two_options().to_config();
        let activity_id = Uuid::new_v4();

        let responses = vec![
            response_for(activity_id, "Tacos"),
            response_for(activity_id, "Pizza"),
        ];

        let results = behavior.aggregate(&config, &responses);

        assert_eq!(results["vote_counts"]["Tacos"], 1);
        assert_eq!(results["percentages"]["Tacos"], 100.0);
        assert_eq!(results["total_responses"], 2);
    }

    #[test]
    fn test_aggregate_empty() {
        let behavior = PollBehavior;
        let results = behavior.aggregate(&two_options().to_config(), &[]);

        assert_eq!(results["vote_counts"]["Tacos"], 0);
        assert_eq!(results["percentages"]["Tacos"], 0.0);
        assert_eq!(results["total_responses"], 0);
    }

    #[test]
    fn test_schema_describes_config() {
        let behavior = PollBehavior;
        let schema = behavior.config_schema();

        assert!(schema["properties"]["question"].is_object());
        assert!(schema["properties"]["options"].is_object());
    }

    #[test]
    fn test_definition_has_all_renderers() {
        let definition = poll_definition();

        assert_eq!(definition.type_id, "poll");
        assert!(definition.renderers.admin.is_some());
        assert!(definition.renderers.viewer.is_some());
        assert!(definition.renderers.participant.is_some());
    }
}
