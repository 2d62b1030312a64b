use crate::dispatch::RenderProps;
use crate::domain::{ResponseEnvelope, UserResponse};
use crate::registry::{ActivityTypeDefinition, PersonaRenderers};
use crate::traits::{
    ActivityBehavior, BehaviorError, ConfigValidation, PersonaRenderer, RenderError,
};
use crate::view::View;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Q&A - participants submit questions to the presenter
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QnaConfig {
    /// Prompt shown above the input field
    pub prompt: String,

    /// Optional cap on question length, in characters
    #[serde(default)]
    pub max_length: Option<usize>,
}

impl QnaConfig {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_length: None,
        }
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn to_config(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    pub fn from_config(config: &serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(config.clone())
    }
}

/// A submitted question, carried in the envelope's data
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QnaSubmission {
    pub question: String,
}

impl QnaSubmission {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
        }
    }

    pub fn to_payload(&self) -> serde_json::Value {
        ResponseEnvelope::new(
            "qna",
            serde_json::to_value(self).unwrap_or(serde_json::Value::Null),
        )
        .to_value()
    }
}

pub struct QnaBehavior;

impl ActivityBehavior for QnaBehavior {
    fn validate_config(&self, config: &serde_json::Value) -> ConfigValidation {
        let parsed = match QnaConfig::from_config(config) {
            Ok(parsed) => parsed,
            Err(e) => return ConfigValidation::fail(vec![format!("not a Q&A configuration: {e}")]),
        };

        let mut errors = Vec::new();

        if parsed.prompt.trim().is_empty() {
            errors.push("prompt must not be empty".to_string());
        }

        if parsed.max_length == Some(0) {
            errors.push("max_length must be positive".to_string());
        }

        if errors.is_empty() {
            ConfigValidation::ok()
        } else {
            ConfigValidation::fail(errors)
        }
    }

    fn default_config(&self) -> serde_json::Value {
        QnaConfig::new("Ask a question").to_config()
    }

    fn config_schema(&self) -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(QnaConfig)).unwrap_or(serde_json::Value::Null)
    }

    fn validate_response(
        &self,
        config: &serde_json::Value,
        payload: &serde_json::Value,
    ) -> Result<(), BehaviorError> {
        let qna = QnaConfig::from_config(config)
            .map_err(|e| BehaviorError::InvalidConfig(e.to_string()))?;

        let envelope = ResponseEnvelope::from_value(payload);
        let submission: QnaSubmission = serde_json::from_value(envelope.data)
            .map_err(|e| BehaviorError::InvalidResponse(format!("bad submission: {e}")))?;

        if submission.question.trim().is_empty() {
            return Err(BehaviorError::InvalidResponse(
                "question must not be empty".to_string(),
            ));
        }

        if let Some(max) = qna.max_length {
            if submission.question.chars().count() > max {
                return Err(BehaviorError::InvalidResponse(format!(
                    "question exceeds {max} characters"
                )));
            }
        }

        Ok(())
    }

    fn aggregate(&self, config: &serde_json::Value, responses: &[UserResponse]) -> serde_json::Value {
        let _ = config;

        let questions: Vec<serde_json::Value> = responses
            .iter()
            .filter_map(|response| {
                let envelope = ResponseEnvelope::from_value(&response.payload);
                let submission: QnaSubmission = serde_json::from_value(envelope.data).ok()?;
                Some(serde_json::json!({
                    "question": submission.question,
                    "participant_id": response.participant_id,
                    "submitted_at": response.created_at.as_millis(),
                }))
            })
            .collect();

        serde_json::json!({
            "questions": questions,
            "total_responses": responses.len(),
        })
    }
}

/// Shared read-only rendering for admin and viewer
///
/// Q&A has no persona-specific admin renderer; the fallback handles both the
/// admin and viewer sides.
pub struct QnaBoardRenderer;

impl PersonaRenderer for QnaBoardRenderer {
    fn render(&self, props: &RenderProps) -> Result<View, RenderError> {
        let (activity, results) = match props {
            RenderProps::Admin(p) => (&p.activity, None),
            RenderProps::Viewer(p) => (&p.activity, p.results.as_ref()),
            RenderProps::Participant(_) => {
                return Err(RenderError::new("Q&A board renderer received participant props"))
            }
        };

        let qna = QnaConfig::from_config(&activity.config)
            .map_err(|e| RenderError::new(format!("unreadable Q&A configuration: {e}")))?;

        let mut view = View::panel(activity.title.clone()).with_line(qna.prompt);

        match results {
            Some(results) if !results.is_null() => {
                let items = results["questions"]
                    .as_array()
                    .map(|questions| {
                        questions
                            .iter()
                            .filter_map(|q| q["question"].as_str().map(str::to_string))
                            .collect()
                    })
                    .unwrap_or_default();
                view = view.with_items(items);
            }
            _ => {
                view = view.with_line("No questions yet.".to_string());
            }
        }

        Ok(view)
    }
}

pub struct QnaParticipantRenderer;

impl PersonaRenderer for QnaParticipantRenderer {
    fn render(&self, props: &RenderProps) -> Result<View, RenderError> {
        let RenderProps::Participant(p) = props else {
            return Err(RenderError::new(
                "Q&A participant renderer received wrong props",
            ));
        };

        let qna = QnaConfig::from_config(&p.activity.config)
            .map_err(|e| RenderError::new(format!("unreadable Q&A configuration: {e}")))?;

        let mut view = View::panel(p.activity.title.clone()).with_line(qna.prompt);

        if let Some(max) = qna.max_length {
            view = view.with_line(format!("Up to {max} characters."));
        }

        if !p.can_submit {
            view = view.with_line("Questions are closed.".to_string());
        }

        if p.has_submitted {
            view = view.with_line("A question has already been submitted.".to_string());
        }

        Ok(view)
    }
}

/// Registry entry for the built-in Q&A type
pub fn qna_definition() -> ActivityTypeDefinition {
    ActivityTypeDefinition::new(
        "qna",
        "Q&A",
        "Participants submit questions to the presenter",
        Arc::new(QnaBehavior),
    )
    .with_version("1.0.0")
    .with_renderers(PersonaRenderers::new().with_participant(Arc::new(QnaParticipantRenderer)))
    .with_fallback(Arc::new(QnaBoardRenderer))
}
