use crate::dispatch::RenderProps;
use crate::domain::{ResponseEnvelope, UserResponse};
use crate::registry::{ActivityTypeDefinition, PersonaRenderers};
use crate::traits::{
    ActivityBehavior, BehaviorError, ConfigValidation, PersonaRenderer, RenderError,
};
use crate::view::View;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Word cloud - participants submit words, frequencies aggregate
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WordCloudConfig {
    /// Prompt the words answer
    pub prompt: String,

    /// Words accepted per submission
    #[serde(default = "default_max_words")]
    pub max_words: usize,
}

fn default_max_words() -> usize {
    3
}

impl WordCloudConfig {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_words: default_max_words(),
        }
    }

    pub fn with_max_words(mut self, max_words: usize) -> Self {
        self.max_words = max_words;
        self
    }

    pub fn to_config(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    pub fn from_config(config: &serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(config.clone())
    }
}

/// Words a participant submitted, carried in the envelope's data
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WordCloudSubmission {
    pub words: Vec<String>,
}

impl WordCloudSubmission {
    pub fn new(words: Vec<String>) -> Self {
        Self { words }
    }

    pub fn to_payload(&self) -> serde_json::Value {
        ResponseEnvelope::new(
            "word-cloud",
            serde_json::to_value(self).unwrap_or(serde_json::Value::Null),
        )
        .to_value()
    }
}

pub struct WordCloudBehavior;

impl ActivityBehavior for WordCloudBehavior {
    fn validate_config(&self, config: &serde_json::Value) -> ConfigValidation {
        let parsed = match WordCloudConfig::from_config(config) {
            Ok(parsed) => parsed,
            Err(e) => {
                return ConfigValidation::fail(vec![format!("not a word cloud configuration: {e}")])
            }
        };

        let mut errors = Vec::new();

        if parsed.prompt.trim().is_empty() {
            errors.push("prompt must not be empty".to_string());
        }

        if parsed.max_words == 0 {
            errors.push("max_words must be positive".to_string());
        }

        if errors.is_empty() {
            ConfigValidation::ok()
        } else {
            ConfigValidation::fail(errors)
        }
    }

    fn default_config(&self) -> serde_json::Value {
        WordCloudConfig::new("").to_config()
    }

    fn config_schema(&self) -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(WordCloudConfig))
            .unwrap_or(serde_json::Value::Null)
    }

    fn validate_response(
        &self,
        config: &serde_json::Value,
        payload: &serde_json::Value,
    ) -> Result<(), BehaviorError> {
        let cloud = WordCloudConfig::from_config(config)
            .map_err(|e| BehaviorError::InvalidConfig(e.to_string()))?;

        let envelope = ResponseEnvelope::from_value(payload);
        let submission: WordCloudSubmission = serde_json::from_value(envelope.data)
            .map_err(|e| BehaviorError::InvalidResponse(format!("bad submission: {e}")))?;

        if submission.words.is_empty() {
            return Err(BehaviorError::InvalidResponse(
                "at least one word required".to_string(),
            ));
        }

        if submission.words.len() > cloud.max_words {
            return Err(BehaviorError::InvalidResponse(format!(
                "at most {} words allowed",
                cloud.max_words
            )));
        }

        if submission.words.iter().any(|w| w.trim().is_empty()) {
            return Err(BehaviorError::InvalidResponse(
                "words must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    fn aggregate(&self, config: &serde_json::Value, responses: &[UserResponse]) -> serde_json::Value {
        let _ = config;

        // Case-folded frequency count
        let mut frequencies: BTreeMap<String, u64> = BTreeMap::new();
        for response in responses {
            let envelope = ResponseEnvelope::from_value(&response.payload);
            let Ok(submission) = serde_json::from_value::<WordCloudSubmission>(envelope.data)
            else {
                continue;
            };

            for word in submission.words {
                let normalized = word.trim().to_lowercase();
                if normalized.is_empty() {
                    continue;
                }
                *frequencies.entry(normalized).or_insert(0) += 1;
            }
        }

        serde_json::json!({
            "word_frequencies": frequencies,
            "total_responses": responses.len(),
        })
    }
}

pub struct WordCloudParticipantRenderer;

impl PersonaRenderer for WordCloudParticipantRenderer {
    fn render(&self, props: &RenderProps) -> Result<View, RenderError> {
        let RenderProps::Participant(p) = props else {
            return Err(RenderError::new(
                "word cloud participant renderer received wrong props",
            ));
        };

        let cloud = WordCloudConfig::from_config(&p.activity.config)
            .map_err(|e| RenderError::new(format!("unreadable word cloud configuration: {e}")))?;

        let mut view = View::panel(p.activity.title.clone())
            .with_line(cloud.prompt)
            .with_line(format!("Submit up to {} words.", cloud.max_words));

        if !p.can_submit {
            view = view.with_line("Submissions are closed.".to_string());
        }

        Ok(view)
    }
}

/// Cloud display shared by admin and viewer via fallback
pub struct WordCloudDisplayRenderer;

impl PersonaRenderer for WordCloudDisplayRenderer {
    fn render(&self, props: &RenderProps) -> Result<View, RenderError> {
        let (activity, results) = match props {
            RenderProps::Admin(p) => (&p.activity, None),
            RenderProps::Viewer(p) => (&p.activity, p.results.as_ref()),
            RenderProps::Participant(_) => {
                return Err(RenderError::new(
                    "word cloud display renderer received participant props",
                ))
            }
        };

        let cloud = WordCloudConfig::from_config(&activity.config)
            .map_err(|e| RenderError::new(format!("unreadable word cloud configuration: {e}")))?;

        let mut view = View::panel(activity.title.clone()).with_line(cloud.prompt);

        match results {
            Some(results) if !results.is_null() => {
                let items = results["word_frequencies"]
                    .as_object()
                    .map(|frequencies| {
                        frequencies
                            .iter()
                            .map(|(word, count)| format!("{word} ({count})"))
                            .collect()
                    })
                    .unwrap_or_default();
                view = view.with_items(items);
            }
            _ => {
                view = view.with_line("No words yet.".to_string());
            }
        }

        Ok(view)
    }
}

/// Registry entry for the built-in word cloud type
pub fn word_cloud_definition() -> ActivityTypeDefinition {
    ActivityTypeDefinition::new(
        "word-cloud",
        "Word Cloud",
        "Participants submit words; frequencies build a cloud",
        Arc::new(WordCloudBehavior),
    )
    .with_version("1.0.0")
    .with_renderers(
        PersonaRenderers::new().with_participant(Arc::new(WordCloudParticipantRenderer)),
    )
    .with_fallback(Arc::new(WordCloudDisplayRenderer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_validate_config() {
        let behavior = WordCloudBehavior;

        assert!(behavior
            .validate_config(&WordCloudConfig::new("One word for today").to_config())
            .valid);

        let validation = behavior.validate_config(&WordCloudConfig::new("").to_config());
        assert!(!validation.valid);

        let zero = WordCloudConfig::new("P").with_max_words(0);
        assert!(!behavior.validate_config(&zero.to_config()).valid);
    }

    #[test]
    fn test_validate_response_word_limit() {
        let behavior = WordCloudBehavior;
        let config = WordCloudConfig::new("P").with_max_words(2).to_config();

        let ok = WordCloudSubmission::new(vec!["fast".to_string(), "safe".to_string()]);
        assert!(behavior.validate_response(&config, &ok.to_payload()).is_ok());

        let too_many = WordCloudSubmission::new(vec![
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
        ]);
        assert!(behavior
            .validate_response(&config, &too_many.to_payload())
            .is_err());

        let empty = WordCloudSubmission::new(vec![]);
        assert!(behavior
            .validate_response(&config, &empty.to_payload())
            .is_err());
    }

    #[test]
    fn test_aggregate_case_folds() {
        let behavior = WordCloudBehavior;
        let config = WordCloudConfig::new("P").to_config();
        let activity_id = Uuid::new_v4();

        let responses = vec![
            UserResponse::new(Uuid::new_v4(), activity_id, Uuid::new_v4()).with_payload(
                WordCloudSubmission::new(vec!["Rust".to_string(), "fast".to_string()]).to_payload(),
            ),
            UserResponse::new(Uuid::new_v4(), activity_id, Uuid::new_v4()).with_payload(
                WordCloudSubmission::new(vec!["rust".to_string()]).to_payload(),
            ),
        ];

        let results = behavior.aggregate(&config, &responses);

        assert_eq!(results["word_frequencies"]["rust"], 2);
        assert_eq!(results["word_frequencies"]["fast"], 1);
        assert_eq!(results["total_responses"], 2);
    }

    #[test]
    fn test_definition_relies_on_fallback() {
        let definition = word_cloud_definition();

        assert_eq!(definition.type_id, "word-cloud");
        assert!(definition.renderers.participant.is_some());
        assert!(definition.fallback.is_some());
    }
}
