use serde::{Deserialize, Serialize};

/// How a view should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Error,
}

/// Structured render product
///
/// Renderers produce views instead of pixels; the host decides how to paint
/// them. Error states from dispatch arrive as ordinary views with
/// `Severity::Error`, so a failing activity never takes down the host page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub heading: String,

    /// Free-form lines of body text
    #[serde(default)]
    pub body: Vec<String>,

    /// List content (choices, tallies, diagnostics)
    #[serde(default)]
    pub items: Vec<String>,

    pub severity: Severity,
}

impl View {
    pub fn panel(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            body: Vec::new(),
            items: Vec::new(),
            severity: Severity::Info,
        }
    }

    pub fn error(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            body: Vec::new(),
            items: Vec::new(),
            severity: Severity::Error,
        }
    }

    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        self.body.push(line.into());
        self
    }

    pub fn with_items(mut self, items: Vec<String>) -> Self {
        self.items = items;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_builder() {
        let view = View::panel("Lunch poll")
            .with_line("Where should we eat?")
            .with_items(vec!["Tacos".to_string(), "Ramen".to_string()]);

        assert_eq!(view.heading, "Lunch poll");
        assert_eq!(view.body.len(), 1);
        assert_eq!(view.items.len(), 2);
        assert!(!view.is_error());
    }

    #[test]
    fn test_error_panel() {
        let view = View::error("Rendering Error").with_line("boom");

        assert!(view.is_error());
        assert_eq!(view.body, vec!["boom".to_string()]);
    }

    #[test]
    fn test_serde_roundtrip() {
        let view = View::panel("P").with_line("l");
        let json = serde_json::to_string(&view).unwrap();
        let parsed: View = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, view);
    }
}
