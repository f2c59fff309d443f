//! Form-level configuration.

use std::collections::HashMap;

use serde::Deserialize;

use super::RuleSource;
use crate::error::ConfigurationError;
use crate::rule::Rules;

/// Where labels sit relative to their control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelPosition {
    Left,
    #[default]
    Right,
    Top,
}

/// Label width as a pixel count or any CSS length.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LabelWidth {
    Pixels(u32),
    Css(String),
}

/// Presentation settings. Validation never reads these.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub label_position: LabelPosition,
    pub label_width: Option<LabelWidth>,
    pub label_suffix: String,
    pub disabled: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            label_position: LabelPosition::Right,
            label_width: None,
            label_suffix: ":".to_string(),
            disabled: false,
        }
    }
}

impl LayoutConfig {
    pub fn label_position(mut self, position: LabelPosition) -> Self {
        self.label_position = position;
        self
    }

    pub fn label_width(mut self, width: LabelWidth) -> Self {
        self.label_width = Some(width);
        self
    }

    pub fn label_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.label_suffix = suffix.into();
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

/// Configuration shared read-only by every field of a form.
///
/// # Example
///
/// ```
/// use formx::form::FormConfig;
///
/// let config = FormConfig::from_json(r#"{
///     "rules": {
///         "name": { "required": true, "message": "Name is required" },
///         "email": [{ "type": "email", "trigger": "blur" }]
///     },
///     "labelPosition": "top"
/// }"#).unwrap();
///
/// assert!(config.rules.contains_key("email"));
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Rules for fields that do not carry their own, keyed by field name.
    pub rules: HashMap<String, Rules>,
    #[serde(flatten)]
    pub layout: LayoutConfig,
}

impl FormConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the form-level rules for a field name.
    pub fn rule(mut self, name: impl Into<String>, rules: impl Into<Rules>) -> Self {
        self.rules.insert(name.into(), rules.into());
        self
    }

    pub fn layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }
}

impl RuleSource for FormConfig {
    fn rules_for(&self, name: &str) -> Option<Rules> {
        self.rules.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{Rule, Trigger};

    #[test]
    fn test_defaults() {
        let config = FormConfig::new();
        assert!(config.rules.is_empty());
        assert_eq!(config.layout.label_position, LabelPosition::Right);
        assert_eq!(config.layout.label_suffix, ":");
        assert!(!config.layout.disabled);
    }

    #[test]
    fn test_from_json_single_and_list_rules() {
        let config = FormConfig::from_json(
            r#"{
                "rules": {
                    "name": { "required": true },
                    "age": [{ "type": "integer" }, { "min": 18, "trigger": "blur" }]
                },
                "labelWidth": 120,
                "labelSuffix": " -"
            }"#,
        )
        .unwrap();

        assert_eq!(config.rules_for("name").unwrap().to_vec().len(), 1);
        let age = config.rules_for("age").unwrap().to_vec();
        assert_eq!(age.len(), 2);
        assert!(age[1].applies_to(Trigger::Blur));
        assert!(!age[1].applies_to(Trigger::Change));
        assert_eq!(config.layout.label_width, Some(LabelWidth::Pixels(120)));
        assert_eq!(config.layout.label_suffix, " -");
    }

    #[test]
    fn test_from_json_css_width() {
        let config = FormConfig::from_json(r#"{ "labelWidth": "8em" }"#).unwrap();
        assert_eq!(config.layout.label_width, Some(LabelWidth::Css("8em".into())));
    }

    #[test]
    fn test_from_json_bad_pattern() {
        let err =
            FormConfig::from_json(r#"{ "rules": { "code": { "pattern": "[" } } }"#).unwrap_err();
        assert!(matches!(err, ConfigurationError::Json(_)));
    }

    #[test]
    fn test_builder() {
        let config = FormConfig::new()
            .rule("name", Rule::new().required())
            .layout(LayoutConfig::default().label_position(LabelPosition::Top).disabled());
        assert!(config.rules_for("name").is_some());
        assert!(config.rules_for("other").is_none());
        assert_eq!(config.layout.label_position, LabelPosition::Top);
        assert!(config.layout.disabled);
    }
}
