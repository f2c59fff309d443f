use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::binding::{EventHandler, InteractionEvent};
use crate::rule::Rules;

/// Caller-supplied configuration for one field.
///
/// # Example
///
/// ```
/// use formx::field::FieldConfig;
/// use formx::rule::{Rule, RuleType};
///
/// let config = FieldConfig::named("email")
///     .rules(Rule::new().kind(RuleType::Email))
///     .required()
///     .initial_value("");
/// assert_eq!(config.name.as_deref(), Some("email"));
/// ```
#[derive(Clone, Default)]
pub struct FieldConfig {
    /// Key for form-level rule lookup and registry membership. A field
    /// without a name is never validated and never registered.
    pub name: Option<String>,
    /// Explicit rules. When set, form-level rules for the name are ignored.
    pub rules: Option<Rules>,
    /// Shortcut that adds a default required rule if none is present.
    pub required: bool,
    /// Value used at creation and on reset. Defaults to an empty string.
    pub initial_value: Option<Value>,
    /// Consumer handler that also observes every change event.
    pub on_change: Option<EventHandler>,
}

impl FieldConfig {
    /// A nameless field.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn rules(mut self, rules: impl Into<Rules>) -> Self {
        self.rules = Some(rules.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn initial_value(mut self, value: impl Into<Value>) -> Self {
        self.initial_value = Some(value.into());
        self
    }

    pub fn on_change<F>(mut self, f: F) -> Self
    where
        F: Fn(&InteractionEvent) + Send + Sync + 'static,
    {
        self.on_change = Some(Arc::new(f));
        self
    }

    /// Snapshot the field starts from and returns to on reset.
    pub fn initial(&self) -> Value {
        self.initial_value
            .clone()
            .unwrap_or_else(|| Value::String(String::new()))
    }
}

impl fmt::Debug for FieldConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldConfig")
            .field("name", &self.name)
            .field("rules", &self.rules)
            .field("required", &self.required)
            .field("initial_value", &self.initial_value)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}
