//! The enclosing form: shared configuration, field registry and the
//! whole-form operations built on them.

mod config;
mod context;
mod registry;

pub use config::{FormConfig, LabelPosition, LabelWidth, LayoutConfig};
pub use context::{FieldContext, FieldRegistrar, RuleSource};
pub use registry::FieldRegistry;

use std::sync::Arc;

use futures::future::join_all;
use log::debug;

use crate::engine::{Model, ValidationEngine};
use crate::error::ValidationError;
use crate::field::{FieldConfig, FieldController};
use crate::rule::Trigger;

/// Outcome of validating every mounted field.
#[derive(Debug, Clone, Default)]
pub enum FormValidation {
    /// Every field passed. Holds the merged model of all named fields.
    Valid(Model),
    /// At least one field failed.
    Invalid(Vec<ValidationError>),
    /// No field is mounted.
    #[default]
    Empty,
}

impl FormValidation {
    /// Check if the form may be submitted. An empty form may.
    pub fn is_valid(&self) -> bool {
        !self.is_invalid()
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    pub fn errors(&self) -> &[ValidationError] {
        match self {
            Self::Invalid(errors) => errors,
            _ => &[],
        }
    }

    pub fn first_error(&self) -> Option<&ValidationError> {
        self.errors().first()
    }

    /// Name of the first failing field (for focusing).
    pub fn first_invalid_field(&self) -> Option<&str> {
        self.first_error().map(ValidationError::field)
    }
}

/// A form owning its configuration, registry and validation engine.
///
/// Fields are created through [`Form::field`] and join the form when
/// mounted.
#[derive(Clone)]
pub struct Form {
    config: Arc<FormConfig>,
    registry: FieldRegistry,
    engine: Arc<dyn ValidationEngine>,
}

impl Form {
    pub fn new(config: FormConfig, engine: Arc<dyn ValidationEngine>) -> Self {
        Self {
            config: Arc::new(config),
            registry: FieldRegistry::new(),
            engine,
        }
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.config.layout
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    /// Capabilities handed to fields of this form.
    pub fn context(&self) -> FieldContext {
        FieldContext::new(
            self.config.clone(),
            Arc::new(self.registry.clone()),
            self.engine.clone(),
        )
    }

    /// Create a field bound to this form. Call `mount` to register it.
    pub fn field(&self, config: FieldConfig) -> FieldController {
        FieldController::new(config, self.context())
    }

    /// Mounted fields in mount order.
    pub fn fields(&self) -> Vec<FieldController> {
        self.registry.fields()
    }

    pub fn field_by_name(&self, name: &str) -> Option<FieldController> {
        self.registry.find(name)
    }

    /// Validate every mounted field concurrently.
    ///
    /// With a trigger only that trigger's rules run; with `None` every
    /// effective rule runs, as for a submit.
    pub async fn validate_fields(&self, trigger: Option<Trigger>) -> FormValidation {
        let fields = self.fields();
        if fields.is_empty() {
            return FormValidation::Empty;
        }

        let passes = fields.iter().map(|field| match trigger {
            Some(trigger) => field.validate(trigger),
            None => field.validate_all(),
        });

        let mut model = Model::new();
        let mut errors = Vec::new();
        for result in join_all(passes).await {
            match result {
                Ok(values) => model.extend(values),
                Err(err) => errors.push(err),
            }
        }

        debug!(
            "validated {} field(s), {} failed",
            fields.len(),
            errors.len()
        );

        if errors.is_empty() {
            FormValidation::Valid(model)
        } else {
            FormValidation::Invalid(errors)
        }
    }

    /// Reset every mounted field to its initial value.
    pub fn reset_fields(&self) {
        for field in self.fields() {
            field.reset();
        }
    }

    /// Populate mounted fields from `values` by name, without validating.
    /// Names with no mounted field are ignored.
    pub fn set_fields_value(&self, values: &Model) {
        for field in self.fields() {
            if let Some(value) = field.name().and_then(|name| values.get(name)) {
                field.set_field_value(value.clone());
            }
        }
    }

    /// Current values of every mounted named field.
    pub fn fields_value(&self) -> Model {
        self.fields()
            .iter()
            .filter_map(|field| Some((field.name()?.to_string(), field.value())))
            .collect()
    }
}

#[cfg(feature = "schema")]
impl Default for Form {
    fn default() -> Self {
        Self::new(FormConfig::default(), Arc::new(crate::engine::SchemaEngine::new()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::engine::{CallbackEngine, RuleError};
    use crate::rule::Rule;

    /// Rejects empty strings.
    fn engine() -> Arc<dyn ValidationEngine> {
        Arc::new(CallbackEngine::new(|descriptor, model, _, done| {
            let errors: Vec<_> = descriptor
                .keys()
                .filter(|name| model.get(*name) == Some(&json!("")))
                .map(|name| RuleError::new(name.clone(), format!("{name} is empty")))
                .collect();
            done(Some(errors));
        }))
    }

    #[test]
    fn test_validation_result_accessors() {
        assert!(FormValidation::Empty.is_valid());
        assert!(FormValidation::Valid(Model::new()).is_valid());
        let invalid = FormValidation::Invalid(vec![ValidationError::rejected(
            "a",
            vec![RuleError::new("a", "bad")],
        )]);
        assert!(invalid.is_invalid());
        assert_eq!(invalid.first_invalid_field(), Some("a"));
    }

    #[tokio::test]
    async fn test_empty_form() {
        let form = Form::new(FormConfig::new(), engine());
        assert!(matches!(form.validate_fields(None).await, FormValidation::Empty));
    }

    #[tokio::test]
    async fn test_form_rules_reach_fields() {
        let form = Form::new(FormConfig::new().rule("name", Rule::new().required()), engine());
        let name = form.field(FieldConfig::named("name"));
        name.mount();
        assert!(name.is_required());

        let result = form.validate_fields(Some(Trigger::Change)).await;
        assert_eq!(result.first_invalid_field(), Some("name"));
        assert_eq!(name.error(), "name is empty");
    }

    #[tokio::test]
    async fn test_validate_aggregates_models() {
        let form = Form::new(FormConfig::new(), engine());
        let a = form.field(FieldConfig::named("a").initial_value("1").rules(Rule::new()));
        let b = form.field(FieldConfig::named("b").initial_value("2").rules(Rule::new()));
        a.mount();
        b.mount();

        match form.validate_fields(None).await {
            FormValidation::Valid(model) => {
                assert_eq!(model.get("a"), Some(&json!("1")));
                assert_eq!(model.get("b"), Some(&json!("2")));
            }
            other => panic!("expected valid form, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_nameless_fields_do_not_join() {
        let form = Form::new(FormConfig::new(), engine());
        let anonymous = form.field(FieldConfig::new().required());
        anonymous.mount();
        assert!(form.fields().is_empty());
    }

    #[test]
    fn test_set_and_read_values() {
        let form = Form::new(FormConfig::new(), engine());
        let a = form.field(FieldConfig::named("a"));
        let b = form.field(FieldConfig::named("b").initial_value("keep"));
        a.mount();
        b.mount();

        let mut values = Model::new();
        values.insert("a".into(), json!("filled"));
        values.insert("zzz".into(), json!("ignored"));
        form.set_fields_value(&values);

        let current = form.fields_value();
        assert_eq!(current.get("a"), Some(&json!("filled")));
        assert_eq!(current.get("b"), Some(&json!("keep")));
        assert!(!current.contains_key("zzz"));

        form.reset_fields();
        assert_eq!(a.value(), json!(""));
    }
}
