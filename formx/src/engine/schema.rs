//! Bundled descriptor-based engine.
//!
//! Checks run in this order for every rule: `required`, `whitespace`, `type`,
//! size (`len`, `min`, `max`), `enum`, `pattern`, then the custom validators.
//! A value that is empty and not required skips every built-in check.

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;

use super::{Descriptor, EngineError, Model, RuleError, ValidateOptions, ValidationEngine};
use crate::rule::{Rule, RuleType};

/// Reference implementation of [`ValidationEngine`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaEngine;

impl SchemaEngine {
    pub fn new() -> Self {
        Self
    }
}

impl ValidationEngine for SchemaEngine {
    fn validate(
        &self,
        descriptor: Descriptor,
        model: Model,
        options: ValidateOptions,
    ) -> BoxFuture<'static, Result<(), EngineError>> {
        async move {
            let mut errors = Vec::new();

            for (field, rules) in &descriptor {
                let value = model.get(field).cloned().unwrap_or(Value::Null);
                for rule in rules {
                    if let Some(message) = check_rule(field, &value, rule).await? {
                        errors.push(RuleError::new(field.clone(), message));
                        if options.first {
                            break;
                        }
                    }
                }
            }

            if errors.is_empty() {
                Ok(())
            } else {
                Err(EngineError::Rejected(errors))
            }
        }
        .boxed()
    }
}

/// Run one rule. `Ok(Some(msg))` is a rejection.
async fn check_rule(
    field: &str,
    value: &Value,
    rule: &Rule,
) -> Result<Option<String>, EngineError> {
    if let Some(message) = check_builtin(field, value, rule)? {
        return Ok(Some(rule.message.clone().unwrap_or(message)));
    }

    if let Some(validator) = &rule.validator {
        if let Err(message) = validator(value, rule) {
            return Ok(Some(custom_message(message, rule)));
        }
    }

    if let Some(validator) = &rule.async_validator {
        if let Err(message) = validator(value.clone(), rule.clone()).await {
            return Ok(Some(custom_message(message, rule)));
        }
    }

    Ok(None)
}

fn custom_message(message: String, rule: &Rule) -> String {
    if message.is_empty() {
        rule.message.clone().unwrap_or_default()
    } else {
        message
    }
}

fn check_builtin(field: &str, value: &Value, rule: &Rule) -> Result<Option<String>, EngineError> {
    if is_empty(value, rule) {
        return Ok(rule.required.then(|| format!("{field} is required")));
    }

    if rule.whitespace {
        if let Value::String(s) = value {
            if s.trim().is_empty() {
                return Ok(Some(format!("{field} cannot be empty")));
            }
        }
    }

    if let Some(kind) = rule.kind {
        if !matches_type(value, kind) {
            return Ok(Some(format!("{field} is not a valid {}", kind.as_str())));
        }
    }

    if let Some(message) = check_size(field, value, rule)? {
        return Ok(Some(message));
    }

    if let Some(allowed) = &rule.one_of {
        if !allowed.contains(value) {
            let list = allowed
                .iter()
                .map(display_value)
                .collect::<Vec<_>>()
                .join(", ");
            return Ok(Some(format!("{field} must be one of {list}")));
        }
    }

    if let Some(pattern) = &rule.pattern {
        let text = display_value(value);
        if !pattern.is_match(&text) {
            return Ok(Some(format!(
                "{field} value {text} does not match pattern {}",
                pattern.as_str()
            )));
        }
    }

    Ok(None)
}

fn is_empty(value: &Value, rule: &Rule) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty() && matches!(rule.kind, Some(RuleType::Array)),
        _ => false,
    }
}

fn matches_type(value: &Value, kind: RuleType) -> bool {
    match kind {
        RuleType::String => value.is_string(),
        RuleType::Number => value.is_number(),
        RuleType::Integer => value.as_f64().is_some_and(|n| n.fract() == 0.0),
        RuleType::Float => value.as_f64().is_some_and(|n| n.fract() != 0.0),
        RuleType::Boolean => value.is_boolean(),
        RuleType::Array => value.is_array(),
        RuleType::Object => value.is_object(),
        RuleType::Email => value
            .as_str()
            .is_some_and(email_address::EmailAddress::is_valid),
        RuleType::Url => value.as_str().is_some_and(|s| url::Url::parse(s).is_ok()),
    }
}

fn check_size(field: &str, value: &Value, rule: &Rule) -> Result<Option<String>, EngineError> {
    if rule.len.is_none() && rule.min.is_none() && rule.max.is_none() {
        return Ok(None);
    }

    let (size, unit) = match value {
        Value::String(s) => (s.chars().count() as f64, Unit::Chars),
        Value::Number(n) => (n.as_f64().unwrap_or_default(), Unit::Number),
        Value::Array(items) => (items.len() as f64, Unit::Items),
        other => {
            return Err(EngineError::Malformed(format!(
                "len/min/max cannot apply to {} for field {field}",
                kind_name(other)
            )));
        }
    };

    let message = if let Some(len) = rule.len {
        (size != len).then(|| unit.exactly(field, len))
    } else {
        match (rule.min, rule.max) {
            (Some(min), Some(max)) if size < min || size > max => Some(unit.range(field, min, max)),
            (Some(min), None) if size < min => Some(unit.at_least(field, min)),
            (None, Some(max)) if size > max => Some(unit.at_most(field, max)),
            _ => None,
        }
    };

    Ok(message)
}

/// What `len`/`min`/`max` measure.
#[derive(Clone, Copy)]
enum Unit {
    Chars,
    Number,
    Items,
}

impl Unit {
    fn exactly(self, field: &str, len: f64) -> String {
        let len = fmt_num(len);
        match self {
            Self::Chars => format!("{field} must be exactly {len} characters"),
            Self::Number => format!("{field} must equal {len}"),
            Self::Items => format!("{field} must be exactly {len} in length"),
        }
    }

    fn at_least(self, field: &str, min: f64) -> String {
        let min = fmt_num(min);
        match self {
            Self::Chars => format!("{field} must be at least {min} characters"),
            Self::Number => format!("{field} cannot be less than {min}"),
            Self::Items => format!("{field} cannot be less than {min} in length"),
        }
    }

    fn at_most(self, field: &str, max: f64) -> String {
        let max = fmt_num(max);
        match self {
            Self::Chars => format!("{field} cannot be longer than {max} characters"),
            Self::Number => format!("{field} cannot be greater than {max}"),
            Self::Items => format!("{field} cannot be greater than {max} in length"),
        }
    }

    fn range(self, field: &str, min: f64, max: f64) -> String {
        let (min, max) = (fmt_num(min), fmt_num(max));
        match self {
            Self::Chars => format!("{field} must be between {min} and {max} characters"),
            Self::Number => format!("{field} must be between {min} and {max}"),
            Self::Items => format!("{field} must be between {min} and {max} in length"),
        }
    }
}

fn fmt_num(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    async fn run(value: Value, rules: Vec<Rule>) -> Result<(), EngineError> {
        let mut descriptor = Descriptor::new();
        descriptor.insert("field".to_string(), rules);
        let mut model = Model::new();
        model.insert("field".to_string(), value);
        SchemaEngine::new()
            .validate(descriptor, model, ValidateOptions::default())
            .await
    }

    async fn first_message(value: Value, rules: Vec<Rule>) -> String {
        match run(value, rules).await {
            Err(EngineError::Rejected(errors)) => errors[0].message.clone(),
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_required() {
        assert_eq!(
            first_message(json!(""), vec![Rule::new().required()]).await,
            "field is required"
        );
        assert!(run(json!("x"), vec![Rule::new().required()]).await.is_ok());
    }

    #[tokio::test]
    async fn test_custom_message_wins() {
        let rule = Rule::new().required().message("Please fill this in");
        assert_eq!(first_message(Value::Null, vec![rule]).await, "Please fill this in");
    }

    #[tokio::test]
    async fn test_empty_optional_skips_checks() {
        assert!(run(json!(""), vec![Rule::new().kind(RuleType::Email)]).await.is_ok());
    }

    #[tokio::test]
    async fn test_whitespace() {
        let rule = Rule::new().required().whitespace();
        assert_eq!(first_message(json!("   "), vec![rule]).await, "field cannot be empty");
    }

    #[tokio::test]
    async fn test_email_type() {
        let rule = Rule::new().kind(RuleType::Email);
        assert_eq!(
            first_message(json!("not-an-email"), vec![rule.clone()]).await,
            "field is not a valid email"
        );
        assert!(run(json!("a@b.com"), vec![rule]).await.is_ok());
    }

    #[tokio::test]
    async fn test_url_and_integer_types() {
        assert!(
            run(json!("https://example.com"), vec![Rule::new().kind(RuleType::Url)])
                .await
                .is_ok()
        );
        assert!(run(json!("nope"), vec![Rule::new().kind(RuleType::Url)]).await.is_err());
        assert!(run(json!(3), vec![Rule::new().kind(RuleType::Integer)]).await.is_ok());
        assert!(run(json!(3.5), vec![Rule::new().kind(RuleType::Integer)]).await.is_err());
        assert!(run(json!(3.5), vec![Rule::new().kind(RuleType::Float)]).await.is_ok());
    }

    #[tokio::test]
    async fn test_string_length_messages() {
        assert_eq!(
            first_message(json!("ab"), vec![Rule::new().min(3.0)]).await,
            "field must be at least 3 characters"
        );
        assert_eq!(
            first_message(json!("abcdef"), vec![Rule::new().max(5.0)]).await,
            "field cannot be longer than 5 characters"
        );
        assert_eq!(
            first_message(json!("ab"), vec![Rule::new().min(3.0).max(5.0)]).await,
            "field must be between 3 and 5 characters"
        );
        assert_eq!(
            first_message(json!("ab"), vec![Rule::new().len(4.0)]).await,
            "field must be exactly 4 characters"
        );
    }

    #[tokio::test]
    async fn test_number_range() {
        assert_eq!(
            first_message(json!(10), vec![Rule::new().max(5.0)]).await,
            "field cannot be greater than 5"
        );
        assert!(run(json!(4), vec![Rule::new().min(1.0).max(5.0)]).await.is_ok());
    }

    #[tokio::test]
    async fn test_array_length() {
        assert_eq!(
            first_message(json!([1]), vec![Rule::new().min(2.0)]).await,
            "field cannot be less than 2 in length"
        );
    }

    #[tokio::test]
    async fn test_size_on_boolean_is_malformed() {
        let result = run(json!(true), vec![Rule::new().min(1.0)]).await;
        assert!(matches!(result, Err(EngineError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_enum() {
        let rule = Rule::new().one_of(vec![json!("red"), json!("blue")]);
        assert_eq!(
            first_message(json!("green"), vec![rule.clone()]).await,
            "field must be one of red, blue"
        );
        assert!(run(json!("red"), vec![rule]).await.is_ok());
    }

    #[tokio::test]
    async fn test_pattern() {
        let rule = Rule::new().pattern("^[0-9]+$").unwrap();
        assert_eq!(
            first_message(json!("12a"), vec![rule]).await,
            "field value 12a does not match pattern ^[0-9]+$"
        );
    }

    #[tokio::test]
    async fn test_first_error_wins() {
        let rules = vec![
            Rule::new().min(5.0).message("too short"),
            Rule::new().pattern("^[0-9]+$").unwrap().message("digits only"),
        ];
        match run(json!("ab"), rules).await {
            Err(EngineError::Rejected(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].message, "too short");
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_custom_validators() {
        let sync_rule = Rule::new().validator(|value, _| {
            if value == &json!("admin") {
                Err("name is taken".to_string())
            } else {
                Ok(())
            }
        });
        assert_eq!(first_message(json!("admin"), vec![sync_rule]).await, "name is taken");

        let async_rule = Rule::new()
            .message("checked remotely")
            .async_validator(|_, _| async { Err(String::new()) });
        assert_eq!(first_message(json!("x"), vec![async_rule]).await, "checked remotely");
    }
}
