//! Validation rules and the triggers that scope them.
//!
//! A [`Rule`] is a single constraint on a field's value. Rules are plain data
//! as far as the field controller is concerned: it only reads `required` and
//! `trigger`, and hands everything else to the validation engine.
//!
//! # Example
//!
//! ```
//! use formx::rule::{Rule, RuleType, Trigger};
//!
//! let rule = Rule::new()
//!     .kind(RuleType::Email)
//!     .on(Trigger::Blur)
//!     .message("Please enter a valid email");
//!
//! assert!(rule.applies_to(Trigger::Blur));
//! assert!(!rule.applies_to(Trigger::Change));
//! ```

mod def;
mod resolve;

pub use def::{RuleDef, TriggerDef};
pub use resolve::{filter, resolve};

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigurationError;

/// The interaction class that causes a validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    /// The value changed.
    Change,
    /// The control lost focus.
    Blur,
}

impl Trigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Change => "change",
            Self::Blur => "blur",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value type a rule expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    String,
    Number,
    Integer,
    Float,
    Boolean,
    Array,
    Object,
    Email,
    Url,
}

impl RuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Email => "email",
            Self::Url => "url",
        }
    }
}

/// Synchronous custom check. Returns the failure message on rejection.
pub type RuleFn = Arc<dyn Fn(&Value, &Rule) -> Result<(), String> + Send + Sync>;

/// Asynchronous custom check. Returns the failure message on rejection.
pub type AsyncRuleFn =
    Arc<dyn Fn(Value, Rule) -> BoxFuture<'static, Result<(), String>> + Send + Sync>;

/// A single validation constraint.
#[derive(Clone, Default, Deserialize)]
#[serde(try_from = "RuleDef")]
pub struct Rule {
    /// The value must be present.
    pub required: bool,
    /// Triggers this rule fires on. `None` means every trigger.
    pub trigger: Option<Vec<Trigger>>,
    /// Message reported instead of the engine's default.
    pub message: Option<String>,
    pub kind: Option<RuleType>,
    pub pattern: Option<Regex>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub len: Option<f64>,
    pub one_of: Option<Vec<Value>>,
    /// Treat whitespace-only strings as empty for `required`.
    pub whitespace: bool,
    pub validator: Option<RuleFn>,
    pub async_validator: Option<AsyncRuleFn>,
}

impl Rule {
    /// Create an empty rule that accepts every value.
    pub fn new() -> Self {
        Self::default()
    }

    /// The rule synthesized by the `required` shortcut.
    pub fn required_default() -> Self {
        Self::new().required().message("required").on(Trigger::Blur)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Scope this rule to a trigger. May be called more than once.
    pub fn on(mut self, trigger: Trigger) -> Self {
        let triggers = self.trigger.get_or_insert_with(Vec::new);
        if !triggers.contains(&trigger) {
            triggers.push(trigger);
        }
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn kind(mut self, kind: RuleType) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Require the value to match a regex.
    pub fn pattern(mut self, pattern: &str) -> Result<Self, ConfigurationError> {
        let re = Regex::new(pattern).map_err(|e| ConfigurationError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        self.pattern = Some(re);
        Ok(self)
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn len(mut self, len: f64) -> Self {
        self.len = Some(len);
        self
    }

    pub fn one_of(mut self, values: Vec<Value>) -> Self {
        self.one_of = Some(values);
        self
    }

    pub fn whitespace(mut self) -> Self {
        self.whitespace = true;
        self
    }

    /// Attach a custom synchronous check.
    pub fn validator<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &Rule) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(f));
        self
    }

    /// Attach a custom asynchronous check.
    pub fn async_validator<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Value, Rule) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), String>> + Send + 'static,
    {
        self.async_validator = Some(Arc::new(
            move |value: Value, rule: Rule| -> BoxFuture<'static, Result<(), String>> {
                Box::pin(f(value, rule))
            },
        ));
        self
    }

    /// Check if this rule fires on the given trigger.
    pub fn applies_to(&self, trigger: Trigger) -> bool {
        match &self.trigger {
            None => true,
            Some(triggers) => triggers.contains(&trigger),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("required", &self.required)
            .field("trigger", &self.trigger)
            .field("message", &self.message)
            .field("kind", &self.kind)
            .field("pattern", &self.pattern.as_ref().map(Regex::as_str))
            .field("min", &self.min)
            .field("max", &self.max)
            .field("len", &self.len)
            .field("one_of", &self.one_of)
            .field("whitespace", &self.whitespace)
            .field("validator", &self.validator.is_some())
            .field("async_validator", &self.async_validator.is_some())
            .finish()
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        fn same_fn<T: ?Sized>(a: &Option<Arc<T>>, b: &Option<Arc<T>>) -> bool {
            match (a, b) {
                (None, None) => true,
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                _ => false,
            }
        }

        self.required == other.required
            && self.trigger == other.trigger
            && self.message == other.message
            && self.kind == other.kind
            && self.pattern.as_ref().map(Regex::as_str) == other.pattern.as_ref().map(Regex::as_str)
            && self.min == other.min
            && self.max == other.max
            && self.len == other.len
            && self.one_of == other.one_of
            && self.whitespace == other.whitespace
            && same_fn(&self.validator, &other.validator)
            && same_fn(&self.async_validator, &other.async_validator)
    }
}

/// Either one rule or an ordered list of rules.
///
/// Configuration may give a single rule where a list is expected; this type
/// keeps that distinction at the boundary and normalizes with [`Rules::to_vec`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Rules {
    Single(Rule),
    Many(Vec<Rule>),
}

impl Rules {
    /// Normalize into an ordered list.
    pub fn to_vec(&self) -> Vec<Rule> {
        match self {
            Self::Single(rule) => vec![rule.clone()],
            Self::Many(rules) => rules.clone(),
        }
    }

    pub fn into_vec(self) -> Vec<Rule> {
        match self {
            Self::Single(rule) => vec![rule],
            Self::Many(rules) => rules,
        }
    }
}

impl From<Rule> for Rules {
    fn from(rule: Rule) -> Self {
        Self::Single(rule)
    }
}

impl From<Vec<Rule>> for Rules {
    fn from(rules: Vec<Rule>) -> Self {
        Self::Many(rules)
    }
}
