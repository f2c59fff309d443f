//! Serializable rule shape used by form configuration.

use serde::Deserialize;
use serde_json::Value;

use super::{Rule, RuleType, Trigger};
use crate::error::ConfigurationError;

/// A trigger given either as one name or a list of names.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TriggerDef {
    One(Trigger),
    Many(Vec<Trigger>),
}

/// Rule as written in a configuration document.
///
/// ```json
/// { "required": true, "message": "Name is required", "trigger": "blur" }
/// { "type": "email", "trigger": ["change", "blur"] }
/// { "pattern": "^[a-z]+$", "min": 3 }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleDef {
    pub required: bool,
    pub trigger: Option<TriggerDef>,
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<RuleType>,
    pub pattern: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub len: Option<f64>,
    #[serde(rename = "enum")]
    pub one_of: Option<Vec<Value>>,
    pub whitespace: bool,
}

impl TryFrom<RuleDef> for Rule {
    type Error = ConfigurationError;

    fn try_from(def: RuleDef) -> Result<Self, Self::Error> {
        let mut rule = Rule {
            required: def.required,
            message: def.message,
            kind: def.kind,
            min: def.min,
            max: def.max,
            len: def.len,
            one_of: def.one_of,
            whitespace: def.whitespace,
            ..Rule::default()
        };

        match def.trigger {
            None => {}
            Some(TriggerDef::One(trigger)) => rule = rule.on(trigger),
            Some(TriggerDef::Many(triggers)) => {
                for trigger in triggers {
                    rule = rule.on(trigger);
                }
            }
        }

        if let Some(pattern) = def.pattern {
            rule = rule.pattern(&pattern)?;
        }

        Ok(rule)
    }
}
