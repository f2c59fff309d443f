//! Boundary to the descriptor-based validation engine.
//!
//! The field controller never checks a value itself. It builds a one-field
//! descriptor (`name -> rules`) and model (`name -> value`) and hands them to
//! a [`ValidationEngine`]. Any engine with that contract can be plugged in;
//! [`SchemaEngine`] is bundled behind the `schema` feature.

mod adapter;
mod callback;
#[cfg(feature = "schema")]
mod schema;

pub use adapter::validate_field;
pub use callback::{CallbackEngine, Completion};
#[cfg(feature = "schema")]
pub use schema::SchemaEngine;

use std::collections::BTreeMap;

use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::rule::Rule;

/// Field values keyed by field name.
pub type Model = Map<String, Value>;

/// Rule lists keyed by field name.
pub type Descriptor = BTreeMap<String, Vec<Rule>>;

/// Options passed with every validation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Stop at the first failing rule of each field.
    pub first: bool,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self { first: true }
    }
}

/// One rejected rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleError {
    /// Field the rule belongs to.
    pub field: String,
    /// Failure message.
    pub message: String,
}

impl RuleError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Reasons an engine run does not succeed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// At least one rule rejected the model. Never empty.
    #[error("{} rule(s) rejected the value", .0.len())]
    Rejected(Vec<RuleError>),

    /// A rule could not be evaluated against the value.
    #[error("malformed rule: {0}")]
    Malformed(String),

    /// The engine never reported completion.
    #[error("engine dropped its completion")]
    Abandoned,
}

/// A descriptor-based asynchronous validator.
///
/// Implementations must settle exactly once per call. An engine is shared by
/// every field of a form and is never mutated by them.
pub trait ValidationEngine: Send + Sync {
    fn validate(
        &self,
        descriptor: Descriptor,
        model: Model,
        options: ValidateOptions,
    ) -> BoxFuture<'static, Result<(), EngineError>>;
}
