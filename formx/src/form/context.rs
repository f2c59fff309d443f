//! Capabilities a field needs from its enclosing form.
//!
//! Validation only reads rules ([`RuleSource`]) and joins or leaves the form
//! ([`FieldRegistrar`]). Presentation settings live separately in
//! [`LayoutConfig`](super::LayoutConfig) and never reach the field.

use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::ValidationEngine;
use crate::field::FieldController;
use crate::rule::Rules;

/// Read-only source of form-level rules keyed by field name.
pub trait RuleSource: Send + Sync {
    fn rules_for(&self, name: &str) -> Option<Rules>;
}

impl RuleSource for HashMap<String, Rules> {
    fn rules_for(&self, name: &str) -> Option<Rules> {
        self.get(name).cloned()
    }
}

/// Membership bookkeeping for live fields.
///
/// Fields call `add_field` when mounted and `remove_field` when unmounted.
/// Both must be idempotent.
pub trait FieldRegistrar: Send + Sync {
    fn add_field(&self, field: &FieldController);
    fn remove_field(&self, field: &FieldController);
}

/// Everything a field controller is wired to.
#[derive(Clone)]
pub struct FieldContext {
    pub rules: Arc<dyn RuleSource>,
    pub registrar: Arc<dyn FieldRegistrar>,
    pub engine: Arc<dyn ValidationEngine>,
}

impl FieldContext {
    pub fn new(
        rules: Arc<dyn RuleSource>,
        registrar: Arc<dyn FieldRegistrar>,
        engine: Arc<dyn ValidationEngine>,
    ) -> Self {
        Self {
            rules,
            registrar,
            engine,
        }
    }

    /// Context for a field used outside any form: no form-level rules and
    /// nowhere to register.
    pub fn detached(engine: Arc<dyn ValidationEngine>) -> Self {
        Self::new(Arc::new(NoRules), Arc::new(NoRegistrar), engine)
    }
}

struct NoRules;

impl RuleSource for NoRules {
    fn rules_for(&self, _name: &str) -> Option<Rules> {
        None
    }
}

struct NoRegistrar;

impl FieldRegistrar for NoRegistrar {
    fn add_field(&self, _field: &FieldController) {}
    fn remove_field(&self, _field: &FieldController) {}
}
