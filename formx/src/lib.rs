//! Field validation core for form bindings.
//!
//! Each [`FieldController`](field::FieldController) owns one field's value and
//! validity. On every trigger it merges its rules with the form's rules for
//! its name, keeps the rules that apply to the trigger, and runs them through
//! a descriptor-based [`ValidationEngine`](engine::ValidationEngine). Fields
//! join the enclosing [`Form`](form::Form) when mounted so whole-form
//! operations can reach them.
//!
//! ```
//! use std::sync::Arc;
//! use formx::prelude::*;
//!
//! # async fn demo() {
//! let config = FormConfig::new().rule("name", Rule::new().required().message("Name is required"));
//! let form = Form::new(config, Arc::new(SchemaEngine::new()));
//!
//! let name = form.field(FieldConfig::named("name"));
//! name.mount();
//!
//! let result = form.validate_fields(None).await;
//! assert_eq!(result.first_error().map(|e| e.message()), Some("Name is required".to_string()));
//! # }
//! ```

pub mod binding;
pub mod engine;
pub mod error;
pub mod field;
pub mod form;
pub mod rule;

pub mod prelude {
    pub use crate::binding::{ControlKind, EventHandler, EventTarget, InteractionEvent};
    #[cfg(feature = "schema")]
    pub use crate::engine::SchemaEngine;
    pub use crate::engine::{CallbackEngine, Model, RuleError, ValidationEngine};
    pub use crate::error::{ConfigurationError, ValidationError};
    pub use crate::field::{FieldConfig, FieldController, FieldState, FieldStatus};
    pub use crate::form::{Form, FormConfig, FormValidation, LayoutConfig};
    pub use crate::rule::{Rule, RuleType, Rules, Trigger};
}
