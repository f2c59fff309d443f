//! The stateful unit behind one form field.

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use futures::FutureExt;
use futures::future::BoxFuture;
use log::{debug, error, trace, warn};
use serde_json::Value;
use tokio::task::JoinHandle;

use super::{FieldConfig, FieldId, FieldState, FieldStatus, StateCell};
use crate::binding::{EventHandler, InteractionEvent, compose_handler, extract_value};
use crate::engine::{Model, validate_field};
use crate::error::{ValidationError, extract_panic_message};
use crate::form::FieldContext;
use crate::rule::{self, Rule, Trigger};

/// Handle to a validation pass started in the background.
pub type ValidationHandle = JoinHandle<Result<Model, ValidationError>>;

struct FieldShared {
    id: FieldId,
    config: FieldConfig,
    context: FieldContext,
    state: StateCell<FieldState>,
    /// Stamp of the most recently started validation (or reset).
    generation: AtomicU64,
    /// Set between unmount and the next mount. Never set for a field that
    /// was not mounted, so standalone fields still settle.
    detached: AtomicBool,
    mounted: AtomicBool,
    handler: EventHandler,
}

impl FieldShared {
    fn label(&self) -> String {
        match &self.config.name {
            Some(name) => format!("'{name}'"),
            None => format!("#{}", self.id),
        }
    }

    /// Apply a finished validation if it is still the latest one and the
    /// field is still mounted.
    fn settle(&self, stamp: u64, result: &Result<Model, ValidationError>) {
        if self.detached.load(Ordering::SeqCst) {
            debug!("field {} unmounted, dropping validation #{stamp}", self.label());
            return;
        }

        self.state.update_if(|state| {
            let latest = self.generation.load(Ordering::SeqCst);
            if stamp != latest {
                debug!(
                    "field {}: validation #{stamp} superseded by #{latest}, dropping result",
                    self.label()
                );
                return false;
            }
            match result {
                Ok(_) => state.mark_valid(),
                Err(err) => {
                    let message = err.message();
                    if message.is_empty() {
                        state.mark_invalid("invalid".to_string());
                    } else {
                        state.mark_invalid(message);
                    }
                }
            }
            true
        });
    }
}

/// Owns one field's value, validity and error message.
///
/// Cloning gives another handle to the same field. Every trigger runs the
/// pipeline: effective rules, trigger filter, engine, state update. Only the
/// most recently started validation may update the state; older completions
/// are dropped, as are completions that arrive after the field unmounted.
///
/// # Example
///
/// ```
/// # use std::sync::Arc;
/// use formx::prelude::*;
///
/// # async fn demo() {
/// let form = Form::new(FormConfig::new(), Arc::new(SchemaEngine::new()));
/// let email = form.field(FieldConfig::named("email").rules(Rule::new().kind(RuleType::Email)));
/// email.mount();
///
/// email.set_field_value("not-an-email");
/// assert!(email.validate(Trigger::Change).await.is_err());
/// assert!(!email.is_valid());
/// # }
/// ```
#[derive(Clone)]
pub struct FieldController {
    shared: Arc<FieldShared>,
}

impl FieldController {
    /// Create a controller wired to `context`. The field is not mounted yet.
    pub fn new(config: FieldConfig, context: FieldContext) -> Self {
        let shared = Arc::new_cyclic(|weak: &Weak<FieldShared>| {
            let weak = weak.clone();
            let internal: EventHandler = Arc::new(move |event: &InteractionEvent| {
                if let Some(shared) = weak.upgrade() {
                    drop(FieldController { shared }.handle_event(event));
                }
            });
            let handler = compose_handler(internal, config.on_change.clone());
            let state = StateCell::new(FieldState::new(config.initial()));

            FieldShared {
                id: FieldId::new(),
                config,
                context,
                state,
                generation: AtomicU64::new(0),
                detached: AtomicBool::new(false),
                mounted: AtomicBool::new(false),
                handler,
            }
        });

        Self { shared }
    }

    pub fn id(&self) -> FieldId {
        self.shared.id
    }

    pub fn name(&self) -> Option<&str> {
        self.shared.config.name.as_deref()
    }

    pub fn config(&self) -> &FieldConfig {
        &self.shared.config
    }

    /// Snapshot of the observable state.
    pub fn state(&self) -> FieldState {
        self.shared.state.get()
    }

    /// The shared state cell, for renderers that poll the dirty flag.
    pub fn state_cell(&self) -> StateCell<FieldState> {
        self.shared.state.clone()
    }

    pub fn value(&self) -> Value {
        self.shared.state.read(|s| s.value.clone())
    }

    pub fn error(&self) -> String {
        self.shared.state.read(|s| s.error.clone())
    }

    pub fn is_valid(&self) -> bool {
        self.shared.state.read(|s| s.valid)
    }

    pub fn status(&self) -> FieldStatus {
        self.shared.state.read(|s| s.status)
    }

    /// Effective rules before trigger filtering.
    ///
    /// Form-level rules are only consulted for named fields.
    pub fn rules(&self) -> Vec<Rule> {
        let config = &self.shared.config;
        let form_rules = self
            .name()
            .and_then(|name| self.shared.context.rules.rules_for(name));
        rule::resolve(config.rules.as_ref(), form_rules.as_ref(), config.required)
    }

    /// Check if any effective rule is required, regardless of trigger.
    pub fn is_required(&self) -> bool {
        self.rules().iter().any(|rule| rule.required)
    }

    /// Store a new value and start a change validation.
    pub fn set_value(&self, value: impl Into<Value>) -> Option<ValidationHandle> {
        let value = value.into();
        self.shared.state.update(|state| state.value = value);
        self.spawn(Trigger::Change)
    }

    /// Extract the value from a control event and store it.
    pub fn handle_event(&self, event: &InteractionEvent) -> Option<ValidationHandle> {
        self.set_value(extract_value(event))
    }

    /// Start a blur validation of the current value.
    pub fn handle_blur(&self) -> Option<ValidationHandle> {
        self.spawn(Trigger::Blur)
    }

    /// Combined change handler: this field first, then the consumer's
    /// `on_change`. Always the same `Arc` for a given field.
    pub fn change_handler(&self) -> EventHandler {
        Arc::clone(&self.shared.handler)
    }

    /// Validate the current value against the rules for `trigger`.
    ///
    /// The field enters `Validating` before this returns. The returned
    /// future yields the outcome even when it is too late to update the
    /// field's state.
    pub fn validate(&self, trigger: Trigger) -> BoxFuture<'static, Result<Model, ValidationError>> {
        self.run(Some(trigger))
    }

    /// Validate the current value against every effective rule.
    pub fn validate_all(&self) -> BoxFuture<'static, Result<Model, ValidationError>> {
        self.run(None)
    }

    /// Restore the initial value and clear any validation outcome.
    pub fn reset(&self) {
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        self.shared
            .state
            .set(FieldState::new(self.shared.config.initial()));
    }

    /// Replace the value without validating it.
    pub fn set_field_value(&self, value: impl Into<Value>) {
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        self.shared.state.set(FieldState::new(value.into()));
    }

    /// Join the enclosing form. Nameless fields never join.
    pub fn mount(&self) {
        self.shared.detached.store(false, Ordering::SeqCst);
        self.shared.mounted.store(true, Ordering::SeqCst);
        if self.name().is_some() {
            self.shared.context.registrar.add_field(self);
        } else {
            trace!("field {} has no name, not registering", self.shared.label());
        }
    }

    /// Leave the enclosing form. Pending validations will not touch state,
    /// even after a later `mount`.
    pub fn unmount(&self) {
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        self.shared.detached.store(true, Ordering::SeqCst);
        self.shared.mounted.store(false, Ordering::SeqCst);
        self.shared.context.registrar.remove_field(self);
    }

    /// Check if the field is between `mount` and `unmount`.
    pub fn is_mounted(&self) -> bool {
        self.shared.mounted.load(Ordering::SeqCst)
    }

    pub fn downgrade(&self) -> WeakField {
        WeakField {
            id: self.shared.id,
            inner: Arc::downgrade(&self.shared),
        }
    }

    /// Check if both handles refer to the same field.
    pub fn ptr_eq(&self, other: &FieldController) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    fn run(&self, trigger: Option<Trigger>) -> BoxFuture<'static, Result<Model, ValidationError>> {
        let shared = &self.shared;
        let stamp = shared.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let effective = self.rules();
        let rules = match trigger {
            Some(trigger) => rule::filter(&effective, trigger),
            None => effective,
        };

        let mut value = Value::Null;
        shared.state.update(|state| {
            value = state.value.clone();
            state.status = FieldStatus::Validating;
        });

        debug!(
            "field {}: validation #{stamp} on {} with {} rule(s)",
            shared.label(),
            trigger.map_or("submit", |t| t.as_str()),
            rules.len()
        );

        let pending = validate_field(shared.context.engine.as_ref(), self.name(), value, rules);
        let weak = Arc::downgrade(shared);
        let field = self.name().unwrap_or_default().to_string();

        async move {
            let result = match AssertUnwindSafe(pending).catch_unwind().await {
                Ok(result) => result,
                Err(panic) => {
                    let message = extract_panic_message(&panic);
                    error!("validation of field '{field}' panicked: {message}");
                    Err(ValidationError::Panicked { field, message })
                }
            };

            match weak.upgrade() {
                Some(shared) => shared.settle(stamp, &result),
                None => debug!("field dropped before validation #{stamp} finished"),
            }

            result
        }
        .boxed()
    }

    fn spawn(&self, trigger: Trigger) -> Option<ValidationHandle> {
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => Some(runtime.spawn(self.validate(trigger))),
            Err(_) => {
                warn!(
                    "no async runtime, {trigger} validation of field {} not started",
                    self.shared.label()
                );
                None
            }
        }
    }
}

impl fmt::Debug for FieldController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldController")
            .field("id", &self.shared.id)
            .field("name", &self.shared.config.name)
            .field("state", &self.state())
            .finish()
    }
}

/// Non-owning reference to a field, as held by a registry.
#[derive(Clone)]
pub struct WeakField {
    id: FieldId,
    inner: Weak<FieldShared>,
}

impl WeakField {
    pub fn id(&self) -> FieldId {
        self.id
    }

    pub fn upgrade(&self) -> Option<FieldController> {
        self.inner.upgrade().map(|shared| FieldController { shared })
    }
}

impl fmt::Debug for WeakField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WeakField").field(&self.id).finish()
    }
}
