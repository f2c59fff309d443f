//! Glue between raw control events and a field.
//!
//! Controls report interactions as [`InteractionEvent`]s. A field reads the
//! semantic value out of the event with [`extract_value`]; consumer handlers
//! are chained behind the field's own with [`compose_handler`].

use std::sync::Arc;

use serde_json::Value;

/// Kind of control that produced an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ControlKind {
    #[default]
    Text,
    Checkbox,
    Radio,
    Select,
    Other,
}

/// The control an interaction happened on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventTarget {
    pub kind: ControlKind,
    pub value: Value,
    pub checked: bool,
}

/// Something a control reported.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionEvent {
    /// A bare value with no control attached (custom widgets, programmatic input).
    Raw(Value),
    /// An interaction on a concrete control.
    Input(EventTarget),
}

impl InteractionEvent {
    pub fn raw(value: impl Into<Value>) -> Self {
        Self::Raw(value.into())
    }

    /// Text typed into a text control.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Input(EventTarget {
            kind: ControlKind::Text,
            value: Value::String(value.into()),
            checked: false,
        })
    }

    /// A checkbox toggled to `checked`.
    pub fn checkbox(checked: bool) -> Self {
        Self::Input(EventTarget {
            kind: ControlKind::Checkbox,
            value: Value::String("on".to_string()),
            checked,
        })
    }

    /// The control the event happened on, if any.
    pub fn target(&self) -> Option<&EventTarget> {
        match self {
            Self::Raw(_) => None,
            Self::Input(target) => Some(target),
        }
    }
}

impl From<Value> for InteractionEvent {
    fn from(value: Value) -> Self {
        Self::Raw(value)
    }
}

/// Read the semantic value carried by an event.
///
/// Raw events pass their value through. Checkboxes yield their `checked`
/// flag; every other control yields its `value`.
pub fn extract_value(event: &InteractionEvent) -> Value {
    match event {
        InteractionEvent::Raw(value) => value.clone(),
        InteractionEvent::Input(target) if target.kind == ControlKind::Checkbox => {
            Value::Bool(target.checked)
        }
        InteractionEvent::Input(target) => target.value.clone(),
    }
}

/// Callback observing control events.
pub type EventHandler = Arc<dyn Fn(&InteractionEvent) + Send + Sync>;

/// Chain an optional consumer handler behind the field's own handler.
///
/// Both see every event; `internal` runs first. Without an external handler
/// the internal handler is returned as-is.
pub fn compose_handler(internal: EventHandler, external: Option<EventHandler>) -> EventHandler {
    match external {
        None => internal,
        Some(external) => Arc::new(move |event: &InteractionEvent| {
            internal(event);
            external(event);
        }),
    }
}
