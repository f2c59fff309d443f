//! Per-field state and the controller that drives validation.

mod config;
mod controller;
mod state;

pub use config::FieldConfig;
pub use controller::{FieldController, ValidationHandle, WeakField};
pub use state::{FieldState, FieldStatus, StateCell};

use serde::Serialize;
use uuid::Uuid;

/// Identity of a field controller. Two fields never share one, even when
/// they share a name.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(transparent)]
pub struct FieldId(Uuid);

impl FieldId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for FieldId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for FieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
