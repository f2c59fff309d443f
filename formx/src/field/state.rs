use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use serde::Serialize;
use serde_json::Value;

/// Where a field is in its validation lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldStatus {
    /// Not validated since creation, reset, or programmatic population.
    #[default]
    Pristine,
    /// A validation pass is in flight.
    Validating,
    Valid,
    Invalid,
}

/// Observable state of one field, read by the rendering layer.
///
/// `valid` is false exactly when `error` is non-empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldState {
    pub value: Value,
    pub valid: bool,
    pub error: String,
    pub status: FieldStatus,
}

impl FieldState {
    /// Fresh state holding `value`.
    pub fn new(value: Value) -> Self {
        Self {
            value,
            valid: true,
            error: String::new(),
            status: FieldStatus::Pristine,
        }
    }

    pub(crate) fn mark_valid(&mut self) {
        self.valid = true;
        self.error.clear();
        self.status = FieldStatus::Valid;
    }

    pub(crate) fn mark_invalid(&mut self, error: String) {
        debug_assert!(!error.is_empty());
        self.valid = false;
        self.error = error;
        self.status = FieldStatus::Invalid;
    }
}

/// Shared, interior-mutable state with a dirty flag.
///
/// Cheap to clone; all clones see the same value. The dirty flag is set on
/// every write so a renderer can poll for changes.
#[derive(Debug)]
pub struct StateCell<T> {
    inner: Arc<RwLock<T>>,
    dirty: Arc<AtomicBool>,
}

impl<T> StateCell<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(RwLock::new(value)),
            dirty: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a clone of the current value.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.read(T::clone)
    }

    /// Read through a closure without cloning the whole value.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        match self.inner.read() {
            Ok(guard) => f(&guard),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }

    pub fn set(&self, value: T) {
        self.update(|current| *current = value);
    }

    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard);
        self.dirty.store(true, Ordering::SeqCst);
    }

    /// Write through `f`, marking the cell dirty only when `f` returns true.
    pub fn update_if<F>(&self, f: F)
    where
        F: FnOnce(&mut T) -> bool,
    {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if f(&mut guard) {
            self.dirty.store(true, Ordering::SeqCst);
        }
    }

    /// Check if the state has been modified since the last check.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }
}

impl<T> Clone for StateCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            dirty: Arc::clone(&self.dirty),
        }
    }
}

impl<T: Default> Default for StateCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
