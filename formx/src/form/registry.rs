//! Registry of mounted fields.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use log::debug;

use super::FieldRegistrar;
use crate::field::{FieldController, FieldId, WeakField};

/// Set of live fields, keyed by identity.
///
/// Fields are held weakly, so a registry never keeps a dropped field alive.
/// Enumeration returns a snapshot; fields may mount or unmount while a
/// caller walks it.
#[derive(Clone, Default)]
pub struct FieldRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

#[derive(Default)]
struct RegistryInner {
    fields: HashMap<FieldId, WeakField>,
    /// Mount order.
    order: Vec<FieldId>,
}

impl RegistryInner {
    fn prune(&mut self) {
        let fields = &mut self.fields;
        fields.retain(|_, weak| weak.upgrade().is_some());
        self.order.retain(|id| fields.contains_key(id));
    }
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add a field. Returns false if it was already present.
    pub fn add(&self, field: &FieldController) -> bool {
        let mut inner = self.lock();
        let id = field.id();
        if inner.fields.contains_key(&id) {
            return false;
        }
        inner.fields.insert(id, field.downgrade());
        inner.order.push(id);
        debug!("field {:?} ({id}) joined registry", field.name());
        true
    }

    /// Remove a field. Returns false if it was not present.
    pub fn remove(&self, field: &FieldController) -> bool {
        let mut inner = self.lock();
        let id = field.id();
        if inner.fields.remove(&id).is_none() {
            return false;
        }
        inner.order.retain(|&i| i != id);
        debug!("field {:?} ({id}) left registry", field.name());
        true
    }

    pub fn contains(&self, field: &FieldController) -> bool {
        self.lock().fields.contains_key(&field.id())
    }

    /// Live fields in mount order.
    pub fn fields(&self) -> Vec<FieldController> {
        let mut inner = self.lock();
        inner.prune();
        inner
            .order
            .iter()
            .filter_map(|id| inner.fields.get(id).and_then(WeakField::upgrade))
            .collect()
    }

    /// First live field registered under `name`.
    pub fn find(&self, name: &str) -> Option<FieldController> {
        self.fields()
            .into_iter()
            .find(|field| field.name() == Some(name))
    }

    pub fn len(&self) -> usize {
        let mut inner = self.lock();
        inner.prune();
        inner.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FieldRegistrar for FieldRegistry {
    fn add_field(&self, field: &FieldController) {
        self.add(field);
    }

    fn remove_field(&self, field: &FieldController) {
        self.remove(field);
    }
}
