//! Instance store for singletons and manually registered instances.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::key::Key;

/// Type-erased shared instance.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// Instances keyed by identifier.
///
/// The resolver stores singletons here under their concrete key; callers can
/// force entries in with [`Container::set_instance`](crate::Container::set_instance).
/// Entries stay until forgotten or cleared.
#[derive(Default)]
pub struct InstanceStore {
    instances: RwLock<HashMap<Key, AnyArc>>,
}

impl InstanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, key: &Key) -> Option<AnyArc> {
        self.instances.read().get(key).cloned()
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.instances.read().contains_key(key)
    }

    /// Inserts or overwrites.
    pub fn set(&self, key: Key, instance: AnyArc) {
        self.instances.write().insert(key, instance);
    }

    /// Stores a freshly constructed singleton unless another chain stored one
    /// first, and returns whichever instance is now in the store.
    pub fn persist(&self, key: Key, instance: AnyArc) -> AnyArc {
        self.instances
            .write()
            .entry(key)
            .or_insert(instance)
            .clone()
    }

    /// Removes the entry and returns it.
    pub fn remove(&self, key: &Key) -> Option<AnyArc> {
        self.instances.write().remove(key)
    }

    pub fn clear(&self) {
        self.instances.write().clear();
    }

    pub fn len(&self) -> usize {
        self.instances.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.read().is_empty()
    }

    /// Stored keys, unordered.
    pub fn keys(&self) -> Vec<Key> {
        self.instances.read().keys().cloned().collect()
    }
}
