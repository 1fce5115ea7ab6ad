//! Bounded FIFO cache of structural descriptors.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::descriptors::StructuralDescriptor;
use crate::key::Key;

/// Default number of descriptors kept.
pub const DEFAULT_REFLECTION_CACHE_CAPACITY: usize = 100;

/// Descriptor memo bounded by insertion order.
///
/// Eviction is strict FIFO: the oldest *inserted* key goes first, lookups do
/// not refresh an entry. A capacity of zero disables caching, every insert is
/// evicted immediately.
///
/// The cache itself is not synchronized; the container keeps it behind a
/// lock.
pub struct ReflectionCache {
    capacity: usize,
    entries: HashMap<Key, Arc<StructuralDescriptor>>,
    order: VecDeque<Key>,
}

impl ReflectionCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity.min(1024)),
            order: VecDeque::with_capacity(capacity.min(1024)),
        }
    }

    #[inline]
    pub fn get(&self, key: &Key) -> Option<Arc<StructuralDescriptor>> {
        self.entries.get(key).cloned()
    }

    /// Inserts a descriptor and returns the key evicted to stay within
    /// capacity, if any.
    ///
    /// Replacing a present key keeps its position in the eviction order.
    pub fn put(&mut self, key: Key, descriptor: Arc<StructuralDescriptor>) -> Option<Key> {
        if self.entries.insert(key.clone(), descriptor).is_some() {
            return None;
        }
        self.order.push_back(key);

        if self.order.len() > self.capacity {
            let evicted = self.order.pop_front()?;
            self.entries.remove(&evicted);
            return Some(evicted);
        }
        None
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.entries.contains_key(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Cached keys, oldest first.
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.order.iter()
    }
}

impl Default for ReflectionCache {
    fn default() -> Self {
        Self::new(DEFAULT_REFLECTION_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiResult;
    use crate::instances::AnyArc;
    use crate::markers::Marker;
    use crate::reflection::{Args, MethodInfo, ParamInfo, ReflectedType};

    struct Stub(Key);

    impl ReflectedType for Stub {
        fn key(&self) -> &Key {
            &self.0
        }
        fn markers(&self) -> &[Marker] {
            &[]
        }
        fn constructor(&self) -> Option<&[ParamInfo]> {
            None
        }
        fn methods(&self) -> &[MethodInfo] {
            &[]
        }
        fn new_instance(&self) -> DiResult<AnyArc> {
            Ok(Arc::new(()))
        }
        fn new_instance_args(&self, _args: Args) -> DiResult<AnyArc> {
            self.new_instance()
        }
        fn invoke(&self, _instance: &AnyArc, _method: &str) -> DiResult<()> {
            Ok(())
        }
    }

    fn descriptor(name: &str) -> Arc<StructuralDescriptor> {
        Arc::new(StructuralDescriptor::from_reflected(Arc::new(Stub(Key::new(name)))))
    }

    #[test]
    fn evicts_oldest_inserted_past_capacity() {
        let mut cache = ReflectionCache::new(2);
        assert_eq!(cache.put(Key::new("a"), descriptor("a")), None);
        assert_eq!(cache.put(Key::new("b"), descriptor("b")), None);

        // Reads do not refresh position.
        assert!(cache.get(&Key::new("a")).is_some());

        assert_eq!(cache.put(Key::new("c"), descriptor("c")), Some(Key::new("a")));
        assert!(!cache.contains(&Key::new("a")));
        assert_eq!(cache.len(), 2);
        assert_eq!(
            cache.keys().cloned().collect::<Vec<_>>(),
            vec![Key::new("b"), Key::new("c")]
        );
    }

    #[test]
    fn replacing_keeps_position() {
        let mut cache = ReflectionCache::new(2);
        cache.put(Key::new("a"), descriptor("a"));
        cache.put(Key::new("b"), descriptor("b"));
        assert_eq!(cache.put(Key::new("a"), descriptor("a")), None);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.put(Key::new("c"), descriptor("c")), Some(Key::new("a")));
    }

    #[test]
    fn zero_capacity_caches_nothing() {
        let mut cache = ReflectionCache::new(0);
        assert_eq!(cache.put(Key::new("a"), descriptor("a")), Some(Key::new("a")));
        assert!(cache.is_empty());
        assert!(cache.get(&Key::new("a")).is_none());
    }

    #[test]
    fn default_capacity_is_one_hundred() {
        let mut cache = ReflectionCache::default();
        for i in 0..100 {
            assert_eq!(cache.put(Key::new(format!("t{i}")), descriptor("t")), None);
        }
        assert_eq!(cache.put(Key::new("t100"), descriptor("t")), Some(Key::new("t0")));
        assert_eq!(cache.len(), 100);
    }
}
