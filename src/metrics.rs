//! Resolution counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of a container's counters.
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{Container, TypeCatalog};
/// use std::sync::Arc;
///
/// struct Config;
///
/// let catalog = TypeCatalog::new();
/// let key = catalog.register::<Config>().singleton().construct_with(|| Config);
/// let container = Container::new(Arc::new(catalog));
///
/// container.resolve(&key).unwrap();
/// container.resolve(&key).unwrap();
///
/// let stats = container.stats();
/// assert_eq!(stats.resolutions, 2);
/// assert_eq!(stats.constructions, 1);
/// assert_eq!(stats.singleton_hits, 1);
/// assert_eq!(stats.introspections, 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContainerStats {
    /// Calls to resolve, nested ones included.
    pub resolutions: u64,
    /// Resolutions answered from the instance store.
    pub singleton_hits: u64,
    /// Descriptors served by the reflection cache.
    pub cache_hits: u64,
    /// Descriptors built by the introspector.
    pub introspections: u64,
    /// Descriptors evicted by the FIFO bound.
    pub evictions: u64,
    /// Instances created.
    pub constructions: u64,
    pub initializers_run: u64,
}

impl ContainerStats {
    /// Share of descriptor lookups served from the cache, if any happened.
    pub fn cache_hit_rate(&self) -> Option<f64> {
        let lookups = self.cache_hits + self.introspections;
        if lookups == 0 {
            None
        } else {
            Some(self.cache_hits as f64 / lookups as f64)
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    resolutions: AtomicU64,
    singleton_hits: AtomicU64,
    cache_hits: AtomicU64,
    introspections: AtomicU64,
    evictions: AtomicU64,
    constructions: AtomicU64,
    initializers_run: AtomicU64,
}

macro_rules! counter {
    ($($name:ident => $field:ident),* $(,)?) => {
        $(
            #[inline]
            pub(crate) fn $name(&self) {
                self.$field.fetch_add(1, Ordering::Relaxed);
            }
        )*
    };
}

impl StatsCounters {
    counter! {
        record_resolution => resolutions,
        record_singleton_hit => singleton_hits,
        record_cache_hit => cache_hits,
        record_introspection => introspections,
        record_eviction => evictions,
        record_construction => constructions,
        record_initializer => initializers_run,
    }

    pub(crate) fn snapshot(&self) -> ContainerStats {
        ContainerStats {
            resolutions: self.resolutions.load(Ordering::Relaxed),
            singleton_hits: self.singleton_hits.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            introspections: self.introspections.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            constructions: self.constructions.load(Ordering::Relaxed),
            initializers_run: self.initializers_run.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn reset(&self) {
        for counter in [
            &self.resolutions,
            &self.singleton_hits,
            &self.cache_hits,
            &self.introspections,
            &self.evictions,
            &self.constructions,
            &self.initializers_run,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
