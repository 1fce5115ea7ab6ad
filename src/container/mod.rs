//! The autowiring container.
//!
//! [`Container`] ties the registry, the reflection cache, the construction
//! stack and the instance store together behind the resolution algorithm.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;

use crate::cache::ReflectionCache;
use crate::config::ContainerConfig;
use crate::descriptors::{ParamDescriptor, StructuralDescriptor};
use crate::error::{DiError, DiResult};
use crate::instances::{AnyArc, InstanceStore};
use crate::internal::{circular, ConstructionGuard};
use crate::key::Key;
use crate::markers::{Attribute, MarkerAttachment};
use crate::metrics::{ContainerStats, StatsCounters};
use crate::observer::Observers;
use crate::reflection::{Args, TypeIntrospector};
use crate::registry::TypeRegistry;
use crate::traits::{Resolver, ResolverCore};

pub mod builder;
pub mod context;

pub use builder::ContainerBuilder;
pub use context::ResolverContext;

static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

/// Dependency resolution engine.
///
/// Given a key, the container produces a fully constructed and initialized
/// instance, resolving constructor dependencies recursively. Types are
/// described by a [`TypeIntrospector`]; nothing has to be registered up front
/// beyond that.
///
/// Resolution of a key goes through these steps:
///
/// 1. Follow aliases and bindings to the concrete key.
/// 2. Return the stored instance for the concrete key, if any.
/// 3. Fail with [`DiError::CircularDependency`] if the concrete key is already
///    being constructed on this thread, otherwise push it on the construction
///    stack.
/// 4. Fetch the type's descriptor from the reflection cache, introspecting it
///    on a miss.
/// 5. Resolve each constructor parameter in order, through a recognized
///    custom marker or else its declared type.
/// 6. Instantiate, run the initializer, and store the instance if the type is
///    a singleton.
///
/// The construction stack entry is popped on every exit path.
///
/// `Container` is cheap to clone; clones share all state.
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{Container, Resolver, TypeCatalog};
/// use std::sync::Arc;
///
/// struct Animal { name: String }
/// struct User { pet: Arc<Animal> }
///
/// let catalog = TypeCatalog::new();
/// catalog.register::<Animal>()
///     .singleton()
///     .construct_with(|| Animal { name: "Rex".to_string() });
/// catalog.register::<User>()
///     .param::<Animal>("pet")
///     .construct(|args| Ok(User { pet: args.get(0)? }));
///
/// let container = Container::new(Arc::new(catalog));
/// let first = container.get_required::<User>();
/// let second = container.get_required::<User>();
///
/// assert!(!Arc::ptr_eq(&first, &second));
/// assert!(Arc::ptr_eq(&first.pet, &second.pet));
/// assert_eq!(first.pet.name, "Rex");
/// ```
pub struct Container {
    inner: Arc<ContainerInner>,
}

pub(crate) struct ContainerInner {
    id: u64,
    config: ContainerConfig,
    introspector: Arc<dyn TypeIntrospector>,
    registry: TypeRegistry,
    cache: RwLock<ReflectionCache>,
    instances: InstanceStore,
    custom_markers: RwLock<HashSet<Key>>,
    observers: Observers,
    stats: StatsCounters,
}

/// Whether a freshly introspected top-level descriptor goes into the cache.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Caching {
    Store,
    Skip,
}

impl Container {
    /// Creates a container with the default configuration.
    pub fn new(introspector: Arc<dyn TypeIntrospector>) -> Self {
        Self::from_parts(introspector, ContainerConfig::default(), Observers::new(), Vec::new())
    }

    /// Creates a container with `config`, rejecting invalid settings.
    pub fn with_config(introspector: Arc<dyn TypeIntrospector>, config: ContainerConfig) -> DiResult<Self> {
        config.validate()?;
        Ok(Self::from_parts(introspector, config, Observers::new(), Vec::new()))
    }

    /// Starts a [`ContainerBuilder`].
    pub fn builder(introspector: Arc<dyn TypeIntrospector>) -> ContainerBuilder {
        ContainerBuilder::new(introspector)
    }

    pub(crate) fn from_parts(
        introspector: Arc<dyn TypeIntrospector>,
        config: ContainerConfig,
        observers: Observers,
        custom_markers: Vec<Key>,
    ) -> Self {
        Self {
            inner: Arc::new(ContainerInner {
                id: NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed),
                cache: RwLock::new(ReflectionCache::new(config.reflection_cache_capacity)),
                config,
                introspector,
                registry: TypeRegistry::new(),
                instances: InstanceStore::new(),
                custom_markers: RwLock::new(custom_markers.into_iter().collect()),
                observers,
                stats: StatsCounters::default(),
            }),
        }
    }

    #[inline]
    fn inner(&self) -> &ContainerInner {
        &self.inner
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.inner().config
    }

    // ----- Resolution -----

    /// Resolves `key` to an instance of its concrete type.
    ///
    /// The result is the concrete instance even when `key` is a trait-object
    /// key; use [`Resolver::get_trait`] or [`ResolverCore::resolve_view`] for
    /// the trait view.
    pub fn resolve(&self, key: &Key) -> DiResult<AnyArc> {
        self.resolve_entry(key, Caching::Store, false)
    }

    /// Resolves `key` without caching a newly introspected descriptor for it.
    ///
    /// A cached descriptor is still used when present, and dependencies are
    /// resolved normally.
    pub fn resolve_uncached(&self, key: &Key) -> DiResult<AnyArc> {
        self.resolve_entry(key, Caching::Skip, false)
    }

    /// The descriptor the container uses for `key`, introspecting it if
    /// needed.
    pub fn descriptor(&self, key: &Key) -> DiResult<Arc<StructuralDescriptor>> {
        let concrete = self.canonicalize(key)?;
        self.descriptor_for(&concrete, Caching::Store)
    }

    fn resolve_entry(&self, requested: &Key, caching: Caching, view: bool) -> DiResult<AnyArc> {
        let inner = self.inner();
        inner.stats.record_resolution();

        if !inner.observers.has_observers() {
            return self.resolve_key(requested, caching, view);
        }

        let start = Instant::now();
        inner.observers.resolving(requested);
        let result = self.resolve_key(requested, caching, view);
        match &result {
            Ok(_) => inner.observers.resolved(requested, start.elapsed()),
            Err(err) => inner.observers.failed(requested, err),
        }
        result
    }

    fn resolve_key(&self, requested: &Key, caching: Caching, view: bool) -> DiResult<AnyArc> {
        let inner = self.inner();
        tracing::trace!(key = %requested, "resolving");

        let path = inner
            .registry
            .redirections(requested, inner.config.canonicalization)?;
        let concrete = path.last().cloned().unwrap_or_else(|| requested.clone());

        let instance = self.instantiate(requested, &concrete, caching)?;
        if view {
            Ok(self.view_as(&path, instance))
        } else {
            Ok(instance)
        }
    }

    fn instantiate(&self, requested: &Key, concrete: &Key, caching: Caching) -> DiResult<AnyArc> {
        let inner = self.inner();

        if let Some(instance) = inner.instances.get(concrete) {
            inner.stats.record_singleton_hit();
            return Ok(instance);
        }

        let _guard = ConstructionGuard::enter(inner.id, concrete, requested, inner.config.max_depth)?;

        let descriptor = self.descriptor_for(concrete, caching)?;
        let reflected = descriptor.reflected();

        let instance = if descriptor.has_constructor() {
            let args = self.resolve_arguments(&descriptor)?;
            reflected.new_instance_args(args)?
        } else {
            reflected.new_instance()?
        };
        inner.stats.record_construction();

        if let Some(method) = descriptor.initializer() {
            reflected.invoke(&instance, method)?;
            inner.stats.record_initializer();
        }

        if descriptor.is_singleton() {
            // A concurrent chain may have stored one first; keep that one.
            return Ok(inner.instances.persist(concrete.clone(), instance));
        }
        Ok(instance)
    }

    fn descriptor_for(&self, concrete: &Key, caching: Caching) -> DiResult<Arc<StructuralDescriptor>> {
        let inner = self.inner();

        let cached = inner.cache.read().get(concrete);
        if let Some(descriptor) = cached {
            inner.stats.record_cache_hit();
            return Ok(descriptor);
        }

        let reflected = inner.introspector.reflect(concrete)?;
        let descriptor = Arc::new(StructuralDescriptor::from_reflected(reflected));
        inner.stats.record_introspection();
        tracing::debug!(
            key = %concrete,
            params = descriptor.params().len(),
            lifetime = ?descriptor.lifetime(),
            "introspected type"
        );
        if inner.observers.has_observers() {
            inner.observers.introspected(concrete);
        }

        if caching == Caching::Store {
            let evicted = inner.cache.write().put(concrete.clone(), descriptor.clone());
            if let Some(evicted) = evicted {
                inner.stats.record_eviction();
                tracing::debug!(key = %evicted, "evicted descriptor");
                if inner.observers.has_observers() {
                    inner.observers.evicted(&evicted);
                }
            }
        }

        Ok(descriptor)
    }

    fn resolve_arguments(&self, descriptor: &StructuralDescriptor) -> DiResult<Args> {
        let mut args = Args::with_capacity(descriptor.params().len());

        for param in descriptor.params() {
            if let Some(attachment) = self.recognized_marker(param) {
                args.push(self.inject_property(attachment)?);
                continue;
            }

            let declared = param
                .declared_type()
                .ok_or_else(|| DiError::ParameterTypeEmpty {
                    owner: descriptor.key().clone(),
                    parameter: param.name().to_string(),
                })?;
            args.push(self.resolve_entry(declared, Caching::Store, true)?);
        }

        Ok(args)
    }

    /// First marker on `param` that is registered as a custom marker.
    fn recognized_marker<'p>(&self, param: &'p ParamDescriptor) -> Option<&'p MarkerAttachment> {
        if param.markers().is_empty() {
            return None;
        }
        let recognized = self.inner().custom_markers.read();
        let found = param
            .markers()
            .iter()
            .find(|attachment| recognized.contains(attachment.marker()));
        found
    }

    fn inject_property(&self, attachment: &MarkerAttachment) -> DiResult<AnyArc> {
        let attribute = attachment.instantiate();
        let property = attribute
            .as_property()
            .ok_or_else(|| DiError::InvalidAttribute {
                marker: attachment.marker().clone(),
            })?;
        property.inject(&ResolverContext::new(self))
    }

    /// Views `instance` as the first key on the redirection path that its
    /// concrete type has a view for.
    fn view_as(&self, path: &[Key], instance: AnyArc) -> AnyArc {
        let Some((concrete, abstracts)) = path.split_last() else {
            return instance;
        };
        abstracts
            .iter()
            .find_map(|target| self.inner().introspector.upcast(concrete, &instance, target))
            .unwrap_or(instance)
    }

    // ----- Registry -----

    /// Maps `abstract_key` to `concrete`; the last binding wins.
    pub fn bind(&self, abstract_key: impl Into<Key>, concrete: impl Into<Key>) {
        self.inner().registry.bind(abstract_key.into(), concrete.into());
    }

    /// Removes the binding for `abstract_key`, if any.
    pub fn unbind(&self, abstract_key: &Key) -> Option<Key> {
        self.inner().registry.unbind(abstract_key)
    }

    /// Makes `alias_name` resolve like `target`.
    pub fn alias(&self, target: impl Into<Key>, alias_name: impl Into<Key>) {
        self.inner().registry.alias(target.into(), alias_name.into());
    }

    pub fn unalias(&self, alias_name: &Key) -> Option<Key> {
        self.inner().registry.unalias(alias_name)
    }

    /// The concrete key `key` resolves to.
    pub fn canonicalize(&self, key: &Key) -> DiResult<Key> {
        let inner = self.inner();
        inner.registry.canonicalize(key, inner.config.canonicalization)
    }

    // ----- Instances -----

    /// Stores `instance` under `key` as given, replacing any previous one.
    ///
    /// The key is not canonicalized. A later resolution of any key that
    /// canonicalizes to `key` returns this instance without construction.
    pub fn set_instance(&self, key: impl Into<Key>, instance: AnyArc) {
        self.inner().instances.set(key.into(), instance);
    }

    /// [`set_instance`](Self::set_instance) under `T`'s type name.
    pub fn set_instance_of<T: Send + Sync + 'static>(&self, instance: Arc<T>) {
        self.set_instance(Key::of::<T>(), instance);
    }

    /// Drops the stored instance for `key`; the next resolution constructs
    /// a new one.
    pub fn forget(&self, key: &Key) -> Option<AnyArc> {
        self.inner().instances.remove(key)
    }

    pub fn has_instance(&self, key: &Key) -> bool {
        self.inner().instances.contains(key)
    }

    // ----- Custom markers -----

    /// Recognizes `marker` on constructor parameters from now on.
    /// Registering the same marker twice has no further effect.
    pub fn register_custom_marker(&self, marker: impl Into<Key>) {
        let marker = marker.into();
        tracing::debug!(marker = %marker, "registered custom marker");
        self.inner().custom_markers.write().insert(marker);
    }

    /// [`register_custom_marker`](Self::register_custom_marker) for the
    /// attribute type `M`.
    pub fn register_custom_marker_type<M: Attribute>(&self) {
        self.register_custom_marker(Key::of::<M>());
    }

    pub fn is_custom_marker(&self, marker: &Key) -> bool {
        self.inner().custom_markers.read().contains(marker)
    }

    // ----- Lifecycle -----

    pub fn clear_reflection_cache(&self) {
        self.inner().cache.write().clear();
    }

    /// Drops every stored instance, singletons and manual ones alike.
    pub fn clear_instances(&self) {
        self.inner().instances.clear();
    }

    /// Clears bindings, aliases, cached descriptors, stored instances and
    /// registered custom markers. Counters are kept.
    pub fn reset(&self) {
        let inner = self.inner();
        inner.registry.clear();
        inner.cache.write().clear();
        inner.instances.clear();
        inner.custom_markers.write().clear();
        tracing::debug!("container reset");
    }

    pub fn reset_stats(&self) {
        self.inner().stats.reset();
    }

    pub fn stats(&self) -> ContainerStats {
        self.inner().stats.snapshot()
    }

    /// Number of descriptors currently cached.
    pub fn cached_descriptors(&self) -> usize {
        self.inner().cache.read().len()
    }

    /// Whether the descriptor for the concrete `key` is cached.
    pub fn is_descriptor_cached(&self, key: &Key) -> bool {
        self.inner().cache.read().contains(key)
    }

    /// Keys this container is constructing on the current thread.
    ///
    /// Zero outside of a resolution.
    pub fn construction_depth(&self) -> usize {
        circular::depth(self.inner().id)
    }

    /// Human-readable dump of the container state.
    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let inner = self.inner();
        let mut s = String::new();
        s.push_str("=== Container Debug ===\n");
        s.push_str("Aliases:\n");
        for (alias, target) in inner.registry.aliases() {
            s.push_str(&format!("  {alias} -> {target}\n"));
        }
        s.push_str("Bindings:\n");
        for (abstract_key, concrete) in inner.registry.bindings() {
            s.push_str(&format!("  {abstract_key} => {concrete}\n"));
        }
        s.push_str("Instances:\n");
        let mut instances = inner.instances.keys();
        instances.sort();
        for key in instances {
            s.push_str(&format!("  {key}\n"));
        }
        s.push_str("Cached descriptors (oldest first):\n");
        for key in inner.cache.read().keys() {
            s.push_str(&format!("  {key}\n"));
        }
        s
    }
}

impl Clone for Container {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("id", &self.inner.id)
            .field("config", &self.inner.config)
            .field("instances", &self.inner.instances.len())
            .field("cached_descriptors", &self.cached_descriptors())
            .finish()
    }
}

impl ResolverCore for Container {
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc> {
        self.resolve(key)
    }

    fn resolve_view(&self, key: &Key) -> DiResult<AnyArc> {
        self.resolve_entry(key, Caching::Store, true)
    }
}

impl Resolver for Container {}
