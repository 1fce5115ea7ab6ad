//! Container builder.

use std::sync::Arc;

use crate::config::ContainerConfig;
use crate::container::Container;
use crate::error::DiResult;
use crate::key::Key;
use crate::markers::Attribute;
use crate::observer::{Observers, ResolutionObserver};
use crate::reflection::TypeIntrospector;

/// Collects configuration, observers, registry entries and custom markers
/// before the container exists.
///
/// Observers can only be attached here; everything else can also be changed
/// on the built [`Container`].
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{Container, ContainerConfig, Key, LoggingObserver, TypeCatalog};
/// use std::sync::Arc;
///
/// struct MemoryStore;
///
/// let catalog = TypeCatalog::new();
/// catalog.register::<MemoryStore>().construct_with(|| MemoryStore);
///
/// let container = Container::builder(Arc::new(catalog))
///     .config(ContainerConfig::default().with_reflection_cache_capacity(10))
///     .add_observer(Arc::new(LoggingObserver::new()))
///     .bind("Store", Key::of::<MemoryStore>())
///     .alias("Store", "store")
///     .build()
///     .unwrap();
///
/// assert_eq!(container.canonicalize(&Key::new("store")).unwrap(), Key::of::<MemoryStore>());
/// ```
pub struct ContainerBuilder {
    introspector: Arc<dyn TypeIntrospector>,
    config: ContainerConfig,
    observers: Observers,
    custom_markers: Vec<Key>,
    bindings: Vec<(Key, Key)>,
    aliases: Vec<(Key, Key)>,
}

impl ContainerBuilder {
    pub fn new(introspector: Arc<dyn TypeIntrospector>) -> Self {
        Self {
            introspector,
            config: ContainerConfig::default(),
            observers: Observers::new(),
            custom_markers: Vec::new(),
            bindings: Vec::new(),
            aliases: Vec::new(),
        }
    }

    pub fn config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds an observer notified of every resolution event.
    pub fn add_observer(mut self, observer: Arc<dyn ResolutionObserver>) -> Self {
        self.observers.add(observer);
        self
    }

    pub fn register_custom_marker(mut self, marker: impl Into<Key>) -> Self {
        self.custom_markers.push(marker.into());
        self
    }

    pub fn register_custom_marker_type<M: Attribute>(self) -> Self {
        self.register_custom_marker(Key::of::<M>())
    }

    /// See [`Container::bind`].
    pub fn bind(mut self, abstract_key: impl Into<Key>, concrete: impl Into<Key>) -> Self {
        self.bindings.push((abstract_key.into(), concrete.into()));
        self
    }

    /// See [`Container::alias`].
    pub fn alias(mut self, target: impl Into<Key>, alias_name: impl Into<Key>) -> Self {
        self.aliases.push((target.into(), alias_name.into()));
        self
    }

    /// Validates the configuration and creates the container.
    ///
    /// Registry entries are applied in the order they were added.
    pub fn build(self) -> DiResult<Container> {
        self.config.validate()?;

        let container = Container::from_parts(
            self.introspector,
            self.config,
            self.observers,
            self.custom_markers,
        );
        for (abstract_key, concrete) in self.bindings {
            container.bind(abstract_key, concrete);
        }
        for (target, alias_name) in self.aliases {
            container.alias(target, alias_name);
        }
        Ok(container)
    }
}
