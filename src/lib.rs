//! # ferrous-autowire
//!
//! Autowiring dependency resolution for Rust: ask for a type and get a fully
//! constructed, initialized instance, with constructor dependencies resolved
//! recursively from what the types declare about themselves.
//!
//! ## Features
//!
//! - **Autowiring**: constructor parameters are resolved from their declared types
//! - **Aliases and bindings**: redirect abstract or named keys to concrete types
//! - **Singleton and transient lifetimes**, chosen by a marker on the type
//! - **Initializers**: a marked method runs once after construction
//! - **Custom markers**: parameter-level attributes that inject their own values
//! - **Circular dependency detection** with the full construction path
//! - **Bounded reflection cache**: FIFO, 100 descriptors by default
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_autowire::{Container, Resolver, TypeCatalog};
//! use std::sync::Arc;
//!
//! struct Database {
//!     connection_string: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! // Describe the types once
//! let catalog = TypeCatalog::new();
//! catalog.register::<Database>()
//!     .singleton()
//!     .construct_with(|| Database { connection_string: "postgres://localhost".to_string() });
//! catalog.register::<UserService>()
//!     .param::<Database>("db")
//!     .construct(|args| Ok(UserService { db: args.get(0)? }));
//!
//! // Resolve on demand
//! let container = Container::new(Arc::new(catalog));
//! let user_service = container.get_required::<UserService>();
//! assert_eq!(user_service.db.connection_string, "postgres://localhost");
//! ```
//!
//! ## Lifetimes
//!
//! - **Singleton**: created on first resolution, stored, and shared afterwards
//! - **Transient**: created fresh on every resolution (the default)
//!
//! ## Trait Bindings
//!
//! ```rust
//! use ferrous_autowire::{Container, Key, Resolver, TypeCatalog};
//! use std::sync::Arc;
//!
//! trait Logger: Send + Sync {
//!     fn log(&self, message: &str) -> String;
//! }
//!
//! struct ConsoleLogger;
//! impl Logger for ConsoleLogger {
//!     fn log(&self, message: &str) -> String {
//!         format!("[LOG] {message}")
//!     }
//! }
//!
//! struct Worker { logger: Arc<dyn Logger> }
//!
//! let catalog = TypeCatalog::new();
//! catalog.register::<ConsoleLogger>()
//!     .singleton()
//!     .implements::<dyn Logger, _>(|logger| logger as Arc<dyn Logger>)
//!     .construct_with(|| ConsoleLogger);
//! catalog.register::<Worker>()
//!     .param::<dyn Logger>("logger")
//!     .construct(|args| Ok(Worker { logger: args.get_trait(0)? }));
//!
//! let container = Container::new(Arc::new(catalog));
//! container.bind(Key::of::<dyn Logger>(), Key::of::<ConsoleLogger>());
//!
//! let worker = container.get_required::<Worker>();
//! assert_eq!(worker.logger.log("ready"), "[LOG] ready");
//! ```

pub mod cache;
pub mod config;
pub mod container;
pub mod descriptors;
pub mod error;
pub mod instances;
pub mod key;
pub mod lifetime;
pub mod markers;
pub mod metrics;
pub mod observer;
pub mod reflection;
pub mod registry;
pub mod traits;

// Internal modules
mod internal;

// Re-export core types
pub use cache::{ReflectionCache, DEFAULT_REFLECTION_CACHE_CAPACITY};
pub use config::{
    Canonicalization, ConfigSource, ContainerConfig, EnvironmentConfigSource, MapConfigSource,
};
pub use container::{Container, ContainerBuilder, ResolverContext};
pub use descriptors::{ParamDescriptor, StructuralDescriptor};
pub use error::{DiError, DiResult};
pub use instances::{AnyArc, InstanceStore};
pub use key::{key_of_type, Key};
pub use lifetime::Lifetime;
pub use markers::{Attribute, Marker, MarkerAttachment, PropertyAttribute};
pub use metrics::ContainerStats;
pub use observer::{LoggingObserver, ResolutionObserver};
pub use reflection::{
    Args, ClassBuilder, MethodInfo, ParamInfo, ReflectedType, TypeCatalog, TypeIntrospector,
};
pub use registry::TypeRegistry;
pub use traits::{Resolver, ResolverCore};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Counter(AtomicUsize);

    #[test]
    fn test_singleton_resolution() {
        let catalog = TypeCatalog::new();
        catalog
            .register::<Counter>()
            .singleton()
            .construct_with(|| Counter(AtomicUsize::new(42)));

        let container = Container::new(Arc::new(catalog));
        let a = container.get_required::<Counter>();
        let b = container.get_required::<Counter>();

        assert_eq!(a.0.load(Ordering::SeqCst), 42);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_transient_resolution() {
        let created = Arc::new(AtomicUsize::new(0));
        let created_clone = created.clone();

        let catalog = TypeCatalog::new();
        catalog.register::<Counter>().construct_with(move || {
            Counter(AtomicUsize::new(created_clone.fetch_add(1, Ordering::SeqCst)))
        });

        let container = Container::new(Arc::new(catalog));
        let a = container.get_required::<Counter>();
        let b = container.get_required::<Counter>();

        assert_eq!(a.0.load(Ordering::SeqCst), 0);
        assert_eq!(b.0.load(Ordering::SeqCst), 1);
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(created.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_circular_dependency_detection() {
        let catalog = TypeCatalog::new();
        catalog
            .register_as::<()>("A")
            .param_key("b", "B")
            .construct(|_| Ok(()));
        catalog
            .register_as::<()>("B")
            .param_key("a", "A")
            .construct(|_| Ok(()));

        let container = Container::new(Arc::new(catalog));
        match container.resolve(&Key::new("A")) {
            Err(DiError::CircularDependency { requested, path }) => {
                assert_eq!(requested, Key::new("A"));
                assert_eq!(path, vec![Key::new("A"), Key::new("B"), Key::new("A")]);
            }
            other => panic!("expected circular dependency, got {:?}", other.map(|_| ())),
        }
        assert_eq!(container.construction_depth(), 0);
    }

    #[test]
    fn test_not_found() {
        let container = Container::new(Arc::new(TypeCatalog::new()));
        assert!(matches!(
            container.get::<Counter>(),
            Err(DiError::UnresolvableType { .. })
        ));
    }
}
