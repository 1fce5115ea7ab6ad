//! Instance lifetime definitions.

/// Lifetime of a resolved instance
///
/// The lifetime is not registered separately: it is read from the type's
/// markers when its descriptor is built. A type carrying
/// [`Marker::Singleton`](crate::Marker::Singleton) is a singleton, every other
/// type is transient.
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{Container, Lifetime, Resolver, TypeCatalog};
/// use std::sync::Arc;
///
/// struct Clock;
/// struct Request;
///
/// let catalog = TypeCatalog::new();
/// catalog.register::<Clock>().singleton().construct(|_| Ok(Clock));
/// catalog.register::<Request>().construct(|_| Ok(Request));
///
/// let container = Container::new(Arc::new(catalog));
///
/// // Singleton: same instance every time
/// let a = container.get_required::<Clock>();
/// let b = container.get_required::<Clock>();
/// assert!(Arc::ptr_eq(&a, &b));
///
/// // Transient: new instance per resolution
/// let r1 = container.get_required::<Request>();
/// let r2 = container.get_required::<Request>();
/// assert!(!Arc::ptr_eq(&r1, &r2));
///
/// let descriptor = container.descriptor(&ferrous_autowire::key_of_type::<Clock>()).unwrap();
/// assert_eq!(descriptor.lifetime(), Lifetime::Singleton);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifetime {
    /// Created on first resolution and kept in the instance store
    ///
    /// The instance lives until it is explicitly forgotten or the container's
    /// instance store is cleared. Its initializer runs once per construction.
    Singleton,
    /// New instance per resolution, never stored
    #[default]
    Transient,
}
