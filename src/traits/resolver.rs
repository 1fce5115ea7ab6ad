//! Resolver traits.

use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::instances::AnyArc;
use crate::key::Key;

/// Object-safe resolution entry points.
///
/// Implemented by [`Container`](crate::Container) and by the
/// [`ResolverContext`](crate::ResolverContext) handed to property injectors.
pub trait ResolverCore: Send + Sync {
    /// Resolves `key` to the instance of its concrete type.
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc>;

    /// Resolves `key` and views the instance as `key` itself.
    ///
    /// Differs from [`resolve_any`](Self::resolve_any) only when `key` is an
    /// abstract (trait object) key bound to a concrete type that registered a
    /// view for it: the result is then an `Arc<Arc<dyn Trait>>`.
    fn resolve_view(&self, key: &Key) -> DiResult<AnyArc> {
        self.resolve_any(key)
    }
}

/// Typed helpers over [`ResolverCore`].
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{Container, Key, Resolver, TypeCatalog};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
/// impl Greeter for English {
///     fn greet(&self) -> String { "hello".into() }
/// }
///
/// let catalog = TypeCatalog::new();
/// catalog.register::<English>()
///     .implements::<dyn Greeter, _>(|english| english as Arc<dyn Greeter>)
///     .construct_with(|| English);
///
/// let container = Container::new(Arc::new(catalog));
/// container.bind(Key::of::<dyn Greeter>(), Key::of::<English>());
///
/// let greeter = container.get_trait::<dyn Greeter>().unwrap();
/// assert_eq!(greeter.greet(), "hello");
/// assert!(container.get::<English>().is_ok());
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves `T` by its type name.
    fn get<T: Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        self.get_named::<T>(&Key::of::<T>())
    }

    /// Like [`get`](Self::get), panicking on failure.
    fn get_required<T: Send + Sync + 'static>(&self) -> Arc<T> {
        self.get::<T>()
            .unwrap_or_else(|e| panic!("Failed to resolve {}: {}", std::any::type_name::<T>(), e))
    }

    /// Resolves an arbitrary key (alias, binding or type name) and downcasts
    /// the instance to `T`.
    fn get_named<T: Send + Sync + 'static>(&self, key: &Key) -> DiResult<Arc<T>> {
        self.resolve_any(key)?
            .downcast::<T>()
            .map_err(|_| DiError::TypeMismatch {
                expected: std::any::type_name::<T>(),
            })
    }

    /// Resolves the trait object `T` through its binding.
    fn get_trait<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        self.get_trait_named::<T>(&Key::of::<T>())
    }

    /// Like [`get_trait`](Self::get_trait), panicking on failure.
    fn get_required_trait<T: ?Sized + Send + Sync + 'static>(&self) -> Arc<T> {
        self.get_trait::<T>().unwrap_or_else(|e| {
            panic!("Failed to resolve trait {}: {}", std::any::type_name::<T>(), e)
        })
    }

    /// Resolves `key` viewed as the trait object `T`.
    fn get_trait_named<T: ?Sized + Send + Sync + 'static>(&self, key: &Key) -> DiResult<Arc<T>> {
        downcast_view::<T>(self.resolve_view(key)?)
    }
}

/// Unwraps an `Arc<Arc<T>>` view.
fn downcast_view<T: ?Sized + Send + Sync + 'static>(any: AnyArc) -> DiResult<Arc<T>> {
    any.downcast::<Arc<T>>()
        .map(|view| (*view).clone())
        .map_err(|_| DiError::TypeMismatch {
            expected: std::any::type_name::<T>(),
        })
}
