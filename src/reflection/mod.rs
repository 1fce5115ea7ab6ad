//! Type introspection boundary.
//!
//! The resolver never inspects Rust types itself. Everything it needs to know
//! about a type (constructor parameters, markers, methods) and everything it
//! needs to do with one (instantiate it, call its initializer) goes through
//! [`TypeIntrospector`] and [`ReflectedType`]. [`TypeCatalog`] is the bundled
//! implementation; hosts with their own metadata source implement the traits
//! directly.

use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::instances::AnyArc;
use crate::key::Key;
use crate::markers::{Marker, MarkerAttachment};

pub mod catalog;

pub use catalog::{ClassBuilder, TypeCatalog};

/// Source of type descriptions.
pub trait TypeIntrospector: Send + Sync {
    /// Describes the type named by `key`.
    ///
    /// Unknown and non-instantiable types fail with
    /// [`DiError::UnresolvableType`].
    fn reflect(&self, key: &Key) -> DiResult<Arc<dyn ReflectedType>>;

    /// Views an instance of `concrete` as the abstract type `target`.
    ///
    /// Used when a binding maps a trait-object key to a concrete type: the
    /// returned value is an `Arc<Arc<dyn Trait>>` sharing the instance. The
    /// default implementation has no views.
    fn upcast(&self, concrete: &Key, instance: &AnyArc, target: &Key) -> Option<AnyArc> {
        let _ = (concrete, instance, target);
        None
    }
}

/// Introspected view of one concrete type.
pub trait ReflectedType: Send + Sync {
    fn key(&self) -> &Key;

    /// Markers attached to the type itself.
    fn markers(&self) -> &[Marker];

    /// Constructor parameters in declaration order, or `None` when the type
    /// declares no constructor.
    fn constructor(&self) -> Option<&[ParamInfo]>;

    /// Declared methods in declaration order.
    fn methods(&self) -> &[MethodInfo];

    /// Instantiates a type that declares no constructor.
    fn new_instance(&self) -> DiResult<AnyArc>;

    /// Invokes the constructor with resolved arguments.
    fn new_instance_args(&self, args: Args) -> DiResult<AnyArc>;

    /// Calls a no-argument method on an instance of this type.
    fn invoke(&self, instance: &AnyArc, method: &str) -> DiResult<()>;
}

/// One constructor parameter.
#[derive(Debug, Clone)]
pub struct ParamInfo {
    name: String,
    declared_type: Option<Key>,
    markers: Vec<MarkerAttachment>,
}

impl ParamInfo {
    pub fn typed(name: impl Into<String>, declared_type: impl Into<Key>) -> Self {
        Self {
            name: name.into(),
            declared_type: Some(declared_type.into()),
            markers: Vec::new(),
        }
    }

    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: None,
            markers: Vec::new(),
        }
    }

    pub fn with_marker(mut self, marker: MarkerAttachment) -> Self {
        self.markers.push(marker);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_type(&self) -> Option<&Key> {
        self.declared_type.as_ref()
    }

    pub fn markers(&self) -> &[MarkerAttachment] {
        &self.markers
    }
}

/// One declared method.
#[derive(Debug, Clone)]
pub struct MethodInfo {
    name: String,
    markers: Vec<Marker>,
}

impl MethodInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            markers: Vec::new(),
        }
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn is_initializer(&self) -> bool {
        self.markers.iter().any(Marker::is_initializer)
    }
}

/// Resolved constructor arguments, in parameter order.
///
/// Values are type-erased; constructors read them back with [`Args::get`] for
/// concrete types and [`Args::get_trait`] for trait-object parameters.
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{Args, AnyArc};
/// use std::sync::Arc;
///
/// let args: Args = vec![Arc::new(8080u16) as AnyArc].into_iter().collect();
/// assert_eq!(*args.get::<u16>(0).unwrap(), 8080);
/// assert!(args.get::<String>(0).is_err());
/// assert!(args.get::<u16>(1).is_err());
/// ```
#[derive(Clone, Default)]
pub struct Args {
    values: Vec<AnyArc>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, value: AnyArc) {
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The raw argument at `index`.
    pub fn get_any(&self, index: usize) -> DiResult<&AnyArc> {
        self.values
            .get(index)
            .ok_or(DiError::MissingArgument { index })
    }

    /// The argument at `index` as a concrete type.
    pub fn get<T: Send + Sync + 'static>(&self, index: usize) -> DiResult<Arc<T>> {
        self.get_any(index)?
            .clone()
            .downcast::<T>()
            .map_err(|_| DiError::TypeMismatch {
                expected: std::any::type_name::<T>(),
            })
    }

    /// The argument at `index` as a trait object.
    ///
    /// Trait-object views are stored as `Arc<Arc<dyn Trait>>`.
    pub fn get_trait<T>(&self, index: usize) -> DiResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.get_any(index)?
            .clone()
            .downcast::<Arc<T>>()
            .map(|boxed| (*boxed).clone())
            .map_err(|_| DiError::TypeMismatch {
                expected: std::any::type_name::<T>(),
            })
    }

    /// A clone of the value at `index`.
    pub fn cloned<T: Clone + Send + Sync + 'static>(&self, index: usize) -> DiResult<T> {
        Ok((*self.get::<T>(index)?).clone())
    }
}

impl FromIterator<AnyArc> for Args {
    fn from_iter<I: IntoIterator<Item = AnyArc>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Args").field("len", &self.values.len()).finish()
    }
}
