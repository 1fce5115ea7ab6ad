//! Markers attached to types, methods and constructor parameters.
//!
//! Two markers are built in: [`Marker::Singleton`] on a type and
//! [`Marker::Initializer`] on a method. Everything else is a custom marker,
//! a value implementing [`Attribute`] carried in a [`MarkerAttachment`].
//! A custom marker attached to a constructor parameter takes over that
//! parameter's injection once its type is registered with
//! [`Container::register_custom_marker`](crate::Container::register_custom_marker).

use std::fmt;
use std::sync::Arc;

use crate::container::ResolverContext;
use crate::error::{DiError, DiResult};
use crate::instances::AnyArc;
use crate::key::Key;
use crate::traits::ResolverCore;

/// Tag attached to a type, method or parameter.
#[derive(Clone, Debug)]
pub enum Marker {
    /// The type is a singleton (type level, no payload)
    Singleton,
    /// The method runs once after construction (method level, no payload)
    Initializer,
}

impl Marker {
    pub fn is_singleton(&self) -> bool {
        matches!(self, Marker::Singleton)
    }

    pub fn is_initializer(&self) -> bool {
        matches!(self, Marker::Initializer)
    }
}

type AttributeFactory = Arc<dyn Fn() -> Box<dyn Attribute> + Send + Sync>;

/// A custom marker as attached to a declaration.
///
/// The attachment records the marker type and how to instantiate it with the
/// metadata given at the attachment site. Instantiation happens at injection
/// time, once per injected argument.
#[derive(Clone)]
pub struct MarkerAttachment {
    marker: Key,
    factory: AttributeFactory,
}

impl MarkerAttachment {
    /// Attaches `attribute`; the marker key is the attribute's Rust type.
    pub fn new<A>(attribute: A) -> Self
    where
        A: Attribute + Clone,
    {
        Self {
            marker: Key::of::<A>(),
            factory: Arc::new(move || Box::new(attribute.clone()) as Box<dyn Attribute>),
        }
    }

    /// Attaches a marker identified by `marker`, instantiated through `factory`.
    pub fn with_factory<F>(marker: impl Into<Key>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Attribute> + Send + Sync + 'static,
    {
        Self {
            marker: marker.into(),
            factory: Arc::new(factory),
        }
    }

    pub fn marker(&self) -> &Key {
        &self.marker
    }

    /// Creates the marker instance.
    pub fn instantiate(&self) -> Box<dyn Attribute> {
        (self.factory)()
    }
}

impl fmt::Debug for MarkerAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkerAttachment")
            .field("marker", &self.marker)
            .finish()
    }
}

/// Custom marker value.
///
/// Markers that can satisfy a constructor parameter expose that capability by
/// returning `Some(self)` from [`as_property`](Attribute::as_property). A marker
/// that answers `None` is rejected with [`DiError::InvalidAttribute`] when it is
/// used for injection.
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{Attribute, AnyArc, DiResult, PropertyAttribute, ResolverContext};
/// use std::sync::Arc;
///
/// #[derive(Clone)]
/// struct Port(u16);
///
/// impl Attribute for Port {
///     fn as_property(&self) -> Option<&dyn PropertyAttribute> {
///         Some(self)
///     }
/// }
///
/// impl PropertyAttribute for Port {
///     fn inject(&self, _ctx: &ResolverContext<'_>) -> DiResult<AnyArc> {
///         Ok(Arc::new(self.0))
///     }
/// }
/// ```
pub trait Attribute: Send + Sync + 'static {
    /// Capability check for value injection.
    fn as_property(&self) -> Option<&dyn PropertyAttribute> {
        None
    }
}

/// Produces the value injected for a marked constructor parameter.
pub trait PropertyAttribute: Send + Sync {
    /// Returns the argument value. `ctx` resolves other types through the
    /// same container and construction stack.
    fn inject(&self, ctx: &ResolverContext<'_>) -> DiResult<AnyArc>;
}

/// Injects an environment variable as `Arc<String>`.
///
/// Fails when the variable is unset and no default was given.
#[derive(Debug, Clone)]
pub struct Env {
    var: String,
    default: Option<String>,
}

impl Env {
    pub fn new(var: impl Into<String>) -> Self {
        Self {
            var: var.into(),
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

impl Attribute for Env {
    fn as_property(&self) -> Option<&dyn PropertyAttribute> {
        Some(self)
    }
}

impl PropertyAttribute for Env {
    fn inject(&self, _ctx: &ResolverContext<'_>) -> DiResult<AnyArc> {
        match std::env::var(&self.var).ok().or_else(|| self.default.clone()) {
            Some(value) => Ok(Arc::new(value)),
            None => Err(DiError::Construction {
                key: Key::of::<Env>(),
                message: format!("environment variable {} is not set", self.var),
            }),
        }
    }
}

/// Injects a clone of a literal value as `Arc<T>`.
#[derive(Debug, Clone)]
pub struct Value<T>(pub T);

impl<T> Attribute for Value<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn as_property(&self) -> Option<&dyn PropertyAttribute> {
        Some(self)
    }
}

impl<T> PropertyAttribute for Value<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn inject(&self, _ctx: &ResolverContext<'_>) -> DiResult<AnyArc> {
        Ok(Arc::new(self.0.clone()))
    }
}

/// Injects whatever another key resolves to, typically an alias.
///
/// When the key is bound to a type that registered a trait-object view for
/// it, the view is injected.
#[derive(Debug, Clone)]
pub struct Named(pub Key);

impl Named {
    pub fn new(key: impl Into<Key>) -> Self {
        Named(key.into())
    }
}

impl Attribute for Named {
    fn as_property(&self) -> Option<&dyn PropertyAttribute> {
        Some(self)
    }
}

impl PropertyAttribute for Named {
    fn inject(&self, ctx: &ResolverContext<'_>) -> DiResult<AnyArc> {
        ctx.resolve_view(&self.0)
    }
}
