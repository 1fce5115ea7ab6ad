//! Structural descriptors: what the resolver needs to know about a type.

use std::fmt;
use std::sync::Arc;

use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::markers::{Marker, MarkerAttachment};
use crate::reflection::{ParamInfo, ReflectedType};

/// Cached description of one concrete type
///
/// Built once from the introspector's [`ReflectedType`] and kept in the
/// reflection cache, so type markers are scanned only when a descriptor is
/// (re)built. The descriptor also holds the reflected handle used to
/// instantiate the type and call its initializer.
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{Container, Lifetime, TypeCatalog, key_of_type};
/// use std::sync::Arc;
///
/// struct Database;
/// struct Repository { db: Arc<Database> }
///
/// let catalog = TypeCatalog::new();
/// catalog.register::<Database>().singleton().construct_with(|| Database);
/// catalog.register::<Repository>()
///     .param::<Database>("db")
///     .initializer("warm_up", |_: &Repository| Ok(()))
///     .initializer("never_called", |_: &Repository| Ok(()))
///     .construct(|args| Ok(Repository { db: args.get(0)? }));
///
/// let container = Container::new(Arc::new(catalog));
/// let descriptor = container.descriptor(&key_of_type::<Repository>()).unwrap();
///
/// assert_eq!(descriptor.lifetime(), Lifetime::Transient);
/// assert!(descriptor.has_constructor());
/// assert_eq!(descriptor.params().len(), 1);
/// assert_eq!(descriptor.params()[0].name(), "db");
/// assert_eq!(descriptor.initializer(), Some("warm_up"));
/// ```
#[derive(Clone)]
pub struct StructuralDescriptor {
    key: Key,
    lifetime: Lifetime,
    has_constructor: bool,
    params: Vec<ParamDescriptor>,
    initializer: Option<String>,
    reflected: Arc<dyn ReflectedType>,
}

impl StructuralDescriptor {
    /// Extracts the descriptor from an introspected type.
    pub fn from_reflected(reflected: Arc<dyn ReflectedType>) -> Self {
        let lifetime = if reflected.markers().iter().any(Marker::is_singleton) {
            Lifetime::Singleton
        } else {
            Lifetime::Transient
        };

        let (has_constructor, params) = match reflected.constructor() {
            Some(params) => (true, params.iter().map(ParamDescriptor::from).collect()),
            None => (false, Vec::new()),
        };

        // First marked method in declaration order wins.
        let initializer = reflected
            .methods()
            .iter()
            .find(|method| method.is_initializer())
            .map(|method| method.name().to_string());

        Self {
            key: reflected.key().clone(),
            lifetime,
            has_constructor,
            params,
            initializer,
            reflected,
        }
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub fn is_singleton(&self) -> bool {
        self.lifetime == Lifetime::Singleton
    }

    /// Whether the type declares a constructor, even one without parameters.
    pub fn has_constructor(&self) -> bool {
        self.has_constructor
    }

    pub fn params(&self) -> &[ParamDescriptor] {
        &self.params
    }

    /// Name of the method run after construction.
    pub fn initializer(&self) -> Option<&str> {
        self.initializer.as_deref()
    }

    pub(crate) fn reflected(&self) -> &Arc<dyn ReflectedType> {
        &self.reflected
    }
}

impl fmt::Debug for StructuralDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuralDescriptor")
            .field("key", &self.key)
            .field("lifetime", &self.lifetime)
            .field("has_constructor", &self.has_constructor)
            .field("params", &self.params)
            .field("initializer", &self.initializer)
            .finish()
    }
}

/// One constructor parameter as the resolver sees it.
#[derive(Debug, Clone)]
pub struct ParamDescriptor {
    name: String,
    declared_type: Option<Key>,
    markers: Vec<MarkerAttachment>,
}

impl ParamDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_type(&self) -> Option<&Key> {
        self.declared_type.as_ref()
    }

    /// Custom markers attached to the parameter, in attachment order.
    pub fn markers(&self) -> &[MarkerAttachment] {
        &self.markers
    }
}

impl From<&ParamInfo> for ParamDescriptor {
    fn from(param: &ParamInfo) -> Self {
        Self {
            name: param.name().to_string(),
            declared_type: param.declared_type().cloned(),
            markers: param.markers().to_vec(),
        }
    }
}
