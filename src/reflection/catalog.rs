//! Declarative type descriptions backing the bundled introspector.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{DiError, DiResult};
use crate::instances::AnyArc;
use crate::key::Key;
use crate::markers::{Attribute, Marker, MarkerAttachment};
use crate::reflection::{Args, MethodInfo, ParamInfo, ReflectedType, TypeIntrospector};

type ConstructFn = Arc<dyn Fn(&Args) -> DiResult<AnyArc> + Send + Sync>;
type InvokeFn = Arc<dyn Fn(&AnyArc) -> DiResult<()> + Send + Sync>;
type CastFn = Arc<dyn Fn(&AnyArc) -> Option<AnyArc> + Send + Sync>;

enum CatalogEntry {
    Concrete(Arc<CatalogType>),
    Abstract,
}

/// In-memory [`TypeIntrospector`] populated through [`ClassBuilder`].
///
/// Each type is described once: its markers, its constructor parameters, its
/// methods, and a closure that builds it from resolved [`Args`]. The container
/// introspects the catalog lazily and caches what it learns.
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{Container, Resolver, TypeCatalog};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database>, ready: AtomicBool }
///
/// let catalog = TypeCatalog::new();
/// catalog.register::<Database>()
///     .singleton()
///     .construct_with(|| Database { url: "postgres://localhost".to_string() });
/// catalog.register::<UserService>()
///     .param::<Database>("db")
///     .initializer("boot", |svc: &UserService| {
///         svc.ready.store(true, Ordering::SeqCst);
///         Ok(())
///     })
///     .construct(|args| Ok(UserService { db: args.get::<Database>(0)?, ready: AtomicBool::new(false) }));
///
/// let container = Container::new(Arc::new(catalog));
/// let service = container.get_required::<UserService>();
/// assert_eq!(service.db.url, "postgres://localhost");
/// assert!(service.ready.load(Ordering::SeqCst));
/// ```
#[derive(Default)]
pub struct TypeCatalog {
    entries: RwLock<HashMap<Key, CatalogEntry>>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts describing `T` under its type name.
    pub fn register<T: Send + Sync + 'static>(&self) -> ClassBuilder<'_, T> {
        self.register_as::<T>(Key::of::<T>())
    }

    /// Starts describing `T` under an explicit key.
    pub fn register_as<T: Send + Sync + 'static>(&self, key: impl Into<Key>) -> ClassBuilder<'_, T> {
        ClassBuilder {
            catalog: self,
            key: key.into(),
            markers: Vec::new(),
            params: Vec::new(),
            methods: Vec::new(),
            invokers: HashMap::new(),
            casts: HashMap::new(),
            _type: PhantomData,
        }
    }

    /// Declares a key that is known but cannot be instantiated, such as an
    /// interface that must be bound to an implementation.
    pub fn register_abstract(&self, key: impl Into<Key>) {
        self.entries.write().insert(key.into(), CatalogEntry::Abstract);
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.entries.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn insert(&self, ty: CatalogType) {
        self.entries
            .write()
            .insert(ty.key.clone(), CatalogEntry::Concrete(Arc::new(ty)));
    }

    fn concrete(&self, key: &Key) -> DiResult<Arc<CatalogType>> {
        match self.entries.read().get(key) {
            Some(CatalogEntry::Concrete(ty)) => Ok(ty.clone()),
            Some(CatalogEntry::Abstract) => Err(DiError::UnresolvableType {
                key: key.clone(),
                reason: "abstract type cannot be instantiated".to_string(),
            }),
            None => Err(DiError::UnresolvableType {
                key: key.clone(),
                reason: "type is not registered".to_string(),
            }),
        }
    }
}

impl TypeIntrospector for TypeCatalog {
    fn reflect(&self, key: &Key) -> DiResult<Arc<dyn ReflectedType>> {
        Ok(self.concrete(key)? as Arc<dyn ReflectedType>)
    }

    fn upcast(&self, concrete: &Key, instance: &AnyArc, target: &Key) -> Option<AnyArc> {
        let ty = self.concrete(concrete).ok()?;
        let cast = ty.casts.get(target)?;
        cast(instance)
    }
}

struct CatalogType {
    key: Key,
    markers: Vec<Marker>,
    params: Option<Vec<ParamInfo>>,
    methods: Vec<MethodInfo>,
    invokers: HashMap<String, InvokeFn>,
    ctor: ConstructFn,
    casts: HashMap<Key, CastFn>,
}

impl ReflectedType for CatalogType {
    fn key(&self) -> &Key {
        &self.key
    }

    fn markers(&self) -> &[Marker] {
        &self.markers
    }

    fn constructor(&self) -> Option<&[ParamInfo]> {
        self.params.as_deref()
    }

    fn methods(&self) -> &[MethodInfo] {
        &self.methods
    }

    fn new_instance(&self) -> DiResult<AnyArc> {
        (self.ctor)(&Args::new())
    }

    fn new_instance_args(&self, args: Args) -> DiResult<AnyArc> {
        (self.ctor)(&args)
    }

    fn invoke(&self, instance: &AnyArc, method: &str) -> DiResult<()> {
        let invoker = self.invokers.get(method).ok_or_else(|| DiError::Construction {
            key: self.key.clone(),
            message: format!("no method named {method}"),
        })?;
        invoker(instance)
    }
}

/// Fluent description of one type, finished by a `construct*` call.
///
/// Parameters, methods and markers are recorded in call order, which is the
/// declaration order the resolver honors.
pub struct ClassBuilder<'a, T> {
    catalog: &'a TypeCatalog,
    key: Key,
    markers: Vec<Marker>,
    params: Vec<ParamInfo>,
    methods: Vec<MethodInfo>,
    invokers: HashMap<String, InvokeFn>,
    casts: HashMap<Key, CastFn>,
    _type: PhantomData<fn() -> T>,
}

impl<'a, T: Send + Sync + 'static> ClassBuilder<'a, T> {
    /// Marks the type as a singleton.
    pub fn singleton(self) -> Self {
        self.marker(Marker::Singleton)
    }

    /// Attaches a type-level marker.
    pub fn marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    /// Declares a parameter whose type is `P`.
    pub fn param<P: ?Sized + 'static>(self, name: &str) -> Self {
        self.param_info(ParamInfo::typed(name, Key::of::<P>()))
    }

    /// Declares a parameter whose type is named by `key`.
    pub fn param_key(self, name: &str, key: impl Into<Key>) -> Self {
        self.param_info(ParamInfo::typed(name, key))
    }

    /// Declares a parameter without a type.
    pub fn untyped_param(self, name: &str) -> Self {
        self.param_info(ParamInfo::untyped(name))
    }

    /// Declares a parameter of type `P` carrying a custom marker.
    pub fn marked_param<P, A>(self, name: &str, attribute: A) -> Self
    where
        P: ?Sized + 'static,
        A: Attribute + Clone,
    {
        self.param_info(ParamInfo::typed(name, Key::of::<P>()).with_marker(MarkerAttachment::new(attribute)))
    }

    /// Declares an untyped parameter carrying a custom marker.
    pub fn marked_untyped_param<A: Attribute + Clone>(self, name: &str, attribute: A) -> Self {
        self.param_info(ParamInfo::untyped(name).with_marker(MarkerAttachment::new(attribute)))
    }

    pub fn param_info(mut self, param: ParamInfo) -> Self {
        self.params.push(param);
        self
    }

    /// Declares a plain method.
    pub fn method<F>(self, name: &str, body: F) -> Self
    where
        F: Fn(&T) -> DiResult<()> + Send + Sync + 'static,
    {
        self.method_with_markers(name, Vec::new(), body)
    }

    /// Declares a method marked as initializer.
    pub fn initializer<F>(self, name: &str, body: F) -> Self
    where
        F: Fn(&T) -> DiResult<()> + Send + Sync + 'static,
    {
        self.method_with_markers(name, vec![Marker::Initializer], body)
    }

    pub fn method_with_markers<F>(mut self, name: &str, markers: Vec<Marker>, body: F) -> Self
    where
        F: Fn(&T) -> DiResult<()> + Send + Sync + 'static,
    {
        let info = markers
            .into_iter()
            .fold(MethodInfo::new(name), MethodInfo::with_marker);
        self.methods.push(info);

        let invoker = move |instance: &AnyArc| match (**instance).downcast_ref::<T>() {
            Some(this) => body(this),
            None => Err(DiError::TypeMismatch {
                expected: std::any::type_name::<T>(),
            }),
        };
        self.invokers.insert(name.to_string(), Arc::new(invoker));
        self
    }

    /// Registers a trait-object view of `T` used when `Tr` is bound to it.
    pub fn implements<Tr, F>(mut self, cast: F) -> Self
    where
        Tr: ?Sized + Send + Sync + 'static,
        F: Fn(Arc<T>) -> Arc<Tr> + Send + Sync + 'static,
    {
        let view = move |instance: &AnyArc| {
            instance
                .clone()
                .downcast::<T>()
                .ok()
                .map(|this| Arc::new(cast(this)) as AnyArc)
        };
        self.casts.insert(Key::of::<Tr>(), Arc::new(view));
        self
    }

    /// Declares the constructor and adds the type to the catalog.
    ///
    /// The constructor receives one argument per declared parameter, even
    /// when none were declared.
    pub fn construct<F>(self, ctor: F) -> Key
    where
        F: Fn(&Args) -> DiResult<T> + Send + Sync + 'static,
    {
        let ctor = move |args: &Args| ctor(args).map(|value| Arc::new(value) as AnyArc);
        self.finish(true, Arc::new(ctor))
    }

    /// Adds a type that declares no constructor; `factory` plays the role of
    /// the implicit no-argument one.
    ///
    /// Parameters declared on the builder are dropped.
    pub fn construct_with<F>(self, factory: F) -> Key
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let ctor = move |_: &Args| Ok(Arc::new(factory()) as AnyArc);
        self.finish(false, Arc::new(ctor))
    }

    /// [`construct_with`](Self::construct_with) using `T::default`.
    pub fn construct_default(self) -> Key
    where
        T: Default,
    {
        self.construct_with(T::default)
    }

    fn finish(self, declares_constructor: bool, ctor: ConstructFn) -> Key {
        let key = self.key.clone();
        self.catalog.insert(CatalogType {
            key: self.key,
            markers: self.markers,
            params: declares_constructor.then_some(self.params),
            methods: self.methods,
            invokers: self.invokers,
            ctor,
            casts: self.casts,
        });
        key
    }
}
