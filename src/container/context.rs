//! Resolver context handed to property injectors.

use crate::error::DiResult;
use crate::instances::AnyArc;
use crate::key::Key;
use crate::traits::{Resolver, ResolverCore};

/// Access to the resolving container from inside an injection.
///
/// Resolutions made through the context join the current construction
/// chain, so a marker that resolves the type being constructed is reported as
/// a circular dependency.
///
/// # Examples
///
/// ```
/// use ferrous_autowire::{
///     AnyArc, Attribute, Container, DiResult, PropertyAttribute, Resolver, ResolverContext,
///     TypeCatalog,
/// };
/// use std::sync::Arc;
///
/// struct Settings { greeting: String }
/// struct Greeter { line: Arc<String> }
///
/// #[derive(Clone)]
/// struct Greeting;
///
/// impl Attribute for Greeting {
///     fn as_property(&self) -> Option<&dyn PropertyAttribute> { Some(self) }
/// }
///
/// impl PropertyAttribute for Greeting {
///     fn inject(&self, ctx: &ResolverContext<'_>) -> DiResult<AnyArc> {
///         let settings = ctx.get::<Settings>()?;
///         Ok(Arc::new(settings.greeting.clone()))
///     }
/// }
///
/// let catalog = TypeCatalog::new();
/// catalog.register::<Settings>()
///     .singleton()
///     .construct_with(|| Settings { greeting: "hi".to_string() });
/// catalog.register::<Greeter>()
///     .marked_untyped_param("line", Greeting)
///     .construct(|args| Ok(Greeter { line: args.get(0)? }));
///
/// let container = Container::new(Arc::new(catalog));
/// container.register_custom_marker_type::<Greeting>();
/// assert_eq!(*container.get_required::<Greeter>().line, "hi");
/// ```
pub struct ResolverContext<'a> {
    resolver: &'a dyn ResolverCore,
}

impl<'a> ResolverContext<'a> {
    pub(crate) fn new<T>(resolver: &'a T) -> Self
    where
        T: ResolverCore,
    {
        Self { resolver }
    }
}

impl<'a> ResolverCore for ResolverContext<'a> {
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc> {
        self.resolver.resolve_any(key)
    }

    fn resolve_view(&self, key: &Key) -> DiResult<AnyArc> {
        self.resolver.resolve_view(key)
    }
}

impl<'a> Resolver for ResolverContext<'a> {}
