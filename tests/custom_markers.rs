use ferrous_autowire::markers::{Env, Named, Value};
use ferrous_autowire::{
    AnyArc, Attribute, Container, DiError, DiResult, Key, MarkerAttachment, ParamInfo,
    PropertyAttribute, Resolver, ResolverContext, ResolverCore, TypeCatalog,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Injects a fixed port number.
#[derive(Clone)]
struct Port(u16);

impl Attribute for Port {
    fn as_property(&self) -> Option<&dyn PropertyAttribute> {
        Some(self)
    }
}

impl PropertyAttribute for Port {
    fn inject(&self, _ctx: &ResolverContext<'_>) -> DiResult<AnyArc> {
        Ok(Arc::new(self.0))
    }
}

/// Documentation-only marker; cannot inject.
#[derive(Clone)]
struct Deprecated;

impl Attribute for Deprecated {}

struct Server {
    port: Arc<u16>,
}

fn server_catalog() -> TypeCatalog {
    let catalog = TypeCatalog::new();
    catalog
        .register::<Server>()
        .marked_untyped_param("port", Port(8080))
        .construct(|args| Ok(Server { port: args.get(0)? }));
    catalog
}

#[test]
fn registered_marker_injects_value() {
    let container = Container::new(Arc::new(server_catalog()));
    container.register_custom_marker_type::<Port>();

    assert_eq!(*container.get_required::<Server>().port, 8080);
}

#[test]
fn unregistered_marker_falls_back_to_declared_type() {
    let container = Container::new(Arc::new(server_catalog()));

    // Untyped and the marker is not recognized
    assert!(matches!(
        container.get::<Server>(),
        Err(DiError::ParameterTypeEmpty { .. })
    ));
}

#[test]
fn marker_registered_later_takes_effect() {
    let container = Container::new(Arc::new(server_catalog()));
    assert!(container.get::<Server>().is_err());

    container.register_custom_marker_type::<Port>();
    assert!(container.get::<Server>().is_ok());
}

#[test]
fn registration_is_idempotent() {
    let container = Container::new(Arc::new(server_catalog()));
    container.register_custom_marker_type::<Port>();
    container.register_custom_marker_type::<Port>();
    container.register_custom_marker(Key::of::<Port>());

    assert!(container.is_custom_marker(&Key::of::<Port>()));
    assert_eq!(*container.get_required::<Server>().port, 8080);
}

#[test]
fn marker_without_injection_capability_is_invalid() {
    struct Legacy;

    let catalog = TypeCatalog::new();
    catalog
        .register::<Legacy>()
        .marked_param::<u16, _>("port", Deprecated)
        .construct(|_| Ok(Legacy));

    let container = Container::new(Arc::new(catalog));
    container.register_custom_marker_type::<Deprecated>();

    match container.get::<Legacy>() {
        Err(DiError::InvalidAttribute { marker }) => assert_eq!(marker, Key::of::<Deprecated>()),
        other => panic!("expected InvalidAttribute, got {:?}", other.map(|_| ())),
    }
    assert_eq!(container.construction_depth(), 0);
}

#[test]
fn recognized_marker_wins_over_declared_type() {
    struct Client {
        port: Arc<u16>,
    }

    let catalog = TypeCatalog::new();
    catalog
        .register::<Client>()
        .marked_param::<u16, _>("port", Port(9000))
        .construct(|args| Ok(Client { port: args.get(0)? }));

    let container = Container::new(Arc::new(catalog));
    container.set_instance_of(Arc::new(1u16));
    container.register_custom_marker_type::<Port>();

    assert_eq!(*container.get_required::<Client>().port, 9000);
}

#[test]
fn first_recognized_marker_in_attachment_order_wins() {
    struct Pair {
        port: Arc<u16>,
    }

    let catalog = TypeCatalog::new();
    catalog
        .register::<Pair>()
        .param_info(
            ParamInfo::untyped("port")
                .with_marker(MarkerAttachment::new(Deprecated))
                .with_marker(MarkerAttachment::new(Port(1)))
                .with_marker(MarkerAttachment::new(Port(2))),
        )
        .construct(|args| Ok(Pair { port: args.get(0)? }));

    let container = Container::new(Arc::new(catalog));
    // Deprecated is not registered, so it is skipped
    container.register_custom_marker_type::<Port>();
    assert_eq!(*container.get_required::<Pair>().port, 1);
}

#[test]
fn marker_is_instantiated_per_injection() {
    static CREATED: AtomicUsize = AtomicUsize::new(0);

    struct Widget;

    let catalog = TypeCatalog::new();
    catalog
        .register::<Widget>()
        .param_info(ParamInfo::untyped("port").with_marker(MarkerAttachment::with_factory(
            Key::of::<Port>(),
            || {
                CREATED.fetch_add(1, Ordering::SeqCst);
                Box::new(Port(7)) as Box<dyn Attribute>
            },
        )))
        .construct(|_| Ok(Widget));

    let container = Container::new(Arc::new(catalog));
    container.register_custom_marker_type::<Port>();
    container.get_required::<Widget>();
    container.get_required::<Widget>();

    assert_eq!(CREATED.load(Ordering::SeqCst), 2);
}

#[test]
fn builtin_value_and_named_markers() {
    struct Database {
        url: String,
    }

    struct Repository {
        db: Arc<Database>,
        table: Arc<String>,
    }

    let catalog = TypeCatalog::new();
    catalog
        .register::<Database>()
        .singleton()
        .construct_with(|| Database {
            url: "sqlite::memory:".to_string(),
        });
    catalog
        .register::<Repository>()
        .marked_untyped_param("db", Named::new("db.primary"))
        .marked_untyped_param("table", Value("users".to_string()))
        .construct(|args| {
            Ok(Repository {
                db: args.get(0)?,
                table: args.get(1)?,
            })
        });

    let container = Container::builder(Arc::new(catalog))
        .register_custom_marker_type::<Named>()
        .register_custom_marker_type::<Value<String>>()
        .alias(Key::of::<Database>(), "db.primary")
        .build()
        .unwrap();

    let repo = container.get_required::<Repository>();
    assert_eq!(repo.db.url, "sqlite::memory:");
    assert_eq!(*repo.table, "users");
    assert!(Arc::ptr_eq(&repo.db, &container.get_required::<Database>()));
}

#[test]
fn env_marker_uses_default_when_unset() {
    struct Worker {
        queue: Arc<String>,
    }

    let catalog = TypeCatalog::new();
    catalog
        .register::<Worker>()
        .marked_untyped_param(
            "queue",
            Env::new("FERROUS_AUTOWIRE_TEST_SURELY_UNSET_QUEUE").with_default("jobs"),
        )
        .construct(|args| Ok(Worker { queue: args.get(0)? }));
    catalog
        .register_as::<()>("strict")
        .marked_untyped_param("missing", Env::new("FERROUS_AUTOWIRE_TEST_SURELY_UNSET_QUEUE"))
        .construct(|_| Ok(()));

    let container = Container::new(Arc::new(catalog));
    container.register_custom_marker_type::<Env>();

    assert_eq!(*container.get_required::<Worker>().queue, "jobs");
    assert!(matches!(
        container.resolve(&Key::new("strict")),
        Err(DiError::Construction { .. })
    ));
}

#[test]
fn injector_resolution_joins_the_construction_chain() {
    // A marker that resolves the type it is injecting into
    #[derive(Clone)]
    struct SelfRef;

    impl Attribute for SelfRef {
        fn as_property(&self) -> Option<&dyn PropertyAttribute> {
            Some(self)
        }
    }

    impl PropertyAttribute for SelfRef {
        fn inject(&self, ctx: &ResolverContext<'_>) -> DiResult<AnyArc> {
            ctx.resolve_any(&Key::new("Loop"))
        }
    }

    let catalog = TypeCatalog::new();
    catalog
        .register_as::<()>("Loop")
        .marked_untyped_param("me", SelfRef)
        .construct(|_| Ok(()));

    let container = Container::new(Arc::new(catalog));
    container.register_custom_marker_type::<SelfRef>();

    assert!(matches!(
        container.resolve(&Key::new("Loop")),
        Err(DiError::CircularDependency { .. })
    ));
}
