//! Wiring Demo - constructor injection driven by type descriptors
//!
//! This example demonstrates:
//! - Describing types once in a `TypeCatalog`
//! - A singleton injected into a transient through its constructor
//! - Initializer methods running after construction
//! - Trait bindings and aliases
//! - Resolution logging through `tracing`
//!
//! Run with `RUST_LOG=ferrous_autowire=trace cargo run --example wiring`.

use ferrous_autowire::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

trait Sound: Send + Sync {
    fn make(&self) -> String;
}

/// Shared by every user; built once.
struct Animal {
    name: String,
}

impl Sound for Animal {
    fn make(&self) -> String {
        format!("{} says woof", self.name)
    }
}

/// A fresh user per resolution.
struct User {
    pet: Arc<Animal>,
    sound: Arc<dyn Sound>,
    greeted: AtomicBool,
}

impl User {
    fn greet(&self) {
        self.greeted.store(true, Ordering::SeqCst);
        println!("hello, I live with {}", self.pet.name);
    }
}

fn catalog() -> TypeCatalog {
    let catalog = TypeCatalog::new();
    catalog
        .register::<Animal>()
        .singleton()
        .implements::<dyn Sound, _>(|animal| animal as Arc<dyn Sound>)
        .construct_with(|| Animal {
            name: "Rex".to_string(),
        });
    catalog
        .register::<User>()
        .param::<Animal>("pet")
        .param_key("sound", "sound")
        .initializer("greet", |user: &User| {
            user.greet();
            Ok(())
        })
        .construct(|args| {
            Ok(User {
                pet: args.get(0)?,
                sound: args.get_trait(1)?,
                greeted: AtomicBool::new(false),
            })
        });
    catalog
}

fn main() -> DiResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let container = Container::builder(Arc::new(catalog()))
        .add_observer(Arc::new(LoggingObserver::new()))
        .bind(Key::of::<dyn Sound>(), Key::of::<Animal>())
        .alias(Key::of::<dyn Sound>(), "sound")
        .build()?;

    let started = Instant::now();
    let first = container.get::<User>()?;
    let cold = started.elapsed();

    let started = Instant::now();
    let second = container.get::<User>()?;
    let warm = started.elapsed();

    println!("{}", first.sound.make());
    println!("users are distinct: {}", !Arc::ptr_eq(&first, &second));
    println!("pet is shared: {}", Arc::ptr_eq(&first.pet, &second.pet));
    println!("initializer ran: {}", second.greeted.load(Ordering::SeqCst));
    println!("first resolution {cold:?}, second {warm:?}");

    let stats = container.stats();
    println!(
        "{} resolutions, {} constructions, cache hit rate {:.0}%",
        stats.resolutions,
        stats.constructions,
        stats.cache_hit_rate().unwrap_or_default() * 100.0
    );

    Ok(())
}
