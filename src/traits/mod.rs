//! Resolution traits shared by the container and injection contexts.

mod resolver;

pub use resolver::{Resolver, ResolverCore};
