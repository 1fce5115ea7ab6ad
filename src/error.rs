//! Error types for the autowiring container.

use thiserror::Error;

use crate::key::Key;

/// Resolution errors
///
/// Every variant is terminal for the resolution request that raised it.
/// Nothing is retried or downgraded inside the container; the error travels
/// back to the original caller with the recursion unwound.
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{Container, DiError, Key, TypeCatalog};
/// use std::sync::Arc;
///
/// let container = Container::new(Arc::new(TypeCatalog::new()));
/// match container.resolve(&Key::new("app::Missing")) {
///     Err(DiError::UnresolvableType { key, .. }) => assert_eq!(key.as_str(), "app::Missing"),
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use ferrous_autowire::{DiError, Key};
///
/// let circular = DiError::CircularDependency {
///     requested: Key::new("A"),
///     path: vec![Key::new("A"), Key::new("B"), Key::new("A")],
/// };
/// assert_eq!(
///     circular.to_string(),
///     "Circular dependency detected for type: A (A -> B -> A)"
/// );
/// ```
#[derive(Debug, Clone, Error)]
pub enum DiError {
    /// The requested type is already being constructed on this call chain
    #[error("Circular dependency detected for type: {requested} ({})", join_path(.path))]
    CircularDependency {
        /// Identifier originally passed to `resolve`
        requested: Key,
        /// Construction stack at detection time, closed by the repeated key
        path: Vec<Key>,
    },
    /// A constructor parameter has no declared type and no recognized marker
    #[error("Parameter type not found: {parameter} (in {owner})")]
    ParameterTypeEmpty {
        /// Type whose constructor declares the parameter
        owner: Key,
        /// Parameter name
        parameter: String,
    },
    /// A custom marker cannot produce an injectable value
    #[error("Invalid property attribute: {marker}")]
    InvalidAttribute {
        /// The marker type
        marker: Key,
    },
    /// The introspector does not know the type or cannot instantiate it
    #[error("Unresolvable type {key}: {reason}")]
    UnresolvableType {
        /// Concrete identifier handed to the introspector
        key: Key,
        /// Why introspection failed
        reason: String,
    },
    /// Alias or binding redirections loop back on themselves
    #[error("Alias cycle while canonicalizing {key}: {}", join_path(.chain))]
    AliasCycle {
        /// Identifier being canonicalized
        key: Key,
        /// Redirections followed, closed by the repeated key
        chain: Vec<Key>,
    },
    /// Type downcast failed
    #[error("Type mismatch for: {expected}")]
    TypeMismatch {
        /// Type the caller asked for
        expected: &'static str,
    },
    /// A constructor asked for an argument the descriptor does not provide
    #[error("Missing constructor argument at index {index}")]
    MissingArgument {
        /// Zero-based parameter position
        index: usize,
    },
    /// Constructor or method failure reported by user code
    #[error("Construction of {key} failed: {message}")]
    Construction {
        /// Type being constructed
        key: Key,
        /// Failure description
        message: String,
    },
    /// Maximum recursion depth exceeded
    #[error("Max depth {0} exceeded")]
    DepthExceeded(usize),
    /// Rejected configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

fn join_path(path: &[Key]) -> String {
    path.iter()
        .map(Key::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Result type for container operations
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{DiResult, DiError};
///
/// fn failing_operation() -> DiResult<()> {
///     Err(DiError::DepthExceeded(1024))
/// }
///
/// assert!(failing_operation().is_err());
/// ```
pub type DiResult<T> = Result<T, DiError>;
