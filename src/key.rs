//! Type identifiers for the autowiring container.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Identifier naming a constructible type.
///
/// Keys are opaque string tokens with structural equality. The helpers
/// [`Key::of`] and [`key_of_type`] derive them from `std::any::type_name`, so a
/// Rust type and the key used to describe it in a [`TypeCatalog`] agree without
/// extra bookkeeping. Arbitrary names (`"app::Mailer"`, `"mailer"`) work too and
/// are how aliases are usually spelled.
///
/// Cloning is cheap: the name is shared behind an `Arc<str>`.
///
/// # Examples
///
/// ```rust
/// use ferrous_autowire::{Key, key_of_type};
///
/// struct Database;
///
/// let by_type = key_of_type::<Database>();
/// let by_name = Key::new(std::any::type_name::<Database>());
/// assert_eq!(by_type, by_name);
///
/// let alias = Key::from("db");
/// assert_eq!(alias.as_str(), "db");
/// assert_ne!(alias, by_type);
/// ```
///
/// [`TypeCatalog`]: crate::TypeCatalog
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(Arc<str>);

impl Key {
    /// Creates a key from any name.
    pub fn new(name: impl AsRef<str>) -> Self {
        Key(Arc::from(name.as_ref()))
    }

    /// Key for a Rust type, including unsized trait objects (`dyn Logger`).
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Key(Arc::from(std::any::type_name::<T>()))
    }

    /// The name this key carries.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.0)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::new(name)
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key(Arc::from(name))
    }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self {
        key.clone()
    }
}

impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Helper function for creating type keys
#[inline(always)]
pub fn key_of_type<T: ?Sized + 'static>() -> Key {
    Key::of::<T>()
}
