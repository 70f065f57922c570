//! Type names and declared property types.
//!
//! These are what an `Introspector` reports about a type. They carry no
//! classification; deciding which properties are relations is the job of
//! `TypeDescriptor::build` together with a `TypeResolver`.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Name of a model type.
///
/// Cloning is a reference-count bump. Names are compared by content, so two
/// independently created `TypeName("family::Person")` are equal.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName(Arc<str>);

impl TypeName {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment, split on `::` or `.`.
    ///
    /// # Examples
    /// ```
    /// use domainiser_core::TypeName;
    /// assert_eq!(TypeName::new("family::Person").simple_name(), "Person");
    /// assert_eq!(TypeName::new("com.example.Address").simple_name(), "Address");
    /// assert_eq!(TypeName::new("String").simple_name(), "String");
    /// ```
    pub fn simple_name(&self) -> &str {
        let name = self.as_str();
        let after_colons = name.rsplit("::").next().unwrap_or(name);
        after_colons.rsplit('.').next().unwrap_or(after_colons)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeName({:?})", &*self.0)
    }
}

impl Borrow<str> for TypeName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TypeName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TypeName {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&TypeName> for TypeName {
    fn from(name: &TypeName) -> Self {
        name.clone()
    }
}

/// Declared type of a property, as reported by an introspector.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum DeclaredType {
    /// A concrete named type, either a scalar or a model.
    Named(TypeName),
    /// Ordered sequence of the inner type.
    Sequence(Box<DeclaredType>),
    /// Unordered set of the inner type.
    Set(Box<DeclaredType>),
    /// Keyed mapping; `(key, value)`.
    Mapping(Box<DeclaredType>, Box<DeclaredType>),
    /// Generic argument known only through its bounds.
    Wildcard {
        lower: Option<TypeName>,
        upper: Option<TypeName>,
    },
    /// Statically undeterminable (erased type variable, `Any`).
    Unknown,
}

impl DeclaredType {
    pub fn named(name: impl Into<TypeName>) -> Self {
        Self::Named(name.into())
    }

    pub fn sequence_of(inner: DeclaredType) -> Self {
        Self::Sequence(Box::new(inner))
    }

    pub fn set_of(inner: DeclaredType) -> Self {
        Self::Set(Box::new(inner))
    }

    pub fn mapping_of(key: DeclaredType, value: DeclaredType) -> Self {
        Self::Mapping(Box::new(key), Box::new(value))
    }

    /// `? extends upper`
    pub fn extends(upper: impl Into<TypeName>) -> Self {
        Self::Wildcard {
            lower: None,
            upper: Some(upper.into()),
        }
    }

    /// `? super lower`
    pub fn super_of(lower: impl Into<TypeName>) -> Self {
        Self::Wildcard {
            lower: Some(lower.into()),
            upper: None,
        }
    }

    /// Unbounded `?`
    pub fn wildcard() -> Self {
        Self::Wildcard {
            lower: None,
            upper: None,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Self::Sequence(_) | Self::Set(_) | Self::Mapping(..))
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{name}"),
            Self::Sequence(inner) => write!(f, "Seq<{inner}>"),
            Self::Set(inner) => write!(f, "Set<{inner}>"),
            Self::Mapping(key, value) => write!(f, "Map<{key}, {value}>"),
            Self::Wildcard { lower: Some(lower), .. } => write!(f, "? super {lower}"),
            Self::Wildcard { upper: Some(upper), .. } => write!(f, "? extends {upper}"),
            Self::Wildcard { .. } => f.write_str("?"),
            Self::Unknown => f.write_str("<unknown>"),
        }
    }
}

/// A named property and its accessors.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PropertyInfo {
    pub name: String,
    pub declared: DeclaredType,
    pub readable: bool,
    pub writable: bool,
}

impl PropertyInfo {
    pub fn read_write(name: impl Into<String>, declared: DeclaredType) -> Self {
        Self {
            name: name.into(),
            declared,
            readable: true,
            writable: true,
        }
    }

    pub fn read_only(name: impl Into<String>, declared: DeclaredType) -> Self {
        Self {
            readable: true,
            writable: false,
            ..Self::read_write(name, declared)
        }
    }

    pub fn write_only(name: impl Into<String>, declared: DeclaredType) -> Self {
        Self {
            readable: false,
            writable: true,
            ..Self::read_write(name, declared)
        }
    }

    pub fn is_read_write(&self) -> bool {
        self.readable && self.writable
    }
}
