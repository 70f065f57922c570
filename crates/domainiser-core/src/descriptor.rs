//! Per-type relation metadata.
//!
//! A `TypeDescriptor` answers, for every read-write property of a type:
//! is it a relation to a tracked type, and if so in which container shape.
//! The shape is decided once here, so walkers dispatch on an enum instead of
//! inspecting values.

use std::fmt;

use indexmap::IndexMap;

use crate::Result;
use crate::introspect::Introspector;
use crate::resolver::TypeResolver;
use crate::types::{DeclaredType, TypeName};

/// How a property holds its value(s).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ContainerShape {
    /// A single value.
    Scalar,
    /// Ordered sequence.
    Sequence,
    Set,
    /// Keyed mapping; only values are relation targets.
    Mapping,
}

impl ContainerShape {
    pub fn of(declared: &DeclaredType) -> Self {
        match declared {
            DeclaredType::Sequence(_) => Self::Sequence,
            DeclaredType::Set(_) => Self::Set,
            DeclaredType::Mapping(..) => Self::Mapping,
            _ => Self::Scalar,
        }
    }

    pub fn is_container(self) -> bool {
        !matches!(self, Self::Scalar)
    }
}

impl fmt::Display for ContainerShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => f.write_str("a single value"),
            Self::Sequence => f.write_str("a sequence"),
            Self::Set => f.write_str("a set"),
            Self::Mapping => f.write_str("a mapping"),
        }
    }
}

/// Classification of one property.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PropertyDescriptor {
    name: String,
    declared: DeclaredType,
    shape: ContainerShape,
    element_type: Option<TypeName>,
    ambiguous: bool,
}

impl PropertyDescriptor {
    /// Classify a declared type against a resolver.
    pub fn classify(
        name: impl Into<String>,
        declared: DeclaredType,
        resolver: &dyn TypeResolver,
    ) -> Self {
        let shape = ContainerShape::of(&declared);
        let element = match &declared {
            DeclaredType::Sequence(inner) | DeclaredType::Set(inner) => resolve_element(inner),
            DeclaredType::Mapping(_, value) => resolve_element(value),
            other => resolve_element(other),
        };

        let (element_type, ambiguous) = match element {
            Some(ty) if resolver.is_tracked_type(&ty) => (Some(ty), false),
            Some(_) => (None, false),
            None => (None, true),
        };

        Self {
            name: name.into(),
            declared,
            shape,
            element_type,
            ambiguous,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared(&self) -> &DeclaredType {
        &self.declared
    }

    pub fn shape(&self) -> ContainerShape {
        self.shape
    }

    /// Tracked type of the value (or of each element); `None` for scalars.
    pub fn element_type(&self) -> Option<&TypeName> {
        self.element_type.as_ref()
    }

    pub fn is_relation(&self) -> bool {
        self.element_type.is_some()
    }

    /// The element type could not be determined statically.
    ///
    /// Ambiguous properties are treated as scalars.
    pub fn is_ambiguous(&self) -> bool {
        self.ambiguous
    }
}

/// Concrete element type of a (container element) declaration.
///
/// Wildcards resolve to their lower bound, then their upper bound. Unbounded
/// wildcards, unknown types and nested containers have no element type.
fn resolve_element(declared: &DeclaredType) -> Option<TypeName> {
    match declared {
        DeclaredType::Named(ty) => Some(ty.clone()),
        DeclaredType::Wildcard { lower, upper } => lower.clone().or_else(|| upper.clone()),
        DeclaredType::Sequence(_)
        | DeclaredType::Set(_)
        | DeclaredType::Mapping(..)
        | DeclaredType::Unknown => None,
    }
}

/// Relation metadata for one type, under one resolver.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TypeDescriptor {
    owner: TypeName,
    supertypes: Vec<TypeName>,
    properties: IndexMap<String, PropertyDescriptor>,
}

impl TypeDescriptor {
    /// Describe `owner`'s read-write properties.
    ///
    /// Prefer `Domain::descriptor`, which memoizes the result.
    pub fn build(
        owner: &TypeName,
        introspector: &dyn Introspector,
        resolver: &dyn TypeResolver,
    ) -> Result<Self> {
        tracing::info!(%owner, "initialising type descriptor");

        let mut properties = IndexMap::new();
        for info in introspector.describe_properties(owner)? {
            if !info.is_read_write() {
                tracing::trace!(%owner, property = %info.name, "skipping property without both accessors");
                continue;
            }

            let descriptor = PropertyDescriptor::classify(info.name, info.declared, resolver);
            if descriptor.is_ambiguous() {
                tracing::warn!(
                    %owner,
                    property = descriptor.name(),
                    declared = %descriptor.declared(),
                    "unknown property type; treating it as a scalar"
                );
            }
            properties.insert(descriptor.name.clone(), descriptor);
        }

        if properties.is_empty() {
            tracing::warn!(%owner, "no read-write properties found");
        }

        Ok(Self {
            owner: owner.clone(),
            supertypes: introspector.supertypes(owner),
            properties,
        })
    }

    pub fn owner(&self) -> &TypeName {
        &self.owner
    }

    pub fn supertypes(&self) -> &[TypeName] {
        &self.supertypes
    }

    /// `owner` is `ty` or one of its supertypes is.
    pub fn is_assignable_to(&self, ty: &TypeName) -> bool {
        &self.owner == ty || self.supertypes.contains(ty)
    }

    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    pub fn properties(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties.values()
    }

    /// Properties that point at tracked types.
    pub fn relations(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties.values().filter(|p| p.is_relation())
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.get(name)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn element_type(&self, name: &str) -> Option<&TypeName> {
        self.property(name).and_then(PropertyDescriptor::element_type)
    }

    pub fn shape(&self, name: &str) -> Option<ContainerShape> {
        self.property(name).map(PropertyDescriptor::shape)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}
