#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures for Domainiser.
//!
//! Two layers:
//! - **Object layer**: type names, declared property types, dynamic records
//!   and values, plus the collaborator traits (`Introspector`, `TypeResolver`)
//! - **Descriptor layer**: per-type relation metadata (`TypeDescriptor`),
//!   memoized process-wide by `DescriptorCache`
//!
//! Walking and cloning live in the `domainiser` crate; everything here is
//! what a walk consults.

use std::fmt;

pub mod cache;
pub mod descriptor;
pub mod domain;
pub mod introspect;
pub mod registry;
pub mod resolver;
pub mod types;
pub mod value;


pub use cache::DescriptorCache;
pub use descriptor::{ContainerShape, PropertyDescriptor, TypeDescriptor};
pub use domain::Domain;
pub use introspect::Introspector;
pub use registry::{Registry, Schema};
pub use resolver::{NamespaceResolver, TypeResolver, TypeSetResolver};
pub use types::{DeclaredType, PropertyInfo, TypeName};
pub use value::{EntityId, EntityRef, Record, Value};

/// Direction of a property access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Read => f.write_str("reading"),
            Access::Write => f.write_str("writing"),
        }
    }
}

/// Errors raised while describing types, building graph specs or walking.
///
/// All of them are configuration or programming errors: they abort the
/// operation in progress and are never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A graph spec names a property the owning type does not have.
    #[error("property `{property}` does not exist on `{owner}`")]
    UnknownProperty { owner: TypeName, property: String },

    /// A builder path descends through a property that is not a relation.
    #[error("property `{property}` on `{owner}` is not a relation to a tracked type")]
    NotARelation { owner: TypeName, property: String },

    /// The value being walked does not match the type the spec was built for.
    #[error("graph spec was built for `{expected}` but the value is `{found}`")]
    SpecMismatch { expected: TypeName, found: String },

    /// A relation holds a value whose container shape differs from its declaration.
    #[error("property `{property}` on `{owner}` is declared as {expected} but holds {found}")]
    ShapeMismatch {
        owner: TypeName,
        property: String,
        expected: ContainerShape,
        found: &'static str,
    },

    #[error("type `{0}` has no parameterless construction path")]
    NotConstructible(TypeName),

    #[error("property `{property}` on `{owner}` is not accessible for {access}")]
    PropertyAccessDenied {
        owner: TypeName,
        property: String,
        access: Access,
    },

    /// A descriptor was looked up before anything built it.
    #[error("type descriptor for `{0}` has not been initialised")]
    NotInitialized(TypeName),

    #[error("type `{0}` is not known to the introspector")]
    UnknownType(TypeName),

    /// A declarative graph definition could not be read.
    #[error("invalid graph definition: {0}")]
    InvalidDefinition(String),
}

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, Error>;
