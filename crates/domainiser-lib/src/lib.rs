//! Domainiser: selective deep cloning of entity graphs.
//!
//! A [`GraphSpec`] names the relations to follow; a [`CloningWalker`] copies
//! an entity and exactly those relations, cloning each shared entity once
//! per call and leaving everything else empty (or shared, with
//! `keep_references`).
//!
//! # Example
//!
//! ```
//! use domainiser::{
//!     CloningWalker, DeclaredType, Domain, GraphSpecBuilder, GraphWalker, Introspector,
//!     NamespaceResolver, Registry, Schema, TypeName, Value,
//! };
//!
//! let person = || DeclaredType::named("family::Person");
//! let registry = Registry::new().with(
//!     Schema::new("family::Person")
//!         .property("name", DeclaredType::named("String"))
//!         .property("spouse", person())
//!         .property("children", DeclaredType::sequence_of(person())),
//! );
//! let domain = Domain::new(registry, NamespaceResolver::new("family::"));
//!
//! let ty = TypeName::new("family::Person");
//! let dad = domain.introspector().new_instance(&ty)?;
//! dad.set("name", "Dad");
//! let kid = domain.introspector().new_instance(&ty)?;
//! kid.set("name", "Kid");
//! dad.set("children", vec![Value::from(&kid)]);
//!
//! let spec = GraphSpecBuilder::new(&domain, ty)
//!     .with_paths_dot_notation(["children"])
//!     .build()?;
//! let copy = CloningWalker::new(&domain).walk_with(&dad, &spec)?;
//!
//! assert_eq!(copy.get("name"), Some(Value::from("Dad")));
//! assert_eq!(copy.get("children").and_then(|c| c.as_sequence().map(<[Value]>::len)), Some(1));
//! # Ok::<(), domainiser::Error>(())
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod spec;
pub mod walk;

mod invariants;

#[cfg(test)]
pub mod test_utils;

pub use domainiser_core::{
    Access, ContainerShape, DeclaredType, DescriptorCache, Domain, EntityId, EntityRef, Error,
    Introspector, NamespaceResolver, PropertyDescriptor, PropertyInfo, Record, Registry, Result,
    Schema, TypeDescriptor, TypeName, TypeResolver, TypeSetResolver, Value,
};
pub use spec::{GraphMap, GraphSpec, GraphSpecBuilder, SpecPrinter, TracedSpec};
pub use walk::{CloneOptions, CloningWalker, GraphWalker};
