//! Graph traversal driven by a `GraphSpec`.
//!
//! A walker maps a source graph to a result graph. Implementors provide the
//! spec-driven entry points; the convenience entry points that synthesize a
//! trivial spec, and value-shape dispatch, come for free.

mod clone;

#[cfg(test)]
mod clone_tests;

pub use clone::{CloneOptions, CloningWalker};

use indexmap::{IndexMap, IndexSet};

use domainiser_core::{Domain, EntityRef, Error, Result, TypeName, Value};

use crate::spec::GraphSpec;

pub trait GraphWalker {
    fn domain(&self) -> &Domain;

    /// Walk one entity. `spec` must be built for the entity's type.
    fn walk_with(&self, entity: &EntityRef, spec: &GraphSpec) -> Result<EntityRef>;

    /// Walk every element in order. Null elements stay null.
    fn walk_sequence(&self, items: &[Value], spec: &GraphSpec) -> Result<Vec<Value>>;

    fn walk_set(&self, items: &IndexSet<Value>, spec: &GraphSpec) -> Result<IndexSet<Value>>;

    /// Walk the values of a mapping; keys are kept as they are.
    fn walk_mapping(
        &self,
        entries: &IndexMap<Value, Value>,
        spec: &GraphSpec,
    ) -> Result<IndexMap<Value, Value>>;

    /// Childless spec for `ty`.
    fn trivial_spec(&self, ty: &TypeName) -> Result<GraphSpec> {
        GraphSpec::for_type(self.domain(), ty)
    }

    /// Walk one entity without following any relation.
    fn walk(&self, entity: &EntityRef) -> Result<EntityRef> {
        let spec = self.trivial_spec(entity.type_name())?;
        self.walk_with(entity, &spec)
    }

    fn walk_sequence_of(&self, items: &[Value], element: &TypeName) -> Result<Vec<Value>> {
        self.walk_sequence(items, &self.trivial_spec(element)?)
    }

    fn walk_set_of(&self, items: &IndexSet<Value>, element: &TypeName) -> Result<IndexSet<Value>> {
        self.walk_set(items, &self.trivial_spec(element)?)
    }

    fn walk_mapping_of(
        &self,
        entries: &IndexMap<Value, Value>,
        element: &TypeName,
    ) -> Result<IndexMap<Value, Value>> {
        self.walk_mapping(entries, &self.trivial_spec(element)?)
    }

    /// Dispatch on the shape of `value`. `Null` passes through.
    fn walk_value(&self, value: &Value, spec: &GraphSpec) -> Result<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Entity(entity) => self.walk_with(entity, spec).map(Value::Entity),
            Value::Sequence(items) => self.walk_sequence(items, spec).map(Value::Sequence),
            Value::Set(items) => self.walk_set(items, spec).map(Value::Set),
            Value::Mapping(entries) => self.walk_mapping(entries, spec).map(Value::Mapping),
            other => Err(Error::SpecMismatch {
                expected: spec.owner().clone(),
                found: other.kind_name().to_owned(),
            }),
        }
    }
}
