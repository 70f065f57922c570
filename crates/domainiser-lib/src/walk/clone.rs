//! Selective deep cloning.
//!
//! For every read-write property of the source entity:
//! - scalars and untracked values are copied as they are
//! - a tracked relation with a child spec is cloned, shape by shape
//! - a tracked relation without a child spec is passed through by reference
//!   when `keep_references` is set, and otherwise left at the fresh
//!   instance's default
//!
//! Within one entry-point call each source entity is cloned at most once,
//! so two paths reaching the same source reach the same clone. Separate
//! calls never share clones.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use domainiser_core::{
    ContainerShape, Domain, EntityId, EntityRef, Error, PropertyDescriptor, Result, Value,
};

use super::GraphWalker;
use crate::spec::{GraphSpec, TracedSpec};

/// Policy for relations the spec does not include.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CloneOptions {
    /// Share excluded relations with the source instead of leaving them empty.
    pub keep_references: bool,
}

#[derive(Clone, Debug)]
pub struct CloningWalker {
    domain: Domain,
    options: CloneOptions,
}

impl CloningWalker {
    pub fn new(domain: &Domain) -> Self {
        Self {
            domain: domain.clone(),
            options: CloneOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CloneOptions) -> Self {
        self.options = options;
        self
    }

    pub fn keep_references(mut self, value: bool) -> Self {
        self.options.keep_references = value;
        self
    }

    pub fn options(&self) -> CloneOptions {
        self.options
    }

    fn session(&self) -> CloneSession<'_> {
        CloneSession {
            domain: &self.domain,
            options: self.options,
            clones: HashMap::new(),
        }
    }
}

impl GraphWalker for CloningWalker {
    fn domain(&self) -> &Domain {
        &self.domain
    }

    fn walk_with(&self, entity: &EntityRef, spec: &GraphSpec) -> Result<EntityRef> {
        tracing::debug!(owner = %spec.owner(), "cloning entity");
        self.session().clone_shared(entity, &TracedSpec::new(spec))
    }

    fn walk_sequence(&self, items: &[Value], spec: &GraphSpec) -> Result<Vec<Value>> {
        let spec = TracedSpec::new(spec);
        let mut session = self.session();
        items
            .iter()
            .map(|item| session.clone_one(item, &spec))
            .collect()
    }

    fn walk_set(&self, items: &IndexSet<Value>, spec: &GraphSpec) -> Result<IndexSet<Value>> {
        let spec = TracedSpec::new(spec);
        let mut session = self.session();
        items
            .iter()
            .map(|item| session.clone_one(item, &spec))
            .collect()
    }

    fn walk_mapping(
        &self,
        entries: &IndexMap<Value, Value>,
        spec: &GraphSpec,
    ) -> Result<IndexMap<Value, Value>> {
        let spec = TracedSpec::new(spec);
        let mut session = self.session();
        entries
            .iter()
            .map(|(key, value)| Ok::<_, Error>((key.clone(), session.clone_one(value, &spec)?)))
            .collect()
    }
}

/// State of one top-level clone call.
struct CloneSession<'w> {
    domain: &'w Domain,
    options: CloneOptions,
    /// Source identity -> (source, clone). Holding the source keeps its
    /// address from being reused while the session lives.
    clones: HashMap<EntityId, (EntityRef, EntityRef)>,
}

impl CloneSession<'_> {
    /// Clone one element of a relation: null, or an entity.
    fn clone_one(&mut self, value: &Value, spec: &TracedSpec<'_>) -> Result<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Entity(entity) => self.clone_shared(entity, spec).map(Value::Entity),
            other => Err(Error::SpecMismatch {
                expected: spec.owner().clone(),
                found: other.kind_name().to_owned(),
            }),
        }
    }

    /// Clone `source` unless this session already did.
    ///
    /// The clone is registered once it is complete, so a back-reference to
    /// an entity whose clone is still being assembled gets a clone of its own.
    fn clone_shared(&mut self, source: &EntityRef, spec: &TracedSpec<'_>) -> Result<EntityRef> {
        let ty = source.type_name();
        if spec.owner() != ty {
            return Err(Error::SpecMismatch {
                expected: spec.owner().clone(),
                found: ty.to_string(),
            });
        }

        let id = EntityId::of(source);
        if let Some((_, clone)) = self.clones.get(&id) {
            tracing::trace!(path = spec.path(), "reusing clone of shared entity");
            return Ok(Arc::clone(clone));
        }

        let clone = self.clone_entity(source, spec)?;
        self.clones
            .insert(id, (Arc::clone(source), Arc::clone(&clone)));
        Ok(clone)
    }

    /// Build the clone of `source`, whose type matches `spec.owner()`.
    fn clone_entity(&mut self, source: &EntityRef, spec: &TracedSpec<'_>) -> Result<EntityRef> {
        let ty = source.type_name();
        let domain = self.domain;
        let introspector = domain.introspector();
        let target = introspector.new_instance(ty)?;

        for property in spec.descriptor().properties() {
            let name = property.name();
            let value = if !property.is_relation() {
                introspector.get_property(source, name)?
            } else if let Some(child) = spec.child(name) {
                tracing::trace!(path = child.path(), "following relation");
                let value = introspector.get_property(source, name)?;
                self.clone_relation(property, &value, &child, spec)?
            } else if self.options.keep_references {
                tracing::trace!(path = spec.path(), property = name, "sharing excluded relation");
                introspector.get_property(source, name)?
            } else {
                tracing::trace!(path = spec.path(), property = name, "leaving excluded relation empty");
                continue;
            };
            introspector.set_property(&target, name, value)?;
        }

        Ok(target)
    }

    fn clone_relation(
        &mut self,
        property: &PropertyDescriptor,
        value: &Value,
        child: &TracedSpec<'_>,
        owner: &TracedSpec<'_>,
    ) -> Result<Value> {
        match (property.shape(), value) {
            (_, Value::Null) => Ok(Value::Null),
            (ContainerShape::Sequence, Value::Sequence(items)) => items
                .iter()
                .map(|item| self.clone_one(item, child))
                .collect::<Result<Vec<_>>>()
                .map(Value::Sequence),
            (ContainerShape::Set, Value::Set(items)) => items
                .iter()
                .map(|item| self.clone_one(item, child))
                .collect::<Result<IndexSet<_>>>()
                .map(Value::Set),
            (ContainerShape::Mapping, Value::Mapping(entries)) => entries
                .iter()
                .map(|(key, value)| Ok::<_, Error>((key.clone(), self.clone_one(value, child)?)))
                .collect::<Result<IndexMap<_, _>>>()
                .map(Value::Mapping),
            (ContainerShape::Scalar, value)
                if !matches!(value, Value::Sequence(_) | Value::Set(_) | Value::Mapping(_)) =>
            {
                self.clone_one(value, child)
            }
            (expected, found) => Err(Error::ShapeMismatch {
                owner: owner.owner().clone(),
                property: property.name().to_owned(),
                expected,
                found: found.kind_name(),
            }),
        }
    }
}
