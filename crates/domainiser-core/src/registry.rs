//! Table-driven `Introspector`.
//!
//! Each model type is declared once as a `Schema`. A schema lists properties
//! with their declared types and accessors, may inherit from a parent schema,
//! and may be abstract (no blank instance can be allocated).

use indexmap::IndexMap;

use crate::introspect::Introspector;
use crate::types::{DeclaredType, PropertyInfo, TypeName};
use crate::value::{EntityRef, Record, Value};
use crate::{Access, Error, Result};

/// Declaration of one model type.
#[derive(Debug, Clone)]
pub struct Schema {
    name: TypeName,
    parent: Option<TypeName>,
    properties: Vec<PropertyInfo>,
    defaults: IndexMap<String, Value>,
    constructible: bool,
}

impl Schema {
    pub fn new(name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            properties: Vec::new(),
            defaults: IndexMap::new(),
            constructible: true,
        }
    }

    /// Declare a read-write property.
    pub fn property(self, name: impl Into<String>, declared: DeclaredType) -> Self {
        self.declare(PropertyInfo::read_write(name, declared))
    }

    pub fn read_only(self, name: impl Into<String>, declared: DeclaredType) -> Self {
        self.declare(PropertyInfo::read_only(name, declared))
    }

    pub fn write_only(self, name: impl Into<String>, declared: DeclaredType) -> Self {
        self.declare(PropertyInfo::write_only(name, declared))
    }

    /// Declare a property; a later declaration with the same name replaces it.
    pub fn declare(mut self, info: PropertyInfo) -> Self {
        match self.properties.iter_mut().find(|p| p.name == info.name) {
            Some(existing) => *existing = info,
            None => self.properties.push(info),
        }
        self
    }

    pub fn extends(mut self, parent: impl Into<TypeName>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Value a fresh instance starts with, instead of the declared-type default.
    pub fn default_value(mut self, property: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.insert(property.into(), value.into());
        self
    }

    /// Mark the type abstract: `new_instance` fails with `NotConstructible`.
    pub fn abstract_type(mut self) -> Self {
        self.constructible = false;
        self
    }

    pub fn name(&self) -> &TypeName {
        &self.name
    }

    pub fn parent(&self) -> Option<&TypeName> {
        self.parent.as_ref()
    }

    pub fn is_constructible(&self) -> bool {
        self.constructible
    }

    /// Properties declared directly on this schema (not inherited).
    pub fn own_properties(&self) -> &[PropertyInfo] {
        &self.properties
    }
}

/// Collection of schemas, keyed by type name.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    schemas: IndexMap<TypeName, Schema>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a schema, replacing any previous one of the same name.
    pub fn register(&mut self, schema: Schema) -> &mut Self {
        self.schemas.insert(schema.name.clone(), schema);
        self
    }

    pub fn with(mut self, schema: Schema) -> Self {
        self.register(schema);
        self
    }

    pub fn schema(&self, ty: &TypeName) -> Option<&Schema> {
        self.schemas.get(ty)
    }

    pub fn contains(&self, ty: &TypeName) -> bool {
        self.schemas.contains_key(ty)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    fn ensure_schema(&self, ty: &TypeName) -> Result<&Schema> {
        self.schemas
            .get(ty)
            .ok_or_else(|| Error::UnknownType(ty.clone()))
    }

    /// Schema chain from the root ancestor down to `ty`.
    ///
    /// A parent that is not registered, or that repeats, ends the chain.
    fn lineage(&self, ty: &TypeName) -> Result<Vec<&Schema>> {
        let mut chain = vec![self.ensure_schema(ty)?];
        while let Some(parent) = chain.last().copied().and_then(|s| s.parent.as_ref()) {
            let Some(schema) = self.schemas.get(parent) else {
                tracing::warn!(%ty, %parent, "parent schema is not registered");
                break;
            };
            if chain.iter().any(|s| s.name == schema.name) {
                break;
            }
            chain.push(schema);
        }
        chain.reverse();
        Ok(chain)
    }

    /// Effective properties of `ty`: inherited first, own declarations override.
    fn effective_properties(&self, ty: &TypeName) -> Result<IndexMap<String, PropertyInfo>> {
        let mut properties = IndexMap::new();
        for schema in self.lineage(ty)? {
            for info in &schema.properties {
                properties.insert(info.name.clone(), info.clone());
            }
        }
        Ok(properties)
    }

    fn property(&self, ty: &TypeName, property: &str) -> Result<PropertyInfo> {
        self.effective_properties(ty)?
            .swap_remove(property)
            .ok_or_else(|| Error::UnknownProperty {
                owner: ty.clone(),
                property: property.to_owned(),
            })
    }
}

fn declared_default(declared: &DeclaredType) -> Value {
    match declared {
        DeclaredType::Sequence(_) => Value::empty_sequence(),
        DeclaredType::Set(_) => Value::empty_set(),
        DeclaredType::Mapping(..) => Value::empty_mapping(),
        _ => Value::Null,
    }
}

impl Introspector for Registry {
    fn describe_properties(&self, ty: &TypeName) -> Result<Vec<PropertyInfo>> {
        Ok(self.effective_properties(ty)?.into_values().collect())
    }

    fn new_instance(&self, ty: &TypeName) -> Result<EntityRef> {
        let lineage = self.lineage(ty)?;
        let Some(schema) = lineage.last() else {
            return Err(Error::UnknownType(ty.clone()));
        };
        if !schema.constructible {
            return Err(Error::NotConstructible(ty.clone()));
        }

        let record = Record::new(ty.clone());
        for info in self.effective_properties(ty)?.values() {
            let default = lineage
                .iter()
                .rev()
                .find_map(|s| s.defaults.get(&info.name))
                .cloned()
                .unwrap_or_else(|| declared_default(&info.declared));
            record.set(info.name.clone(), default);
        }
        Ok(record.into_ref())
    }

    fn get_property(&self, entity: &EntityRef, property: &str) -> Result<Value> {
        let ty = entity.type_name();
        let info = self.property(ty, property)?;
        if !info.readable {
            return Err(Error::PropertyAccessDenied {
                owner: ty.clone(),
                property: property.to_owned(),
                access: Access::Read,
            });
        }
        Ok(entity.get(property).unwrap_or_default())
    }

    fn set_property(&self, entity: &EntityRef, property: &str, value: Value) -> Result<()> {
        let ty = entity.type_name();
        let info = self.property(ty, property)?;
        if !info.writable {
            return Err(Error::PropertyAccessDenied {
                owner: ty.clone(),
                property: property.to_owned(),
                access: Access::Write,
            });
        }
        entity.set(property, value);
        Ok(())
    }

    fn supertypes(&self, ty: &TypeName) -> Vec<TypeName> {
        let Ok(lineage) = self.lineage(ty) else {
            return Vec::new();
        };
        lineage
            .iter()
            .rev()
            .skip(1)
            .map(|s| s.name.clone())
            .collect()
    }
}
