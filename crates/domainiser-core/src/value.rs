//! Dynamic values and entity records.
//!
//! A graph is a set of `Record`s shared through `EntityRef` (`Arc<Record>`).
//! Fields sit behind a lock so back-references (spouse ↔ spouse,
//! parent ↔ child) can be wired after both ends exist.
//!
//! Equality and hashing on `Value` are identity-based for entities and
//! bit-based for floats. That keeps `Value` usable as a set member and a
//! mapping key without ever looking inside another entity.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;

use crate::types::TypeName;

/// Shared handle to an entity.
pub type EntityRef = Arc<Record>;

/// Identity of an entity: the address of its record.
///
/// Only meaningful while the entity is alive.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct EntityId(usize);

impl EntityId {
    #[inline]
    pub fn of(entity: &EntityRef) -> Self {
        Self(Arc::as_ptr(entity) as usize)
    }
}

/// A property value.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(Arc<str>),
    Entity(EntityRef),
    Sequence(Vec<Value>),
    Set(IndexSet<Value>),
    Mapping(IndexMap<Value, Value>),
}

impl Value {
    pub fn text(s: impl Into<Arc<str>>) -> Self {
        Self::Text(s.into())
    }

    pub fn empty_sequence() -> Self {
        Self::Sequence(Vec::new())
    }

    pub fn empty_set() -> Self {
        Self::Set(IndexSet::new())
    }

    pub fn empty_mapping() -> Self {
        Self::Mapping(IndexMap::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the variant, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Entity(_) => "entity",
            Self::Sequence(_) => "sequence",
            Self::Set(_) => "set",
            Self::Mapping(_) => "mapping",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&EntityRef> {
        match self {
            Self::Entity(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&IndexSet<Value>> {
        match self {
            Self::Set(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&IndexMap<Value, Value>> {
        match self {
            Self::Mapping(entries) => Some(entries),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Entity(a), Self::Entity(b)) => Arc::ptr_eq(a, b),
            (Self::Sequence(a), Self::Sequence(b)) => a == b,
            (Self::Set(a), Self::Set(b)) => a == b,
            (Self::Mapping(a), Self::Mapping(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Null => {}
            Self::Bool(b) => b.hash(state),
            Self::Int(i) => i.hash(state),
            Self::Float(x) => x.to_bits().hash(state),
            Self::Text(s) => s.hash(state),
            Self::Entity(e) => EntityId::of(e).hash(state),
            Self::Sequence(items) => items.hash(state),
            // Set and mapping equality ignore order, so only the size is hashed.
            Self::Set(items) => items.len().hash(state),
            Self::Mapping(entries) => entries.len().hash(state),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Text(s) => write!(f, "{:?}", &**s),
            Self::Entity(e) => write!(f, "<{}@{:#x}>", e.type_name(), EntityId::of(e).0),
            Self::Sequence(items) => f.debug_list().entries(items).finish(),
            Self::Set(items) => f.debug_set().entries(items).finish(),
            Self::Mapping(entries) => f.debug_map().entries(entries).finish(),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::text(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::text(s)
    }
}

impl From<EntityRef> for Value {
    fn from(e: EntityRef) -> Self {
        Self::Entity(e)
    }
}

impl From<&EntityRef> for Value {
    fn from(e: &EntityRef) -> Self {
        Self::Entity(Arc::clone(e))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Sequence(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// One entity instance: a type name plus named fields.
pub struct Record {
    type_name: TypeName,
    fields: RwLock<IndexMap<String, Value>>,
}

impl Record {
    pub fn new(type_name: impl Into<TypeName>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: RwLock::new(IndexMap::new()),
        }
    }

    /// Set a field while building, before the record is shared.
    pub fn with(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.write().insert(name.into(), value.into());
        self
    }

    pub fn into_ref(self) -> EntityRef {
        Arc::new(self)
    }

    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.read().contains_key(name)
    }

    /// Current value of a field. Missing fields read as `None`.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.fields.read().get(name).cloned()
    }

    /// Replace a field, returning the previous value.
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.write().insert(name.into(), value.into())
    }

    /// Mutate a field in place. A missing field starts as `Value::Null`.
    pub fn update<R>(&self, name: &str, f: impl FnOnce(&mut Value) -> R) -> R {
        let mut fields = self.fields.write();
        let slot = fields.entry(name.to_owned()).or_default();
        f(slot)
    }

    pub fn field_names(&self) -> Vec<String> {
        self.fields.read().keys().cloned().collect()
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self.fields.read();
        let mut s = f.debug_struct(self.type_name.simple_name());
        for (name, value) in fields.iter() {
            s.field(name, value);
        }
        s.finish()
    }
}
