//! Classification of types into tracked relations and opaque scalars.

use std::collections::HashSet;

use crate::types::TypeName;

/// Decides which types are nested relations worth traversing.
///
/// Must be pure and deterministic for as long as any descriptor cache keyed
/// by it is alive: descriptors built from one answer are never rebuilt.
/// Called during descriptor builds, so it must not ask the cache for the
/// descriptor of the type being classified.
pub trait TypeResolver: Send + Sync {
    fn is_tracked_type(&self, ty: &TypeName) -> bool;
}

impl<F> TypeResolver for F
where
    F: Fn(&TypeName) -> bool + Send + Sync,
{
    fn is_tracked_type(&self, ty: &TypeName) -> bool {
        self(ty)
    }
}

/// Tracks every type whose name starts with a namespace prefix.
#[derive(Debug, Clone)]
pub struct NamespaceResolver {
    prefix: String,
}

impl NamespaceResolver {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl TypeResolver for NamespaceResolver {
    fn is_tracked_type(&self, ty: &TypeName) -> bool {
        ty.as_str().starts_with(&self.prefix)
    }
}

/// Tracks an explicit set of types.
#[derive(Debug, Clone, Default)]
pub struct TypeSetResolver {
    types: HashSet<TypeName>,
}

impl TypeSetResolver {
    pub fn new<I, T>(types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeName>,
    {
        Self {
            types: types.into_iter().map(Into::into).collect(),
        }
    }

    pub fn insert(&mut self, ty: impl Into<TypeName>) -> bool {
        self.types.insert(ty.into())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeResolver for TypeSetResolver {
    fn is_tracked_type(&self, ty: &TypeName) -> bool {
        self.types.contains(ty)
    }
}
