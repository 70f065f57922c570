use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use domainiser_core::{Domain, Error, Result, TypeDescriptor, TypeName};

use super::dump::SpecPrinter;
use super::graph_map::GraphMap;

/// Inclusion graph for one type.
///
/// Every child key is a property of the owner's descriptor; this is checked
/// when the child is attached, so a walk never meets an unknown name. A
/// missing child means "do not traverse this relation".
#[derive(Clone, Debug)]
pub struct GraphSpec {
    descriptor: Arc<TypeDescriptor>,
    children: IndexMap<String, GraphSpec>,
}

impl GraphSpec {
    /// Childless spec over an existing descriptor.
    pub fn new(descriptor: Arc<TypeDescriptor>) -> Self {
        Self {
            descriptor,
            children: IndexMap::new(),
        }
    }

    /// Childless spec for `ty`, building its descriptor if needed.
    pub fn for_type(domain: &Domain, ty: &TypeName) -> Result<Self> {
        Ok(Self::new(domain.descriptor(ty)?))
    }

    pub fn owner(&self) -> &TypeName {
        self.descriptor.owner()
    }

    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    /// Simple name of the owner type.
    pub fn name(&self) -> &str {
        self.owner().simple_name()
    }

    /// Attach `child` under `property`, replacing any previous child.
    ///
    /// Fails with `UnknownProperty`, leaving the spec untouched, when the
    /// owner has no such read-write property. The child's owner is not
    /// compared with the property's element type; a mismatch shows up as
    /// `SpecMismatch` when a walk reaches it.
    pub fn add_child(
        &mut self,
        property: impl Into<String>,
        child: GraphSpec,
    ) -> Result<Option<GraphSpec>> {
        let property = property.into();
        if !self.descriptor.has_property(&property) {
            return Err(Error::UnknownProperty {
                owner: self.owner().clone(),
                property,
            });
        }
        Ok(self.children.insert(property, child))
    }

    /// Attach a childless spec built from `descriptor`.
    pub fn add_child_descriptor(
        &mut self,
        property: impl Into<String>,
        descriptor: Arc<TypeDescriptor>,
    ) -> Result<Option<GraphSpec>> {
        self.add_child(property, GraphSpec::new(descriptor))
    }

    pub fn with_child(mut self, property: impl Into<String>, child: GraphSpec) -> Result<Self> {
        self.add_child(property, child)?;
        Ok(self)
    }

    pub fn child(&self, property: &str) -> Option<&GraphSpec> {
        self.children.get(property)
    }

    /// Child under `property`, only if its owner can be used as `expected`.
    pub fn child_as(&self, property: &str, expected: &TypeName) -> Option<&GraphSpec> {
        self.child(property)
            .filter(|child| child.descriptor.is_assignable_to(expected))
    }

    pub fn child_names(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &GraphSpec)> {
        self.children.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Longest chain of relations below this node; a leaf has depth 0.
    pub fn depth(&self) -> usize {
        self.children
            .values()
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// The nested-map form; leaves render as empty maps.
    pub fn to_graph_map(&self) -> GraphMap {
        self.children
            .iter()
            .fold(GraphMap::new(), |map, (property, child)| {
                map.with_subtree(property.as_str(), child.to_graph_map())
            })
    }

    /// Indented tree, one relation per line.
    pub fn dump(&self) -> String {
        SpecPrinter::new(self).dump()
    }
}

/// JSON rendition of `to_graph_map`.
impl fmt::Display for GraphSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_graph_map(), f)
    }
}
