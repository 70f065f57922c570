//! Incremental construction of `GraphSpec`s.
//!
//! The builder only records names. Nothing is checked until `build`, so
//! `a.b.c` can be declared before anyone knows what `a` points at; `build`
//! then resolves each step through the owner's descriptor.

use std::sync::Arc;

use domainiser_core::{Domain, Error, Result, TypeName};

use super::graph_map::GraphMap;
use super::graph_spec::GraphSpec;

#[derive(Clone, Debug)]
pub struct GraphSpecBuilder {
    domain: Domain,
    owner: TypeName,
    tree: GraphMap,
}

impl GraphSpecBuilder {
    pub fn new(domain: &Domain, owner: impl Into<TypeName>) -> Self {
        Self {
            domain: domain.clone(),
            owner: owner.into(),
            tree: GraphMap::new(),
        }
    }

    pub fn owner(&self) -> &TypeName {
        &self.owner
    }

    /// Declared tree so far.
    pub fn graph_map(&self) -> &GraphMap {
        &self.tree
    }

    /// Include the chain `path[0] -> path[1] -> ...`.
    pub fn with_single_path<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tree.insert_path(path);
        self
    }

    /// Include every `a.b.c` path.
    ///
    /// Segments are trimmed and blank paths are skipped. An empty segment
    /// (`a..b`) is kept and rejected by `build`.
    pub fn with_paths_dot_notation<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for path in paths {
            let path = path.as_ref().trim();
            if path.is_empty() {
                continue;
            }
            self.tree.insert_path(path.split('.').map(str::trim));
        }
        self
    }

    /// Include `property` and everything `child` declares beneath it.
    pub fn with_builder(mut self, child: &GraphSpecBuilder, property: &str) -> Self {
        if let Ok(descriptor) = self.domain.descriptor(&self.owner)
            && let Some(element) = descriptor.element_type(property)
            && element != &child.owner
        {
            tracing::warn!(
                owner = %self.owner,
                property,
                expected = %element,
                found = %child.owner,
                "grafted builder is for a different type; its declarations are reinterpreted"
            );
        }
        self.tree.graft(property, &child.tree);
        self
    }

    /// Include a nested-map tree.
    pub fn with_declarative_map(mut self, map: &GraphMap) -> Self {
        self.tree.merge(map);
        self
    }

    /// Include a tree given as JSON: `{"children": {"addresses": null}}`.
    pub fn with_json(self, json: &str) -> Result<Self> {
        let map = GraphMap::from_json(json)?;
        Ok(self.with_declarative_map(&map))
    }

    /// Compile the declared tree.
    ///
    /// Fails with `UnknownProperty` for a name the owner does not have and
    /// `NotARelation` for a property that is not a tracked relation. The
    /// builder is left as it was.
    pub fn build(&self) -> Result<GraphSpec> {
        build_node(&self.domain, &self.owner, Some(&self.tree))
    }
}

fn build_node(domain: &Domain, owner: &TypeName, tree: Option<&GraphMap>) -> Result<GraphSpec> {
    let descriptor = domain.descriptor(owner)?;
    let mut spec = GraphSpec::new(Arc::clone(&descriptor));

    for (property, subtree) in tree.into_iter().flat_map(GraphMap::iter) {
        let Some(info) = descriptor.property(property) else {
            return Err(Error::UnknownProperty {
                owner: owner.clone(),
                property: property.to_owned(),
            });
        };
        let Some(element) = info.element_type() else {
            return Err(Error::NotARelation {
                owner: owner.clone(),
                property: property.to_owned(),
            });
        };

        let child = build_node(domain, element, subtree)?;
        spec.add_child(property, child)?;
    }

    Ok(spec)
}
