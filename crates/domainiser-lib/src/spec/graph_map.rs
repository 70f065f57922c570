//! Nested-map form of an inclusion graph.
//!
//! `{"spouse": null, "children": {"addresses": {}}}` includes `spouse` and
//! `children`, and below `children` includes `addresses`. `null` and `{}`
//! both mean "include this relation, nothing beneath it".

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphMap(IndexMap<String, Option<GraphMap>>);

impl GraphMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the JSON rendition. Values must be `null` or nested objects.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidDefinition(e.to_string()))
    }

    pub fn to_json(&self) -> String {
        self.to_string()
    }

    /// Make sure the chain `path[0] -> path[1] -> ...` exists.
    pub fn insert_path<I, S>(&mut self, path: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut node = self;
        for segment in path {
            node = node
                .0
                .entry(segment.into())
                .or_insert(None)
                .get_or_insert_with(GraphMap::new);
        }
    }

    /// Merge `subtree` beneath `property`, keeping what is already there.
    pub fn graft(&mut self, property: impl Into<String>, subtree: &GraphMap) {
        self.0
            .entry(property.into())
            .or_insert(None)
            .get_or_insert_with(GraphMap::new)
            .merge(subtree);
    }

    /// Union of both trees.
    pub fn merge(&mut self, other: &GraphMap) {
        for (property, subtree) in &other.0 {
            match subtree {
                Some(subtree) => self.graft(property.clone(), subtree),
                None => {
                    self.0.entry(property.clone()).or_insert(None);
                }
            }
        }
    }

    pub fn get(&self, property: &str) -> Option<Option<&GraphMap>> {
        self.0.get(property).map(Option::as_ref)
    }

    pub fn contains(&self, property: &str) -> bool {
        self.0.contains_key(property)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&GraphMap>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn with_subtree(mut self, property: impl Into<String>, subtree: GraphMap) -> Self {
        self.0.insert(property.into(), Some(subtree));
        self
    }
}

impl fmt::Display for GraphMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl<K: Into<String>> FromIterator<(K, Option<GraphMap>)> for GraphMap {
    fn from_iter<T: IntoIterator<Item = (K, Option<GraphMap>)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
