use std::ops::Deref;

use super::graph_spec::GraphSpec;

/// A `GraphSpec` that remembers how it was reached.
///
/// Paths start at `root` and gain `.property` for every step down, e.g.
/// `root.children.addresses`. Behaves exactly like the wrapped spec; the
/// path is only for diagnostics.
#[derive(Clone, Debug)]
pub struct TracedSpec<'s> {
    inner: &'s GraphSpec,
    path: String,
}

impl<'s> TracedSpec<'s> {
    pub fn new(spec: &'s GraphSpec) -> Self {
        Self {
            inner: spec,
            path: "root".to_owned(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The child under `property`, with the path extended.
    pub fn child(&self, property: &str) -> Option<TracedSpec<'s>> {
        self.inner.child(property).map(|child| TracedSpec {
            inner: child,
            path: format!("{}.{property}", self.path),
        })
    }

    pub fn inner(&self) -> &'s GraphSpec {
        self.inner
    }
}

impl Deref for TracedSpec<'_> {
    type Target = GraphSpec;

    fn deref(&self) -> &GraphSpec {
        self.inner
    }
}
