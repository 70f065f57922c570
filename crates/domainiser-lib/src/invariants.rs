//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use domainiser_core::PropertyDescriptor;

use crate::GraphSpec;

impl GraphSpec {
    /// Descriptor of a property that has a child attached.
    pub(crate) fn ensure_child_property(&self, property: &str) -> &PropertyDescriptor {
        self.descriptor().property(property).unwrap_or_else(|| {
            panic!(
                "GraphSpec: child `{property}` is not a property of `{}` \
                 (add_child must reject unknown properties)",
                self.owner()
            )
        })
    }
}
