use std::sync::Arc;

use crate::Result;
use crate::cache::DescriptorCache;
use crate::descriptor::TypeDescriptor;
use crate::introspect::Introspector;
use crate::resolver::TypeResolver;
use crate::types::TypeName;

/// The collaborators every spec and walker needs, bundled.
///
/// Cheap to clone; clones share the introspector, the resolver and the
/// descriptor cache, so descriptors built through one clone are visible to
/// all of them.
#[derive(Clone)]
pub struct Domain {
    introspector: Arc<dyn Introspector>,
    resolver: Arc<dyn TypeResolver>,
    cache: Arc<DescriptorCache>,
}

impl Domain {
    /// Domain backed by the process-wide descriptor cache.
    pub fn new(
        introspector: impl Introspector + 'static,
        resolver: impl TypeResolver + 'static,
    ) -> Self {
        Self::from_arcs(Arc::new(introspector), Arc::new(resolver))
    }

    pub fn from_arcs(
        introspector: Arc<dyn Introspector>,
        resolver: Arc<dyn TypeResolver>,
    ) -> Self {
        Self {
            introspector,
            resolver,
            cache: DescriptorCache::global(),
        }
    }

    /// Use a private cache instead of the global one.
    pub fn with_cache(mut self, cache: Arc<DescriptorCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn introspector(&self) -> &dyn Introspector {
        self.introspector.as_ref()
    }

    pub fn resolver(&self) -> &dyn TypeResolver {
        self.resolver.as_ref()
    }

    pub fn cache(&self) -> &Arc<DescriptorCache> {
        &self.cache
    }

    /// Descriptor for `ty`, built on first use and memoized.
    pub fn descriptor(&self, ty: &TypeName) -> Result<Arc<TypeDescriptor>> {
        self.cache
            .get_or_build(ty, &self.introspector, &self.resolver)
    }

    /// Descriptor for `ty` only if something already built it.
    pub fn cached_descriptor(&self, ty: &TypeName) -> Result<Arc<TypeDescriptor>> {
        self.cache.get(ty, &self.introspector, &self.resolver)
    }

    pub fn is_tracked_type(&self, ty: &TypeName) -> bool {
        self.resolver.is_tracked_type(ty)
    }
}

impl std::fmt::Debug for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Domain")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
