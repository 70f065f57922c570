//! Memoization of type descriptors.
//!
//! Descriptors are keyed by the identity of the resolver and introspector
//! that produced them plus the type name: two resolvers may classify the same
//! type differently, so equal-looking resolvers still get separate entries.
//!
//! # Thread Safety
//!
//! Lookups take the `DashMap` fast path. A miss takes a per-key build lock
//! and checks again, so concurrent first accesses to one key build it exactly
//! once and everyone receives the same `Arc`. No map shard is locked while a
//! descriptor is built, so an introspector or resolver may look up *other*
//! descriptors through the same cache. Asking for the descriptor being built
//! deadlocks.

use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::descriptor::TypeDescriptor;
use crate::introspect::Introspector;
use crate::resolver::TypeResolver;
use crate::types::TypeName;
use crate::{Error, Result};

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
struct DescriptorKey {
    resolver: usize,
    introspector: usize,
    ty: TypeName,
}

impl DescriptorKey {
    fn new(
        ty: &TypeName,
        introspector: &Arc<dyn Introspector>,
        resolver: &Arc<dyn TypeResolver>,
    ) -> Self {
        Self {
            resolver: Arc::as_ptr(resolver) as *const () as usize,
            introspector: Arc::as_ptr(introspector) as *const () as usize,
            ty: ty.clone(),
        }
    }
}

/// A cached descriptor. Holding the collaborators keeps their addresses from
/// being reused by a different resolver or introspector while the key exists.
struct CachedDescriptor {
    descriptor: Arc<TypeDescriptor>,
    _introspector: Arc<dyn Introspector>,
    _resolver: Arc<dyn TypeResolver>,
}

/// Thread-safe store of built descriptors.
#[derive(Default)]
pub struct DescriptorCache {
    entries: DashMap<DescriptorKey, CachedDescriptor>,
    /// Keys with a build in flight.
    building: DashMap<DescriptorKey, Arc<Mutex<()>>>,
}

impl DescriptorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide cache used by `Domain::new`.
    pub fn global() -> Arc<DescriptorCache> {
        static GLOBAL: OnceLock<Arc<DescriptorCache>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(DescriptorCache::new())))
    }

    /// Descriptor for `ty`, building it on first use.
    ///
    /// Build failures are returned and not cached.
    pub fn get_or_build(
        &self,
        ty: &TypeName,
        introspector: &Arc<dyn Introspector>,
        resolver: &Arc<dyn TypeResolver>,
    ) -> Result<Arc<TypeDescriptor>> {
        let key = DescriptorKey::new(ty, introspector, resolver);

        if let Some(cached) = self.entries.get(&key) {
            tracing::trace!(%ty, "descriptor cache hit");
            return Ok(Arc::clone(&cached.descriptor));
        }

        let lock = Arc::clone(self.building.entry(key.clone()).or_default().value());
        let result = {
            let _guard = lock.lock();
            // Another thread may have built it while we waited.
            match self.entries.get(&key) {
                Some(cached) => Ok(Arc::clone(&cached.descriptor)),
                None => self.build(key.clone(), ty, introspector, resolver),
            }
        };
        self.building
            .remove_if(&key, |_, pending| Arc::ptr_eq(pending, &lock));
        result
    }

    fn build(
        &self,
        key: DescriptorKey,
        ty: &TypeName,
        introspector: &Arc<dyn Introspector>,
        resolver: &Arc<dyn TypeResolver>,
    ) -> Result<Arc<TypeDescriptor>> {
        let built = TypeDescriptor::build(ty, introspector.as_ref(), resolver.as_ref())?;
        let descriptor = Arc::new(built);
        self.entries.insert(
            key,
            CachedDescriptor {
                descriptor: Arc::clone(&descriptor),
                _introspector: Arc::clone(introspector),
                _resolver: Arc::clone(resolver),
            },
        );
        Ok(descriptor)
    }

    /// Descriptor for `ty` if it was already built.
    pub fn get(
        &self,
        ty: &TypeName,
        introspector: &Arc<dyn Introspector>,
        resolver: &Arc<dyn TypeResolver>,
    ) -> Result<Arc<TypeDescriptor>> {
        let key = DescriptorKey::new(ty, introspector, resolver);
        self.entries
            .get(&key)
            .map(|cached| Arc::clone(&cached.descriptor))
            .ok_or_else(|| Error::NotInitialized(ty.clone()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every cached descriptor.
    ///
    /// Descriptors already handed out stay valid; later lookups rebuild.
    pub fn invalidate_all(&self) {
        self.entries.clear();
    }
}

impl std::fmt::Debug for DescriptorCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptorCache")
            .field("entries", &self.entries.len())
            .finish()
    }
}
