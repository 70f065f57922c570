use crate::Result;
use crate::types::{PropertyInfo, TypeName};
use crate::value::{EntityRef, Value};

/// Property discovery and accessor service.
///
/// Stands in for runtime reflection: it lists a type's properties with their
/// declared types, allocates blank instances and reads/writes properties by
/// name. `Registry` is the table-driven implementation; anything able to
/// answer these questions (generated accessor tables, a schema service) can
/// implement it instead.
///
/// `describe_properties` and `supertypes` run while a descriptor is being
/// built. They may look up descriptors of other types through the same
/// cache, but not the one being built.
pub trait Introspector: Send + Sync {
    /// All properties of `ty`, including ones that are not read-write.
    ///
    /// Order is significant: descriptors keep it.
    fn describe_properties(&self, ty: &TypeName) -> Result<Vec<PropertyInfo>>;

    /// A blank instance of `ty`, with every property at its default.
    fn new_instance(&self, ty: &TypeName) -> Result<EntityRef>;

    fn get_property(&self, entity: &EntityRef, property: &str) -> Result<Value>;

    fn set_property(&self, entity: &EntityRef, property: &str, value: Value) -> Result<()>;

    /// Types `ty` can be used as, nearest first. Excludes `ty` itself.
    fn supertypes(&self, ty: &TypeName) -> Vec<TypeName> {
        let _ = ty;
        Vec::new()
    }
}
