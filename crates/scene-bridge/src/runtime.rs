/// Identifier of a runtime entity. Zero is never a live entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

impl EntityId {
    /// The null reference.
    pub const NONE: Self = Self(0);

    /// Returns true for the null reference.
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

/// A component as stored by the runtime: its type name and raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentRef<'a> {
    /// Type name, used to find the layout in a type registry.
    pub type_name: &'a str,
    /// Raw data.
    pub bytes: &'a [u8],
}

/// Tag names the runtime uses for its own bookkeeping.
pub const RESERVED_TAGS: [&str; 4] = ["Prefab", "Disabled", "Module", "Final"];

/// Name of the namespace holding the runtime's own entities.
pub const INTERNAL_NAMESPACE: &str = "core";

/// Returns true for tags that never show up in a scene.
pub fn is_reserved_tag(tag: &str) -> bool {
    RESERVED_TAGS.contains(&tag)
        || tag
            .strip_prefix(INTERNAL_NAMESPACE)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}

/// Read access to a live-object runtime.
///
/// The bridge only reads. Implementations return borrowed data valid for
/// as long as the runtime is borrowed.
pub trait Runtime {
    /// Every entity, in creation order.
    fn entities(&self) -> Vec<EntityId>;

    /// The entity's own name; `None` for anonymous entities.
    fn name(&self, entity: EntityId) -> Option<&str>;

    /// Returns true for entities in the runtime's internal namespace.
    fn is_internal(&self, entity: EntityId) -> bool;

    /// Components attached to the entity, in attachment order.
    fn components(&self, entity: EntityId) -> Vec<ComponentRef<'_>>;

    /// Plain tags on the entity, reserved ones included.
    fn tags(&self, entity: EntityId) -> Vec<&str>;

    /// Target of the entity's `IsA` relation.
    fn is_a(&self, entity: EntityId) -> Option<EntityId>;

    /// Direct parent.
    fn parent(&self, entity: EntityId) -> Option<EntityId>;

    /// Looks up an interned string.
    fn string(&self, index: u32) -> Option<&str>;
}
