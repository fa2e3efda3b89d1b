//! An in-process [`Runtime`] that loads wire documents.
//!
//! Entities live in a flat arena. Names resolve by dotted path from the top
//! level, or by leaf name when no path matches. Component data is encoded
//! into bytes with the layouts of a [`TypeRegistry`]; types the registry
//! does not know are kept as opaque JSON bytes.

use scene_core::Value;
use tracing::{debug, trace, warn};

use crate::error::BridgeResult;
use crate::reflect::{PrimitiveKind, TypeId, TypeLayout, TypeRegistry};
use crate::runtime::{ComponentRef, EntityId, INTERNAL_NAMESPACE, Runtime};
use crate::wire::{WireDocument, WireRecord, parse_wire};

#[derive(Debug, Clone, Default)]
struct Record {
    name: Option<String>,
    parent: Option<EntityId>,
    internal: bool,
    tags: Vec<String>,
    is_a: Option<EntityId>,
    pairs: Vec<(String, String)>,
    components: Vec<(String, Vec<u8>)>,
}

/// A small reference runtime.
#[derive(Debug, Clone)]
pub struct MemoryWorld {
    records: Vec<Record>,
    strings: Vec<String>,
}

impl Default for MemoryWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryWorld {
    /// Creates a world holding only the internal namespace entity.
    pub fn new() -> Self {
        let mut world = Self {
            records: Vec::new(),
            strings: Vec::new(),
        };
        let core = world.spawn(Some(INTERNAL_NAMESPACE), None);
        if let Some(record) = world.record_mut(core) {
            record.internal = true;
        }
        world
    }

    /// Creates a world and loads a wire document into it.
    pub fn from_wire(registry: &TypeRegistry, text: &str) -> BridgeResult<Self> {
        let mut world = Self::new();
        world.load_wire(registry, text)?;
        Ok(world)
    }

    /// Number of entities, internal ones included.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false; the internal namespace exists from the start.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn record(&self, id: EntityId) -> Option<&Record> {
        let index = usize::try_from(id.0).ok()?.checked_sub(1)?;
        self.records.get(index)
    }

    fn record_mut(&mut self, id: EntityId) -> Option<&mut Record> {
        let index = usize::try_from(id.0).ok()?.checked_sub(1)?;
        self.records.get_mut(index)
    }

    fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        (1..=self.records.len() as u64).map(EntityId)
    }

    /// Creates an entity. A `None` name makes it anonymous.
    pub fn spawn(&mut self, name: Option<&str>, parent: Option<EntityId>) -> EntityId {
        let internal = parent.is_some_and(|p| self.is_internal(p));
        self.records.push(Record {
            name: name.map(str::to_string),
            parent,
            internal,
            ..Record::default()
        });
        EntityId(self.records.len() as u64)
    }

    fn child_named(&self, parent: Option<EntityId>, name: &str) -> Option<EntityId> {
        self.ids().find(|id| {
            self.record(*id)
                .is_some_and(|r| r.parent == parent && r.name.as_deref() == Some(name))
        })
    }

    /// Resolves a dotted path from the top level.
    pub fn lookup_path(&self, path: &str) -> Option<EntityId> {
        path.split('.')
            .try_fold(None, |parent, segment| self.child_named(parent, segment).map(Some))
            .flatten()
    }

    /// Resolves a path, falling back to the first entity with that leaf name.
    pub fn lookup(&self, name: &str) -> Option<EntityId> {
        self.lookup_path(name).or_else(|| {
            self.ids()
                .find(|id| self.record(*id).is_some_and(|r| r.name.as_deref() == Some(name)))
        })
    }

    /// Resolves a dotted path, creating missing segments.
    pub fn ensure_path(&mut self, path: &str) -> EntityId {
        let mut parent = None;
        let mut current = EntityId::NONE;
        for segment in path.split('.') {
            current = match self.child_named(parent, segment) {
                Some(id) => id,
                None => self.spawn(Some(segment), parent),
            };
            parent = Some(current);
        }
        current
    }

    fn ensure(&mut self, name: &str) -> EntityId {
        match self.lookup(name) {
            Some(id) => id,
            None => self.ensure_path(name),
        }
    }

    /// Adds a tag unless present.
    pub fn add_tag(&mut self, entity: EntityId, tag: &str) {
        if let Some(record) = self.record_mut(entity) {
            if !record.tags.iter().any(|t| t == tag) {
                record.tags.push(tag.to_string());
            }
        }
    }

    /// Attaches raw component bytes, replacing an existing component of the
    /// same type.
    pub fn set_component(&mut self, entity: EntityId, type_name: &str, bytes: Vec<u8>) {
        let Some(record) = self.record_mut(entity) else {
            return;
        };
        match record.components.iter_mut().find(|(t, _)| t == type_name) {
            Some(slot) => slot.1 = bytes,
            None => record.components.push((type_name.to_string(), bytes)),
        }
    }

    /// A relation target stored by name, such as `JointType` on a joint.
    pub fn pair(&self, entity: EntityId, relation: &str) -> Option<&str> {
        self.record(entity)?
            .pairs
            .iter()
            .find(|(r, _)| r == relation)
            .map(|(_, target)| target.as_str())
    }

    /// Interns a string, returning its pool index.
    pub fn intern(&mut self, text: &str) -> u32 {
        let index = match self.strings.iter().position(|s| s == text) {
            Some(index) => index,
            None => {
                self.strings.push(text.to_string());
                self.strings.len() - 1
            }
        };
        u32::try_from(index).unwrap_or(u32::MAX)
    }

    /// Loads every record of a wire document.
    ///
    /// A `parent` field places the entity under that parent; otherwise a
    /// dotted name is taken as a full path. Records named `#...` become
    /// anonymous entities. Every record is placed before any pair or entity
    /// reference is resolved, so references may point at later records.
    pub fn load_wire(&mut self, registry: &TypeRegistry, text: &str) -> BridgeResult<()> {
        let doc: WireDocument = parse_wire(text)?;
        let placed: Vec<EntityId> = doc.results.iter().map(|r| self.place_record(r)).collect();
        for (record, id) in doc.results.iter().zip(placed) {
            self.fill_record(registry, id, record);
        }
        debug!(records = doc.results.len(), entities = self.len(), "wire document loaded");
        Ok(())
    }

    fn place_record(&mut self, record: &WireRecord) -> EntityId {
        let id = if record.is_anonymous() {
            self.spawn(None, None)
        } else if let Some(parent) = &record.parent {
            let parent = self.ensure(parent);
            match self.lookup(&record.name) {
                Some(existing) => {
                    if let Some(r) = self.record_mut(existing) {
                        r.parent = Some(parent);
                    }
                    existing
                }
                None => self.spawn(Some(&record.name), Some(parent)),
            }
        } else if record.name.contains('.') {
            self.ensure_path(&record.name)
        } else {
            self.ensure(&record.name)
        };
        trace!(name = %record.name, entity = id.0, "record placed");
        id
    }

    fn fill_record(&mut self, registry: &TypeRegistry, id: EntityId, record: &WireRecord) {
        for tag in &record.tags {
            self.add_tag(id, tag);
        }

        if let Some(prefab) = &record.pairs.is_a {
            let target = self.ensure(prefab);
            if let Some(r) = self.record_mut(id) {
                r.is_a = Some(target);
            }
        }
        let named_pairs = [
            ("JointType", &record.pairs.joint_type),
            ("JointA", &record.pairs.joint_a),
            ("JointB", &record.pairs.joint_b),
        ];
        for (relation, target) in named_pairs {
            if let (Some(target), Some(r)) = (target, self.record_mut(id)) {
                r.pairs.push((relation.to_string(), target.clone()));
            }
        }

        for (type_name, value) in &record.components {
            let bytes = match registry.lookup(type_name) {
                Some(type_id) => {
                    let mut bytes = Vec::new();
                    self.encode(registry, type_id, value, &mut bytes);
                    bytes
                }
                None => {
                    debug!(component = %type_name, "no layout, storing opaque");
                    value.to_json().into_bytes()
                }
            };
            self.set_component(id, type_name, bytes);
        }
    }

    /// Writes `value` into `out` laid out as `type_id`. Missing members and
    /// elements are zero-filled; mismatched scalars are coerced.
    fn encode(&mut self, registry: &TypeRegistry, type_id: TypeId, value: &Value, out: &mut Vec<u8>) {
        let Some(info) = registry.info(type_id) else {
            return;
        };
        match &info.layout {
            TypeLayout::Primitive(kind) => self.encode_primitive(*kind, value, out),
            TypeLayout::Struct(members) => {
                for member in members {
                    let field = value.get(&member.name).unwrap_or(&Value::Null);
                    self.encode(registry, member.type_id, field, out);
                }
            }
            TypeLayout::Array { elem, count } => {
                for i in 0..*count {
                    let item = value.index(i).unwrap_or(&Value::Null);
                    self.encode(registry, *elem, item, out);
                }
            }
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn encode_primitive(&mut self, kind: PrimitiveKind, value: &Value, out: &mut Vec<u8>) {
        let int = || match value {
            Value::Bool(b) => i64::from(*b),
            Value::Int(n) => *n,
            Value::Float(n) => *n as i64,
            _ => 0,
        };
        let float = || value.as_number().unwrap_or(0.0);

        match kind {
            PrimitiveKind::Bool => out.push(u8::from(int() != 0)),
            PrimitiveKind::I8 => out.extend_from_slice(&(int() as i8).to_le_bytes()),
            PrimitiveKind::I16 => out.extend_from_slice(&(int() as i16).to_le_bytes()),
            PrimitiveKind::I32 => out.extend_from_slice(&(int() as i32).to_le_bytes()),
            PrimitiveKind::I64 => out.extend_from_slice(&int().to_le_bytes()),
            PrimitiveKind::U8 => out.extend_from_slice(&(int() as u8).to_le_bytes()),
            PrimitiveKind::U16 => out.extend_from_slice(&(int() as u16).to_le_bytes()),
            PrimitiveKind::U32 => out.extend_from_slice(&(int() as u32).to_le_bytes()),
            PrimitiveKind::U64 => out.extend_from_slice(&(int() as u64).to_le_bytes()),
            PrimitiveKind::F32 => out.extend_from_slice(&(float() as f32).to_le_bytes()),
            PrimitiveKind::F64 => out.extend_from_slice(&float().to_le_bytes()),
            PrimitiveKind::String => {
                let index = match value {
                    Value::Null => {
                        warn!("null string stored as empty");
                        self.intern("")
                    }
                    Value::String(s) => self.intern(s),
                    other => self.intern(&other.to_string()),
                };
                out.extend_from_slice(&index.to_le_bytes());
            }
            PrimitiveKind::Entity => {
                let target = match value.as_str() {
                    Some(name) if !name.is_empty() => self.ensure(name),
                    _ => EntityId::NONE,
                };
                out.extend_from_slice(&target.0.to_le_bytes());
            }
            PrimitiveKind::Id => {
                let raw = match value {
                    Value::String(s) => s.trim_start_matches('#').parse().unwrap_or(0),
                    other => other.as_i64().map_or(0, |n| n as u64),
                };
                out.extend_from_slice(&raw.to_le_bytes());
            }
        }
    }
}

impl Runtime for MemoryWorld {
    fn entities(&self) -> Vec<EntityId> {
        self.ids().collect()
    }

    fn name(&self, entity: EntityId) -> Option<&str> {
        self.record(entity)?.name.as_deref()
    }

    fn is_internal(&self, entity: EntityId) -> bool {
        self.record(entity).is_some_and(|r| r.internal)
    }

    fn components(&self, entity: EntityId) -> Vec<ComponentRef<'_>> {
        self.record(entity)
            .map(|r| {
                r.components
                    .iter()
                    .map(|(type_name, bytes)| ComponentRef { type_name, bytes })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn tags(&self, entity: EntityId) -> Vec<&str> {
        self.record(entity)
            .map(|r| r.tags.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    fn is_a(&self, entity: EntityId) -> Option<EntityId> {
        self.record(entity)?.is_a
    }

    fn parent(&self, entity: EntityId) -> Option<EntityId> {
        self.record(entity)?.parent
    }

    fn string(&self, index: u32) -> Option<&str> {
        self.strings.get(index as usize).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_world_has_internal_namespace() {
        let world = MemoryWorld::new();
        assert_eq!(world.len(), 1);
        let core = world.lookup("core").unwrap();
        assert!(world.is_internal(core));
    }

    #[test]
    fn parent_fields_and_paths_build_the_same_tree() {
        let registry = TypeRegistry::new();
        let by_parent = MemoryWorld::from_wire(
            &registry,
            r#"{"results":[{"parent":"Camp","name":"Fire"},{"parent":"World","name":"Camp"},{"name":"World"}]}"#,
        )
        .unwrap();
        let by_path = MemoryWorld::from_wire(
            &registry,
            r#"{"results":[{"name":"World"},{"name":"World.Camp"},{"name":"World.Camp.Fire"}]}"#,
        )
        .unwrap();

        for world in [&by_parent, &by_path] {
            let fire = world.lookup_path("World.Camp.Fire").unwrap();
            let camp = world.parent(fire).unwrap();
            assert_eq!(world.name(camp), Some("Camp"));
            assert_eq!(world.len(), 4);
        }
    }

    #[test]
    fn references_resolve_to_later_records() {
        let mut registry = TypeRegistry::new();
        let entity_id = registry.lookup(PrimitiveKind::Entity.name()).unwrap();
        registry.register_struct("Follow", &[("target", entity_id)]).unwrap();
        let world = MemoryWorld::from_wire(
            &registry,
            r#"{"results":[{"name":"Player","pairs":{"IsA":"Actor"},"components":{"Follow":{"target":"Actor"}}},{"name":"World"},{"name":"World.Actor"}]}"#,
        )
        .unwrap();

        let actor = world.lookup_path("World.Actor").unwrap();
        let named_actor: Vec<_> = world
            .entities()
            .into_iter()
            .filter(|id| world.name(*id) == Some("Actor"))
            .collect();
        assert_eq!(named_actor, [actor]);

        let player = world.lookup("Player").unwrap();
        assert_eq!(world.is_a(player), Some(actor));
        assert_eq!(world.components(player)[0].bytes, actor.0.to_le_bytes());
    }

    #[test]
    fn anonymous_records_keep_their_pairs() {
        let registry = TypeRegistry::new();
        let world = MemoryWorld::from_wire(
            &registry,
            r##"{"results":[{"name":"#1","pairs":{"JointType":"hinge","JointA":"A"}}]}"##,
        )
        .unwrap();
        let joint = world
            .entities()
            .into_iter()
            .find(|id| world.name(*id).is_none())
            .unwrap();
        assert_eq!(world.pair(joint, "JointType"), Some("hinge"));
        assert_eq!(world.pair(joint, "JointA"), Some("A"));
        assert_eq!(world.pair(joint, "JointB"), None);
    }

    #[test]
    fn unregistered_components_are_opaque() {
        let registry = TypeRegistry::new();
        let world = MemoryWorld::from_wire(
            &registry,
            r#"{"results":[{"name":"A","components":{"Script":{"src":"main.lua"}}}]}"#,
        )
        .unwrap();
        let a = world.lookup("A").unwrap();
        let components = world.components(a);
        assert_eq!(components[0].type_name, "Script");
        assert_eq!(components[0].bytes, br#"{"src":"main.lua"}"#);
    }

    #[test]
    fn encodes_by_layout() {
        let mut registry = TypeRegistry::new();
        let i16_id = registry.lookup("i16").unwrap();
        let f64_id = registry.lookup("f64").unwrap();
        registry
            .register_struct("Stats", &[("hp", i16_id), ("speed", f64_id)])
            .unwrap();
        let world = MemoryWorld::from_wire(
            &registry,
            r#"{"results":[{"name":"A","components":{"Stats":{"speed":1.5}}}]}"#,
        )
        .unwrap();
        let a = world.lookup("A").unwrap();
        let bytes = world.components(a)[0].bytes;
        assert_eq!(bytes.len(), 10);
        assert_eq!(&bytes[..2], &[0, 0]);
        assert_eq!(&bytes[2..], &1.5f64.to_le_bytes());
    }

    #[test]
    fn strings_are_interned_once() {
        let mut world = MemoryWorld::new();
        let a = world.intern("hello");
        let b = world.intern("hello");
        assert_eq!(a, b);
        assert_eq!(world.string(a), Some("hello"));
    }
}
