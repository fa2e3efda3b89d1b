use scene_core::{Entity, HierarchyRelation, Scene, SceneMetadata, Value};
use tracing::{debug, instrument, trace, warn};

use crate::error::BridgeResult;
use crate::reflect::{Cursor, Primitive, TypeLayout, TypeRegistry};
use crate::runtime::{EntityId, Runtime, is_reserved_tag};
use crate::wire::WireDocument;

/// Value substituted for data nested deeper than [`BridgeOptions::max_depth`].
pub const MAX_DEPTH_SENTINEL: &str = "<max depth exceeded>";

/// Knobs for a [`WorldBridge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeOptions {
    /// Deepest level of nested struct or array data read from the runtime.
    pub max_depth: usize,
    /// Write wire names as dotted ancestor paths instead of `parent` fields.
    pub names_as_full_paths: bool,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            max_depth: 64,
            names_as_full_paths: false,
        }
    }
}

impl BridgeOptions {
    /// Set the depth ceiling.
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Write names as full paths.
    #[must_use]
    pub fn with_full_paths(mut self, on: bool) -> Self {
        self.names_as_full_paths = on;
        self
    }
}

/// Moves scenes to and from a runtime using one type registry.
#[derive(Debug, Clone)]
pub struct WorldBridge<'r> {
    registry: &'r TypeRegistry,
    options: BridgeOptions,
}

impl<'r> WorldBridge<'r> {
    /// Creates a bridge with default options.
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self::with_options(registry, BridgeOptions::default())
    }

    /// Creates a bridge with the given options.
    pub fn with_options(registry: &'r TypeRegistry, options: BridgeOptions) -> Self {
        Self { registry, options }
    }

    /// The options in effect.
    pub fn options(&self) -> &BridgeOptions {
        &self.options
    }

    /// The registry used for reflection.
    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    /// Wire JSON for a scene.
    pub fn to_wire(&self, scene: &Scene) -> BridgeResult<String> {
        WireDocument::from_scene(scene, self.options.names_as_full_paths).to_json()
    }

    /// Rebuilds a scene from the runtime's current contents.
    ///
    /// Anonymous and internal entities are skipped, as are components with
    /// no registered layout. Each remaining component is read through the
    /// registry. Tags, the `IsA` target and the direct parent come from
    /// typed queries; a parent becomes a relation with order 0. Joints are
    /// not recovered.
    #[instrument(skip_all, fields(scene = %name))]
    pub fn from_world<R: Runtime + ?Sized>(&self, world: &R, name: &str, version: &str) -> Scene {
        let mut scene = Scene::new(SceneMetadata::new(name, version));

        for id in world.entities() {
            let Some(entity_name) = world.name(id) else {
                trace!(entity = id.0, "skipping anonymous entity");
                continue;
            };
            if world.is_internal(id) {
                trace!(entity = %entity_name, "skipping internal entity");
                continue;
            }

            let mut entity = Entity::new(entity_name);
            for component in world.components(id) {
                let Some(type_id) = self.registry.lookup(component.type_name) else {
                    debug!(entity = %entity_name, component = %component.type_name, "no layout, skipping component");
                    continue;
                };
                match self.registry.cursor(type_id, component.bytes) {
                    Ok(cursor) => {
                        let data = self.read_value(world, cursor, 0);
                        entity.add_component(component.type_name, data);
                    }
                    Err(err) => {
                        warn!(entity = %entity_name, component = %component.type_name, %err, "unreadable component");
                    }
                }
            }

            for tag in world.tags(id) {
                if !is_reserved_tag(tag) {
                    entity.add_tag(tag);
                }
            }

            entity.prefab = world
                .is_a(id)
                .and_then(|target| world.name(target))
                .map(str::to_string);

            let parent_name = world
                .parent(id)
                .filter(|p| !world.is_internal(*p))
                .and_then(|p| world.name(p));
            if let Some(parent_name) = parent_name {
                scene
                    .relations
                    .push(HierarchyRelation::new(parent_name, entity_name, 0));
            }

            scene.entities.push(entity);
        }

        debug!(
            entities = scene.entity_count(),
            components = scene.component_count(),
            "scene read from runtime"
        );
        scene
    }

    fn read_value<R: Runtime + ?Sized>(&self, world: &R, cursor: Cursor<'_>, depth: usize) -> Value {
        if depth >= self.options.max_depth {
            warn!(type_name = %cursor.info().name, depth, "depth ceiling reached");
            return Value::from(MAX_DEPTH_SENTINEL);
        }

        match cursor.layout() {
            TypeLayout::Primitive(_) => match cursor.primitive() {
                Some(primitive) => read_primitive(world, primitive),
                None => Value::Null,
            },
            TypeLayout::Struct(_) => Value::Object(
                cursor
                    .members()
                    .into_iter()
                    .map(|(name, member)| (name.to_string(), self.read_value(world, member, depth + 1)))
                    .collect(),
            ),
            TypeLayout::Array { .. } => Value::Array(
                cursor
                    .elements()
                    .into_iter()
                    .map(|elem| self.read_value(world, elem, depth + 1))
                    .collect(),
            ),
        }
    }
}

fn read_primitive<R: Runtime + ?Sized>(world: &R, primitive: Primitive) -> Value {
    match primitive {
        Primitive::Bool(b) => Value::Bool(b),
        Primitive::Int(n) => Value::Int(n),
        Primitive::UInt(n) => i64::try_from(n).map_or_else(|_| Value::Float(n as f64), Value::Int),
        Primitive::Float(n) => Value::Float(n),
        Primitive::Str(index) => world.string(index).map_or(Value::Null, Value::from),
        Primitive::Entity(raw) => {
            let target = EntityId(raw);
            if target.is_none() {
                return Value::Null;
            }
            world.name(target).map_or(Value::Null, Value::from)
        }
        Primitive::Id(raw) => Value::String(format!("#{raw}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryWorld;
    use crate::reflect::PrimitiveKind;

    #[test]
    fn options_builder() {
        let options = BridgeOptions::default().with_max_depth(3).with_full_paths(true);
        assert_eq!(options.max_depth, 3);
        assert!(options.names_as_full_paths);
        assert_eq!(BridgeOptions::default().max_depth, 64);
    }

    #[test]
    fn reads_every_primitive_kind() {
        let mut registry = TypeRegistry::new();
        let members: Vec<(&str, _)> = [
            ("flag", PrimitiveKind::Bool),
            ("small", PrimitiveKind::I8),
            ("wide", PrimitiveKind::U64),
            ("ratio", PrimitiveKind::F32),
            ("label", PrimitiveKind::String),
            ("target", PrimitiveKind::Entity),
            ("none", PrimitiveKind::Entity),
            ("handle", PrimitiveKind::Id),
        ]
        .into_iter()
        .map(|(name, kind)| (name, registry.lookup(kind.name()).unwrap()))
        .collect();
        registry.register_struct("Everything", &members).unwrap();

        let wire = r##"{"results":[
            {"name":"Other"},
            {"name":"A","components":{"Everything":{
                "flag":true,"small":-3,"wide":7,"ratio":0.5,"label":"hi",
                "target":"Other","none":null,"handle":"#42"}}}
        ]}"##;
        let world = MemoryWorld::from_wire(&registry, wire).unwrap();
        let scene = WorldBridge::new(&registry).from_world(&world, "T", "1.0.0");

        let data = &scene.find_entity("A").unwrap().find_component("Everything").unwrap().data;
        assert_eq!(data.get("flag"), Some(&Value::Bool(true)));
        assert_eq!(data.get("small"), Some(&Value::Int(-3)));
        assert_eq!(data.get("wide"), Some(&Value::Int(7)));
        assert_eq!(data.get("ratio"), Some(&Value::Float(0.5)));
        assert_eq!(data.get("label"), Some(&Value::from("hi")));
        assert_eq!(data.get("target"), Some(&Value::from("Other")));
        assert_eq!(data.get("none"), Some(&Value::Null));
        assert_eq!(data.get("handle"), Some(&Value::from("#42")));
    }

    #[test]
    fn depth_ceiling_substitutes_sentinel() {
        let mut registry = TypeRegistry::new();
        let i32_id = registry.lookup("i32").unwrap();
        let inner = registry.register_struct("Inner", &[("v", i32_id)]).unwrap();
        let middle = registry.register_struct("Middle", &[("inner", inner)]).unwrap();
        registry.register_struct("Outer", &[("middle", middle)]).unwrap();

        let wire = r#"{"results":[{"name":"A","components":{"Outer":{"middle":{"inner":{"v":5}}}}}]}"#;
        let world = MemoryWorld::from_wire(&registry, wire).unwrap();

        let deep = WorldBridge::new(&registry).from_world(&world, "T", "1.0.0");
        let outer = &deep.entities[0].components[0].data;
        assert_eq!(outer.pointer("middle.inner.v"), Some(&Value::Int(5)));

        let shallow = WorldBridge::with_options(&registry, BridgeOptions::default().with_max_depth(2))
            .from_world(&world, "T", "1.0.0");
        let outer = &shallow.entities[0].components[0].data;
        assert_eq!(outer.pointer("middle.inner"), Some(&Value::from(MAX_DEPTH_SENTINEL)));
    }

    #[test]
    fn skips_internal_and_anonymous_entities() {
        let registry = TypeRegistry::new();
        let wire = r##"{"results":[{"name":"A","tags":["Prefab","Visible"]},{"name":"#1","pairs":{"JointType":"hinge"}}]}"##;
        let world = MemoryWorld::from_wire(&registry, wire).unwrap();
        let scene = WorldBridge::new(&registry).from_world(&world, "T", "1.0.0");

        let names: Vec<_> = scene.entities.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["A"]);
        assert_eq!(scene.entities[0].tags, ["Visible"]);
        assert!(scene.joints.is_empty());
    }
}
