//! Scenes sent through the wire format and read back from a runtime.

use scene_bridge::{
    BridgeOptions, MAX_DEPTH_SENTINEL, MemoryWorld, PrimitiveKind, TypeRegistry, WorldBridge,
    to_wire,
};
use scene_core::{Entity, HierarchyRelation, Scene, SceneMetadata, Value, validate};

fn transform(x: i64, y: i64, z: i64) -> Value {
    Value::object([(
        "position",
        Value::object([("x", Value::Int(x)), ("y", Value::Int(y)), ("z", Value::Int(z))]),
    )])
}

fn round_trip(scene: &Scene, registry: &TypeRegistry, options: BridgeOptions) -> Scene {
    let bridge = WorldBridge::with_options(registry, options);
    let wire = bridge.to_wire(scene).unwrap();
    let world = MemoryWorld::from_wire(registry, &wire).unwrap();
    bridge.from_world(&world, &scene.metadata.name, &scene.metadata.version)
}

// ---------------------------------------------------------------------------
// Meaning preservation
// ---------------------------------------------------------------------------

#[test]
fn tagged_entity_with_transform_survives() {
    let mut scene = Scene::new(SceneMetadata::new("Demo", "1.0.0"));
    scene.entities.push(
        Entity::new("A")
            .with_tag("Controllable")
            .with_component("Transform", transform(1, 2, 3)),
    );

    let mut registry = TypeRegistry::new();
    registry.infer_from_scene(&scene);
    let back = round_trip(&scene, &registry, BridgeOptions::default());

    assert_eq!(back.metadata.name, "Demo");
    let a = back.find_entity("A").unwrap();
    assert!(a.has_tag("Controllable"));
    let data = &a.find_component("Transform").unwrap().data;
    assert_eq!(data.pointer("position.x").and_then(Value::as_number), Some(1.0));
    assert_eq!(data.pointer("position.y").and_then(Value::as_number), Some(2.0));
    assert_eq!(data.pointer("position.z").and_then(Value::as_number), Some(3.0));
}

#[test]
fn explicit_float_layout_reads_back_as_floats() {
    let mut scene = Scene::new(SceneMetadata::new("Demo", "1.0.0"));
    scene
        .entities
        .push(Entity::new("A").with_component("Transform", transform(1, 2, 3)));

    let mut registry = TypeRegistry::new();
    let f32_id = registry.lookup(PrimitiveKind::F32.name()).unwrap();
    let vec3 = registry
        .register_struct("Vec3", &[("x", f32_id), ("y", f32_id), ("z", f32_id)])
        .unwrap();
    registry
        .register_struct("Transform", &[("position", vec3)])
        .unwrap();

    let back = round_trip(&scene, &registry, BridgeOptions::default());
    let data = &back.entities[0].components[0].data;
    assert_eq!(data.pointer("position.y"), Some(&Value::Float(2.0)));
}

#[test]
fn document_scene_survives() {
    let scene = scene_doc::load_from_text(
        "\
metadata:
  name: Camp
  version: 1.0.0
entities:
  Actor:
    tags: [Template]
  Player:
    prefab: Actor
    tags: [Controllable, Hero]
    components:
      Transform:
        position: {x: 1, y: 2, z: 3}
      Label: Hero of the camp
      Waypoints: [4, 5, 6]
",
    )
    .unwrap();

    let mut registry = TypeRegistry::new();
    registry.infer_from_scene(&scene);
    let back = round_trip(&scene, &registry, BridgeOptions::default());

    let player = back.find_entity("Player").unwrap();
    let original = scene.find_entity("Player").unwrap();
    assert_eq!(player.tags, original.tags);
    assert_eq!(player.prefab.as_deref(), Some("Actor"));
    assert_eq!(player.components, original.components);
}

// ---------------------------------------------------------------------------
// Hierarchy
// ---------------------------------------------------------------------------

fn nested_scene() -> Scene {
    let mut scene = Scene::new(SceneMetadata::new("Nested", "1.0.0"));
    for name in ["World", "Camp", "Fire"] {
        scene.entities.push(Entity::new(name));
    }
    scene.relations.push(HierarchyRelation::new("World", "Camp", 0));
    scene.relations.push(HierarchyRelation::new("Camp", "Fire", 0));
    scene
}

#[test]
fn hierarchy_survives_with_full_paths() {
    let scene = nested_scene();
    let registry = TypeRegistry::new();
    let back = round_trip(&scene, &registry, BridgeOptions::default().with_full_paths(true));

    let names: Vec<_> = back.entities.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["World", "Camp", "Fire"]);
    assert_eq!(back.relations, scene.relations);
}

#[test]
fn hierarchy_survives_with_parent_fields() {
    let scene = nested_scene();
    let registry = TypeRegistry::new();
    let back = round_trip(&scene, &registry, BridgeOptions::default());
    assert_eq!(back.parent_of("Fire"), Some("Camp"));
    assert_eq!(back.parent_of("Camp"), Some("World"));
    assert_eq!(back.parent_of("World"), None);
}

#[test]
fn prefab_declared_before_its_nested_target() {
    let mut scene = Scene::new(SceneMetadata::new("Camp", "1.0.0"));
    scene.entities.push(Entity::new("Player").with_prefab("Actor"));
    scene.entities.push(Entity::new("World"));
    scene.entities.push(Entity::new("Actor"));
    scene.relations.push(HierarchyRelation::new("World", "Actor", 0));

    let registry = TypeRegistry::new();
    for options in [BridgeOptions::default(), BridgeOptions::default().with_full_paths(true)] {
        let back = round_trip(&scene, &registry, options);
        validate(&back).unwrap();

        let mut names: Vec<_> = back.entities.iter().map(|e| e.name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, ["Actor", "Player", "World"]);
        assert_eq!(back.find_entity("Player").unwrap().prefab.as_deref(), Some("Actor"));
        assert_eq!(back.parent_of("Actor"), Some("World"));
    }
}

// ---------------------------------------------------------------------------
// Best-effort reading
// ---------------------------------------------------------------------------

#[test]
fn unregistered_components_are_skipped() {
    let mut scene = Scene::new(SceneMetadata::new("Demo", "1.0.0"));
    scene.entities.push(
        Entity::new("A")
            .with_component("Transform", transform(1, 2, 3))
            .with_component("Script", Value::from("main.lua")),
    );

    let registry = TypeRegistry::new();
    let wire = to_wire(&scene, false).unwrap();
    let world = MemoryWorld::from_wire(&registry, &wire).unwrap();
    let back = WorldBridge::new(&registry).from_world(&world, "Demo", "1.0.0");

    assert_eq!(back.entity_count(), 1);
    assert!(back.entities[0].components.is_empty());
}

#[test]
fn deep_data_hits_the_ceiling() {
    let mut value = Value::Int(7);
    for _ in 0..10 {
        value = Value::object([("next", value)]);
    }
    let mut scene = Scene::new(SceneMetadata::new("Deep", "1.0.0"));
    scene.entities.push(Entity::new("A").with_component("Chain", value));

    let mut registry = TypeRegistry::new();
    registry.infer_from_scene(&scene);
    let back = round_trip(&scene, &registry, BridgeOptions::default().with_max_depth(4));

    let data = &back.entities[0].components[0].data;
    assert_eq!(
        data.pointer("next.next.next.next"),
        Some(&Value::from(MAX_DEPTH_SENTINEL))
    );
}
