use std::path::Path;

use scene_bridge::{BridgeOptions, MemoryWorld, TypeRegistry, WorldBridge};
use scene_core::to_text;
use tracing::debug;

pub fn run(file: &Path, max_depth: usize, full_paths: bool) -> Result<(), String> {
    let scene = super::load_scene(file)?;

    let mut registry = TypeRegistry::new();
    let inferred = registry.infer_from_scene(&scene);
    debug!(inferred, types = registry.len(), "component layouts ready");

    let options = BridgeOptions::default()
        .with_max_depth(max_depth)
        .with_full_paths(full_paths);
    let bridge = WorldBridge::with_options(&registry, options);

    let wire = bridge.to_wire(&scene).map_err(|e| e.to_string())?;
    let world = MemoryWorld::from_wire(&registry, &wire).map_err(|e| e.to_string())?;
    let back = bridge.from_world(&world, &scene.metadata.name, &scene.metadata.version);

    print!("{}", to_text(&back));
    Ok(())
}
