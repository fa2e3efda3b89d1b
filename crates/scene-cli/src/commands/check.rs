use std::path::Path;

use scene_core::{ValidateOptions, validate_with};

pub fn run(file: &Path, strict: bool) -> Result<(), String> {
    let scene = super::load_scene(file)?;

    if strict {
        validate_with(&scene, &ValidateOptions::strict()).map_err(|err| {
            super::print_error(&err);
            "strict checks failed".to_string()
        })?;
    }

    println!("  All checks passed for '{}'.", scene.metadata.name);
    println!(
        "  {} entities, {} components, {} relations",
        scene.entity_count(),
        scene.component_count(),
        scene.relations.len()
    );

    Ok(())
}
