use std::path::Path;

use comfy_table::{ContentArrangement, Table};

pub fn run(file: &Path, tag: Option<&str>) -> Result<(), String> {
    let scene = super::load_scene(file)?;

    let results: Vec<_> = scene
        .entities
        .iter()
        .filter(|e| tag.is_none_or(|t| e.has_tag(t)))
        .collect();

    if results.is_empty() {
        println!("  No entities found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Prefab", "Tags", "Components", "Enabled"]);

    for entity in &results {
        let prefab = entity.prefab.clone().unwrap_or_else(|| "-".to_string());
        let tags = if entity.tags.is_empty() {
            "-".to_string()
        } else {
            entity.tags.join(", ")
        };
        let components = if entity.components.is_empty() {
            "-".to_string()
        } else {
            entity
                .components
                .iter()
                .map(|c| c.type_name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let enabled = if entity.enabled { "yes" } else { "no" };

        table.add_row(vec![
            entity.name.as_str(),
            prefab.as_str(),
            tags.as_str(),
            components.as_str(),
            enabled,
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} entities", results.len());

    Ok(())
}
