use std::path::Path;

use colored::Colorize;
use scene_core::value::write_text_entry;

pub fn run(file: &Path, name: &str) -> Result<(), String> {
    let scene = super::load_scene(file)?;

    let entity = scene
        .find_entity(name)
        .ok_or_else(|| format!("entity not found: \"{name}\""))?;

    // Header
    match &entity.prefab {
        Some(prefab) => println!("  {} [{}]", entity.name.bold(), format!("is a {prefab}").dimmed()),
        None => println!("  {}", entity.name.bold()),
    }
    if !entity.enabled {
        println!("  {}", "disabled".yellow());
    }
    println!();

    if let Some(meta) = &entity.meta {
        if let Some(description) = &meta.description {
            for line in description.lines() {
                println!("  {}", line.trim());
            }
            println!();
        }
        if meta.deprecated {
            println!("  {}", "deprecated".red());
        }
        if let Some(todo) = &meta.todo {
            println!("  todo:       {todo}");
        }
        for note in &meta.notes {
            println!("  note:       {note}");
        }
    }

    if !entity.tags.is_empty() {
        println!("  tags:       {}", entity.tags.join(", "));
    }
    if let Some(parent) = scene.parent_of(&entity.name) {
        println!("  parent:     {parent}");
    }
    let children: Vec<_> = scene
        .children_of(&entity.name)
        .into_iter()
        .map(|r| r.child.as_str())
        .collect();
    if !children.is_empty() {
        println!("  children:   {}", children.join(", "));
    }

    if !entity.components.is_empty() {
        println!();
        println!("  {}", "Components:".bold());
        let mut out = String::new();
        for component in &entity.components {
            write_text_entry(&mut out, 4, &component.type_name, &component.data);
        }
        print!("{out}");
    }

    if !entity.properties.is_empty() {
        println!();
        println!("  {}", "Properties:".bold());
        let mut out = String::new();
        for (key, value) in &entity.properties {
            write_text_entry(&mut out, 4, key, value);
        }
        print!("{out}");
    }

    Ok(())
}
