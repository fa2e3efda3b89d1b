use std::collections::HashSet;
use std::path::Path;

use scene_core::Scene;

pub fn run(file: &Path) -> Result<(), String> {
    let scene = super::load_scene(file)?;

    if let Some(tree) = &scene.tree {
        println!("  Hierarchy tree for '{}'", scene.metadata.name);
        println!();
        for (id, depth) in tree.walk() {
            if let Some(node) = tree.node(id) {
                println!("  {}{}", "  ".repeat(depth), node.name);
            }
        }
        return Ok(());
    }

    if scene.relations.is_empty() {
        println!("  No hierarchy declared.");
        return Ok(());
    }

    println!("  Hierarchy for '{}'", scene.metadata.name);
    println!();
    let mut seen = HashSet::new();
    for entity in &scene.entities {
        if scene.parent_of(&entity.name).is_none() && !scene.children_of(&entity.name).is_empty() {
            print_relations(&scene, &entity.name, 0, &mut seen);
        }
    }
    // Entities only reachable through a cycle have no root above them.
    for relation in &scene.relations {
        if !seen.contains(relation.parent.as_str()) {
            print_relations(&scene, &relation.parent, 0, &mut seen);
        }
    }

    Ok(())
}

fn print_relations<'a>(scene: &'a Scene, name: &'a str, depth: usize, seen: &mut HashSet<&'a str>) {
    if !seen.insert(name) {
        println!("  {}{name} (cycle)", "  ".repeat(depth));
        return;
    }
    println!("  {}{name}", "  ".repeat(depth));
    for relation in scene.children_of(name) {
        print_relations(scene, &relation.child, depth + 1, seen);
    }
}
