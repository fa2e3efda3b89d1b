//! Rendering a [`Scene`] back to document text and to JSON.
//!
//! The text form is deliberately lossy: entity properties, the tree form of
//! the hierarchy, and systems are not written. Parsing the output again
//! yields the same entities, tags, components and enabled flags.

use crate::entity::Entity;
use crate::meta::Meta;
use crate::scene::Scene;
use crate::value::{write_text_entry, write_text_scalar, Value};

/// Renders the scene as a YAML document.
pub fn to_text(scene: &Scene) -> String {
    let mut out = String::new();

    out.push_str("metadata:\n");
    field(&mut out, 2, "name", &scene.metadata.name);
    field(&mut out, 2, "version", &scene.metadata.version);
    if let Some(author) = &scene.metadata.author {
        field(&mut out, 2, "author", author);
    }
    if let Some(description) = &scene.metadata.description {
        field(&mut out, 2, "description", description);
    }

    if scene.entities.is_empty() {
        out.push_str("entities: {}\n");
    } else {
        out.push_str("entities:\n");
        for entity in &scene.entities {
            write_entity(&mut out, entity);
        }
    }

    if !scene.relations.is_empty() {
        out.push_str("hierarchy:\n  relations:\n");
        for rel in &scene.relations {
            out.push_str("    - parent: ");
            write_text_scalar(&mut out, &rel.parent);
            out.push_str("\n      child: ");
            write_text_scalar(&mut out, &rel.child);
            out.push_str(&format!("\n      order: {}\n", rel.order));
        }
    }

    if !scene.joints.is_empty() {
        out.push_str("relationships:\n  constraints:\n    joints:\n");
        for joint in &scene.joints {
            out.push_str("      - type: ");
            write_text_scalar(&mut out, &joint.joint_type);
            out.push_str("\n        entity_a: ");
            write_text_scalar(&mut out, &joint.entity_a);
            out.push_str("\n        entity_b: ");
            write_text_scalar(&mut out, &joint.entity_b);
            out.push('\n');
        }
    }

    out
}

/// Renders the full model, including the parts [`to_text`] drops, as
/// compact JSON.
pub fn to_json(scene: &Scene) -> Result<String, serde_json::Error> {
    serde_json::to_string(scene)
}

/// Indented form of [`to_json`].
pub fn to_json_pretty(scene: &Scene) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(scene)
}

fn field(out: &mut String, indent: usize, key: &str, value: &str) {
    out.extend(std::iter::repeat_n(' ', indent));
    write_text_scalar(out, key);
    out.push_str(": ");
    write_text_scalar(out, value);
    out.push('\n');
}

fn write_entity(out: &mut String, entity: &Entity) {
    let meta = entity.meta.as_ref().filter(|m| !m.is_empty());
    let prefab = entity.prefab.as_deref().filter(|p| !p.is_empty());
    let bare = meta.is_none()
        && prefab.is_none()
        && entity.enabled
        && entity.tags.is_empty()
        && entity.components.is_empty();

    out.push_str("  ");
    write_text_scalar(out, &entity.name);
    if bare {
        out.push_str(": {}\n");
        return;
    }
    out.push_str(":\n");

    if let Some(meta) = meta {
        out.push_str("    _meta:\n");
        write_meta(out, 6, meta);
    }
    if let Some(prefab) = prefab {
        field(out, 4, "prefab", prefab);
    }
    if !entity.enabled {
        out.push_str("    enabled: false\n");
    }
    if !entity.tags.is_empty() {
        out.push_str("    tags:\n");
        for tag in &entity.tags {
            out.push_str("      - ");
            write_text_scalar(out, tag);
            out.push('\n');
        }
    }
    if !entity.components.is_empty() {
        out.push_str("    components:\n");
        for component in &entity.components {
            write_text_entry(out, 6, &component.type_name, &component.data);
        }
    }
}

fn write_meta(out: &mut String, indent: usize, meta: &Meta) {
    if let Some(description) = &meta.description {
        field(out, indent, "description", description);
    }
    if let Some(author) = &meta.author {
        field(out, indent, "author", author);
    }
    if !meta.notes.is_empty() {
        let notes = Value::Array(meta.notes.iter().map(|n| Value::from(n.as_str())).collect());
        write_text_entry(out, indent, "notes", &notes);
    }
    if let Some(todo) = &meta.todo {
        field(out, indent, "todo", todo);
    }
    if meta.deprecated {
        write_text_entry(out, indent, "deprecated", &Value::Bool(true));
    }
    if meta.version != 0 {
        write_text_entry(out, indent, "version", &Value::Int(meta.version));
    }
    for (key, value) in &meta.custom {
        field(out, indent, key, value);
    }
}
