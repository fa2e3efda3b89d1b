use scene_core::{
    Branch, Entity, HierarchyRelation, HierarchyTree, JointConstraint, Meta, Scene, SceneError,
    SceneMetadata, SceneResult, SystemConfig,
};
use tracing::debug;

use crate::node::Node;

/// Builds a [`Scene`] from a document tree.
///
/// Parsing stops at the first structural problem; nothing partial is
/// returned. The version format and name uniqueness are left to the
/// validator.
pub fn parse(root: &Node) -> SceneResult<Scene> {
    let root_map = expect_mapping(root, "document")?;

    let metadata = required(root_map, "metadata", "document")?;
    let mut scene = Scene::new(parse_metadata(metadata)?);

    let entities = required(root_map, "entities", "document")?;
    for (name, decl) in expect_mapping(entities, "entities")? {
        let entity = parse_entity(name, decl, &format!("entities.{name}"))?;
        scene.entities.push(entity);
    }

    if let Some(hierarchy) = lookup(root_map, "hierarchy") {
        let hierarchy = expect_mapping(hierarchy, "hierarchy")?;
        if let Some(tree) = lookup(hierarchy, "tree") {
            scene.tree = parse_tree(tree, "hierarchy.tree")?;
        }
        if let Some(relations) = lookup(hierarchy, "relations") {
            scene.relations = parse_relations(relations, "hierarchy.relations")?;
        }
    }

    if let Some(joints) = joints_node(root_map)? {
        scene.joints = parse_joints(joints, "relationships.constraints.joints")?;
    }

    if let Some(systems) = lookup(root_map, "systems") {
        for (name, decl) in expect_mapping(systems, "systems")? {
            let system = parse_system(name, decl, &format!("systems.{name}"))?;
            scene.systems.push(system);
        }
    }

    for (key, _) in root_map {
        if !matches!(
            key.as_str(),
            "metadata" | "entities" | "hierarchy" | "relationships" | "systems"
        ) {
            debug!(key = %key, "ignoring unknown top-level key");
        }
    }

    Ok(scene)
}

// -- Shape helpers --

fn lookup<'a>(map: &'a [(String, Node)], key: &str) -> Option<&'a Node> {
    map.iter().find(|(k, _)| k == key).map(|(_, v)| v)
}

fn required<'a>(map: &'a [(String, Node)], key: &str, path: &str) -> SceneResult<&'a Node> {
    lookup(map, key).ok_or_else(|| SceneError::missing(key).at(path))
}

fn expect_mapping<'a>(node: &'a Node, path: &str) -> SceneResult<&'a [(String, Node)]> {
    node.as_mapping()
        .ok_or_else(|| SceneError::invalid_type("mapping", node.kind_name()).at(path))
}

/// Like [`expect_mapping`], but an empty value counts as an empty mapping.
fn mapping_or_empty<'a>(node: &'a Node, path: &str) -> SceneResult<&'a [(String, Node)]> {
    match node {
        Node::Null => Ok(&[]),
        other => expect_mapping(other, path),
    }
}

fn sequence_or_empty<'a>(node: &'a Node, path: &str) -> SceneResult<&'a [Node]> {
    match node {
        Node::Null => Ok(&[]),
        Node::Sequence(items) => Ok(items),
        other => Err(SceneError::invalid_type("sequence", other.kind_name()).at(path)),
    }
}

/// Scalar text; an empty value reads as `None`.
fn optional_scalar<'a>(node: &'a Node, path: &str) -> SceneResult<Option<&'a str>> {
    match node {
        Node::Null => Ok(None),
        Node::Scalar(text) => Ok(Some(text)),
        other => Err(SceneError::invalid_type("scalar", other.kind_name()).at(path)),
    }
}

fn required_scalar<'a>(map: &'a [(String, Node)], key: &str, path: &str) -> SceneResult<&'a str> {
    let node = required(map, key, path)?;
    optional_scalar(node, &format!("{path}.{key}"))?
        .filter(|text| !text.is_empty())
        .ok_or_else(|| SceneError::missing(key).at(path))
}

fn field_scalar<'a>(map: &'a [(String, Node)], key: &str, path: &str) -> SceneResult<Option<&'a str>> {
    match lookup(map, key) {
        Some(node) => optional_scalar(node, &format!("{path}.{key}")),
        None => Ok(None),
    }
}

/// `enabled` is true when absent, otherwise true only for `true` or `1`.
fn parse_enabled(map: &[(String, Node)], path: &str) -> SceneResult<bool> {
    match lookup(map, "enabled") {
        None => Ok(true),
        Some(node) => Ok(matches!(
            optional_scalar(node, &format!("{path}.enabled"))?,
            Some("true" | "1")
        )),
    }
}

// -- Sections --

fn parse_metadata(node: &Node) -> SceneResult<SceneMetadata> {
    let map = expect_mapping(node, "metadata")?;
    let mut metadata = SceneMetadata::new(
        required_scalar(map, "name", "metadata")?,
        required_scalar(map, "version", "metadata")?,
    );
    metadata.author = field_scalar(map, "author", "metadata")?.map(str::to_string);
    metadata.description = field_scalar(map, "description", "metadata")?.map(str::to_string);
    Ok(metadata)
}

fn parse_entity(name: &str, decl: &Node, path: &str) -> SceneResult<Entity> {
    let mut entity = Entity::new(name);
    let map = mapping_or_empty(decl, path)?;
    entity.enabled = parse_enabled(map, path)?;

    for (key, node) in map {
        let field_path = format!("{path}.{key}");
        match key.as_str() {
            "_meta" => entity.meta = Some(parse_meta(node, &field_path)?),
            "prefab" => entity.prefab = optional_scalar(node, &field_path)?.map(str::to_string),
            "tags" => {
                for (i, tag) in sequence_or_empty(node, &field_path)?.iter().enumerate() {
                    let tag_path = format!("{field_path}[{i}]");
                    let text = tag
                        .as_scalar()
                        .ok_or_else(|| SceneError::invalid_type("scalar", tag.kind_name()).at(&tag_path))?;
                    if !entity.add_tag(text) {
                        debug!(entity = %name, tag = %text, "repeated tag ignored");
                    }
                }
            }
            "components" => {
                for (type_name, data) in mapping_or_empty(node, &field_path)? {
                    entity.add_component(type_name.as_str(), data.to_value());
                }
            }
            "properties" => {
                for (prop, data) in mapping_or_empty(node, &field_path)? {
                    entity.properties.push((prop.clone(), data.to_value()));
                }
            }
            "enabled" => {}
            other => debug!(entity = %name, key = %other, "ignoring unknown entity key"),
        }
    }

    Ok(entity)
}

fn parse_meta(node: &Node, path: &str) -> SceneResult<Meta> {
    let mut meta = Meta::default();

    for (key, value) in mapping_or_empty(node, path)? {
        let field_path = format!("{path}.{key}");
        match key.as_str() {
            "description" => meta.description = optional_scalar(value, &field_path)?.map(str::to_string),
            "author" => meta.author = optional_scalar(value, &field_path)?.map(str::to_string),
            "todo" => meta.todo = optional_scalar(value, &field_path)?.map(str::to_string),
            "notes" => match value {
                Node::Sequence(items) => {
                    for (i, item) in items.iter().enumerate() {
                        if let Some(note) = optional_scalar(item, &format!("{field_path}[{i}]"))? {
                            meta.notes.push(note.to_string());
                        }
                    }
                }
                other => {
                    if let Some(note) = optional_scalar(other, &field_path)? {
                        meta.notes.push(note.to_string());
                    }
                }
            },
            "deprecated" => meta.deprecated = value.as_scalar() == Some("true"),
            "version" => {
                meta.version = value
                    .as_scalar()
                    .and_then(|text| text.parse().ok())
                    .unwrap_or(0);
            }
            custom => match value {
                Node::Scalar(text) => meta.set_custom(custom, text.as_str()),
                Node::Null => meta.set_custom(custom, ""),
                nested => {
                    debug!(key = %custom, shape = nested.kind_name(), path = %path, "dropping non-scalar meta field");
                }
            },
        }
    }

    Ok(meta)
}

fn parse_tree(node: &Node, path: &str) -> SceneResult<Option<HierarchyTree>> {
    let roots = expect_mapping(node, path)?
        .iter()
        .map(|(name, children)| {
            let children = parse_children(children, &format!("{path}.{name}"))?;
            Ok(Branch::new(name.as_str(), children))
        })
        .collect::<SceneResult<Vec<_>>>()?;
    Ok(HierarchyTree::from_roots(roots))
}

fn parse_children(node: &Node, path: &str) -> SceneResult<Vec<Branch>> {
    sequence_or_empty(node, path)?
        .iter()
        .enumerate()
        .map(|(i, child)| parse_child(child, &format!("{path}[{i}]")))
        .collect()
}

/// A child is a bare name or a single-key mapping of name to children.
fn parse_child(node: &Node, path: &str) -> SceneResult<Branch> {
    match node {
        Node::Scalar(name) => Ok(Branch::leaf(name.as_str())),
        Node::Mapping(entries) => match entries.as_slice() {
            [(name, children)] => {
                let children = parse_children(children, &format!("{path}.{name}"))?;
                Ok(Branch::new(name.as_str(), children))
            }
            _ => Err(SceneError::invalid_type(
                "single-key mapping",
                &format!("mapping with {} keys", entries.len()),
            )
            .at(path)),
        },
        other => Err(SceneError::invalid_type("name or single-key mapping", other.kind_name()).at(path)),
    }
}

fn parse_relations(node: &Node, path: &str) -> SceneResult<Vec<HierarchyRelation>> {
    sequence_or_empty(node, path)?
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let item_path = format!("{path}[{i}]");
            let map = expect_mapping(item, &item_path)?;
            let order = field_scalar(map, "order", &item_path)?
                .and_then(|text| text.parse().ok())
                .unwrap_or(0);
            Ok(HierarchyRelation::new(
                required_scalar(map, "parent", &item_path)?,
                required_scalar(map, "child", &item_path)?,
                order,
            ))
        })
        .collect()
}

/// `relationships.constraints.joints`, tolerating any missing level.
fn joints_node(root: &[(String, Node)]) -> SceneResult<Option<&Node>> {
    let Some(relationships) = lookup(root, "relationships") else {
        return Ok(None);
    };
    let relationships = mapping_or_empty(relationships, "relationships")?;
    let Some(constraints) = lookup(relationships, "constraints") else {
        return Ok(None);
    };
    let constraints = mapping_or_empty(constraints, "relationships.constraints")?;
    Ok(lookup(constraints, "joints"))
}

fn parse_joints(node: &Node, path: &str) -> SceneResult<Vec<JointConstraint>> {
    sequence_or_empty(node, path)?
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let item_path = format!("{path}[{i}]");
            let map = expect_mapping(item, &item_path)?;
            Ok(JointConstraint::new(
                required_scalar(map, "type", &item_path)?,
                field_scalar(map, "entity_a", &item_path)?.unwrap_or_default(),
                field_scalar(map, "entity_b", &item_path)?.unwrap_or_default(),
            ))
        })
        .collect()
}

fn parse_system(name: &str, decl: &Node, path: &str) -> SceneResult<SystemConfig> {
    let map = mapping_or_empty(decl, path)?;
    let meta = match lookup(map, "_meta") {
        Some(node) => Some(parse_meta(node, &format!("{path}._meta"))?),
        None => None,
    };
    Ok(SystemConfig {
        name: name.to_string(),
        meta,
        enabled: parse_enabled(map, path)?,
        config: Node::Mapping(map.to_vec()).to_value(),
    })
}
