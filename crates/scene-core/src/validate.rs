//! Structural checks over a completed [`Scene`].

use std::collections::{HashMap, HashSet};

use tracing::instrument;

use crate::error::{ErrorKind, SceneError, SceneResult};
use crate::scene::Scene;

/// Optional checks beyond the default rule set.
///
/// Both are off by default so `validate` reports exactly the structural
/// rules: required metadata, version format, unique names, and relation
/// references.
#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    /// Also require every tree node to name a declared entity.
    pub check_tree_references: bool,
    /// Also reject cycles among flat relations.
    pub detect_cycles: bool,
}

impl ValidateOptions {
    /// Everything on.
    pub fn strict() -> Self {
        Self {
            check_tree_references: true,
            detect_cycles: true,
        }
    }

    /// Toggle tree reference checks.
    pub fn with_tree_references(mut self, on: bool) -> Self {
        self.check_tree_references = on;
        self
    }

    /// Toggle cycle detection.
    pub fn with_cycle_detection(mut self, on: bool) -> Self {
        self.detect_cycles = on;
        self
    }
}

/// Runs the default checks, stopping at the first failure.
pub fn validate(scene: &Scene) -> SceneResult<()> {
    validate_with(scene, &ValidateOptions::default())
}

/// Runs the default checks plus whatever `options` enables.
#[instrument(skip_all, fields(scene = %scene.metadata.name))]
pub fn validate_with(scene: &Scene, options: &ValidateOptions) -> SceneResult<()> {
    if scene.metadata.name.is_empty() {
        return Err(SceneError::missing("name").at("metadata"));
    }
    if scene.metadata.version.is_empty() {
        return Err(SceneError::missing("version").at("metadata"));
    }
    if !is_valid_version(&scene.metadata.version) {
        return Err(SceneError::validation(format!(
            "version \"{}\" must look like MAJOR.MINOR.PATCH",
            scene.metadata.version
        ))
        .at("metadata.version"));
    }

    check_unique_names(scene)?;

    let names: HashSet<&str> = scene.entities.iter().map(|e| e.name.as_str()).collect();
    for (i, rel) in scene.relations.iter().enumerate() {
        for name in [&rel.parent, &rel.child] {
            if !names.contains(name.as_str()) {
                return Err(SceneError::invalid_reference(name)
                    .at(format!("hierarchy.relations[{i}]")));
            }
        }
    }

    if options.check_tree_references {
        if let Some(tree) = &scene.tree {
            if let Some(missing) = tree.entity_names().into_iter().find(|n| !names.contains(n)) {
                return Err(SceneError::invalid_reference(missing).at("hierarchy.tree"));
            }
        }
    }

    if options.detect_cycles {
        check_acyclic(scene)?;
    }

    tracing::debug!(entities = scene.entities.len(), "scene is valid");
    Ok(())
}

/// `^\d+\.\d+\.\d+$`: three non-empty digit runs separated by exactly two dots.
pub fn is_valid_version(version: &str) -> bool {
    let parts: Vec<&str> = version.split('.').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
}

/// Reports the duplicate with the earliest second occurrence.
fn check_unique_names(scene: &Scene) -> SceneResult<()> {
    for (j, later) in scene.entities.iter().enumerate() {
        if scene.entities[..j].iter().any(|e| e.name == later.name) {
            return Err(SceneError::validation(format!(
                "duplicate entity name \"{}\"",
                later.name
            ))
            .at(format!("entities.{}", later.name)));
        }
    }
    Ok(())
}

/// Depth-first search over parent -> child edges with a visited set.
fn check_acyclic(scene: &Scene) -> SceneResult<()> {
    let mut edges: HashMap<&str, Vec<&str>> = HashMap::new();
    for rel in &scene.relations {
        edges.entry(rel.parent.as_str()).or_default().push(rel.child.as_str());
    }

    let mut done: HashSet<&str> = HashSet::new();
    for rel in &scene.relations {
        let start = rel.parent.as_str();
        if done.contains(start) {
            continue;
        }
        // (node, next child index); `on_path` mirrors the stack.
        let mut stack: Vec<(&str, usize)> = vec![(start, 0)];
        let mut on_path: HashSet<&str> = HashSet::from([start]);
        while let Some((node, next)) = stack.pop() {
            let children = edges.get(node).map(Vec::as_slice).unwrap_or_default();
            match children.get(next) {
                Some(&child) => {
                    stack.push((node, next + 1));
                    if on_path.contains(child) {
                        return Err(SceneError::new(
                            ErrorKind::CircularDependency,
                            format!("\"{child}\" is its own ancestor (via \"{node}\")"),
                        )
                        .at("hierarchy.relations"));
                    }
                    if !done.contains(child) {
                        on_path.insert(child);
                        stack.push((child, 0));
                    }
                }
                None => {
                    on_path.remove(node);
                    done.insert(node);
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::hierarchy::{Branch, HierarchyRelation, HierarchyTree};
    use crate::scene::SceneMetadata;
    use proptest::prelude::*;

    fn scene_with(names: &[&str]) -> Scene {
        let mut scene = Scene::new(SceneMetadata::new("Test", "1.0.0"));
        scene.entities = names.iter().map(|n| Entity::new(*n)).collect();
        scene
    }

    #[test]
    fn valid_scene_passes() {
        let mut scene = scene_with(&["A", "B"]);
        scene.relations.push(HierarchyRelation::new("A", "B", 0));
        assert!(validate(&scene).is_ok());
    }

    #[test]
    fn missing_name_is_reported_first() {
        let mut scene = scene_with(&["A", "A"]);
        scene.metadata.name.clear();
        scene.metadata.version = "bad".into();
        let err = validate(&scene).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingRequired);
    }

    #[test]
    fn malformed_versions_rejected() {
        for version in ["1.0", "1.0.0.0", "v1.0.0", "1..0", "1.0.x", " 1.0.0"] {
            let mut scene = scene_with(&[]);
            scene.metadata.version = version.into();
            let err = validate(&scene).unwrap_err();
            assert_eq!(err.kind, ErrorKind::ValidationError, "{version}");
        }
    }

    #[test]
    fn empty_version_is_missing() {
        let mut scene = scene_with(&[]);
        scene.metadata.version.clear();
        assert_eq!(validate(&scene).unwrap_err().kind, ErrorKind::MissingRequired);
    }

    #[test]
    fn first_duplicate_by_second_index() {
        let scene = scene_with(&["A", "B", "B", "A"]);
        let err = validate(&scene).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValidationError);
        assert!(err.message.contains("\"B\""));
    }

    #[test]
    fn dangling_relation_is_invalid_reference() {
        let mut scene = scene_with(&["A"]);
        scene.relations.push(HierarchyRelation::new("A", "Ghost", 0));
        let err = validate(&scene).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidReference);
        assert!(err.message.contains("Ghost"));
        assert_eq!(err.path.as_deref(), Some("hierarchy.relations[0]"));
    }

    #[test]
    fn cycles_pass_by_default() {
        let mut scene = scene_with(&["A", "B"]);
        scene.relations.push(HierarchyRelation::new("A", "B", 0));
        scene.relations.push(HierarchyRelation::new("B", "A", 0));
        assert!(validate(&scene).is_ok());
    }

    #[test]
    fn cycles_detected_when_enabled() {
        let mut scene = scene_with(&["A", "B", "C"]);
        scene.relations.push(HierarchyRelation::new("A", "B", 0));
        scene.relations.push(HierarchyRelation::new("B", "C", 0));
        scene.relations.push(HierarchyRelation::new("C", "A", 0));
        let options = ValidateOptions::default().with_cycle_detection(true);
        let err = validate_with(&scene, &options).unwrap_err();
        assert_eq!(err.kind, ErrorKind::CircularDependency);
    }

    #[test]
    fn diamonds_are_not_cycles() {
        let mut scene = scene_with(&["A", "B", "C", "D"]);
        for (p, c) in [("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")] {
            scene.relations.push(HierarchyRelation::new(p, c, 0));
        }
        assert!(validate_with(&scene, &ValidateOptions::strict()).is_ok());
    }

    #[test]
    fn self_parent_is_a_cycle() {
        let mut scene = scene_with(&["A"]);
        scene.relations.push(HierarchyRelation::new("A", "A", 0));
        let err = validate_with(&scene, &ValidateOptions::strict()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::CircularDependency);
    }

    #[test]
    fn tree_references_checked_when_enabled() {
        let mut scene = scene_with(&["World"]);
        scene.tree = HierarchyTree::from_roots(vec![
            Branch::leaf("World"),
            Branch::leaf("Nowhere"),
        ]);
        assert!(validate(&scene).is_ok());
        let options = ValidateOptions::default().with_tree_references(true);
        let err = validate_with(&scene, &options).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidReference);
        assert!(err.message.contains("Nowhere"));
    }

    proptest! {
        #[test]
        fn digit_triples_are_valid(a in 0u32..10_000, b in 0u32..10_000, c in 0u32..10_000) {
            let version = format!("{a}.{b}.{c}");
            prop_assert!(is_valid_version(&version));
        }

        #[test]
        fn other_shapes_are_invalid(version in "[0-9.a-z]{0,12}") {
            let parts: Vec<&str> = version.split('.').collect();
            let expected = parts.len() == 3
                && parts.iter().all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()));
            prop_assert_eq!(is_valid_version(&version), expected);
        }
    }
}
