use std::collections::HashSet;

use serde::Serialize;

use crate::entity::Entity;
use crate::hierarchy::{HierarchyNode, HierarchyRelation, HierarchyTree};
use crate::meta::Meta;
use crate::value::Value;

/// Metadata about the scene itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SceneMetadata {
    /// Scene name. Required.
    pub name: String,
    /// Version in `MAJOR.MINOR.PATCH` form. Required.
    pub version: String,
    /// Optional author.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Optional description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SceneMetadata {
    /// Creates metadata with a name and version.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            author: None,
            description: None,
        }
    }
}

/// A relationship between two entities outside the parent/child hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JointConstraint {
    /// Joint kind, e.g. `hinge`.
    pub joint_type: String,
    /// First entity.
    pub entity_a: String,
    /// Second entity.
    pub entity_b: String,
}

impl JointConstraint {
    /// Creates a joint.
    pub fn new(
        joint_type: impl Into<String>,
        entity_a: impl Into<String>,
        entity_b: impl Into<String>,
    ) -> Self {
        Self {
            joint_type: joint_type.into(),
            entity_a: entity_a.into(),
            entity_b: entity_b.into(),
        }
    }
}

/// A system declaration, consumed opaquely by the runtime.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemConfig {
    /// System name.
    pub name: String,
    /// Descriptive annotations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    /// Whether the system runs.
    pub enabled: bool,
    /// The whole declared mapping.
    pub config: Value,
}

/// The in-memory model of one scene document. Owns everything reachable
/// from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Scene {
    /// Scene-level metadata.
    pub metadata: SceneMetadata,
    /// Entities in declaration order.
    pub entities: Vec<Entity>,
    /// Flat hierarchy edges.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub relations: Vec<HierarchyRelation>,
    /// Nested hierarchy, independent of `relations`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree: Option<HierarchyTree>,
    /// Joint constraints.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub joints: Vec<JointConstraint>,
    /// System declarations.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub systems: Vec<SystemConfig>,
}

impl Scene {
    /// Creates an empty scene.
    pub fn new(metadata: SceneMetadata) -> Self {
        Self {
            metadata,
            ..Default::default()
        }
    }

    /// Finds an entity by exact name.
    pub fn find_entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Mutable form of [`Scene::find_entity`].
    pub fn find_entity_mut(&mut self, name: &str) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.name == name)
    }

    /// Finds a system by name.
    pub fn find_system(&self, name: &str) -> Option<&SystemConfig> {
        self.systems.iter().find(|s| s.name == name)
    }

    /// Finds an entity node in the tree form of the hierarchy. The virtual
    /// root is never returned.
    pub fn find_hierarchy_node(&self, name: &str) -> Option<&HierarchyNode> {
        self.tree.as_ref()?.find(name)
    }

    /// Parent of `child` per the flat relations; the first matching relation
    /// wins.
    pub fn parent_of(&self, child: &str) -> Option<&str> {
        self.relations
            .iter()
            .find(|r| r.child == child)
            .map(|r| r.parent.as_str())
    }

    /// Relations whose parent is `parent`, sorted by their order hint.
    pub fn children_of(&self, parent: &str) -> Vec<&HierarchyRelation> {
        let mut children: Vec<_> = self.relations.iter().filter(|r| r.parent == parent).collect();
        children.sort_by_key(|r| r.order);
        children
    }

    /// Ancestor chain from the topmost ancestor down to `name` itself,
    /// following flat relations. Stops if a name repeats, so cyclic
    /// relations still terminate.
    pub fn ancestor_path<'a>(&'a self, name: &'a str) -> Vec<&'a str> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(name);
        while let Some(n) = current {
            if !seen.insert(n) {
                break;
            }
            chain.push(n);
            current = self.parent_of(n);
        }
        chain.reverse();
        chain
    }

    /// Number of entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Total number of components over all entities.
    pub fn component_count(&self) -> usize {
        self.entities.iter().map(|e| e.components.len()).sum()
    }
}
