//! The runtime's wire format.
//!
//! ```json
//! {"results":[
//!   {"parent":"World","name":"Player","tags":["Controllable"],
//!    "pairs":{"IsA":"Actor"},"components":{"Transform":{"position":{"x":1}}}},
//!   {"name":"#1","pairs":{"JointType":"hinge","JointA":"World","JointB":"Player"}}
//! ]}
//! ```
//!
//! Records whose name starts with `#` are anonymous. Joints are written that
//! way, numbered from 1.

use scene_core::{Entity, JointConstraint, Scene, Value};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::BridgeResult;

/// Prefix marking an anonymous record.
pub const ANONYMOUS_PREFIX: char = '#';

/// A whole wire document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireDocument {
    /// One record per entity, then one per joint.
    pub results: Vec<WireRecord>,
}

/// One entity as the runtime sees it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireRecord {
    /// Parent entity name, when names are not written as full paths.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Entity name or dotted path; `#<n>` for anonymous records.
    pub name: String,
    /// Plain tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Named relations to other entities.
    #[serde(default, skip_serializing_if = "WirePairs::is_empty")]
    pub pairs: WirePairs,
    /// Component payloads, in declaration order.
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "scene_core::value::serialize_pairs",
        deserialize_with = "deserialize_components"
    )]
    pub components: Vec<(String, Value)>,
}

/// The relations the bridge knows how to write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePairs {
    /// Prefab this entity inherits from.
    #[serde(rename = "IsA", default, skip_serializing_if = "Option::is_none")]
    pub is_a: Option<String>,
    /// Joint kind, on joint records.
    #[serde(rename = "JointType", default, skip_serializing_if = "Option::is_none")]
    pub joint_type: Option<String>,
    /// First jointed entity.
    #[serde(rename = "JointA", default, skip_serializing_if = "Option::is_none")]
    pub joint_a: Option<String>,
    /// Second jointed entity.
    #[serde(rename = "JointB", default, skip_serializing_if = "Option::is_none")]
    pub joint_b: Option<String>,
}

impl WirePairs {
    /// Returns true if no pair is set.
    pub fn is_empty(&self) -> bool {
        self.is_a.is_none()
            && self.joint_type.is_none()
            && self.joint_a.is_none()
            && self.joint_b.is_none()
    }
}

impl WireRecord {
    /// Returns true if this record has no name of its own.
    pub fn is_anonymous(&self) -> bool {
        self.name.starts_with(ANONYMOUS_PREFIX)
    }

    fn from_entity(scene: &Scene, entity: &Entity, full_paths: bool) -> Self {
        let (parent, name) = if full_paths {
            (None, scene.ancestor_path(&entity.name).join("."))
        } else {
            (
                scene.parent_of(&entity.name).map(str::to_string),
                entity.name.clone(),
            )
        };
        Self {
            parent,
            name,
            tags: entity.tags.clone(),
            pairs: WirePairs {
                is_a: entity.prefab.clone().filter(|p| !p.is_empty()),
                ..WirePairs::default()
            },
            components: entity
                .components
                .iter()
                .map(|c| (c.type_name.clone(), c.data.clone()))
                .collect(),
        }
    }

    fn from_joint(index: usize, joint: &JointConstraint) -> Self {
        let named = |name: &str| Some(name.to_string()).filter(|n| !n.is_empty());
        Self {
            name: format!("{ANONYMOUS_PREFIX}{index}"),
            pairs: WirePairs {
                joint_type: Some(joint.joint_type.clone()),
                joint_a: named(&joint.entity_a),
                joint_b: named(&joint.entity_b),
                ..WirePairs::default()
            },
            ..Self::default()
        }
    }
}

impl WireDocument {
    /// Builds the wire form of a scene.
    ///
    /// With `full_paths`, each name is the dot-joined chain of ancestors
    /// from the flat relations and no `parent` is written.
    pub fn from_scene(scene: &Scene, full_paths: bool) -> Self {
        let entities = scene
            .entities
            .iter()
            .map(|e| WireRecord::from_entity(scene, e, full_paths));
        let joints = scene
            .joints
            .iter()
            .enumerate()
            .map(|(i, j)| WireRecord::from_joint(i + 1, j));
        Self {
            results: entities.chain(joints).collect(),
        }
    }

    /// Compact JSON.
    pub fn to_json(&self) -> BridgeResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Renders a scene as compact wire JSON.
pub fn to_wire(scene: &Scene, names_as_full_paths: bool) -> BridgeResult<String> {
    WireDocument::from_scene(scene, names_as_full_paths).to_json()
}

/// Parses wire JSON.
pub fn parse_wire(text: &str) -> BridgeResult<WireDocument> {
    Ok(serde_json::from_str(text)?)
}

fn deserialize_components<'de, D>(deserializer: D) -> Result<Vec<(String, Value)>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::Object(entries) => Ok(entries),
        Value::Null => Ok(Vec::new()),
        other => Err(D::Error::custom(format!(
            "components must be an object, found {}",
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scene_core::{HierarchyRelation, SceneMetadata};

    fn sample() -> Scene {
        let mut scene = Scene::new(SceneMetadata::new("Camp", "1.0.0"));
        let mut player = Entity::new("Player").with_tag("Controllable").with_component(
            "Transform",
            Value::object([(
                "position",
                Value::object([("x", Value::Int(1)), ("y", Value::Float(2.5))]),
            )]),
        );
        player.prefab = Some("Actor".into());
        scene.entities = vec![Entity::new("World"), player];
        scene.relations.push(HierarchyRelation::new("World", "Player", 0));
        scene.joints.push(JointConstraint::new("hinge", "World", "Player"));
        scene.joints.push(JointConstraint::new("weld", "World", ""));
        scene
    }

    #[test]
    fn compact_wire_output() {
        insta::assert_snapshot!(to_wire(&sample(), false).unwrap(), @r###"{"results":[{"name":"World"},{"parent":"World","name":"Player","tags":["Controllable"],"pairs":{"IsA":"Actor"},"components":{"Transform":{"position":{"x":1,"y":2.5}}}},{"name":"#1","pairs":{"JointType":"hinge","JointA":"World","JointB":"Player"}},{"name":"#2","pairs":{"JointType":"weld","JointA":"World"}}]}"###);
    }

    #[test]
    fn full_paths_replace_parent() {
        let mut scene = sample();
        scene.entities.push(Entity::new("Sword"));
        scene.relations.push(HierarchyRelation::new("Player", "Sword", 0));

        let doc = WireDocument::from_scene(&scene, true);
        let names: Vec<_> = doc.results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["World", "World.Player", "World.Player.Sword", "#1", "#2"]);
        assert!(doc.results.iter().all(|r| r.parent.is_none()));
    }

    #[test]
    fn cyclic_relations_still_terminate() {
        let mut scene = sample();
        scene.relations.push(HierarchyRelation::new("Player", "World", 0));
        let doc = WireDocument::from_scene(&scene, true);
        assert_eq!(doc.results[0].name, "Player.World");
        assert_eq!(doc.results[1].name, "World.Player");
    }

    #[test]
    fn parse_is_the_inverse_of_emit() {
        let doc = WireDocument::from_scene(&sample(), false);
        let parsed = parse_wire(&doc.to_json().unwrap()).unwrap();
        assert_eq!(parsed, doc);
        assert!(parsed.results[2].is_anonymous());
        assert!(!parsed.results[1].is_anonymous());
    }

    #[test]
    fn parse_rejects_bad_components() {
        let err = parse_wire(r#"{"results":[{"name":"A","components":[1,2]}]}"#).unwrap_err();
        assert!(err.to_string().contains("components must be an object"));
        assert!(parse_wire(r#"{"results":[{"tags":["x"]}]}"#).is_err());
    }
}
