use serde::Serialize;

use crate::meta::Meta;
use crate::value::Value;

/// A typed payload attached to an entity.
///
/// `type_name` is the key the runtime uses to find reflection metadata;
/// `data` is whatever the document declared under that key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    /// Component type, e.g. `Transform`.
    pub type_name: String,
    /// Declared data.
    pub data: Value,
}

impl Component {
    /// Creates a component.
    pub fn new(type_name: impl Into<String>, data: Value) -> Self {
        Self {
            type_name: type_name.into(),
            data,
        }
    }
}

/// A named, taggable object owning zero or more components.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    /// Unique name within the scene.
    pub name: String,
    /// Descriptive annotations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    /// Name of the entity this one is instantiated from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefab: Option<String>,
    /// Plain markers, in declaration order, without repeats.
    pub tags: Vec<String>,
    /// Attached components, in declaration order.
    pub components: Vec<Component>,
    /// Disabled entities are kept but not simulated.
    pub enabled: bool,
    /// Free-form properties; parsed but not written back as text.
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "crate::value::serialize_pairs"
    )]
    pub properties: Vec<(String, Value)>,
}

impl Entity {
    /// Creates an enabled entity with no tags or components.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            meta: None,
            prefab: None,
            tags: Vec::new(),
            components: Vec::new(),
            enabled: true,
            properties: Vec::new(),
        }
    }

    /// Finds the first component of the given type.
    pub fn find_component(&self, type_name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.type_name == type_name)
    }

    /// Returns true if the entity carries `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Adds a tag unless already present. Returns whether it was added.
    pub fn add_tag(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.has_tag(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    /// Appends a component.
    pub fn add_component(&mut self, type_name: impl Into<String>, data: Value) {
        self.components.push(Component::new(type_name, data));
    }

    /// Builder form of [`Entity::add_tag`].
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.add_tag(tag);
        self
    }

    /// Sets the prefab.
    #[must_use]
    pub fn with_prefab(mut self, prefab: impl Into<String>) -> Self {
        self.prefab = Some(prefab.into());
        self
    }

    /// Builder form of [`Entity::add_component`].
    #[must_use]
    pub fn with_component(mut self, type_name: impl Into<String>, data: Value) -> Self {
        self.add_component(type_name, data);
        self
    }

    /// Looks up a free-form property.
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_entity_is_enabled_and_bare() {
        let e = Entity::new("Player");
        assert!(e.enabled);
        assert!(e.tags.is_empty());
        assert!(e.components.is_empty());
        assert!(e.meta.is_none());
    }

    #[test]
    fn tags_are_a_set() {
        let mut e = Entity::new("Player");
        assert!(e.add_tag("Controllable"));
        assert!(!e.add_tag("Controllable"));
        assert_eq!(e.tags.len(), 1);
        assert!(e.has_tag("Controllable"));
        assert!(!e.has_tag("Enemy"));
    }

    #[test]
    fn find_component_returns_first_match() {
        let e = Entity::new("Player")
            .with_component("Health", Value::Int(10))
            .with_component("Health", Value::Int(20));
        assert_eq!(e.find_component("Health").unwrap().data, Value::Int(10));
        assert!(e.find_component("Mana").is_none());
    }
}
