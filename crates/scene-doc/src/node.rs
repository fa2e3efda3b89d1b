//! A generic document tree: scalar, sequence, or mapping.
//!
//! The YAML parser types its scalars on its own (`0x1F` becomes 31, `1.10`
//! becomes 1.1). This tree keeps the text as written instead, so value
//! inference happens in one place ([`Value::from_scalar`]). Building it takes
//! two reads of the document: [`Node::from_yaml`] gives the shape, and
//! [`Node::reread`] fills each scalar from the source.

use std::fmt;

use scene_core::{SceneError, SceneResult, Value};
use serde::Deserialize;
use serde::de::{self, DeserializeSeed, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};

/// One node of a parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// An explicit or implied null (`~`, `null`, or an empty value).
    Null,
    /// Scalar text.
    Scalar(String),
    /// Ordered items.
    Sequence(Vec<Node>),
    /// Ordered key/value pairs.
    Mapping(Vec<(String, Node)>),
}

impl Node {
    /// Adapts a `serde_yaml` tree. Mapping keys must be scalars.
    ///
    /// Scalars hold the parser's resolved form here; see [`Node::reread`].
    pub fn from_yaml(value: serde_yaml::Value) -> SceneResult<Self> {
        use serde_yaml::Value as Yaml;

        Ok(match value {
            Yaml::Null => Self::Null,
            Yaml::Bool(b) => Self::Scalar(b.to_string()),
            Yaml::Number(n) => Self::Scalar(n.to_string()),
            Yaml::String(s) => Self::Scalar(s),
            Yaml::Sequence(items) => Self::Sequence(
                items
                    .into_iter()
                    .map(Self::from_yaml)
                    .collect::<SceneResult<_>>()?,
            ),
            Yaml::Mapping(map) => {
                let mut entries = Vec::with_capacity(map.len());
                for (key, value) in map {
                    let key = match Self::from_yaml(key)? {
                        Self::Scalar(text) => text,
                        Self::Null => String::new(),
                        other => {
                            return Err(SceneError::invalid_type(
                                "scalar mapping key",
                                other.kind_name(),
                            ));
                        }
                    };
                    entries.push((key, Self::from_yaml(value)?));
                }
                Self::Mapping(entries)
            }
            Yaml::Tagged(tagged) => Self::from_yaml(tagged.value)?,
        })
    }

    /// Reads the document behind this tree a second time and returns the
    /// same shape with every scalar and key holding its source text.
    ///
    /// The deserializer must produce the document this tree was built from.
    pub fn reread<'de, D>(&self, deserializer: D) -> Result<Node, D::Error>
    where
        D: Deserializer<'de>,
    {
        if matches!(self, Self::Null) {
            return Ok(Self::Null);
        }
        SourceText(self).deserialize(deserializer)
    }

    /// Shape name used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Scalar(_) => "scalar",
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) => "mapping",
        }
    }

    /// Scalar text, if this is a scalar.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Mapping entries, if this is a mapping.
    pub fn as_mapping(&self) -> Option<&[(String, Node)]> {
        match self {
            Self::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    /// Sequence items, if this is a sequence.
    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// First mapping entry with `key`.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_mapping()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Converts to a [`Value`], inferring scalar types from their text.
    /// Order is kept and repeated keys are not merged.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Scalar(text) => Value::from_scalar(text),
            Self::Sequence(items) => Value::Array(items.iter().map(Self::to_value).collect()),
            Self::Mapping(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_value()))
                    .collect(),
            ),
        }
    }
}

/// Seed that reads one node, guided by its known shape.
struct SourceText<'a>(&'a Node);

impl<'de> DeserializeSeed<'de> for SourceText<'_> {
    type Value = Node;

    fn deserialize<D>(self, deserializer: D) -> Result<Node, D::Error>
    where
        D: Deserializer<'de>,
    {
        match self.0 {
            Node::Null => IgnoredAny::deserialize(deserializer).map(|_| Node::Null),
            Node::Scalar(_) => String::deserialize(deserializer).map(Node::Scalar),
            Node::Sequence(items) => deserializer.deserialize_seq(SequenceText(items)),
            Node::Mapping(entries) => deserializer.deserialize_map(MappingText(entries)),
        }
    }
}

struct SequenceText<'a>(&'a [Node]);

impl<'de> Visitor<'de> for SequenceText<'_> {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a sequence of {} items", self.0.len())
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Node, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(self.0.len());
        for (index, shape) in self.0.iter().enumerate() {
            let item = seq
                .next_element_seed(SourceText(shape))?
                .ok_or_else(|| de::Error::invalid_length(index, &self))?;
            items.push(item);
        }
        Ok(Node::Sequence(items))
    }
}

struct MappingText<'a>(&'a [(String, Node)]);

impl<'de> Visitor<'de> for MappingText<'_> {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a mapping of {} entries", self.0.len())
    }

    fn visit_map<A>(self, mut map: A) -> Result<Node, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = Vec::with_capacity(self.0.len());
        for (index, (key, value)) in self.0.iter().enumerate() {
            // A null key was already flattened to "".
            let text = if key.is_empty() {
                map.next_key::<IgnoredAny>()?.map(|_| String::new())
            } else {
                map.next_key::<String>()?
            };
            let key = text.ok_or_else(|| de::Error::invalid_length(index, &self))?;
            entries.push((key, map.next_value_seed(SourceText(value))?));
        }
        Ok(Node::Mapping(entries))
    }
}
