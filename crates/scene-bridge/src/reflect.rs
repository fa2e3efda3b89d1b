//! Type layouts for component data held as raw bytes.
//!
//! A [`TypeRegistry`] describes how a component's bytes are laid out:
//! primitives, structs of named members, and fixed-size arrays. Layouts are
//! packed little-endian with members at sequential offsets. A [`Cursor`]
//! walks a byte slice through one of those layouts.
//!
//! Strings are stored as a 32-bit index into the runtime's string pool and
//! entity references as a 64-bit entity id, so every layout has a fixed
//! size.

use std::collections::HashMap;
use std::fmt;

use scene_core::{Scene, Value};
use tracing::debug;

use crate::error::{BridgeError, BridgeResult};

/// Index of a type in a [`TypeRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type#{}", self.0)
    }
}

/// Leaf kinds a layout bottoms out in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// One byte, zero is false.
    Bool,
    /// Signed integers.
    I8,
    /// Signed 16-bit integer.
    I16,
    /// Signed 32-bit integer.
    I32,
    /// Signed 64-bit integer.
    I64,
    /// Unsigned integers.
    U8,
    /// Unsigned 16-bit integer.
    U16,
    /// Unsigned 32-bit integer.
    U32,
    /// Unsigned 64-bit integer.
    U64,
    /// Single precision float.
    F32,
    /// Double precision float.
    F64,
    /// String pool index.
    String,
    /// Reference to another entity; zero means none.
    Entity,
    /// Opaque identifier with no readable form.
    Id,
}

impl PrimitiveKind {
    /// Every kind, in registration order.
    pub const ALL: [Self; 14] = [
        Self::Bool,
        Self::I8,
        Self::I16,
        Self::I32,
        Self::I64,
        Self::U8,
        Self::U16,
        Self::U32,
        Self::U64,
        Self::F32,
        Self::F64,
        Self::String,
        Self::Entity,
        Self::Id,
    ];

    /// Size in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::Bool | Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 | Self::String => 4,
            Self::I64 | Self::U64 | Self::F64 | Self::Entity | Self::Id => 8,
        }
    }

    /// Name the kind is registered under.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::String => "string",
            Self::Entity => "entity",
            Self::Id => "id",
        }
    }
}

/// A named struct member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Member name.
    pub name: String,
    /// Member type.
    pub type_id: TypeId,
    /// Byte offset inside the struct.
    pub offset: usize,
}

/// How a type is laid out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeLayout {
    /// A leaf value.
    Primitive(PrimitiveKind),
    /// Named members at sequential offsets.
    Struct(Vec<Member>),
    /// `count` elements of one type.
    Array {
        /// Element type.
        elem: TypeId,
        /// Element count.
        count: usize,
    },
}

/// A registered type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    /// Registered name.
    pub name: String,
    /// Layout.
    pub layout: TypeLayout,
    /// Total size in bytes.
    pub size: usize,
}

/// The set of types the bridge can read and write.
///
/// Created once and passed by reference to whatever needs it. A new
/// registry already knows every [`PrimitiveKind`] under its
/// [`PrimitiveKind::name`].
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: Vec<TypeInfo>,
    by_name: HashMap<String, TypeId>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Creates a registry holding the primitive types.
    pub fn new() -> Self {
        let mut registry = Self {
            types: Vec::new(),
            by_name: HashMap::new(),
        };
        for kind in PrimitiveKind::ALL {
            registry.insert(kind.name().to_string(), TypeLayout::Primitive(kind), kind.size());
        }
        registry
    }

    fn insert(&mut self, name: String, layout: TypeLayout, size: usize) -> TypeId {
        let id = TypeId(u32::try_from(self.types.len()).unwrap_or(u32::MAX));
        self.by_name.insert(name.clone(), id);
        self.types.push(TypeInfo { name, layout, size });
        id
    }

    fn check_new(&self, name: &str) -> BridgeResult<()> {
        if self.by_name.contains_key(name) {
            return Err(BridgeError::DuplicateType(name.to_string()));
        }
        Ok(())
    }

    fn known(&self, id: TypeId) -> BridgeResult<&TypeInfo> {
        self.info(id)
            .ok_or_else(|| BridgeError::UnknownType(id.to_string()))
    }

    /// Registers `name` as an alias of a primitive kind.
    pub fn register_primitive(&mut self, name: &str, kind: PrimitiveKind) -> BridgeResult<TypeId> {
        self.check_new(name)?;
        Ok(self.insert(name.to_string(), TypeLayout::Primitive(kind), kind.size()))
    }

    /// Registers a struct whose members are laid out in the given order.
    pub fn register_struct(&mut self, name: &str, members: &[(&str, TypeId)]) -> BridgeResult<TypeId> {
        self.check_new(name)?;
        let mut offset = 0;
        let mut laid_out = Vec::with_capacity(members.len());
        for (member, type_id) in members {
            let size = self.known(*type_id)?.size;
            laid_out.push(Member {
                name: (*member).to_string(),
                type_id: *type_id,
                offset,
            });
            offset += size;
        }
        Ok(self.insert(name.to_string(), TypeLayout::Struct(laid_out), offset))
    }

    /// Registers a fixed-size array.
    pub fn register_array(&mut self, name: &str, elem: TypeId, count: usize) -> BridgeResult<TypeId> {
        self.check_new(name)?;
        let size = self.known(elem)?.size * count;
        Ok(self.insert(name.to_string(), TypeLayout::Array { elem, count }, size))
    }

    /// Finds a type by name.
    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// Layout information for a type.
    pub fn info(&self, id: TypeId) -> Option<&TypeInfo> {
        self.types.get(id.0 as usize)
    }

    /// Number of registered types, primitives included.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Always false; primitives are registered on creation.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Starts a cursor over `bytes` read as `type_id`.
    pub fn cursor<'a>(&'a self, type_id: TypeId, bytes: &'a [u8]) -> BridgeResult<Cursor<'a>> {
        let info = self.known(type_id)?;
        if bytes.len() < info.size {
            return Err(BridgeError::ShortBuffer {
                type_name: info.name.clone(),
                expected: info.size,
                found: bytes.len(),
            });
        }
        Ok(Cursor {
            registry: self,
            info,
            bytes: &bytes[..info.size],
        })
    }

    /// Registers a layout for every component type in the scene that is not
    /// yet known, shaped after its first occurrence.
    ///
    /// Integers become `i64`, floats `f64`, text `string`. Nested objects
    /// and arrays are registered under dotted names such as
    /// `Transform.position`. Null members and empty arrays cannot be typed
    /// and are left out. Returns the number of component types added.
    pub fn infer_from_scene(&mut self, scene: &Scene) -> usize {
        let mut added = 0;
        for component in scene.entities.iter().flat_map(|e| &e.components) {
            if self.lookup(&component.type_name).is_some() {
                continue;
            }
            match self.infer(&component.type_name, &component.data) {
                Some(_) => added += 1,
                None => debug!(component = %component.type_name, "cannot infer a layout"),
            }
        }
        added
    }

    fn infer(&mut self, name: &str, value: &Value) -> Option<TypeId> {
        let kind = match value {
            Value::Null => return None,
            Value::Bool(_) => PrimitiveKind::Bool,
            Value::Int(_) => PrimitiveKind::I64,
            Value::Float(_) => PrimitiveKind::F64,
            Value::String(_) => PrimitiveKind::String,
            Value::Array(items) => {
                let elem = self.infer(&format!("{name}[]"), items.first()?)?;
                return self.register_array(name, elem, items.len()).ok();
            }
            Value::Object(entries) => {
                let mut members: Vec<(&str, TypeId)> = Vec::with_capacity(entries.len());
                for (key, member) in entries {
                    if members.iter().any(|(k, _)| *k == key.as_str()) {
                        continue;
                    }
                    let nested = format!("{name}.{key}");
                    if let Some(id) = self.lookup(&nested).or_else(|| self.infer(&nested, member)) {
                        members.push((key, id));
                    }
                }
                return self.register_struct(name, &members).ok();
            }
        };
        self.register_primitive(name, kind).ok()
    }
}

/// A primitive read from bytes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    /// Boolean.
    Bool(bool),
    /// Any signed width.
    Int(i64),
    /// Any unsigned width.
    UInt(u64),
    /// Any float width.
    Float(f64),
    /// String pool index.
    Str(u32),
    /// Entity id; zero means none.
    Entity(u64),
    /// Opaque id.
    Id(u64),
}

/// A view of bytes through a registered layout.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    registry: &'a TypeRegistry,
    info: &'a TypeInfo,
    bytes: &'a [u8],
}

impl<'a> Cursor<'a> {
    /// The type being viewed.
    pub fn info(&self) -> &'a TypeInfo {
        self.info
    }

    /// The layout being viewed.
    pub fn layout(&self) -> &'a TypeLayout {
        &self.info.layout
    }

    /// Reads the primitive, if this is one.
    pub fn primitive(&self) -> Option<Primitive> {
        let TypeLayout::Primitive(kind) = self.info.layout else {
            return None;
        };
        let b = self.bytes;
        Some(match kind {
            PrimitiveKind::Bool => Primitive::Bool(*b.first()? != 0),
            PrimitiveKind::I8 => Primitive::Int(i8::from_le_bytes(fixed(b)?).into()),
            PrimitiveKind::I16 => Primitive::Int(i16::from_le_bytes(fixed(b)?).into()),
            PrimitiveKind::I32 => Primitive::Int(i32::from_le_bytes(fixed(b)?).into()),
            PrimitiveKind::I64 => Primitive::Int(i64::from_le_bytes(fixed(b)?)),
            PrimitiveKind::U8 => Primitive::UInt(u8::from_le_bytes(fixed(b)?).into()),
            PrimitiveKind::U16 => Primitive::UInt(u16::from_le_bytes(fixed(b)?).into()),
            PrimitiveKind::U32 => Primitive::UInt(u32::from_le_bytes(fixed(b)?).into()),
            PrimitiveKind::U64 => Primitive::UInt(u64::from_le_bytes(fixed(b)?)),
            PrimitiveKind::F32 => Primitive::Float(f32::from_le_bytes(fixed(b)?).into()),
            PrimitiveKind::F64 => Primitive::Float(f64::from_le_bytes(fixed(b)?)),
            PrimitiveKind::String => Primitive::Str(u32::from_le_bytes(fixed(b)?)),
            PrimitiveKind::Entity => Primitive::Entity(u64::from_le_bytes(fixed(b)?)),
            PrimitiveKind::Id => Primitive::Id(u64::from_le_bytes(fixed(b)?)),
        })
    }

    /// Struct members with a cursor over each. Empty for other layouts.
    pub fn members(&self) -> Vec<(&'a str, Cursor<'a>)> {
        let TypeLayout::Struct(members) = &self.info.layout else {
            return Vec::new();
        };
        members
            .iter()
            .filter_map(|m| Some((m.name.as_str(), self.at(m.type_id, m.offset)?)))
            .collect()
    }

    /// Array elements. Empty for other layouts.
    pub fn elements(&self) -> Vec<Cursor<'a>> {
        let TypeLayout::Array { elem, count } = self.info.layout else {
            return Vec::new();
        };
        let Some(size) = self.registry.info(elem).map(|i| i.size) else {
            return Vec::new();
        };
        (0..count).filter_map(|i| self.at(elem, i * size)).collect()
    }

    fn at(&self, type_id: TypeId, offset: usize) -> Option<Cursor<'a>> {
        let info = self.registry.info(type_id)?;
        let bytes = self.bytes.get(offset..offset + info.size)?;
        Some(Cursor {
            registry: self.registry,
            info,
            bytes,
        })
    }
}

fn fixed<const N: usize>(bytes: &[u8]) -> Option<[u8; N]> {
    bytes.get(..N)?.try_into().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scene_core::{Entity, SceneMetadata};

    fn vec3(registry: &mut TypeRegistry) -> TypeId {
        let f32_id = registry.lookup("f32").unwrap();
        registry
            .register_struct("Vec3", &[("x", f32_id), ("y", f32_id), ("z", f32_id)])
            .unwrap()
    }

    #[test]
    fn struct_offsets_are_sequential() {
        let mut registry = TypeRegistry::new();
        let vec3 = vec3(&mut registry);
        let info = registry.info(vec3).unwrap();
        assert_eq!(info.size, 12);
        let TypeLayout::Struct(members) = &info.layout else {
            panic!("expected struct");
        };
        let offsets: Vec<_> = members.iter().map(|m| m.offset).collect();
        assert_eq!(offsets, [0, 4, 8]);
    }

    #[test]
    fn duplicate_and_unknown_types_are_errors() {
        let mut registry = TypeRegistry::new();
        vec3(&mut registry);
        assert!(matches!(
            registry.register_primitive("Vec3", PrimitiveKind::I32),
            Err(BridgeError::DuplicateType(_))
        ));
        assert!(matches!(
            registry.register_array("Bad", TypeId(999), 2),
            Err(BridgeError::UnknownType(_))
        ));
    }

    #[test]
    fn cursor_reads_members() {
        let mut registry = TypeRegistry::new();
        let vec3 = vec3(&mut registry);
        let mut bytes = Vec::new();
        for v in [1.0f32, -2.5, 3.0] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        let cursor = registry.cursor(vec3, &bytes).unwrap();
        let values: Vec<_> = cursor
            .members()
            .into_iter()
            .map(|(name, c)| (name, c.primitive().unwrap()))
            .collect();
        assert_eq!(
            values,
            [
                ("x", Primitive::Float(1.0)),
                ("y", Primitive::Float(-2.5)),
                ("z", Primitive::Float(3.0)),
            ]
        );
        assert!(cursor.primitive().is_none());
        assert!(cursor.elements().is_empty());
    }

    #[test]
    fn cursor_rejects_short_buffers() {
        let mut registry = TypeRegistry::new();
        let vec3 = vec3(&mut registry);
        let err = registry.cursor(vec3, &[0; 8]).unwrap_err();
        assert!(matches!(err, BridgeError::ShortBuffer { expected: 12, found: 8, .. }));
    }

    #[test]
    fn array_elements() {
        let mut registry = TypeRegistry::new();
        let u16_id = registry.lookup("u16").unwrap();
        let pair = registry.register_array("Pair", u16_id, 2).unwrap();
        let bytes = [7, 0, 0, 1];
        let items: Vec<_> = registry
            .cursor(pair, &bytes)
            .unwrap()
            .elements()
            .iter()
            .map(|c| c.primitive().unwrap())
            .collect();
        assert_eq!(items, [Primitive::UInt(7), Primitive::UInt(256)]);
    }

    #[test]
    fn infers_layouts_from_first_occurrence() {
        let mut scene = Scene::new(SceneMetadata::new("T", "1.0.0"));
        scene.entities.push(Entity::new("A").with_component(
            "Transform",
            Value::object([(
                "position",
                Value::object([("x", Value::Int(1)), ("y", Value::Float(2.0)), ("n", Value::Null)]),
            )]),
        ));
        scene.entities.push(
            Entity::new("B")
                .with_component("Transform", Value::Int(3))
                .with_component("Label", Value::from("hi"))
                .with_component("Path", Value::Array(vec![Value::Int(1), Value::Int(2)]))
                .with_component("Nothing", Value::Null),
        );

        let mut registry = TypeRegistry::new();
        assert_eq!(registry.infer_from_scene(&scene), 3);

        let transform = registry.info(registry.lookup("Transform").unwrap()).unwrap();
        assert_eq!(transform.size, 16);
        let position = registry.info(registry.lookup("Transform.position").unwrap()).unwrap();
        let TypeLayout::Struct(members) = &position.layout else {
            panic!("expected struct");
        };
        let names: Vec<_> = members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["x", "y"]);

        assert_eq!(
            registry.info(registry.lookup("Label").unwrap()).unwrap().layout,
            TypeLayout::Primitive(PrimitiveKind::String)
        );
        let path = registry.info(registry.lookup("Path").unwrap()).unwrap();
        assert_eq!(path.size, 16);
        assert!(registry.lookup("Nothing").is_none());
    }
}
