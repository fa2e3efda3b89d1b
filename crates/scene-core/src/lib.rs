//! Core types for scene descriptions: the value tree, the scene model,
//! validation, and text output.
//!
//! This crate is independent of any document parser or runtime. A
//! [`Scene`] can be built programmatically, parsed by `scene-doc`, or
//! reconstructed from a live runtime by `scene-bridge`.

/// Entities and their components.
pub mod entity;
/// Error record and kinds.
pub mod error;
/// Flat relations and the arena-backed hierarchy tree.
pub mod hierarchy;
/// Descriptive annotation blocks.
pub mod meta;
/// The scene model that owns everything.
pub mod scene;
/// Rendering to document text and JSON.
pub mod text;
/// Structural checks.
pub mod validate;
/// The recursive value tree.
pub mod value;

/// Re-export entity types.
pub use entity::{Component, Entity};
/// Re-export error types.
pub use error::{ErrorKind, SceneError, SceneResult};
/// Re-export hierarchy types.
pub use hierarchy::{Branch, HierarchyNode, HierarchyRelation, HierarchyTree, NodeId, NodeKind};
/// Re-export meta.
pub use meta::Meta;
/// Re-export scene types.
pub use scene::{JointConstraint, Scene, SceneMetadata, SystemConfig};
/// Re-export output functions.
pub use text::{to_json, to_text};
/// Re-export validation.
pub use validate::{ValidateOptions, validate, validate_with};
/// Re-export the value tree.
pub use value::Value;
