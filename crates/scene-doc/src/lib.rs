//! Loading scene documents.
//!
//! Text is parsed by `serde_yaml`, adapted into a [`Node`] tree that keeps
//! scalars as written, and turned into a [`Scene`] by [`parser::parse`]. The `load*` entry points also run
//! the default validation.
//!
//! ```text
//! text ──serde_yaml──▶ Node ──parse──▶ Scene ──validate──▶ Scene
//! ```

/// Generic document tree.
pub mod node;
/// Scene construction from a document tree.
pub mod parser;

use std::io;
use std::path::Path;

use scene_core::{Scene, SceneError, SceneResult, validate};
use tracing::{debug, instrument};

pub use node::Node;

/// Parses YAML text into a [`Node`] tree.
///
/// Repeated keys in one mapping are a [`ErrorKind::ParseError`](scene_core::ErrorKind).
pub fn parse_yaml(text: &str) -> SceneResult<Node> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(text).map_err(yaml_error)?;
    let shape = Node::from_yaml(yaml)?;
    shape
        .reread(serde_yaml::Deserializer::from_str(text))
        .map_err(yaml_error)
}

fn yaml_error(e: serde_yaml::Error) -> SceneError {
    let err = SceneError::parse(e.to_string());
    match e.location() {
        Some(loc) => err.with_position(loc.line(), loc.column()),
        None => err,
    }
}

/// Parses a document tree into a scene without validating it.
pub fn parse_node(root: &Node) -> SceneResult<Scene> {
    parser::parse(root)
}

/// Parses document text into a scene without validating it.
pub fn parse_str(text: &str) -> SceneResult<Scene> {
    parse_node(&parse_yaml(text)?)
}

/// Parses and validates document text.
pub fn load_from_text(text: &str) -> SceneResult<Scene> {
    let scene = parse_str(text)?;
    validate(&scene)?;
    debug!(
        scene = %scene.metadata.name,
        entities = scene.entity_count(),
        "scene loaded"
    );
    Ok(scene)
}

/// Reads, parses and validates a document file.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load(path: impl AsRef<Path>) -> SceneResult<Scene> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
            SceneError::file_not_found(path.display())
        }
        _ => SceneError::parse(format!("cannot read {}: {e}", path.display())),
    })?;
    load_from_text(&text)
}
