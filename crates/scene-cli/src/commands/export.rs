use std::path::Path;

use scene_bridge::to_wire;
use scene_core::text::{to_json_pretty, to_text};

pub fn run(file: &Path, format: &str, full_paths: bool, output: Option<&Path>) -> Result<(), String> {
    let scene = super::load_scene(file)?;

    let mut content = match format {
        "text" | "yaml" => to_text(&scene),
        "json" => to_json_pretty(&scene).map_err(|e| format!("JSON serialization error: {e}"))?,
        "wire" => to_wire(&scene, full_paths).map_err(|e| e.to_string())?,
        _ => {
            return Err(format!(
                "unsupported format: \"{format}\". Use: text, json, wire"
            ));
        }
    };
    if !content.ends_with('\n') {
        content.push('\n');
    }

    super::write_output(&content, output)
}
