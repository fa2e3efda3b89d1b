use std::path::Path;

use scene_core::to_text;

pub fn run(file: &Path, output: Option<&Path>) -> Result<(), String> {
    let scene = super::load_scene(file)?;
    super::write_output(&to_text(&scene), output)
}
