pub mod check;
pub mod export;
pub mod fmt;
pub mod list;
pub mod roundtrip;
pub mod show;
pub mod tree;

use std::path::Path;

use colored::Colorize;
use scene_core::{Scene, SceneError};

/// Load and validate a scene document, printing any error to stderr.
fn load_scene(file: &Path) -> Result<Scene, String> {
    scene_doc::load(file).map_err(|err| {
        print_error(&err);
        format!("could not load {}", file.display())
    })
}

/// Print a scene error with its code and location.
fn print_error(err: &SceneError) {
    eprintln!(
        "{}: {}",
        format!("error[{}]", err.code()).red().bold(),
        err.message
    );
    if let Some(path) = &err.path {
        eprintln!("  {} {path}", "at".dimmed());
    }
    if let (Some(line), Some(column)) = (err.line, err.column) {
        eprintln!("  {} line {line}, column {column}", "-->".blue());
    }
}

/// Write `content` to a file, or to stdout when no path is given.
fn write_output(content: &str, output: Option<&Path>) -> Result<(), String> {
    if let Some(path) = output {
        std::fs::write(path, content)
            .map_err(|e| format!("cannot write to {}: {e}", path.display()))?;
        eprintln!("  Written to {}", path.display());
    } else {
        print!("{content}");
    }
    Ok(())
}
