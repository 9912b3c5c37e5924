use anyhow::Result;

use crate::commands::load_config;

/// Declare the templates document (and storage roots) and report the result.
///
/// Any inconsistency is returned as an error, so the process exits non-zero.
pub fn validate_command(root: &str, file: Option<&str>) -> Result<()> {
    let config = load_config(root, file)?;
    let schema = &config.schema;

    println!("OK: {}", config.layout.templates_path.display());
    println!("  Keys: {}", schema.keys().count());
    println!("  Implicit keys used: {}", schema.implicit_keys().count());
    println!("  Path templates: {}", schema.paths().count());
    println!("  String templates: {}", schema.strings().count());
    println!("  Storage roots: {}", config.roots.len());

    Ok(())
}
