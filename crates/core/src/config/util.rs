use anyhow::{Context, Result};
use tracing::warn;

use crate::config::{ConfigLayout, Roots};
use crate::schema::Schema;

/// Load and declare the templates document for a given layout.
pub fn load_schema(layout: &ConfigLayout) -> Result<Schema> {
    Schema::load(&layout.templates_path).with_context(|| {
        format!("Failed to load templates document at {}", layout.templates_path.display())
    })
}

/// Load the storage roots for a given layout.
///
/// A configuration without `roots.yml` has no roots; path templates then
/// only resolve to relative paths.
pub fn load_roots(layout: &ConfigLayout) -> Result<Roots> {
    if !layout.roots_path.is_file() {
        warn!(path = %layout.roots_path.display(), "no storage roots file, using none");
        return Ok(Roots::default());
    }
    Roots::load(&layout.roots_path).with_context(|| {
        format!("Failed to load storage roots at {}", layout.roots_path.display())
    })
}
