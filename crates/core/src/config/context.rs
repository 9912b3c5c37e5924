use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::config::{load_roots, load_schema, ConfigLayout, Platform, Roots};
use crate::error::{ResolutionError, SchemaError};
use crate::model::TemplateKind;
use crate::resolve::Context;
use crate::schema::Schema;

/// Convenience wrapper bundling layout, declared schema and storage roots.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub layout: ConfigLayout,
    pub schema: Schema,
    pub roots: Roots,
}

impl PipelineConfig {
    /// Load the templates document and storage roots for a given root.
    pub fn from_root(root: impl AsRef<Path>) -> Result<Self> {
        Self::from_layout(ConfigLayout::new(root))
    }

    pub fn from_layout(layout: ConfigLayout) -> Result<Self> {
        let schema = load_schema(&layout)?;
        let roots = load_roots(&layout)?;
        let config = Self::from_parts(layout, schema, roots)?;
        info!(
            root = %config.layout.root.display(),
            templates = config.schema.templates().count(),
            roots = config.roots.len(),
            "loaded pipeline configuration"
        );
        Ok(config)
    }

    /// Check that every path template can be placed under a storage root.
    pub fn from_parts(
        layout: ConfigLayout,
        schema: Schema,
        roots: Roots,
    ) -> Result<Self, SchemaError> {
        for template in schema.paths() {
            match template.root_name.as_deref() {
                Some(root) if roots.get(root).is_none() => {
                    return Err(SchemaError::UnknownRoot {
                        template: template.name.clone(),
                        root: root.to_string(),
                    });
                }
                None if !roots.is_empty() && roots.default_name().is_none() => {
                    return Err(SchemaError::InvalidRoots {
                        reason: format!(
                            "path template '{}' has no root_name and no default root is set",
                            template.name
                        ),
                    });
                }
                _ => {}
            }
        }
        Ok(Self { layout, schema, roots })
    }

    /// Storage root a template resolves under, if any.
    pub fn root_name_for(&self, template: &str) -> Option<&str> {
        let template = self.schema.template(template)?;
        if template.kind != TemplateKind::Path {
            return None;
        }
        template.root_name.as_deref().or_else(|| self.roots.default_name())
    }

    /// Resolve a path template to an absolute path on `platform`.
    pub fn resolve_path(
        &self,
        name: &str,
        context: &Context,
        platform: Platform,
    ) -> Result<String, ResolutionError> {
        let relative = self.schema.resolve(name, context)?;
        let root = self
            .root_name_for(name)
            .ok_or_else(|| ResolutionError::NoStorageRoot { template: name.to_string() })?;
        self.roots.join(root, &relative, platform)
    }
}
