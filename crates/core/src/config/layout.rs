use std::path::{Path, PathBuf};

/// Logical layout of a pipeline configuration on disk.
///
/// This is derived from a chosen root path. It does not perform any IO itself.
#[derive(Debug, Clone)]
pub struct ConfigLayout {
    /// Root directory of the pipeline configuration.
    pub root: PathBuf,
    /// Directory holding the core configuration files (core).
    pub core_dir: PathBuf,
    /// Path to the templates document (core/templates.yml).
    pub templates_path: PathBuf,
    /// Path to the storage roots file (core/roots.yml).
    pub roots_path: PathBuf,
}

impl ConfigLayout {
    /// Compute the default layout for a configuration rooted at `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let core_dir = root.join("core");
        let templates_path = core_dir.join("templates.yml");
        let roots_path = core_dir.join("roots.yml");

        Self { root, core_dir, templates_path, roots_path }
    }

    /// Use an explicit templates document instead of `core/templates.yml`.
    ///
    /// Relative paths are taken relative to the configuration root.
    pub fn with_templates_path(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        self.templates_path =
            if path.is_absolute() { path.to_path_buf() } else { self.root.join(path) };
        self
    }

    /// The templates path relative to `root` when possible, for display.
    pub fn templates_path_relative_string(&self) -> String {
        match self.templates_path.strip_prefix(&self.root) {
            Ok(rel) => rel.to_string_lossy().to_string(),
            Err(_) => self.templates_path.to_string_lossy().to_string(),
        }
    }
}
