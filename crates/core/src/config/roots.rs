//! Storage roots: named, per-platform directories that path templates are
//! placed under.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ResolutionError, SchemaError};

/// Operating system family a storage root path is configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    Mac,
    Windows,
}

impl Platform {
    /// Platform of the running process.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::Mac
        } else {
            Platform::Linux
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "linux" => Some(Platform::Linux),
            "mac" | "macos" | "darwin" => Some(Platform::Mac),
            "windows" | "win" => Some(Platform::Windows),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::Mac => "mac",
            Platform::Windows => "windows",
        }
    }

    pub fn separator(&self) -> char {
        match self {
            Platform::Windows => '\\',
            Platform::Linux | Platform::Mac => '/',
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of `roots.yml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageRoot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linux_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub windows_path: Option<String>,
    #[serde(default)]
    pub default: bool,
}

impl StorageRoot {
    pub fn path_for(&self, platform: Platform) -> Option<&str> {
        match platform {
            Platform::Linux => self.linux_path.as_deref(),
            Platform::Mac => self.mac_path.as_deref(),
            Platform::Windows => self.windows_path.as_deref(),
        }
    }
}

/// All storage roots of a configuration, with the default one identified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roots {
    roots: BTreeMap<String, StorageRoot>,
    default: Option<String>,
}

impl Roots {
    pub fn new(roots: BTreeMap<String, StorageRoot>) -> Result<Self, SchemaError> {
        let marked: Vec<&String> =
            roots.iter().filter(|(_, root)| root.default).map(|(name, _)| name).collect();
        let default = match marked.as_slice() {
            [] if roots.len() == 1 => roots.keys().next().cloned(),
            [] => None,
            [single] => Some((*single).clone()),
            _ => {
                let names: Vec<&str> = marked.iter().map(|n| n.as_str()).collect();
                return Err(SchemaError::InvalidRoots {
                    reason: format!("more than one default root: {}", names.join(", ")),
                });
            }
        };
        Ok(Self { roots, default })
    }

    /// Parse a `roots.yml` document. An empty document has no roots.
    pub fn from_yaml_str(source: &str) -> Result<Self, SchemaError> {
        let value: serde_yaml::Value = serde_yaml::from_str(source)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        Self::new(serde_yaml::from_value(value)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|source| SchemaError::Io { path: path.to_path_buf(), source })?;
        Self::from_yaml_str(&source)
    }

    pub fn get(&self, name: &str) -> Option<&StorageRoot> {
        self.roots.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.roots.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StorageRoot)> {
        self.roots.iter().map(|(name, root)| (name.as_str(), root))
    }

    pub fn default_name(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Join `relative` (a resolved path template, `/`-separated) onto root
    /// `name` using the separator of `platform`.
    pub fn join(
        &self,
        name: &str,
        relative: &str,
        platform: Platform,
    ) -> Result<String, ResolutionError> {
        let unavailable =
            || ResolutionError::RootUnavailable { root: name.to_string(), platform };
        let base =
            self.get(name).and_then(|root| root.path_for(platform)).ok_or_else(unavailable)?;

        let separator = platform.separator();
        let base = base.trim_end_matches(['/', '\\']);
        let relative = relative.trim_start_matches('/');
        if relative.is_empty() {
            return Ok(base.to_string());
        }
        let relative: String =
            relative.chars().map(|c| if c == '/' { separator } else { c }).collect();
        Ok(format!("{base}{separator}{relative}"))
    }
}
