//! Error types for declaring a templates document and resolving templates.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::Platform;

/// Top-level section of a templates document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Keys,
    Paths,
    Strings,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Keys => "keys",
            Namespace::Paths => "paths",
            Namespace::Strings => "strings",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A templates document that is malformed or internally inconsistent.
///
/// Nothing can be resolved against such a document, so consumers are
/// expected to refuse to start rather than continue with a partial schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The document (or roots file) could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML syntax errors, unknown fields and wrongly shaped entries.
    #[error("Failed to parse templates document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Duplicate entry '{name}' in {namespace}")]
    DuplicateName { namespace: Namespace, name: String },

    /// Path and string templates share one reference namespace.
    #[error("Template '{name}' is declared in both paths and strings")]
    NameCollision { name: String },

    #[error("Key '{key}' has unsupported type '{found}' (supported: str, int)")]
    UnsupportedKeyType { key: String, found: String },

    #[error("Key '{key}' is invalid: {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("Template '{template}' has a syntax error at offset {offset}: {message}")]
    Syntax { template: String, offset: usize, message: String },

    #[error("Template '{template}' uses undeclared key '{{{key}}}'")]
    UndeclaredKey { template: String, key: String },

    #[error("Template '{template}' references undeclared template '@{reference}'")]
    DanglingReference { template: String, reference: String },

    #[error("Path template '{template}' cannot reference string template '@{reference}'")]
    PathReferencesString { template: String, reference: String },

    #[error("Template reference cycle: {}", .chain.join(" -> "))]
    ReferenceCycle { chain: Vec<String> },

    #[error(
        "Template '{template}' references '@{reference}' inside an optional segment, \
         but '{reference}' has optional segments of its own"
    )]
    NestedOptional { template: String, reference: String },

    #[error("String template '{template}' cannot contain optional segments")]
    OptionalInString { template: String },

    #[error("Invalid storage roots: {reason}")]
    InvalidRoots { reason: String },

    #[error("Path template '{template}' uses unknown storage root '{root}'")]
    UnknownRoot { template: String, root: String },
}

/// A single resolution request that could not be satisfied.
///
/// These are per-request failures; the schema itself remains usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("Unknown template '{name}'")]
    UnknownTemplate { name: String },

    #[error("Missing value for required key '{key}' in template '{template}'")]
    MissingKey { template: String, key: String },

    #[error(
        "Value '{value}' is not an allowed choice for key '{key}' (allowed: {})",
        .allowed.join(", ")
    )]
    InvalidChoice { key: String, value: String, allowed: Vec<String> },

    #[error("Value '{value}' for key '{key}' is not a valid {expected}")]
    InvalidValue { key: String, value: String, expected: &'static str },

    #[error("'{input}' does not match template '{template}'")]
    NoMatch { template: String, input: String },

    #[error("Template '{template}' has no storage root to resolve against")]
    NoStorageRoot { template: String },

    #[error("Storage root '{root}' has no path configured for {platform}")]
    RootUnavailable { root: String, platform: Platform },
}

impl ResolutionError {
    /// True when the caller supplied incomplete or invalid field values,
    /// as opposed to naming something that does not exist.
    pub fn is_missing_information(&self) -> bool {
        matches!(
            self,
            ResolutionError::MissingKey { .. }
                | ResolutionError::InvalidChoice { .. }
                | ResolutionError::InvalidValue { .. }
        )
    }
}
