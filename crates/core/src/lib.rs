//! template-schema
//!
//! Loader, validator and resolver for the path and string templates of a
//! production pipeline configuration.
//!
//! A templates document declares three namespaces: `keys` (typed
//! substitution variables), `paths` (file system templates) and `strings`
//! (engine-internal identifiers). [`Schema`] declares such a document once,
//! rejecting anything inconsistent, and then resolves templates against a
//! [`Context`] of field values any number of times.
//!
//! The goal is to keep all substantive logic here so it is fully testable and
//! reusable from multiple frontends.

pub mod config;
pub mod definition;
pub mod error;
pub mod graph;
pub mod matching;
pub mod model;
pub mod resolve;
pub mod schema;

pub use config::{ConfigLayout, PipelineConfig, Platform, Roots, StorageRoot};
pub use error::{Namespace, ResolutionError, SchemaError};
pub use model::{
    Choice, EntityBinding, Key, KeyType, Template, TemplateKind, Token, IMPLICIT_KEYS,
};
pub use resolve::Context;
pub use schema::Schema;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
