//! Serde shape of a templates document, before any validation.
//!
//! Field names and nesting are the on-disk contract; unknown fields are
//! rejected rather than ignored.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;

/// The whole document: `keys`, `paths` and `strings`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplatesDocument {
    #[serde(default)]
    pub keys: Entries<KeyEntry>,
    #[serde(default)]
    pub paths: Entries<TemplateEntry>,
    #[serde(default)]
    pub strings: Entries<TemplateEntry>,
}

/// Entry under `keys`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyEntry {
    #[serde(rename = "type")]
    pub key_type: String,
    #[serde(default)]
    pub shotgun_entity_type: Option<String>,
    #[serde(default)]
    pub shotgun_field_name: Option<String>,
    #[serde(default)]
    pub choices: Option<ChoicesEntry>,
    #[serde(default)]
    pub default: Option<serde_yaml::Value>,
    #[serde(default)]
    pub format_spec: Option<serde_yaml::Value>,
}

/// `choices` is either `value: label` pairs or a plain list of values.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ChoicesEntry {
    Labeled(serde_yaml::Mapping),
    Listed(Vec<serde_yaml::Value>),
}

/// Entry under `paths` or `strings`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TemplateEntry {
    /// `name: "definition"`
    Shorthand(String),
    Full(TemplateFields),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateFields {
    pub definition: String,
    #[serde(default)]
    pub root_name: Option<String>,
}

impl TemplateEntry {
    pub fn definition(&self) -> &str {
        match self {
            TemplateEntry::Shorthand(definition) => definition,
            TemplateEntry::Full(fields) => &fields.definition,
        }
    }

    pub fn root_name(&self) -> Option<&str> {
        match self {
            TemplateEntry::Shorthand(_) => None,
            TemplateEntry::Full(fields) => fields.root_name.as_deref(),
        }
    }
}

/// Ordered `name: entry` mapping that remembers repeated names instead of
/// letting the last one win.
#[derive(Debug, Clone)]
pub struct Entries<T> {
    pub items: Vec<(String, T)>,
    pub duplicates: Vec<String>,
}

impl<T> Default for Entries<T> {
    fn default() -> Self {
        Self { items: Vec::new(), duplicates: Vec::new() }
    }
}

impl<T> Entries<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.items.iter().map(|(name, entry)| (name.as_str(), entry))
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Entries<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for EntriesVisitor<T> {
            type Value = Entries<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of names to entries")
            }

            // `keys:` with nothing under it.
            fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(Entries::default())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Entries::default();
                while let Some((name, entry)) = map.next_entry::<String, T>()? {
                    if entries.items.iter().any(|(existing, _)| *existing == name) {
                        entries.duplicates.push(name);
                    } else {
                        entries.items.push((name, entry));
                    }
                }
                Ok(entries)
            }
        }

        deserializer.deserialize_any(EntriesVisitor(PhantomData))
    }
}

/// Text of a scalar YAML value; `None` for mappings, sequences and null.
pub fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
