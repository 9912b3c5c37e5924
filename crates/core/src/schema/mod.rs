//! Declaring a schema from a templates document.
//!
//! Declaration does all validation up front:
//! - names are unique per namespace, and path/string names do not collide
//! - keys have a supported type, a complete entity binding and sane choices
//! - every definition parses and uses only declared (or implicit) keys
//! - every `@reference` names a declared template and the reference graph
//!   is acyclic
//!
//! Afterwards each template holds its fully expanded token list, so the
//! resulting [`Schema`] is immutable and resolution never follows
//! references.

pub mod document;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::definition::{parse_definition, Segment};
use crate::error::{Namespace, SchemaError};
use crate::graph::ReferenceGraph;
use crate::model::{Choice, Key, KeyType, Template, TemplateKind, Token};

pub use document::{
    scalar_to_string, ChoicesEntry, Entries, KeyEntry, TemplateEntry, TemplateFields,
    TemplatesDocument,
};

/// A declared, validated templates document.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    keys: BTreeMap<String, Key>,
    /// Reserved tokens used by templates but not declared under `keys`.
    implicit_keys: BTreeMap<String, Key>,
    templates: BTreeMap<String, Template>,
}

impl Schema {
    /// Parse and declare a YAML templates document.
    pub fn from_yaml_str(source: &str) -> Result<Self, SchemaError> {
        let document: TemplatesDocument = serde_yaml::from_str(source)?;
        Self::declare(document)
    }

    /// Read, parse and declare a templates document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)
            .map_err(|source| SchemaError::Io { path: path.to_path_buf(), source })?;
        Self::from_yaml_str(&source)
    }

    /// Validate a parsed document and build the schema.
    pub fn declare(document: TemplatesDocument) -> Result<Self, SchemaError> {
        check_duplicates(Namespace::Keys, &document.keys)?;
        check_duplicates(Namespace::Paths, &document.paths)?;
        check_duplicates(Namespace::Strings, &document.strings)?;

        let mut keys = BTreeMap::new();
        for (name, entry) in document.keys.iter() {
            keys.insert(name.to_string(), declare_key(name, entry)?);
        }

        // Parse every definition before linking, so references can be checked
        // against the complete set of names.
        let mut parsed: BTreeMap<String, ParsedTemplate> = BTreeMap::new();
        let mut declaration_order: Vec<String> = Vec::new();
        let sections = [
            (TemplateKind::Path, &document.paths),
            (TemplateKind::String, &document.strings),
        ];
        for (kind, entries) in sections {
            for (name, entry) in entries.iter() {
                if parsed.contains_key(name) {
                    return Err(SchemaError::NameCollision { name: name.to_string() });
                }
                let segments = parse_definition(entry.definition()).map_err(|err| {
                    SchemaError::Syntax {
                        template: name.to_string(),
                        offset: err.offset,
                        message: err.message,
                    }
                })?;
                declaration_order.push(name.to_string());
                parsed.insert(
                    name.to_string(),
                    ParsedTemplate {
                        kind,
                        definition: entry.definition().to_string(),
                        root_name: entry.root_name().map(str::to_string),
                        segments,
                        references: Vec::new(),
                    },
                );
            }
        }

        let kinds: BTreeMap<String, TemplateKind> =
            parsed.iter().map(|(name, p)| (name.clone(), p.kind)).collect();
        let mut implicit_keys = BTreeMap::new();
        let mut graph = ReferenceGraph::new(declaration_order.iter().cloned());

        for name in &declaration_order {
            let Some(template) = parsed.get_mut(name) else { continue };
            let segments = std::mem::take(&mut template.segments);
            template.segments = link_references(name, template.kind, segments, &kinds)?;
            template.references = direct_references(&template.segments);
            for reference in &template.references {
                graph.add_edge(name, reference);
            }
            for key in segment_keys(&template.segments) {
                if keys.contains_key(key) || implicit_keys.contains_key(key) {
                    continue;
                }
                match Key::implicit(key) {
                    Some(implicit) => {
                        implicit_keys.insert(key.to_string(), implicit);
                    }
                    None => {
                        return Err(SchemaError::UndeclaredKey {
                            template: name.clone(),
                            key: key.to_string(),
                        })
                    }
                }
            }
        }

        let order =
            graph.topological_order().map_err(|chain| SchemaError::ReferenceCycle { chain })?;

        let mut templates: BTreeMap<String, Template> = BTreeMap::new();
        for name in order {
            let Some(source) = parsed.remove(name) else { continue };
            let tokens = expand(name, &source.segments, &templates, false)?;
            if source.kind == TemplateKind::String
                && tokens.iter().any(|t| matches!(t, Token::Optional(_)))
            {
                return Err(SchemaError::OptionalInString { template: name.to_string() });
            }
            templates.insert(
                name.to_string(),
                Template {
                    name: name.to_string(),
                    kind: source.kind,
                    definition: source.definition,
                    root_name: source.root_name,
                    references: source.references,
                    tokens,
                },
            );
        }

        debug!(
            keys = keys.len(),
            implicit_keys = implicit_keys.len(),
            templates = templates.len(),
            "declared template schema"
        );
        Ok(Self { keys, implicit_keys, templates })
    }

    /// Look up a key, falling back to implicit reserved tokens.
    pub fn key(&self, name: &str) -> Option<&Key> {
        self.keys.get(name).or_else(|| self.implicit_keys.get(name))
    }

    /// Keys declared in the document, in name order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.keys.values()
    }

    /// Reserved tokens used by templates without being declared.
    pub fn implicit_keys(&self) -> impl Iterator<Item = &Key> {
        self.implicit_keys.values()
    }

    pub fn template(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    pub fn templates(&self) -> impl Iterator<Item = &Template> {
        self.templates.values()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Template> {
        self.templates.values().filter(|t| t.kind == TemplateKind::Path)
    }

    pub fn strings(&self) -> impl Iterator<Item = &Template> {
        self.templates.values().filter(|t| t.kind == TemplateKind::String)
    }

    /// Declared keys whose values come from a field on `entity_type`.
    pub fn keys_for_entity(&self, entity_type: &str) -> Vec<&Key> {
        self.keys
            .values()
            .filter(|k| k.binding.as_ref().is_some_and(|b| b.entity_type == entity_type))
            .collect()
    }
}

struct ParsedTemplate {
    kind: TemplateKind,
    definition: String,
    root_name: Option<String>,
    segments: Vec<Segment>,
    references: Vec<String>,
}

fn check_duplicates<T>(namespace: Namespace, entries: &Entries<T>) -> Result<(), SchemaError> {
    match entries.duplicates.first() {
        Some(name) => Err(SchemaError::DuplicateName { namespace, name: name.clone() }),
        None => Ok(()),
    }
}

fn declare_key(name: &str, entry: &KeyEntry) -> Result<Key, SchemaError> {
    let invalid = |reason: String| SchemaError::InvalidKey { key: name.to_string(), reason };

    let key_type = KeyType::parse(&entry.key_type).ok_or_else(|| {
        SchemaError::UnsupportedKeyType { key: name.to_string(), found: entry.key_type.clone() }
    })?;
    let mut key = Key::new(name, key_type);

    match (&entry.shotgun_entity_type, &entry.shotgun_field_name) {
        (Some(entity_type), Some(field)) => {
            key = key.with_binding(entity_type.as_str(), field.as_str());
        }
        (None, None) => {}
        _ => {
            return Err(invalid(
                "shotgun_entity_type and shotgun_field_name must be given together".to_string(),
            ))
        }
    }

    if let Some(spec) = &entry.format_spec {
        if key_type != KeyType::Int {
            return Err(invalid("format_spec is only supported on int keys".to_string()));
        }
        let spec = scalar_to_string(spec).unwrap_or_default();
        key.width = Some(parse_format_spec(&spec).ok_or_else(|| {
            invalid(format!("format_spec '{spec}' must be a zero-padded width such as \"03\""))
        })?);
    }

    if let Some(entry) = &entry.choices {
        let mut choices = declare_choices(entry).map_err(invalid)?;
        if choices.is_empty() {
            return Err(invalid("choices must not be empty".to_string()));
        }
        // Values are compared after formatting, so `1` matches an int key's "01".
        for choice in &mut choices {
            choice.value =
                key.format_value(&choice.value).map_err(|err| invalid(err.to_string()))?;
        }
        key.choices = choices;
    }

    if let Some(default) = &entry.default {
        let raw = scalar_to_string(default)
            .ok_or_else(|| invalid("default must be a scalar value".to_string()))?;
        let formatted = key.format_value(&raw).map_err(|err| invalid(err.to_string()))?;
        key.default = Some(formatted);
    }

    Ok(key)
}

fn declare_choices(entry: &ChoicesEntry) -> Result<Vec<Choice>, String> {
    let scalar = |value: &serde_yaml::Value| {
        scalar_to_string(value).ok_or_else(|| "choices must be scalar values".to_string())
    };
    let mut choices: Vec<Choice> = Vec::new();
    let pairs: Vec<(String, String)> = match entry {
        ChoicesEntry::Labeled(mapping) => mapping
            .iter()
            .map(|(value, label)| -> Result<(String, String), String> {
                Ok((scalar(value)?, scalar(label)?))
            })
            .collect::<Result<_, String>>()?,
        ChoicesEntry::Listed(values) => values
            .iter()
            .map(|value| scalar(value).map(|v| (v.clone(), v)))
            .collect::<Result<_, String>>()?,
    };
    for (value, label) in pairs {
        if choices.iter().any(|c| c.value == value) {
            return Err(format!("duplicate choice '{value}'"));
        }
        choices.push(Choice { value, label });
    }
    Ok(choices)
}

/// `"03"` -> width 3.
fn parse_format_spec(spec: &str) -> Option<usize> {
    let digits = spec.strip_prefix('0')?;
    digits.parse::<usize>().ok().filter(|width| *width > 0)
}

/// Replace raw reference text with the declared template it names.
///
/// Reference text may run into trailing literal text joined by a `.`
/// (`@shot_root.v{version}`); the longest declared name ending at a dot
/// boundary wins and the remainder becomes literal text.
fn link_references(
    template: &str,
    kind: TemplateKind,
    segments: Vec<Segment>,
    kinds: &BTreeMap<String, TemplateKind>,
) -> Result<Vec<Segment>, SchemaError> {
    let mut linked = Vec::with_capacity(segments.len());
    for segment in segments {
        match segment {
            Segment::Reference(raw) => {
                let (target, rest) = split_reference(&raw, kinds).ok_or_else(|| {
                    SchemaError::DanglingReference {
                        template: template.to_string(),
                        reference: raw.clone(),
                    }
                })?;
                if kind == TemplateKind::Path && kinds.get(target) == Some(&TemplateKind::String) {
                    return Err(SchemaError::PathReferencesString {
                        template: template.to_string(),
                        reference: target.to_string(),
                    });
                }
                linked.push(Segment::Reference(target.to_string()));
                if !rest.is_empty() {
                    linked.push(Segment::Literal(rest.to_string()));
                }
            }
            Segment::Optional(inner) => {
                linked.push(Segment::Optional(link_references(template, kind, inner, kinds)?));
            }
            other => linked.push(other),
        }
    }
    Ok(linked)
}

fn split_reference<'a>(
    raw: &'a str,
    kinds: &BTreeMap<String, TemplateKind>,
) -> Option<(&'a str, &'a str)> {
    if kinds.contains_key(raw) {
        return Some((raw, ""));
    }
    raw.rmatch_indices('.')
        .map(|(dot, _)| (&raw[..dot], &raw[dot..]))
        .find(|(name, _)| !name.is_empty() && kinds.contains_key(*name))
}

fn direct_references(segments: &[Segment]) -> Vec<String> {
    let mut references: Vec<String> = Vec::new();
    for segment in segments {
        match segment {
            Segment::Reference(name) if !references.contains(name) => {
                references.push(name.clone());
            }
            Segment::Optional(inner) => {
                for name in direct_references(inner) {
                    if !references.contains(&name) {
                        references.push(name);
                    }
                }
            }
            _ => {}
        }
    }
    references
}

fn segment_keys(segments: &[Segment]) -> Vec<&str> {
    let mut keys = Vec::new();
    for segment in segments {
        match segment {
            Segment::Key(name) => keys.push(name.as_str()),
            Segment::Optional(inner) => keys.extend(segment_keys(inner)),
            _ => {}
        }
    }
    keys
}

/// Inline already-expanded referenced templates. `templates` must contain
/// every reference target, which holds when called in topological order.
fn expand(
    name: &str,
    segments: &[Segment],
    templates: &BTreeMap<String, Template>,
    in_optional: bool,
) -> Result<Vec<Token>, SchemaError> {
    let mut tokens: Vec<Token> = Vec::new();
    for segment in segments {
        match segment {
            Segment::Literal(text) => push_literal(&mut tokens, text),
            Segment::Key(key) => tokens.push(Token::Key(key.clone())),
            Segment::Optional(inner) => {
                tokens.push(Token::Optional(expand(name, inner, templates, true)?));
            }
            Segment::Reference(target) => {
                let referenced = templates.get(target).ok_or_else(|| {
                    SchemaError::DanglingReference {
                        template: name.to_string(),
                        reference: target.clone(),
                    }
                })?;
                if in_optional && referenced.has_optional_segments() {
                    return Err(SchemaError::NestedOptional {
                        template: name.to_string(),
                        reference: target.clone(),
                    });
                }
                for token in referenced.tokens() {
                    match token {
                        Token::Literal(text) => push_literal(&mut tokens, text),
                        other => tokens.push(other.clone()),
                    }
                }
            }
        }
    }
    Ok(tokens)
}

fn push_literal(tokens: &mut Vec<Token>, text: &str) {
    if let Some(Token::Literal(last)) = tokens.last_mut() {
        last.push_str(text);
    } else {
        tokens.push(Token::Literal(text.to_string()));
    }
}
