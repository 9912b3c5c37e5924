//! Core data model: keys and templates as declared by a templates document.
//!
//! Everything here is immutable once a [`crate::Schema`] has been declared.
//! Templates carry their fully expanded token list, so resolving one never
//! needs to look at another template.

use serde::Serialize;

use crate::error::ResolutionError;

/// Tokens that may appear in a template without being declared under `keys`.
pub const IMPLICIT_KEYS: &[&str] = &["name", "version", "YYYY", "MM", "DD", "hh", "mm", "ss"];

/// Value type of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    Str,
    Int,
}

impl KeyType {
    /// Parse the `type` field of a key entry.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "str" => Some(KeyType::Str),
            "int" => Some(KeyType::Int),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Str => "str",
            KeyType::Int => "int",
        }
    }
}

/// Binding of a key to a field on a production-tracking entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityBinding {
    pub entity_type: String,
    pub field_name: String,
}

/// One allowed literal value of an enumerated key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

/// A named substitution variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Key {
    pub name: String,
    #[serde(rename = "type")]
    pub key_type: KeyType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding: Option<EntityBinding>,
    /// Allowed values. Empty means unrestricted.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Zero-padded width for `int` keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<usize>,
    /// Reserved token that was not declared in the document.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub implicit: bool,
}

impl Key {
    pub fn new(name: impl Into<String>, key_type: KeyType) -> Self {
        Self {
            name: name.into(),
            key_type,
            binding: None,
            choices: Vec::new(),
            default: None,
            width: None,
            implicit: false,
        }
    }

    /// Key definition for a reserved token, if `name` is one.
    pub fn implicit(name: &str) -> Option<Self> {
        let (key_type, width) = match name {
            "name" => (KeyType::Str, None),
            "version" => (KeyType::Int, None),
            "YYYY" => (KeyType::Int, Some(4)),
            "MM" | "DD" | "hh" | "mm" | "ss" => (KeyType::Int, Some(2)),
            _ => return None,
        };
        let mut key = Key::new(name, key_type);
        key.width = width;
        key.implicit = true;
        Some(key)
    }

    pub fn with_binding(
        mut self,
        entity_type: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        self.binding =
            Some(EntityBinding { entity_type: entity_type.into(), field_name: field.into() });
        self
    }

    pub fn has_choices(&self) -> bool {
        !self.choices.is_empty()
    }

    pub fn choice_values(&self) -> Vec<String> {
        self.choices.iter().map(|c| c.value.clone()).collect()
    }

    /// Validate `value` against this key's type and choices and return the
    /// literal text that goes into a resolved template.
    pub fn format_value(&self, value: &str) -> Result<String, ResolutionError> {
        let formatted = match self.key_type {
            KeyType::Str => value.to_string(),
            KeyType::Int => {
                let number: i64 = value.trim().parse().map_err(|_| ResolutionError::InvalidValue {
                    key: self.name.clone(),
                    value: value.to_string(),
                    expected: "integer",
                })?;
                match self.width {
                    Some(width) => format!("{number:0width$}"),
                    None => number.to_string(),
                }
            }
        };

        if self.has_choices() && !self.choices.iter().any(|c| c.value == formatted) {
            return Err(ResolutionError::InvalidChoice {
                key: self.name.clone(),
                value: value.to_string(),
                allowed: self.choice_values(),
            });
        }
        Ok(formatted)
    }

    /// Check a formatted value used as part of a path. It must be non-empty
    /// and stay within one directory level.
    pub fn check_path_segment(&self, value: &str) -> Result<(), ResolutionError> {
        if self.key_type == KeyType::Str && (value.is_empty() || value.contains(['/', '\\'])) {
            return Err(ResolutionError::InvalidValue {
                key: self.name.clone(),
                value: value.to_string(),
                expected: "path segment",
            });
        }
        Ok(())
    }

    /// Regex fragment (without a capture group) matching a formatted value.
    pub fn value_pattern(&self) -> String {
        if self.has_choices() {
            let mut values = self.choice_values();
            // Longer alternatives first so a prefix choice cannot shadow them.
            values.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
            let escaped: Vec<String> = values.iter().map(|v| regex::escape(v)).collect();
            return format!("(?:{})", escaped.join("|"));
        }
        match self.key_type {
            KeyType::Str => "[^/]+".to_string(),
            KeyType::Int => "-?[0-9]+".to_string(),
        }
    }
}

/// Which section a template was declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Path,
    String,
}

impl TemplateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::Path => "path",
            TemplateKind::String => "string",
        }
    }
}

/// Piece of an expanded template. References are already inlined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Literal(String),
    Key(String),
    /// Emitted only when every key inside has a supplied value.
    Optional(Vec<Token>),
}

/// A named path or string template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Template {
    pub name: String,
    pub kind: TemplateKind,
    /// Definition text exactly as written in the document.
    pub definition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_name: Option<String>,
    /// Templates referenced directly by the definition.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
    #[serde(skip)]
    pub(crate) tokens: Vec<Token>,
}

impl Template {
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Every key used by the expanded template, in order of first use.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys = Vec::new();
        collect_keys(&self.tokens, true, &mut keys);
        keys
    }

    /// Keys outside optional segments.
    pub fn required_keys(&self) -> Vec<&str> {
        let mut keys = Vec::new();
        collect_keys(&self.tokens, false, &mut keys);
        keys
    }

    pub fn has_optional_segments(&self) -> bool {
        self.tokens.iter().any(|t| matches!(t, Token::Optional(_)))
    }
}

pub(crate) fn collect_keys<'a>(
    tokens: &'a [Token],
    include_optional: bool,
    out: &mut Vec<&'a str>,
) {
    for token in tokens {
        match token {
            Token::Key(name) => {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
            Token::Optional(inner) if include_optional => collect_keys(inner, true, out),
            _ => {}
        }
    }
}
