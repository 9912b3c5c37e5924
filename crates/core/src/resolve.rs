//! Resolving templates against a context of field values.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::error::ResolutionError;
use crate::model::{Template, TemplateKind, Token};
use crate::schema::Schema;

/// Field values supplied for one resolution request, keyed by key name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Context {
    fields: BTreeMap<String, String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) -> Option<String> {
        self.fields.insert(key.into(), value.to_string())
    }

    /// Builder form of [`Context::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Whether `key` carries a non-empty value.
    pub fn has_value(&self, key: &str) -> bool {
        self.get(key).is_some_and(|value| !value.is_empty())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.fields.remove(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Fill `YYYY`, `MM` and `DD` from a calendar date.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.insert("YYYY", format!("{:04}", date.year()));
        self.insert("MM", format!("{:02}", date.month()));
        self.insert("DD", format!("{:02}", date.day()));
        self
    }

    /// Copy values from a production-tracking record into every key bound to
    /// `entity_type`. `record` maps entity field names to values.
    ///
    /// Returns how many keys were filled. Fields the record lacks or leaves
    /// blank are skipped.
    pub fn apply_entity(
        &mut self,
        schema: &Schema,
        entity_type: &str,
        record: &BTreeMap<String, String>,
    ) -> usize {
        let mut filled = 0;
        for key in schema.keys_for_entity(entity_type) {
            let Some(binding) = &key.binding else { continue };
            if let Some(value) = record.get(&binding.field_name).filter(|v| !v.is_empty()) {
                self.insert(key.name.clone(), value);
                filled += 1;
            }
        }
        filled
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut context = Context::new();
        context.extend(iter);
        context
    }
}

impl<K: Into<String>, V: ToString> Extend<(K, V)> for Context {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl Schema {
    /// Substitute every placeholder of template `name` with values from
    /// `context`.
    ///
    /// An optional segment is emitted only when every key inside it has a
    /// non-empty value in `context`; key defaults do not count. Keys outside
    /// optional segments fall back to their default and fail when there is
    /// none. In path templates a string value must be a single non-empty
    /// path segment.
    pub fn resolve(&self, name: &str, context: &Context) -> Result<String, ResolutionError> {
        let template = self.lookup(name)?;
        let mut resolved = String::new();
        self.render(template, template.tokens(), context, &mut resolved)?;
        debug!(template = name, %resolved, "resolved template");
        Ok(resolved)
    }

    /// Required keys of `name` that have neither a value in `context` nor a
    /// default, in order of first use.
    pub fn missing_keys(
        &self,
        name: &str,
        context: &Context,
    ) -> Result<Vec<String>, ResolutionError> {
        let template = self.lookup(name)?;
        Ok(template
            .required_keys()
            .into_iter()
            .filter(|key| {
                !context.contains(key) && self.key(key).and_then(|k| k.default.as_ref()).is_none()
            })
            .map(str::to_string)
            .collect())
    }

    pub(crate) fn lookup(&self, name: &str) -> Result<&Template, ResolutionError> {
        self.template(name)
            .ok_or_else(|| ResolutionError::UnknownTemplate { name: name.to_string() })
    }

    fn render(
        &self,
        template: &Template,
        tokens: &[Token],
        context: &Context,
        out: &mut String,
    ) -> Result<(), ResolutionError> {
        for token in tokens {
            match token {
                Token::Literal(text) => out.push_str(text),
                Token::Key(key) => {
                    let value = self.key_value(template, key, context)?;
                    out.push_str(&value);
                }
                Token::Optional(inner) => {
                    let mut keys = Vec::new();
                    crate::model::collect_keys(inner, true, &mut keys);
                    if keys.iter().all(|key| context.has_value(key)) {
                        self.render(template, inner, context, out)?;
                    } else {
                        debug!(template = %template.name, ?keys, "omitting optional segment");
                    }
                }
            }
        }
        Ok(())
    }

    fn key_value(
        &self,
        template: &Template,
        key: &str,
        context: &Context,
    ) -> Result<String, ResolutionError> {
        let definition = self.key(key);
        let raw = context
            .get(key)
            .or_else(|| definition.and_then(|k| k.default.as_deref()))
            .ok_or_else(|| ResolutionError::MissingKey {
                template: template.name.clone(),
                key: key.to_string(),
            })?;
        let Some(definition) = definition else {
            return Ok(raw.to_string());
        };
        let value = definition.format_value(raw)?;
        if template.kind == TemplateKind::Path {
            definition.check_path_segment(&value)?;
        }
        Ok(value)
    }
}
