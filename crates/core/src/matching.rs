//! Reverse resolution: recover field values from a resolved path or string.

use regex::Regex;
use tracing::debug;

use crate::error::ResolutionError;
use crate::model::{Template, TemplateKind, Token};
use crate::resolve::Context;
use crate::schema::Schema;

impl Schema {
    /// Parse `input` against template `name` and return the field values it
    /// encodes.
    ///
    /// Path input may use `\` separators. A key used more than once must
    /// carry the same value everywhere it appears.
    pub fn get_fields(&self, name: &str, input: &str) -> Result<Context, ResolutionError> {
        let template = self.lookup(name)?;
        let no_match =
            || ResolutionError::NoMatch { template: name.to_string(), input: input.to_string() };

        let normalized = match template.kind {
            TemplateKind::Path => input.replace('\\', "/"),
            TemplateKind::String => input.to_string(),
        };

        let (pattern, keys) = self.pattern_for(template);
        // Every fragment is escaped or built from fixed classes.
        let regex = Regex::new(&pattern).map_err(|err| {
            debug!(template = name, %err, "template pattern failed to compile");
            no_match()
        })?;
        let captures = regex.captures(&normalized).ok_or_else(no_match)?;

        let mut fields = Context::new();
        for (index, key) in keys.iter().enumerate() {
            let Some(value) = captures.get(index + 1) else { continue };
            match fields.get(key) {
                Some(existing) if existing != value.as_str() => return Err(no_match()),
                Some(_) => {}
                None => {
                    fields.insert(*key, value.as_str());
                }
            }
        }
        Ok(fields)
    }

    /// Whether `input` could have been produced by template `name`.
    pub fn validate(&self, name: &str, input: &str) -> bool {
        self.get_fields(name, input).is_ok()
    }

    /// Anchored regex for a template plus the key captured by each group.
    fn pattern_for<'a>(&self, template: &'a Template) -> (String, Vec<&'a str>) {
        let mut pattern = String::from("^");
        let mut keys = Vec::new();
        self.push_pattern(template.tokens(), &mut pattern, &mut keys);
        pattern.push('$');
        (pattern, keys)
    }

    fn push_pattern<'a>(
        &self,
        tokens: &'a [Token],
        pattern: &mut String,
        keys: &mut Vec<&'a str>,
    ) {
        for token in tokens {
            match token {
                Token::Literal(text) => pattern.push_str(&regex::escape(text)),
                Token::Key(key) => {
                    let fragment = match self.key(key) {
                        Some(definition) => definition.value_pattern(),
                        None => "[^/]+".to_string(),
                    };
                    pattern.push('(');
                    pattern.push_str(&fragment);
                    pattern.push(')');
                    keys.push(key);
                }
                Token::Optional(inner) => {
                    pattern.push_str("(?:");
                    self.push_pattern(inner, pattern, keys);
                    pattern.push_str(")?");
                }
            }
        }
    }
}
