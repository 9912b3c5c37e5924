//! Definition string grammar.
//!
//! ```text
//! definition := item*
//! item       := literal | "{" key "}" | "@" reference | "[" inner* "]"
//! inner      := literal | "{" key "}" | "@" reference
//! key        := [A-Za-z0-9_]+
//! reference  := [A-Za-z0-9_.]+
//! ```
//!
//! Optional segments do not nest. A lone `@` (not followed by a reference
//! character) is literal text.

use std::fmt;

/// Piece of a definition as written, before references are linked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Key(String),
    /// Raw reference text; may carry trailing literal text after a `.`
    /// until it is linked against the declared template names.
    Reference(String),
    Optional(Vec<Segment>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// Byte offset into the definition.
    pub offset: usize,
    pub message: String,
}

impl SyntaxError {
    fn new(offset: usize, message: impl Into<String>) -> Self {
        Self { offset, message: message.into() }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at offset {})", self.message, self.offset)
    }
}

impl std::error::Error for SyntaxError {}

pub fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub fn is_reference_char(c: char) -> bool {
    is_key_char(c) || c == '.'
}

/// Parse a definition string into segments.
pub fn parse_definition(source: &str) -> Result<Vec<Segment>, SyntaxError> {
    let mut top: Vec<Segment> = Vec::new();
    let mut optional: Option<(usize, Vec<Segment>)> = None;
    let mut literal = String::new();
    let mut chars = source.char_indices().peekable();

    while let Some((offset, ch)) = chars.next() {
        match ch {
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    name.push(c);
                }
                if !closed {
                    return Err(SyntaxError::new(offset, "unterminated '{'"));
                }
                if name.is_empty() || !name.chars().all(is_key_char) {
                    return Err(SyntaxError::new(offset, format!("invalid key name '{name}'")));
                }
                let target = current(&mut top, &mut optional);
                flush(&mut literal, target);
                target.push(Segment::Key(name));
            }
            '}' => return Err(SyntaxError::new(offset, "unexpected '}'")),
            '[' => {
                if optional.is_some() {
                    return Err(SyntaxError::new(offset, "optional segments cannot be nested"));
                }
                flush(&mut literal, &mut top);
                optional = Some((offset, Vec::new()));
            }
            ']' => {
                let Some((start, mut inner)) = optional.take() else {
                    return Err(SyntaxError::new(offset, "unexpected ']'"));
                };
                flush(&mut literal, &mut inner);
                if inner.is_empty() {
                    return Err(SyntaxError::new(start, "empty optional segment"));
                }
                top.push(Segment::Optional(inner));
            }
            '@' => {
                let mut name = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if !is_reference_char(c) {
                        break;
                    }
                    name.push(c);
                    chars.next();
                }
                if name.is_empty() {
                    literal.push('@');
                    continue;
                }
                let target = current(&mut top, &mut optional);
                flush(&mut literal, target);
                target.push(Segment::Reference(name));
            }
            other => literal.push(other),
        }
    }

    if let Some((start, _)) = optional {
        return Err(SyntaxError::new(start, "unterminated '['"));
    }
    flush(&mut literal, &mut top);
    Ok(top)
}

fn current<'a>(
    top: &'a mut Vec<Segment>,
    optional: &'a mut Option<(usize, Vec<Segment>)>,
) -> &'a mut Vec<Segment> {
    match optional {
        Some((_, inner)) => inner,
        None => top,
    }
}

fn flush(literal: &mut String, out: &mut Vec<Segment>) {
    if !literal.is_empty() {
        out.push(Segment::Literal(std::mem::take(literal)));
    }
}
