//! Grammar parse of asset script files into a generic tree
//!
//! The tree knows nothing about sprites or portraits; it only records
//! `key = value` options and bare values, nested through groups. Semantic
//! extraction happens in [`crate::reader`].

use crate::tokenizer::{tokenize, Token, TokenKind};
use std::io::Read;
use std::iter::Peekable;
use thiserror::Error;

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
}

impl ParseError {
    fn new(message: impl Into<String>, line: usize) -> Self {
        Self { message: message.into(), line }
    }
}

/// A scalar or group value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Quoted string, quotes stripped
    Str(String),
    /// Bare numeric literal, kept as written
    Number(String),
    /// `yes` / `no`
    Bool(bool),
    /// Any other bare word
    Id(String),
    Group(Vec<Node>),
}

impl Value {
    /// Text of a string, number or identifier value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Str(s) | Value::Number(s) | Value::Id(s) => Some(s),
            Value::Bool(_) | Value::Group(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&[Node]> {
        match self {
            Value::Group(nodes) => Some(nodes),
            _ => None,
        }
    }

    fn from_bare(word: String) -> Self {
        if word == "yes" {
            return Value::Bool(true);
        }
        if word == "no" {
            return Value::Bool(false);
        }
        let numeric = word.starts_with(|c: char| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'))
            && word.parse::<f64>().is_ok();
        if numeric {
            Value::Number(word)
        } else {
            Value::Id(word)
        }
    }
}

/// One entry of a document or group.
///
/// `key` is set for `key = value` options and empty for bare list items such
/// as the strings of a `layer = { ... }` group.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub key: Option<String>,
    pub value: Value,
    pub line: usize,
}

impl Node {
    /// Whether this is an option with the given key (case-sensitive).
    pub fn is(&self, key: &str) -> bool {
        self.key.as_deref() == Some(key)
    }

    /// Whether this is an option with the given key, ignoring ASCII case.
    pub fn is_ignore_case(&self, key: &str) -> bool {
        self.key.as_deref().is_some_and(|k| k.eq_ignore_ascii_case(key))
    }

    /// Children of a group value, empty for scalars.
    pub fn children(&self) -> &[Node] {
        self.value.as_group().unwrap_or(&[])
    }
}

/// Parse script source text into its top-level nodes.
///
/// # Examples
///
/// ```
/// use portrait_builder::parser::{parse_document, Value};
///
/// let nodes = parse_document("spriteTypes = { spriteType = { noOfFrames = 3 } }").unwrap();
/// let sprite = &nodes[0].children()[0];
/// assert!(sprite.is("spriteType"));
/// assert_eq!(sprite.children()[0].value, Value::Number("3".to_string()));
/// ```
pub fn parse_document(source: &str) -> Result<Vec<Node>, ParseError> {
    let tokens = tokenize(source)?;
    let mut iter = tokens.into_iter().peekable();
    let nodes = parse_entries(&mut iter, None, 0)?;
    Ok(nodes)
}

/// Read a whole script stream in the legacy Western encoding and parse it.
pub fn parse_stream<R: Read>(mut reader: R) -> Result<Vec<Node>, ParseError> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| ParseError::new(format!("read failed: {}", e), 0))?;
    parse_document(&decode_western(&bytes))
}

/// Deepest group nesting accepted in a script.
pub const MAX_NESTING: usize = 256;

fn parse_group<I>(tokens: &mut Peekable<I>, line: usize, depth: usize) -> Result<Vec<Node>, ParseError>
where
    I: Iterator<Item = Token>,
{
    if depth >= MAX_NESTING {
        return Err(ParseError::new(format!("Groups nested deeper than {}", MAX_NESTING), line));
    }
    parse_entries(tokens, Some(line), depth + 1)
}

fn parse_entries<I>(tokens: &mut Peekable<I>, open_line: Option<usize>, depth: usize) -> Result<Vec<Node>, ParseError>
where
    I: Iterator<Item = Token>,
{
    let mut nodes = Vec::new();

    loop {
        let Some(token) = tokens.next() else {
            return match open_line {
                Some(line) => Err(ParseError::new("Unclosed group", line)),
                None => Ok(nodes),
            };
        };

        let line = token.line;
        let scalar = match token.kind {
            TokenKind::Close => {
                return match open_line {
                    Some(_) => Ok(nodes),
                    None => Err(ParseError::new("Unexpected '}'", line)),
                };
            }
            TokenKind::Equals => return Err(ParseError::new("'=' without a key", line)),
            TokenKind::Open => {
                let children = parse_group(tokens, line, depth)?;
                nodes.push(Node { key: None, value: Value::Group(children), line });
                continue;
            }
            TokenKind::Quoted(s) => (s, true),
            TokenKind::Bare(s) => (s, false),
        };

        let is_option = matches!(tokens.peek(), Some(Token { kind: TokenKind::Equals, .. }));
        if !is_option {
            let (text, quoted) = scalar;
            let value = if quoted { Value::Str(text) } else { Value::from_bare(text) };
            nodes.push(Node { key: None, value, line });
            continue;
        }

        tokens.next();
        let key = scalar.0;
        let value = match tokens.next() {
            Some(Token { kind: TokenKind::Open, line: group_line }) => {
                Value::Group(parse_group(tokens, group_line, depth)?)
            }
            Some(Token { kind: TokenKind::Quoted(s), .. }) => Value::Str(s),
            Some(Token { kind: TokenKind::Bare(s), .. }) => Value::from_bare(s),
            Some(Token { line: l, .. }) => {
                return Err(ParseError::new(format!("Missing value for '{}'", key), l));
            }
            None => return Err(ParseError::new(format!("Missing value for '{}'", key), line)),
        };
        nodes.push(Node { key: Some(key), value, line });
    }
}

/// Windows-1252 code points for bytes 0x80..=0x9F; the rest of the range
/// coincides with Latin-1. Undefined slots decode to U+FFFD.
const CP1252_HIGH: [char; 32] = [
    '\u{20AC}', '\u{FFFD}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{FFFD}', '\u{017D}', '\u{FFFD}',
    '\u{FFFD}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{FFFD}', '\u{017E}', '\u{0178}',
];

/// Decode bytes in the single-byte Western encoding used by game files.
pub fn decode_western(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| match b {
            0x80..=0x9F => CP1252_HIGH[(b - 0x80) as usize],
            _ => b as char,
        })
        .collect()
}
