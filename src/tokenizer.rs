//! Lexer for the asset script language
//!
//! Script files are sequences of `key = value` pairs where a value is a
//! quoted string, a bare word (identifier, number, `yes`/`no`) or a
//! brace-delimited group. `#` starts a comment running to the end of the line.

use crate::parser::ParseError;

/// Kind of a lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// `{`
    Open,
    /// `}`
    Close,
    /// `=`
    Equals,
    /// Double-quoted string, quotes stripped, content verbatim
    Quoted(String),
    /// Any other run of non-separator characters
    Bare(String),
}

/// A token with the 1-based line it starts on.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '{' | '}' | '=' | '"' | '#')
}

/// Split script source into tokens.
///
/// The only lexical error is a string left open at end of input.
///
/// # Examples
///
/// ```
/// use portrait_builder::tokenizer::{tokenize, TokenKind};
///
/// let tokens = tokenize("name = \"GFX_x\" # comment\nnoOfFrames = 3").unwrap();
/// let kinds: Vec<_> = tokens.into_iter().map(|t| t.kind).collect();
/// assert_eq!(kinds[0], TokenKind::Bare("name".to_string()));
/// assert_eq!(kinds[2], TokenKind::Quoted("GFX_x".to_string()));
/// assert_eq!(kinds.len(), 6);
/// ```
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();
    let mut line = 1;

    while let Some(c) = chars.next() {
        match c {
            '\n' => line += 1,
            c if c.is_whitespace() => {}
            '#' => {
                // Comment runs to end of line; the newline itself is handled above
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '{' => tokens.push(Token { kind: TokenKind::Open, line }),
            '}' => tokens.push(Token { kind: TokenKind::Close, line }),
            '=' => tokens.push(Token { kind: TokenKind::Equals, line }),
            '"' => {
                let start = line;
                let mut text = String::new();
                let mut closed = false;
                for inner in chars.by_ref() {
                    if inner == '"' {
                        closed = true;
                        break;
                    }
                    if inner == '\n' {
                        line += 1;
                    }
                    text.push(inner);
                }
                if !closed {
                    return Err(ParseError {
                        message: format!("Unterminated string \"{}", truncate(&text)),
                        line: start,
                    });
                }
                tokens.push(Token { kind: TokenKind::Quoted(text), line: start });
            }
            other => {
                let mut word = String::from(other);
                while let Some(&next) = chars.peek() {
                    if is_separator(next) {
                        break;
                    }
                    word.push(next);
                    chars.next();
                }
                tokens.push(Token { kind: TokenKind::Bare(word), line });
            }
        }
    }

    Ok(tokens)
}

fn truncate(text: &str) -> String {
    text.chars().take(24).collect()
}
