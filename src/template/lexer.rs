//! Lexer for `@@`-delimited templates using logos

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Placeholder sentinel
pub const DELIMITER: &str = "@@";

/// Raw lexemes. Every input byte matches one of these, so lexing never fails.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum Lexeme {
    #[token("@@")]
    Delimiter,
    #[token("@")]
    At,
    #[regex(r"[^@]+")]
    Text,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `@@@@`, a literal `@@` in the output
    Escaped,
    /// `@@NAME`
    Named(String),
    /// `@@{NAME}`
    Braced(String),
    /// A delimiter that does not start a valid placeholder
    Dangling,
    /// A single `@`, never a delimiter
    At,
    Text,
}

impl Token {
    /// Placeholder name, for named and braced tokens
    pub fn placeholder(&self) -> Option<&str> {
        match self {
            Token::Named(name) | Token::Braced(name) => Some(name.as_str()),
            _ => None,
        }
    }
}

/// Lex a template into tokens with spans
///
/// Spans are contiguous and cover the whole input.
pub fn lex(input: &str) -> Vec<(Token, Span)> {
    let mut lexemes = Lexeme::lexer(input)
        .spanned()
        .map(|(lexeme, span)| (lexeme.unwrap_or(Lexeme::Text), span))
        .peekable();
    let mut tokens = Vec::new();

    while let Some((lexeme, span)) = lexemes.next() {
        match lexeme {
            Lexeme::Text => tokens.push((Token::Text, span)),
            Lexeme::At => tokens.push((Token::At, span)),
            Lexeme::Delimiter => {
                if let Some((_, next)) = lexemes.next_if(|(l, _)| *l == Lexeme::Delimiter) {
                    tokens.push((Token::Escaped, span.start..next.end));
                    continue;
                }

                let placeholder = match lexemes.peek() {
                    Some((Lexeme::Text, text)) => {
                        placeholder_at(&input[text.clone()]).map(|p| (p, text.clone()))
                    }
                    _ => None,
                };
                let Some(((token, len), text)) = placeholder else {
                    tokens.push((Token::Dangling, span));
                    continue;
                };

                lexemes.next();
                let end = text.start + len;
                tokens.push((token, span.start..end));
                if end < text.end {
                    tokens.push((Token::Text, end..text.end));
                }
            }
        }
    }

    tokens
}

/// Placeholder body at the start of `text` and its byte length
fn placeholder_at(text: &str) -> Option<(Token, usize)> {
    let ident_len = |s: &str| {
        let len = s
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(s.len());
        if is_identifier(&s[..len]) {
            len
        } else {
            0
        }
    };

    if let Some(rest) = text.strip_prefix('{') {
        let len = ident_len(rest);
        if len > 0 && rest[len..].starts_with('}') {
            return Some((Token::Braced(rest[..len].to_string()), len + 2));
        }
        return None;
    }

    match ident_len(text) {
        0 => None,
        len => Some((Token::Named(text[..len].to_string()), len)),
    }
}

/// Whether `name` is a valid placeholder identifier
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// 1-based line and column of a byte offset
pub fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let before = &source[..offset.min(source.len())];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}
