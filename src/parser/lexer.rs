//! Logos-based lexer for YASDL
//!
//! Fast tokenization using the logos crate. Nothing is skipped; the parser
//! filters trivia so that every byte of the input is covered by a token and
//! line/column tracking stays exact.

use logos::{Lexer as LogosLexer, Logos};

use crate::base::{Position, Span};

/// A token with its kind, text, and position
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub span: Span,
}

impl Token<'_> {
    /// True for whitespace and comments.
    pub fn is_trivia(&self) -> bool {
        matches!(self.kind, TokenKind::Whitespace | TokenKind::Comment)
    }
}

/// Lexer wrapping the logos-generated tokenizer, tracking line/column
pub struct Lexer<'a> {
    inner: LogosLexer<'a, TokenKind>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: TokenKind::lexer(input),
            line: 1,
            column: 1,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.inner.next()?;
        let text = self.inner.slice();

        let start = Position::new(self.line, self.column);
        for b in text.bytes() {
            if b == b'\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        let end = Position::new(self.line, self.column);

        let kind = result.unwrap_or(TokenKind::Error);
        Some(Token {
            kind,
            text,
            span: Span::new(start, end),
        })
    }
}

/// Tokenize an entire string into a Vec, trivia included
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

fn block_string(lex: &mut LogosLexer<'_, TokenKind>, quote: u8) -> bool {
    // Called after the opening triple quote; consume through the closing one.
    let rest = lex.remainder().as_bytes();
    let mut i = 0;
    while i < rest.len() {
        if rest[i] == b'\\' {
            i += 2;
            continue;
        }
        if rest[i] == quote && rest.get(i + 1) == Some(&quote) && rest.get(i + 2) == Some(&quote) {
            lex.bump(i + 3);
            return true;
        }
        i += 1;
    }
    false
}

/// Logos token enum for YASDL
///
/// Keywords are matched case-insensitively because YASDL names are
/// case-insensitive. Contextual words (`fields`, `any`, property names)
/// are plain identifiers.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[regex(r"#[^\n]*")]
    Comment,

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    #[token("schema", ignore(ascii_case))]
    SchemaKw,

    #[token("fieldset", ignore(ascii_case))]
    FieldsetKw,

    #[token("field", ignore(ascii_case))]
    FieldKw,

    #[token("index", ignore(ascii_case))]
    IndexKw,

    #[token("constraint", ignore(ascii_case))]
    ConstraintKw,

    #[token("use", ignore(ascii_case))]
    UseKw,

    #[token("require", ignore(ascii_case))]
    RequireKw,

    #[token("as", ignore(ascii_case))]
    AsKw,

    #[token("delete", ignore(ascii_case))]
    DeleteKw,

    #[token("rename", ignore(ascii_case))]
    RenameKw,

    #[token("fallback", ignore(ascii_case))]
    FallbackKw,

    #[token("abstract", ignore(ascii_case))]
    AbstractKw,

    #[token("final", ignore(ascii_case))]
    FinalKw,

    #[token("required", ignore(ascii_case))]
    RequiredKw,

    #[token("true", ignore(ascii_case))]
    TrueKw,

    #[token("false", ignore(ascii_case))]
    FalseKw,

    #[token("none", ignore(ascii_case))]
    NoneKw,

    #[token("all", ignore(ascii_case))]
    AllKw,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?")]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+")]
    Float,

    #[regex(r"[0-9]+")]
    Integer,

    // Triple-quoted forms win over the single-line forms by length.
    #[token("\"\"\"", |lex| block_string(lex, b'"'))]
    #[token("'''", |lex| block_string(lex, b'\''))]
    BlockString,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r"'([^'\\\n]|\\.)*'")]
    String,

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token(";")]
    Semicolon,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token("=")]
    Eq,

    #[token("->")]
    Arrow,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("|")]
    Pipe,

    // Lowest-priority catch-all so an unexpected character becomes a
    // one-character error token instead of aborting the stream.
    #[regex(r".", priority = 0)]
    Error,
}

impl TokenKind {
    /// True when the token can serve as a simple name. Keywords are
    /// accepted here so that reserved-word misuse is diagnosed by the
    /// local checker with a precise message instead of a parse error.
    pub fn is_name_like(self) -> bool {
        matches!(
            self,
            TokenKind::Ident
                | TokenKind::SchemaKw
                | TokenKind::FieldsetKw
                | TokenKind::FieldKw
                | TokenKind::IndexKw
                | TokenKind::ConstraintKw
                | TokenKind::UseKw
                | TokenKind::RequireKw
                | TokenKind::AsKw
                | TokenKind::DeleteKw
                | TokenKind::RenameKw
                | TokenKind::FallbackKw
                | TokenKind::AbstractKw
                | TokenKind::FinalKw
                | TokenKind::RequiredKw
                | TokenKind::NoneKw
                | TokenKind::AllKw
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .into_iter()
            .filter(|t| !t.is_trivia())
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_keywords_case_insensitive() {
        assert_eq!(
            kinds("FIELDSET Schema abstract"),
            vec![TokenKind::FieldsetKw, TokenKind::SchemaKw, TokenKind::AbstractKw]
        );
    }

    #[test]
    fn test_punctuation_and_names() {
        assert_eq!(
            kinds("field issuer -> person;"),
            vec![
                TokenKind::FieldKw,
                TokenKind::Ident,
                TokenKind::Arrow,
                TokenKind::Ident,
                TokenKind::Semicolon
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("100 3.25 1.5e10"),
            vec![TokenKind::Integer, TokenKind::Float, TokenKind::Float]
        );
    }

    #[test]
    fn test_strings() {
        assert_eq!(kinds(r#""char" 'text'"#), vec![TokenKind::String, TokenKind::String]);
        assert_eq!(kinds("\"\"\"multi\nline\"\"\""), vec![TokenKind::BlockString]);
    }

    #[test]
    fn test_comment_to_end_of_line() {
        assert_eq!(
            kinds("# heading\nfield x;"),
            vec![TokenKind::FieldKw, TokenKind::Ident, TokenKind::Semicolon]
        );
    }

    #[test]
    fn test_spans_track_lines() {
        let tokens = tokenize("a\n  b");
        let named: Vec<_> = tokens.iter().filter(|t| !t.is_trivia()).collect();
        assert_eq!(named[0].span.start, crate::base::Position::new(1, 1));
        assert_eq!(named[1].span.start, crate::base::Position::new(2, 3));
    }

    #[test]
    fn test_unterminated_string_is_error() {
        let tokens = tokenize("\"oops");
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Error));
    }
}
