//! Recursive descent parser for YASDL
//!
//! Consumes the token stream and builds a [`SchemaDoc`]. Statement-level
//! error recovery skips to the next `;` or `}` so that one pass reports
//! every syntax error in the file; any error still makes the parse fatal
//! for the loader.

use smol_str::SmolStr;

use crate::base::{FileId, Name, Span};
use crate::syntax::{
    Arg, ArgValue, AstDefKind, ClassSet, DefStmt, DeleteStmt, DottedName, ImportKind,
    ImportStmt, ImportTarget, Modifier, NameClass, PropertyStmt, SchemaDoc, SortDir, Stmt,
};

use super::lexer::{Lexer, Token, TokenKind};

/// Parse result containing the document and any errors
#[derive(Debug, Clone)]
pub struct Parse {
    pub doc: Option<SchemaDoc>,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    /// Check if parsing succeeded without errors
    pub fn ok(&self) -> bool {
        self.errors.is_empty() && self.doc.is_some()
    }
}

/// A syntax error with location and message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub span: Span,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// Parse YASDL source into a schema document
pub fn parse_schema(input: &str, file: FileId) -> Parse {
    let tokens: Vec<_> = Lexer::new(input).filter(|t| !t.is_trivia()).collect();
    let mut parser = Parser::new(&tokens, file);
    let doc = parser.parse_file();
    Parse {
        doc,
        errors: parser.errors,
    }
}

/// Convert a TokenKind to a human-readable name for error messages
fn kind_to_name(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Whitespace => "whitespace",
        TokenKind::Comment => "comment",
        TokenKind::Ident => "identifier",
        TokenKind::Integer => "integer",
        TokenKind::Float => "number",
        TokenKind::String | TokenKind::BlockString => "string",
        TokenKind::Error => "invalid token",
        TokenKind::SchemaKw => "'schema'",
        TokenKind::FieldsetKw => "'fieldset'",
        TokenKind::FieldKw => "'field'",
        TokenKind::IndexKw => "'index'",
        TokenKind::ConstraintKw => "'constraint'",
        TokenKind::UseKw => "'use'",
        TokenKind::RequireKw => "'require'",
        TokenKind::AsKw => "'as'",
        TokenKind::DeleteKw => "'delete'",
        TokenKind::RenameKw => "'rename'",
        TokenKind::FallbackKw => "'fallback'",
        TokenKind::AbstractKw => "'abstract'",
        TokenKind::FinalKw => "'final'",
        TokenKind::RequiredKw => "'required'",
        TokenKind::TrueKw => "'true'",
        TokenKind::FalseKw => "'false'",
        TokenKind::NoneKw => "'none'",
        TokenKind::AllKw => "'all'",
        TokenKind::LBrace => "'{'",
        TokenKind::RBrace => "'}'",
        TokenKind::LBracket => "'['",
        TokenKind::RBracket => "']'",
        TokenKind::Semicolon => "';'",
        TokenKind::Colon => "':'",
        TokenKind::Comma => "','",
        TokenKind::Dot => "'.'",
        TokenKind::Eq => "'='",
        TokenKind::Arrow => "'->'",
        TokenKind::Plus => "'+'",
        TokenKind::Minus => "'-'",
        TokenKind::Pipe => "'|'",
    }
}

struct Parser<'a, 'src> {
    tokens: &'a [Token<'src>],
    pos: usize,
    file: FileId,
    errors: Vec<SyntaxError>,
    eof_span: Span,
}

impl<'a, 'src> Parser<'a, 'src> {
    fn new(tokens: &'a [Token<'src>], file: FileId) -> Self {
        let eof_span = tokens
            .last()
            .map(|t| Span::new(t.span.end, t.span.end))
            .unwrap_or_else(Span::empty);
        Self {
            tokens,
            pos: 0,
            file,
            errors: Vec::new(),
            eof_span,
        }
    }

    // =========================================================================
    // Token access
    // =========================================================================

    // Returned references carry the token buffer's lifetime, not the
    // parser borrow, so `self.pos` can advance while one is held.
    fn peek(&self) -> Option<&'a Token<'src>> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn nth_kind(&self, n: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + n).map(|t| t.kind)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    fn bump(&mut self) -> Option<&'a Token<'src>> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn current_span(&self) -> Span {
        self.peek().map(|t| t.span).unwrap_or(self.eof_span)
    }

    fn error(&mut self, message: impl Into<String>) {
        let span = self.current_span();
        self.errors.push(SyntaxError::new(message, span));
    }

    fn expect(&mut self, kind: TokenKind) -> bool {
        if self.eat(kind) {
            return true;
        }
        let found = self
            .peek_kind()
            .map(kind_to_name)
            .unwrap_or("end of file");
        self.error(format!("expected {}, found {}", kind_to_name(kind), found));
        false
    }

    /// Skip to the next statement boundary after an error: past the next
    /// `;` at this nesting level, past a complete skipped `{}` block, or up
    /// to (not past) the `}` that closes the enclosing block.
    fn recover(&mut self) {
        let mut depth = 0usize;
        while let Some(kind) = self.peek_kind() {
            match kind {
                TokenKind::Semicolon if depth == 0 => {
                    self.pos += 1;
                    return;
                }
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                    if depth == 0 {
                        self.pos += 1;
                        return;
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }
    }

    // =========================================================================
    // File structure
    // =========================================================================

    fn parse_file(&mut self) -> Option<SchemaDoc> {
        let start = self.current_span();
        if !self.expect(TokenKind::SchemaKw) {
            return None;
        }

        let (package, package_original, package_span) = self.parse_package_name()?;

        if !self.expect(TokenKind::LBrace) {
            return None;
        }
        let body = self.parse_block_body(true);
        let end = self.current_span();
        self.expect(TokenKind::RBrace);

        if let Some(token) = self.peek() {
            let span = token.span;
            self.errors.push(SyntaxError::new(
                "unexpected content after the schema block",
                span,
            ));
        }

        Some(SchemaDoc {
            file: self.file,
            package,
            package_original,
            package_span,
            body,
            span: start.cover(end),
        })
    }

    fn parse_package_name(&mut self) -> Option<(Vec<Name>, SmolStr, Span)> {
        let mut segments = Vec::new();
        let mut original = String::new();
        let first = match self.peek() {
            Some(t) if t.kind.is_name_like() => t,
            _ => {
                self.error("expected package name after 'schema'");
                return None;
            }
        };
        let mut span = first.span;
        segments.push(Name::new(first.text));
        original.push_str(first.text);
        self.pos += 1;

        while self.eat(TokenKind::Dot) {
            match self.peek() {
                Some(t) if t.kind.is_name_like() => {
                    segments.push(Name::new(t.text));
                    original.push('.');
                    original.push_str(t.text);
                    span = span.cover(t.span);
                    self.pos += 1;
                }
                _ => {
                    self.error("expected name segment after '.'");
                    return None;
                }
            }
        }
        Some((segments, SmolStr::new(original), span))
    }

    fn parse_block_body(&mut self, top_level: bool) -> Vec<Stmt> {
        let mut stmts = Vec::new();
        loop {
            match self.peek_kind() {
                None | Some(TokenKind::RBrace) => break,
                _ => {}
            }
            let before = self.pos;
            match self.parse_stmt(top_level) {
                Some(stmt) => stmts.push(stmt),
                None => {
                    self.recover();
                    if self.pos == before {
                        // Not even recovery consumed anything; bail out of the block.
                        break;
                    }
                }
            }
        }
        stmts
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_stmt(&mut self, top_level: bool) -> Option<Stmt> {
        match self.peek_kind()? {
            TokenKind::UseKw | TokenKind::RequireKw => {
                if !top_level {
                    self.error("imports are only allowed at the schema level");
                    return None;
                }
                self.parse_import().map(Stmt::Import)
            }
            TokenKind::DeleteKw => self.parse_delete().map(Stmt::Delete),
            TokenKind::AbstractKw
            | TokenKind::FinalKw
            | TokenKind::RequiredKw
            | TokenKind::FieldsetKw
            | TokenKind::FieldKw
            | TokenKind::IndexKw
            | TokenKind::ConstraintKw => self.parse_def().map(Stmt::Def),
            TokenKind::Ident => self.parse_property().map(Stmt::Property),
            other => {
                self.error(format!("expected a statement, found {}", kind_to_name(other)));
                None
            }
        }
    }

    fn parse_import(&mut self) -> Option<ImportStmt> {
        let start = self.current_span();
        let kind = if self.eat(TokenKind::UseKw) {
            ImportKind::Use
        } else {
            self.expect(TokenKind::RequireKw);
            ImportKind::Require
        };

        let target = match self.peek() {
            Some(t) if t.kind == TokenKind::String || t.kind == TokenKind::BlockString => {
                let uri = unescape_string(t.text);
                self.pos += 1;
                ImportTarget::Uri(uri)
            }
            Some(t) if t.kind.is_name_like() => {
                let (segments, _, _) = self.parse_package_name()?;
                ImportTarget::Dotted(segments)
            }
            _ => {
                self.error(format!("expected a package name or URI after '{}'", kind.as_str()));
                return None;
            }
        };

        let alias = if self.eat(TokenKind::AsKw) {
            match self.peek() {
                Some(t) if t.kind.is_name_like() => {
                    let name = Name::new(t.text);
                    self.pos += 1;
                    Some(name)
                }
                _ => {
                    self.error("expected alias name after 'as'");
                    return None;
                }
            }
        } else {
            None
        };

        let end = self.current_span();
        if !self.expect(TokenKind::Semicolon) {
            return None;
        }
        Some(ImportStmt {
            kind,
            target,
            alias,
            span: start.cover(end),
        })
    }

    fn parse_delete(&mut self) -> Option<DeleteStmt> {
        let start = self.current_span();
        self.expect(TokenKind::DeleteKw);
        let token = match self.peek() {
            Some(t) if t.kind.is_name_like() => t,
            _ => {
                self.error("expected member name after 'delete'");
                return None;
            }
        };
        let target = Name::new(token.text);
        let target_original = SmolStr::new(token.text);
        let end = token.span;
        self.pos += 1;
        if !self.expect(TokenKind::Semicolon) {
            return None;
        }
        Some(DeleteStmt {
            target,
            target_original,
            span: start.cover(end),
        })
    }

    fn parse_def(&mut self) -> Option<DefStmt> {
        let start = self.current_span();
        let mut modifiers = Vec::new();
        loop {
            let modifier = match self.peek_kind() {
                Some(TokenKind::AbstractKw) => Modifier::Abstract,
                Some(TokenKind::FinalKw) => Modifier::Final,
                Some(TokenKind::RequiredKw) => Modifier::Required,
                _ => break,
            };
            modifiers.push((modifier, self.current_span()));
            self.pos += 1;
        }

        let kind = match self.peek_kind() {
            Some(TokenKind::FieldsetKw) => AstDefKind::Fieldset,
            Some(TokenKind::FieldKw) => AstDefKind::Field,
            Some(TokenKind::IndexKw) => AstDefKind::Index,
            Some(TokenKind::ConstraintKw) => AstDefKind::Constraint,
            _ => {
                self.error("expected 'fieldset', 'field', 'index', or 'constraint'");
                return None;
            }
        };
        self.pos += 1;

        let token = match self.peek() {
            Some(t) if t.kind.is_name_like() => t,
            _ => {
                self.error(format!("expected a name after '{}'", kind.as_str()));
                return None;
            }
        };
        let name = Name::new(token.text);
        let original_name = SmolStr::new(token.text);
        let name_span = token.span;
        self.pos += 1;

        let mut ancestors = Vec::new();
        if self.eat(TokenKind::Colon) {
            loop {
                ancestors.push(self.parse_dotted_name()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }

        let reference = if self.eat(TokenKind::Arrow) {
            Some(self.parse_dotted_name()?)
        } else {
            None
        };

        let mut body = Vec::new();
        let end;
        if self.eat(TokenKind::LBrace) {
            body = self.parse_block_body(false);
            end = self.current_span();
            self.expect(TokenKind::RBrace);
        } else {
            end = self.current_span();
            if !self.expect(TokenKind::Semicolon) {
                return None;
            }
        }

        Some(DefStmt {
            kind,
            modifiers,
            name,
            original_name,
            name_span,
            ancestors,
            reference,
            body,
            span: start.cover(end),
        })
    }

    fn parse_property(&mut self) -> Option<PropertyStmt> {
        let token = self.bump().expect("caller checked for an identifier");
        let name = Name::new(token.text);
        let original_name = SmolStr::new(token.text);
        let start = token.span;

        let mut args = Vec::new();
        if !self.at(TokenKind::Semicolon) {
            loop {
                args.push(self.parse_arg()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        let end = self.current_span();
        if !self.expect(TokenKind::Semicolon) {
            return None;
        }
        Some(PropertyStmt {
            name,
            original_name,
            args,
            span: start.cover(end),
        })
    }

    // =========================================================================
    // Arguments and dotted names
    // =========================================================================

    fn parse_arg(&mut self) -> Option<Arg> {
        let token = match self.peek() {
            Some(t) => t.clone(),
            None => {
                self.error("expected a property argument");
                return None;
            }
        };
        let value = match token.kind {
            TokenKind::String | TokenKind::BlockString => {
                self.pos += 1;
                ArgValue::Str(unescape_string(token.text))
            }
            TokenKind::Integer => {
                self.pos += 1;
                match token.text.parse::<i64>() {
                    Ok(value) => ArgValue::Int(value),
                    Err(_) => {
                        self.errors
                            .push(SyntaxError::new("integer literal out of range", token.span));
                        return None;
                    }
                }
            }
            TokenKind::Float => {
                self.pos += 1;
                match token.text.parse::<f64>() {
                    Ok(value) => ArgValue::Float(value),
                    Err(_) => {
                        self.errors
                            .push(SyntaxError::new("invalid float literal", token.span));
                        return None;
                    }
                }
            }
            TokenKind::TrueKw => {
                self.pos += 1;
                ArgValue::Bool(true)
            }
            TokenKind::FalseKw => {
                self.pos += 1;
                ArgValue::Bool(false)
            }
            TokenKind::NoneKw => {
                self.pos += 1;
                ArgValue::None
            }
            TokenKind::AllKw => {
                self.pos += 1;
                ArgValue::All
            }
            TokenKind::Eq | TokenKind::Ident | TokenKind::SchemaKw => {
                let name = self.parse_dotted_name()?;
                ArgValue::Name(name)
            }
            other => {
                self.error(format!(
                    "expected a property argument, found {}",
                    kind_to_name(other)
                ));
                return None;
            }
        };
        let span = match &value {
            ArgValue::Name(name) => name.span,
            _ => token.span,
        };
        Some(Arg { value, span })
    }

    fn parse_dotted_name(&mut self) -> Option<DottedName> {
        let start = self.current_span();
        let mut original = String::new();

        let imp = self.eat(TokenKind::Eq);
        if imp {
            original.push('=');
        }

        // `schema.` prefix makes the name absolute.
        let absolute = self.at(TokenKind::SchemaKw) && self.nth_kind(1) == Some(TokenKind::Dot);
        if absolute {
            original.push_str(self.peek().map(|t| t.text).unwrap_or("schema"));
            original.push('.');
            self.pos += 2;
        }

        let mut segments = Vec::new();
        let mut span = start;
        loop {
            match self.peek() {
                Some(t) if t.kind.is_name_like() => {
                    segments.push(Name::new(t.text));
                    original.push_str(t.text);
                    span = span.cover(t.span);
                    self.pos += 1;
                }
                _ => {
                    self.error("expected a name segment");
                    return None;
                }
            }
            if self.at(TokenKind::Dot) {
                original.push('.');
                self.pos += 1;
            } else {
                break;
            }
        }

        let min_classes = if self.at(TokenKind::LBracket) {
            span = span.cover(self.current_span());
            self.pos += 1;
            let set = self.parse_class_set(&mut original)?;
            span = span.cover(self.current_span());
            if !self.expect(TokenKind::RBracket) {
                return None;
            }
            Some(set)
        } else {
            None
        };

        let sort = if self.at(TokenKind::Plus) {
            span = span.cover(self.current_span());
            original.push('+');
            self.pos += 1;
            Some(SortDir::Ascending)
        } else if self.at(TokenKind::Minus) {
            span = span.cover(self.current_span());
            original.push('-');
            self.pos += 1;
            Some(SortDir::Descending)
        } else {
            None
        };

        Some(DottedName {
            imp,
            absolute,
            segments,
            original: SmolStr::new(original),
            min_classes,
            sort,
            span,
        })
    }

    fn parse_class_set(&mut self, original: &mut String) -> Option<ClassSet> {
        original.push('[');
        let mut set = ClassSet::EMPTY;
        loop {
            let class = match self.peek() {
                Some(t) if t.kind == TokenKind::SchemaKw => NameClass::Schema,
                Some(t) if t.kind == TokenKind::FieldsetKw => NameClass::Fieldset,
                Some(t) if t.kind == TokenKind::FieldKw => NameClass::Field,
                Some(t) if t.kind == TokenKind::IndexKw => NameClass::Index,
                Some(t) if t.kind == TokenKind::Ident && t.text.eq_ignore_ascii_case("property") => {
                    NameClass::Property
                }
                _ => {
                    self.error("expected 'schema', 'fieldset', 'field', 'index', or 'property'");
                    return None;
                }
            };
            original.push_str(class.as_str());
            set.insert(class);
            self.pos += 1;
            if self.eat(TokenKind::Pipe) {
                original.push('|');
            } else {
                break;
            }
        }
        original.push(']');
        Some(set)
    }
}

/// Strip quotes and process backslash escapes.
fn unescape_string(text: &str) -> String {
    let inner = if text.len() >= 6 && (text.starts_with("\"\"\"") || text.starts_with("'''")) {
        &text[3..text.len() - 3]
    } else if text.len() >= 2 {
        &text[1..text.len() - 1]
    } else {
        text
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(input: &str) -> SchemaDoc {
        let parse = parse_schema(input, FileId::new(0));
        assert!(parse.errors.is_empty(), "syntax errors: {:?}", parse.errors);
        parse.doc.expect("document")
    }

    #[test]
    fn test_minimal_schema() {
        let doc = parse_ok("schema app { }");
        assert_eq!(doc.package_name(), "app");
        assert!(doc.body.is_empty());
    }

    #[test]
    fn test_dotted_package_name() {
        let doc = parse_ok("schema com.example.crm { }");
        assert_eq!(doc.package_name(), "com.example.crm");
    }

    #[test]
    fn test_imports() {
        let doc = parse_ok(
            "schema app {\n  use com.example.base as base;\n  require \"https://example.com/x.yasdl\" as ext;\n}",
        );
        assert_eq!(doc.body.len(), 2);
        let Stmt::Import(first) = &doc.body[0] else {
            panic!("expected import");
        };
        assert_eq!(first.kind, ImportKind::Use);
        assert_eq!(first.alias.as_ref().map(|a| a.as_str()), Some("base"));
        let Stmt::Import(second) = &doc.body[1] else {
            panic!("expected import");
        };
        assert_eq!(
            second.target,
            ImportTarget::Uri("https://example.com/x.yasdl".into())
        );
    }

    #[test]
    fn test_definition_with_modifiers_and_body() {
        let doc = parse_ok(
            "schema app { abstract fieldset person { field name { type \"varchar\"; size 100; } } }",
        );
        let Stmt::Def(person) = &doc.body[0] else {
            panic!("expected definition");
        };
        assert_eq!(person.kind, AstDefKind::Fieldset);
        assert_eq!(person.modifiers[0].0, Modifier::Abstract);
        assert_eq!(person.body.len(), 1);
        let Stmt::Def(name) = &person.body[0] else {
            panic!("expected field");
        };
        assert_eq!(name.name.as_str(), "name");
        assert_eq!(name.body.len(), 2);
    }

    #[test]
    fn test_ancestor_list_and_imp_name() {
        let doc = parse_ok("schema app { field firstname : =name, other.thing; }");
        let Stmt::Def(def) = &doc.body[0] else {
            panic!("expected definition");
        };
        assert_eq!(def.ancestors.len(), 2);
        assert!(def.ancestors[0].imp);
        assert_eq!(def.ancestors[0].original.as_str(), "=name");
        assert_eq!(def.ancestors[1].segments.len(), 2);
    }

    #[test]
    fn test_reference_arrow() {
        let doc = parse_ok("schema app { field issuer -> person; }");
        let Stmt::Def(def) = &doc.body[0] else {
            panic!("expected definition");
        };
        let target = def.reference.as_ref().expect("reference");
        assert_eq!(target.head().as_str(), "person");
    }

    #[test]
    fn test_property_arguments() {
        let doc = parse_ok(
            "schema app { type \"char\"; size 100; weight 2.5; notnull true; nothing none; everything all; }",
        );
        let values: Vec<_> = doc
            .body
            .iter()
            .map(|s| match s {
                Stmt::Property(p) => p.args[0].value.clone(),
                _ => panic!("expected property"),
            })
            .collect();
        assert_eq!(values[0], ArgValue::Str("char".into()));
        assert_eq!(values[1], ArgValue::Int(100));
        assert_eq!(values[2], ArgValue::Float(2.5));
        assert_eq!(values[3], ArgValue::Bool(true));
        assert_eq!(values[4], ArgValue::None);
        assert_eq!(values[5], ArgValue::All);
    }

    #[test]
    fn test_min_classes_and_sort() {
        let doc = parse_ok("schema app { fields code[field]+, name-; }");
        let Stmt::Property(prop) = &doc.body[0] else {
            panic!("expected property");
        };
        let ArgValue::Name(first) = &prop.args[0].value else {
            panic!("expected name");
        };
        assert!(first.min_classes.expect("classes").contains(NameClass::Field));
        assert_eq!(first.sort, Some(SortDir::Ascending));
        let ArgValue::Name(second) = &prop.args[1].value else {
            panic!("expected name");
        };
        assert_eq!(second.sort, Some(SortDir::Descending));
    }

    #[test]
    fn test_absolute_dotted_name() {
        let doc = parse_ok("schema app { references schema.partner.code; }");
        let Stmt::Property(prop) = &doc.body[0] else {
            panic!("expected property");
        };
        let ArgValue::Name(name) = &prop.args[0].value else {
            panic!("expected name");
        };
        assert!(name.absolute);
        assert_eq!(name.segments.len(), 2);
    }

    #[test]
    fn test_delete_statement() {
        let doc = parse_ok("schema app { fieldset b : a { delete f2; } }");
        let Stmt::Def(def) = &doc.body[0] else {
            panic!("expected definition");
        };
        let Stmt::Delete(del) = &def.body[0] else {
            panic!("expected delete");
        };
        assert_eq!(del.target.as_str(), "f2");
    }

    #[test]
    fn test_reserved_word_as_name_parses() {
        // The local checker rejects this, not the parser.
        let parse = parse_schema("schema app { field all; }", FileId::new(0));
        assert!(parse.errors.is_empty());
    }

    #[test]
    fn test_error_recovery_reports_multiple() {
        let parse = parse_schema(
            "schema app { field ; fieldset { } field ok; }",
            FileId::new(0),
        );
        assert!(parse.errors.len() >= 2);
        let doc = parse.doc.expect("document survives recovery");
        assert_eq!(doc.body.len(), 1);
    }

    #[test]
    fn test_names_are_lowercased() {
        let doc = parse_ok("schema App { fieldset Invoice { } }");
        assert_eq!(doc.package_name(), "app");
        let Stmt::Def(def) = &doc.body[0] else {
            panic!("expected definition");
        };
        assert_eq!(def.name.as_str(), "invoice");
        assert_eq!(def.original_name.as_str(), "Invoice");
    }
}
