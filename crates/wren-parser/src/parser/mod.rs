//! Recursive-descent parser: token stream → [`crate::ast::Module`].
//!
//! The parser buffers the entire token stream up front (the scanner has
//! no side effects, so there is nothing to gain from pulling tokens one
//! at a time) and walks it with a plain cursor. The only lookahead
//! beyond the current token is the one-past-newline dot check in
//! [`expr`](mod@self::expr), and since the whole stream is already in
//! memory that check is just peeking further into the same `Vec`
//! rather than a separate pushback queue.
//!
//! On a missed expectation the parser records a `parse-error`
//! diagnostic and still consumes the offending token, so it always
//! makes progress; it never attempts structural recovery beyond that.

mod expr;

use wren_common::{Diagnostic, DiagnosticCode, Span, Token, TokenKind};

use crate::ast::{
    Body, ClassStmt, ForStmt, IfStmt, ImportName, ImportStmt, Method, Module, Parameter, Stmt,
    TypeAnnotation, VarStmt, WhileStmt,
};
use crate::ast::{BlockStmt, BreakStmt, ContinueStmt, ReturnStmt};

/// Token kinds usable as an operator-method signature (the precedence
/// table's binary operators, minus the keyword-like `is`... no, `is`
/// counts too: Wren allows `is(other) { ... }` as an override).
fn is_infix_operator(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::PipePipe
            | TokenKind::AmpAmp
            | TokenKind::EqEq
            | TokenKind::BangEq
            | TokenKind::Is
            | TokenKind::Lt
            | TokenKind::LtEq
            | TokenKind::Gt
            | TokenKind::GtEq
            | TokenKind::Pipe
            | TokenKind::Caret
            | TokenKind::Amp
            | TokenKind::LtLt
            | TokenKind::GtGt
            | TokenKind::DotDot
            | TokenKind::DotDotDot
            | TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Star
            | TokenKind::Slash
            | TokenKind::Percent
    )
}

pub struct Parser<'src> {
    tokens: Vec<Token>,
    source: &'src str,
    pos: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        let tokens = wren_lexer::tokenize(source);
        Self {
            tokens,
            source,
            pos: 0,
            diagnostics: Vec::new(),
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    // ── token cursor ────────────────────────────────────────────────

    fn current(&self) -> Token {
        self.tokens[self.pos]
    }

    fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    fn current_span(&self) -> Span {
        self.current().span
    }

    fn current_text(&self) -> &'src str {
        self.current().text(self.source)
    }

    fn peek_kind(&self, n: usize) -> TokenKind {
        let idx = (self.pos + n).min(self.tokens.len() - 1);
        self.tokens[idx].kind
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    fn check_name_text(&self, text: &str) -> bool {
        self.check(TokenKind::Name) && self.current_text() == text
    }

    fn at_eof(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    /// Consumes and returns the current token. Idempotent at `Eof`: the
    /// cursor never advances past the sentinel, so repeated calls at
    /// end of input keep returning it.
    fn bump(&mut self) -> Token {
        let tok = self.current();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn error_at_current(&mut self, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::error(
            DiagnosticCode::ParseError,
            self.current_span(),
            message,
        ));
    }

    /// Consumes the current token if it matches `kind`; otherwise
    /// records a `parse-error` and consumes whatever token is there
    /// anyway (except at `Eof`, which is left in place for the caller's
    /// own termination checks).
    fn expect(&mut self, kind: TokenKind, message: &str) -> Token {
        if self.check(kind) {
            return self.bump();
        }
        self.error_at_current(message);
        if self.at_eof() {
            self.current()
        } else {
            self.bump()
        }
    }

    /// Skips any number of `Line` tokens without requiring one.
    fn ignore_line(&mut self) {
        while self.check(TokenKind::Line) {
            self.bump();
        }
    }

    /// Requires at least one `Line` token, then skips any further ones.
    /// Returns whether the required newline was actually present.
    fn consume_line(&mut self) -> bool {
        if !self.check(TokenKind::Line) {
            return false;
        }
        self.ignore_line();
        true
    }

    fn require_separator(&mut self) {
        if !self.consume_line() {
            self.error_at_current("expected a newline between statements");
        }
    }

    // ── module / definitions ───────────────────────────────────────

    pub fn parse_module(&mut self) -> Module {
        log::debug!("parser: starting module parse");
        let start = self.current_span();
        self.ignore_line();
        let mut statements = Vec::new();
        while !self.at_eof() {
            statements.push(self.definition());
            if self.at_eof() {
                break;
            }
            self.require_separator();
        }
        let span = start.merge(self.current_span());
        log::debug!(
            "parser: finished module parse, {} statement(s), {} diagnostic(s)",
            statements.len(),
            self.diagnostics.len()
        );
        Module { statements, span }
    }

    fn definition(&mut self) -> Stmt {
        match self.current_kind() {
            TokenKind::Class => self.class_decl(false),
            TokenKind::Foreign if self.peek_kind(1) == TokenKind::Class => {
                self.bump();
                self.class_decl(true)
            }
            TokenKind::Import => self.import_decl(),
            TokenKind::Var => self.var_decl(),
            _ => self.statement(),
        }
    }

    fn class_decl(&mut self, is_foreign: bool) -> Stmt {
        let start = self.bump().span; // 'class'
        let name = self.expect(TokenKind::Name, "expected a class name");
        let mut superclass = None;
        if self.check(TokenKind::Is) {
            self.bump();
            superclass = Some(self.expect(TokenKind::Name, "expected a superclass name"));
        }
        self.expect(TokenKind::LeftBrace, "expected '{' to start a class body");
        self.ignore_line();
        let mut methods = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.at_eof() {
            methods.push(self.method_decl());
            if self.check(TokenKind::RightBrace) {
                break;
            }
            self.require_separator();
        }
        let end = self
            .expect(TokenKind::RightBrace, "expected '}' to close a class body")
            .span;
        Stmt::Class(ClassStmt {
            name,
            superclass,
            is_foreign,
            methods,
            span: start.merge(end),
        })
    }

    fn method_decl(&mut self) -> Method {
        let start = self.current_span();
        let mut is_foreign = false;
        let mut is_static = false;
        let mut is_construct = false;
        if self.check(TokenKind::Foreign) {
            is_foreign = true;
            self.bump();
        }
        if self.check(TokenKind::Static) {
            is_static = true;
            self.bump();
        }
        if self.check(TokenKind::Construct) {
            is_construct = true;
            self.bump();
        }

        let name;
        let mut parameters = None;
        let mut allow_trailing_params = true;

        if self.check(TokenKind::LeftBracket) {
            name = self.bump(); // '[' stands in for the subscript signature
            parameters = Some(self.parameter_list_until(TokenKind::RightBracket));
            self.expect(
                TokenKind::RightBracket,
                "expected ']' to close a subscript signature",
            );
            allow_trailing_params = false;
        } else if is_infix_operator(self.current_kind()) {
            name = self.bump();
        } else if matches!(self.current_kind(), TokenKind::Bang | TokenKind::Tilde) {
            name = self.bump();
            allow_trailing_params = false;
        } else {
            name = self.expect(TokenKind::Name, "expected a method name");
        }

        if allow_trailing_params && self.check(TokenKind::LeftParen) {
            self.bump();
            parameters = Some(self.parameter_list_until(TokenKind::RightParen));
            self.expect(TokenKind::RightParen, "expected ')' to close a parameter list");
        }

        let mut is_setter = false;
        if self.check(TokenKind::Eq) {
            self.bump();
            self.expect(
                TokenKind::LeftParen,
                "expected '(' to open a setter parameter",
            );
            let params = self.parameter_list_until(TokenKind::RightParen);
            self.expect(TokenKind::RightParen, "expected ')' to close a setter parameter");
            parameters = Some(params);
            is_setter = true;
        }

        let mut return_type = None;
        if self.check(TokenKind::Arrow) {
            self.bump();
            self.ignore_line();
            return_type = Some(self.type_annotation());
        }

        let body = if is_foreign {
            None
        } else {
            Some(self.parse_body(false))
        };

        let end = body
            .as_ref()
            .map(|b| b.span)
            .or_else(|| return_type.as_ref().map(|t| t.name.span))
            .unwrap_or(name.span);
        Method {
            is_foreign,
            is_static,
            is_construct,
            is_setter,
            name,
            parameters,
            return_type,
            body,
            span: start.merge(end),
        }
    }

    fn parameter_list_until(&mut self, closer: TokenKind) -> Vec<Parameter> {
        self.ignore_line();
        let mut params = Vec::new();
        if self.check(closer) {
            return params;
        }
        loop {
            let name = self.expect(TokenKind::Name, "expected a parameter name");
            let mut type_annotation = None;
            if self.check(TokenKind::Colon) {
                self.bump();
                self.ignore_line();
                type_annotation = Some(self.type_annotation());
            }
            params.push(Parameter { name, type_annotation });
            self.ignore_line();
            if self.check(TokenKind::Comma) {
                self.bump();
                self.ignore_line();
                continue;
            }
            break;
        }
        params
    }

    fn type_annotation(&mut self) -> TypeAnnotation {
        let name = self.expect(TokenKind::Name, "expected a type name");
        TypeAnnotation { name }
    }

    fn import_decl(&mut self) -> Stmt {
        let start = self.bump().span; // 'import'
        let path = self.expect(TokenKind::String, "expected a module path string");
        let mut names = None;
        let mut end = path.span;
        if self.check(TokenKind::For) {
            self.bump();
            let mut list = Vec::new();
            loop {
                let name = self.expect(TokenKind::Name, "expected an imported name");
                end = name.span;
                let mut alias = None;
                if self.check_name_text("as") {
                    self.bump();
                    let alias_name =
                        self.expect(TokenKind::Name, "expected an alias name after 'as'");
                    end = alias_name.span;
                    alias = Some(alias_name);
                }
                list.push(ImportName { name, alias });
                if self.check(TokenKind::Comma) {
                    self.bump();
                    continue;
                }
                break;
            }
            names = Some(list);
        }
        Stmt::Import(ImportStmt {
            path,
            names,
            span: start.merge(end),
        })
    }

    fn var_decl(&mut self) -> Stmt {
        let start = self.bump().span; // 'var'
        let name = self.expect(TokenKind::Name, "expected a variable name");
        let mut type_annotation = None;
        let mut end = name.span;
        if self.check(TokenKind::Colon) {
            self.bump();
            self.ignore_line();
            let annotation = self.type_annotation();
            end = annotation.name.span;
            type_annotation = Some(annotation);
        }
        let mut initializer = None;
        if self.check(TokenKind::Eq) {
            self.bump();
            self.ignore_line();
            let init = self.expression();
            end = init.span();
            initializer = Some(Box::new(init));
        }
        Stmt::Var(VarStmt {
            name,
            type_annotation,
            initializer,
            span: start.merge(end),
        })
    }

    // ── statements ──────────────────────────────────────────────────

    fn statement(&mut self) -> Stmt {
        match self.current_kind() {
            TokenKind::Break => {
                let tok = self.bump();
                Stmt::Break(BreakStmt { span: tok.span })
            }
            TokenKind::Name if self.current_text() == "continue" => {
                let tok = self.bump();
                Stmt::Continue(ContinueStmt { span: tok.span })
            }
            TokenKind::If => self.if_stmt(),
            TokenKind::For => self.for_stmt(),
            TokenKind::While => self.while_stmt(),
            TokenKind::Return => self.return_stmt(),
            TokenKind::LeftBrace => self.block_stmt(),
            _ => {
                let expr = self.expression();
                Stmt::Expr(Box::new(expr))
            }
        }
    }

    fn if_stmt(&mut self) -> Stmt {
        let start = self.bump().span; // 'if'
        self.expect(TokenKind::LeftParen, "expected '(' after 'if'");
        self.ignore_line();
        let condition = self.expression();
        self.expect(TokenKind::RightParen, "expected ')' after if condition");
        let then_branch = self.statement();
        let mut end = then_branch.span();
        let mut else_branch = None;
        if self.check(TokenKind::Else) {
            self.bump();
            let branch = self.statement();
            end = branch.span();
            else_branch = Some(Box::new(branch));
        }
        Stmt::If(IfStmt {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch,
            span: start.merge(end),
        })
    }

    fn for_stmt(&mut self) -> Stmt {
        let start = self.bump().span; // 'for'
        self.expect(TokenKind::LeftParen, "expected '(' after 'for'");
        let variable = self.expect(TokenKind::Name, "expected a loop variable name");
        let mut type_annotation = None;
        if self.check(TokenKind::Colon) {
            self.bump();
            self.ignore_line();
            type_annotation = Some(self.type_annotation());
        }
        self.expect(TokenKind::In, "expected 'in' in a for loop header");
        self.ignore_line();
        let iterable = self.expression();
        self.expect(TokenKind::RightParen, "expected ')' after a for loop header");
        let body = self.statement();
        let span = start.merge(body.span());
        Stmt::For(ForStmt {
            variable,
            type_annotation,
            iterable: Box::new(iterable),
            body: Box::new(body),
            span,
        })
    }

    fn while_stmt(&mut self) -> Stmt {
        let start = self.bump().span; // 'while'
        self.expect(TokenKind::LeftParen, "expected '(' after 'while'");
        self.ignore_line();
        let condition = self.expression();
        self.expect(TokenKind::RightParen, "expected ')' after while condition");
        let body = self.statement();
        let span = start.merge(body.span());
        Stmt::While(WhileStmt {
            condition: Box::new(condition),
            body: Box::new(body),
            span,
        })
    }

    fn return_stmt(&mut self) -> Stmt {
        let start = self.bump().span; // 'return'
        let value = if matches!(self.current_kind(), TokenKind::Line | TokenKind::Eof) {
            None
        } else {
            Some(Box::new(self.expression()))
        };
        let end = value.as_ref().map(|v| v.span()).unwrap_or(start);
        Stmt::Return(ReturnStmt {
            value,
            span: start.merge(end),
        })
    }

    fn block_stmt(&mut self) -> Stmt {
        let start = self.bump().span; // '{'
        self.ignore_line();
        let mut statements = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.at_eof() {
            statements.push(self.definition());
            if self.check(TokenKind::RightBrace) {
                break;
            }
            self.require_separator();
        }
        let end = self
            .expect(TokenKind::RightBrace, "expected '}' to close a block")
            .span;
        Stmt::Block(BlockStmt {
            statements,
            span: start.merge(end),
        })
    }

    // ── bodies (method bodies and block arguments) ─────────────────

    /// Parses `{ ... }` after a method signature or as a block
    /// argument. `allow_params` gates the leading `|a, b|` parameter
    /// list that only block arguments accept.
    fn parse_body(&mut self, allow_params: bool) -> Body {
        let start = self
            .expect(TokenKind::LeftBrace, "expected '{' to start a body")
            .span;

        let mut parameters = None;
        if allow_params && self.check(TokenKind::Pipe) {
            self.bump();
            parameters = Some(self.parameter_list_until(TokenKind::Pipe));
            self.expect(TokenKind::Pipe, "expected '|' to close block parameters");
        }

        if self.check(TokenKind::RightBrace) {
            let end = self.bump().span;
            return Body {
                parameters,
                expression: None,
                statements: None,
                span: start.merge(end),
            };
        }

        if !self.check(TokenKind::Line) {
            let expr = self.expression();
            self.ignore_line();
            let end = self.expect(TokenKind::RightBrace, "expected '}' to close a body").span;
            return Body {
                parameters,
                expression: Some(Box::new(expr)),
                statements: None,
                span: start.merge(end),
            };
        }

        self.ignore_line();
        let mut statements = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.at_eof() {
            statements.push(self.definition());
            if self.check(TokenKind::RightBrace) {
                break;
            }
            self.require_separator();
        }
        let end = self.expect(TokenKind::RightBrace, "expected '}' to close a body").span;
        Body {
            parameters,
            expression: None,
            statements: Some(statements),
            span: start.merge(end),
        }
    }
}

/// Parses `source` into a [`Module`] plus whatever diagnostics the
/// parser accumulated along the way.
pub fn parse(source: &str) -> (Module, Vec<Diagnostic>) {
    let mut parser = Parser::new(source);
    let module = parser.parse_module();
    (module, parser.into_diagnostics())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Expr;

    fn parse_ok(source: &str) -> Module {
        let (module, diags) = parse(source);
        assert!(
            diags.is_empty(),
            "expected no diagnostics for {source:?}, got {diags:?}"
        );
        module
    }

    #[test]
    fn var_without_annotation_or_initializer() {
        let module = parse_ok("var x");
        let Stmt::Var(v) = &module.statements[0] else { panic!() };
        assert!(v.type_annotation.is_none());
        assert!(v.initializer.is_none());
    }

    #[test]
    fn var_with_annotation_no_initializer() {
        let module = parse_ok("var x: Num");
        let Stmt::Var(v) = &module.statements[0] else { panic!() };
        assert!(v.type_annotation.is_some());
        assert!(v.initializer.is_none());
    }

    #[test]
    fn var_with_initializer_no_annotation() {
        let module = parse_ok("var x = 42");
        let Stmt::Var(v) = &module.statements[0] else { panic!() };
        assert!(v.type_annotation.is_none());
        assert!(v.initializer.is_some());
    }

    #[test]
    fn var_with_annotation_and_initializer() {
        let module = parse_ok("var x: Num = 42");
        let Stmt::Var(v) = &module.statements[0] else { panic!() };
        assert!(v.type_annotation.is_some());
        assert!(v.initializer.is_some());
    }

    fn dot_chain_shape(module: &Module) -> (bool, &str) {
        let Stmt::Expr(e) = &module.statements[0] else { panic!() };
        match e.as_ref() {
            Expr::Call(c) => (c.receiver.is_some(), "call"),
            other => panic!("expected a call, got {other:?}"),
        }
    }

    #[test]
    fn dot_chains_tolerate_newlines_identically() {
        let a = parse_ok("a.b");
        let b = parse_ok("a\n.b");
        let c = parse_ok("a\n\n  .b");
        assert_eq!(dot_chain_shape(&a), dot_chain_shape(&b));
        assert_eq!(dot_chain_shape(&b), dot_chain_shape(&c));
    }

    #[test]
    fn bare_identifier_is_a_receiverless_call() {
        let module = parse_ok("foo");
        let Stmt::Expr(e) = &module.statements[0] else { panic!() };
        assert!(e.is_bare_name());
    }

    #[test]
    fn call_with_args_is_not_bare() {
        let module = parse_ok("foo(1, 2)");
        let Stmt::Expr(e) = &module.statements[0] else { panic!() };
        assert!(!e.is_bare_name());
        let Expr::Call(c) = e.as_ref() else { panic!() };
        assert_eq!(c.arguments.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn class_with_superclass_and_methods() {
        let module = parse_ok("class Foo is Bar {\n  construct new() {}\n  static go() { 1 }\n}");
        let Stmt::Class(c) = &module.statements[0] else { panic!() };
        assert!(c.superclass.is_some());
        assert_eq!(c.methods.len(), 2);
        assert!(c.methods[0].is_construct);
        assert!(c.methods[1].is_static);
    }

    #[test]
    fn setter_method_is_flagged() {
        let module = parse_ok("class Foo {\n  value=(v) { }\n}");
        let Stmt::Class(c) = &module.statements[0] else { panic!() };
        assert!(c.methods[0].is_setter);
    }

    #[test]
    fn foreign_method_has_no_body() {
        let module = parse_ok("foreign class Foo {\n  foreign bar()\n}");
        let Stmt::Class(c) = &module.statements[0] else { panic!() };
        assert!(c.is_foreign);
        assert!(c.methods[0].is_foreign);
        assert!(c.methods[0].body.is_none());
    }

    #[test]
    fn bare_import_has_no_names() {
        let module = parse_ok("import \"foo\"");
        let Stmt::Import(i) = &module.statements[0] else { panic!() };
        assert!(i.names.is_none());
    }

    #[test]
    fn import_with_names_and_alias() {
        let module = parse_ok("import \"foo\" for Bar, Baz as Qux");
        let Stmt::Import(i) = &module.statements[0] else { panic!() };
        let names = i.names.as_ref().unwrap();
        assert_eq!(names.len(), 2);
        assert!(names[0].alias.is_none());
        assert!(names[1].alias.is_some());
    }

    #[test]
    fn continue_is_recognized_contextually() {
        let module = parse_ok("while (true) {\n  continue\n}");
        let Stmt::While(w) = &module.statements[0] else { panic!() };
        let Stmt::Block(b) = w.body.as_ref() else { panic!() };
        assert!(matches!(b.statements[0], Stmt::Continue(_)));
    }

    #[test]
    fn ternary_is_right_associative_in_shape() {
        let module = parse_ok("a ? b : c ? d : e");
        let Stmt::Expr(e) = &module.statements[0] else { panic!() };
        let Expr::Conditional(outer) = e.as_ref() else { panic!() };
        assert!(matches!(outer.else_branch.as_ref(), Expr::Conditional(_)));
    }

    #[test]
    fn string_interpolation_round_trip() {
        let module = parse_ok("\"hello %(name)\"");
        let Stmt::Expr(e) = &module.statements[0] else { panic!() };
        let Expr::Interpolation(i) = e.as_ref() else { panic!() };
        assert_eq!(i.parts.len(), 3);
    }

    #[test]
    fn every_expr_span_is_within_source_bounds() {
        let source = "var x = (1 + 2) * foo.bar(3)[0]";
        let module = parse_ok(source);
        for stmt in &module.statements {
            let span = stmt.span();
            assert!((span.end() as usize) <= source.len());
        }
    }

    #[test]
    fn parse_error_on_missing_closing_paren_still_produces_a_module() {
        let (module, diags) = parse("var x = (1 + 2");
        assert!(!diags.is_empty());
        assert_eq!(module.statements.len(), 1);
    }

    #[test]
    fn subscript_operator_method_signature() {
        let module = parse_ok("class Foo {\n  [i] { i }\n  [i]=(v) { }\n}");
        let Stmt::Class(c) = &module.statements[0] else { panic!() };
        assert_eq!(c.methods.len(), 2);
        assert!(c.methods[1].is_setter);
    }

    #[test]
    fn binary_operator_method_signature() {
        let module = parse_ok("class Foo {\n  +(other) { this }\n}");
        let Stmt::Class(c) = &module.statements[0] else { panic!() };
        assert_eq!(c.methods[0].parameters.as_ref().unwrap().len(), 1);
    }
}
