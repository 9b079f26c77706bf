//! Expression parsing: the precedence chain from assignment down to
//! primary, plus the call/subscript/dot chain that follows a primary.

use wren_common::{DiagnosticCode, Diagnostic, TokenKind};

use super::Parser;
use crate::ast::{
    AssignmentExpr, BoolExpr, CallExpr, ConditionalExpr, Expr, FieldExpr, GroupingExpr,
    InfixExpr, InterpolationExpr, InterpolationPart, ListExpr, MapExpr, NullExpr, NumExpr,
    PrefixExpr, StaticFieldExpr, StrExpr, SubscriptExpr, SuperExpr, ThisExpr,
};

impl<'src> Parser<'src> {
    pub(super) fn expression(&mut self) -> Expr {
        self.assignment()
    }

    fn assignment(&mut self) -> Expr {
        let left = self.conditional();
        if self.check(TokenKind::Eq) {
            self.bump();
            self.ignore_line();
            let value = self.assignment();
            let span = left.span().merge(value.span());
            return Expr::Assignment(AssignmentExpr {
                target: Box::new(left),
                value: Box::new(value),
                span,
            });
        }
        left
    }

    fn conditional(&mut self) -> Expr {
        let condition = self.logical_or();
        if self.check(TokenKind::Question) {
            self.bump();
            self.ignore_line();
            let then_branch = self.assignment();
            self.expect(TokenKind::Colon, "expected ':' in a conditional expression");
            self.ignore_line();
            let else_branch = self.conditional();
            let span = condition.span().merge(else_branch.span());
            return Expr::Conditional(ConditionalExpr {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
                span,
            });
        }
        condition
    }

    /// Generic left-associative binary level: parses `next`, then loops
    /// while the current token is one of `ops`, recursing into `next`
    /// again for the right operand after skipping any newlines.
    fn left_assoc(&mut self, next: fn(&mut Self) -> Expr, ops: &[TokenKind]) -> Expr {
        let mut left = next(self);
        while ops.contains(&self.current_kind()) {
            let op = self.bump();
            self.ignore_line();
            let right = next(self);
            let span = left.span().merge(right.span());
            left = Expr::Infix(InfixExpr {
                left: Box::new(left),
                op,
                right: Box::new(right),
                span,
            });
        }
        left
    }

    fn logical_or(&mut self) -> Expr {
        self.left_assoc(Self::logical_and, &[TokenKind::PipePipe])
    }

    fn logical_and(&mut self) -> Expr {
        self.left_assoc(Self::equality, &[TokenKind::AmpAmp])
    }

    fn equality(&mut self) -> Expr {
        self.left_assoc(Self::type_test, &[TokenKind::EqEq, TokenKind::BangEq])
    }

    fn type_test(&mut self) -> Expr {
        self.left_assoc(Self::comparison, &[TokenKind::Is])
    }

    fn comparison(&mut self) -> Expr {
        self.left_assoc(
            Self::bit_or,
            &[TokenKind::Lt, TokenKind::LtEq, TokenKind::Gt, TokenKind::GtEq],
        )
    }

    fn bit_or(&mut self) -> Expr {
        self.left_assoc(Self::bit_xor, &[TokenKind::Pipe])
    }

    fn bit_xor(&mut self) -> Expr {
        self.left_assoc(Self::bit_and, &[TokenKind::Caret])
    }

    fn bit_and(&mut self) -> Expr {
        self.left_assoc(Self::shift, &[TokenKind::Amp])
    }

    fn shift(&mut self) -> Expr {
        self.left_assoc(Self::range, &[TokenKind::LtLt, TokenKind::GtGt])
    }

    fn range(&mut self) -> Expr {
        self.left_assoc(Self::term, &[TokenKind::DotDot, TokenKind::DotDotDot])
    }

    fn term(&mut self) -> Expr {
        self.left_assoc(Self::factor, &[TokenKind::Plus, TokenKind::Minus])
    }

    fn factor(&mut self) -> Expr {
        self.left_assoc(
            Self::prefix,
            &[TokenKind::Star, TokenKind::Slash, TokenKind::Percent],
        )
    }

    fn prefix(&mut self) -> Expr {
        if matches!(
            self.current_kind(),
            TokenKind::Minus | TokenKind::Bang | TokenKind::Tilde
        ) {
            let op = self.bump();
            let operand = self.prefix();
            let span = op.span.merge(operand.span());
            return Expr::Prefix(PrefixExpr {
                op,
                operand: Box::new(operand),
                span,
            });
        }
        self.call_chain()
    }

    fn call_chain(&mut self) -> Expr {
        let mut expr = self.primary();
        loop {
            match self.current_kind() {
                TokenKind::LeftBracket => {
                    let start = expr.span();
                    self.bump();
                    self.ignore_line();
                    let arguments = self.arg_list_until(TokenKind::RightBracket);
                    let end = self
                        .expect(TokenKind::RightBracket, "expected ']' to close a subscript")
                        .span;
                    expr = Expr::Subscript(SubscriptExpr {
                        receiver: Box::new(expr),
                        arguments,
                        span: start.merge(end),
                    });
                }
                TokenKind::Dot => {
                    self.bump();
                    expr = self.finish_dot_call(expr);
                }
                TokenKind::Line => {
                    let mut n = 0usize;
                    while self.peek_kind(n) == TokenKind::Line {
                        n += 1;
                    }
                    if self.peek_kind(n) == TokenKind::Dot {
                        for _ in 0..=n {
                            self.bump();
                        }
                        expr = self.finish_dot_call(expr);
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        expr
    }

    fn finish_dot_call(&mut self, receiver: Expr) -> Expr {
        let start = receiver.span();
        let name = self.expect(TokenKind::Name, "expected a method name after '.'");
        let (arguments, block_argument, end_span) = self.call_suffix();
        let span = start.merge(end_span.unwrap_or(name.span));
        Expr::Call(CallExpr {
            receiver: Some(Box::new(receiver)),
            name,
            arguments,
            block_argument,
            span,
        })
    }

    /// Parses an optional `(args)` and/or optional `{ body }` call
    /// suffix, returning the arguments, the block argument, and the
    /// span of whichever of the two was present last (for callers that
    /// need an end span without re-deriving it).
    #[allow(clippy::type_complexity)]
    fn call_suffix(
        &mut self,
    ) -> (
        Option<Vec<Expr>>,
        Option<crate::ast::Body>,
        Option<wren_common::Span>,
    ) {
        let mut arguments = None;
        let mut end_span = None;
        if self.check(TokenKind::LeftParen) {
            self.bump();
            self.ignore_line();
            let args = self.arg_list_until(TokenKind::RightParen);
            let close = self.expect(TokenKind::RightParen, "expected ')' to close arguments");
            end_span = Some(close.span);
            arguments = Some(args);
        }
        let mut block_argument = None;
        if self.check(TokenKind::LeftBrace) {
            let body = self.parse_body(true);
            end_span = Some(body.span);
            block_argument = Some(body);
        }
        (arguments, block_argument, end_span)
    }

    fn arg_list_until(&mut self, closer: TokenKind) -> Vec<Expr> {
        self.ignore_line();
        let mut args = Vec::new();
        if self.check(closer) {
            return args;
        }
        loop {
            args.push(self.assignment());
            self.ignore_line();
            if self.check(TokenKind::Comma) {
                self.bump();
                self.ignore_line();
                if self.check(closer) {
                    break;
                }
                continue;
            }
            break;
        }
        args
    }

    fn primary(&mut self) -> Expr {
        match self.current_kind() {
            TokenKind::Number => {
                let token = self.bump();
                Expr::Num(NumExpr { token })
            }
            TokenKind::String => {
                let token = self.bump();
                Expr::Str(StrExpr { token })
            }
            TokenKind::True => {
                let token = self.bump();
                Expr::Bool(BoolExpr { token, value: true })
            }
            TokenKind::False => {
                let token = self.bump();
                Expr::Bool(BoolExpr { token, value: false })
            }
            TokenKind::Null => {
                let token = self.bump();
                Expr::Null(NullExpr { token })
            }
            TokenKind::This => {
                let token = self.bump();
                Expr::This(ThisExpr { token })
            }
            TokenKind::Field => {
                let token = self.bump();
                Expr::Field(FieldExpr { token })
            }
            TokenKind::StaticField => {
                let token = self.bump();
                Expr::StaticField(StaticFieldExpr { token })
            }
            TokenKind::Interpolation => self.interpolation_expr(),
            TokenKind::LeftParen => self.grouping_expr(),
            TokenKind::LeftBracket => self.list_expr(),
            TokenKind::LeftBrace => self.map_expr(),
            TokenKind::Super => self.super_expr(),
            TokenKind::Name => self.bare_name_call(),
            _ => self.error_primary(),
        }
    }

    fn bare_name_call(&mut self) -> Expr {
        let name = self.bump();
        let (arguments, block_argument, end_span) = self.call_suffix();
        let span = name.span.merge(end_span.unwrap_or(name.span));
        Expr::Call(CallExpr {
            receiver: None,
            name,
            arguments,
            block_argument,
            span,
        })
    }

    fn grouping_expr(&mut self) -> Expr {
        let start = self.bump().span; // '('
        self.ignore_line();
        let inner = self.expression();
        self.ignore_line();
        let end = self.expect(TokenKind::RightParen, "expected ')' to close a grouping").span;
        Expr::Grouping(GroupingExpr {
            inner: Box::new(inner),
            span: start.merge(end),
        })
    }

    fn list_expr(&mut self) -> Expr {
        let start = self.bump().span; // '['
        self.ignore_line();
        let mut elements = Vec::new();
        if !self.check(TokenKind::RightBracket) {
            loop {
                elements.push(self.assignment());
                self.ignore_line();
                if self.check(TokenKind::Comma) {
                    self.bump();
                    self.ignore_line();
                    if self.check(TokenKind::RightBracket) {
                        break;
                    }
                    continue;
                }
                break;
            }
        }
        let end = self
            .expect(TokenKind::RightBracket, "expected ']' to close a list literal")
            .span;
        Expr::List(ListExpr {
            elements,
            span: start.merge(end),
        })
    }

    fn map_expr(&mut self) -> Expr {
        let start = self.bump().span; // '{'
        self.ignore_line();
        let mut entries = Vec::new();
        if !self.check(TokenKind::RightBrace) {
            loop {
                let key = self.assignment();
                self.ignore_line();
                self.expect(TokenKind::Colon, "expected ':' in a map literal entry");
                self.ignore_line();
                let value = self.assignment();
                entries.push((key, value));
                self.ignore_line();
                if self.check(TokenKind::Comma) {
                    self.bump();
                    self.ignore_line();
                    if self.check(TokenKind::RightBrace) {
                        break;
                    }
                    continue;
                }
                break;
            }
        }
        let end = self
            .expect(TokenKind::RightBrace, "expected '}' to close a map literal")
            .span;
        Expr::Map(MapExpr {
            entries,
            span: start.merge(end),
        })
    }

    fn super_expr(&mut self) -> Expr {
        let token = self.bump(); // 'super'
        let mut name = None;
        let mut end_span = token.span;
        if self.check(TokenKind::Dot) {
            self.bump();
            let method_name = self.expect(TokenKind::Name, "expected a method name after 'super.'");
            end_span = method_name.span;
            name = Some(method_name);
        }
        let (arguments, block_argument, suffix_end) = self.call_suffix();
        if let Some(e) = suffix_end {
            end_span = e;
        }
        Expr::Super(SuperExpr {
            token,
            name,
            arguments,
            block_argument,
            span: token.span.merge(end_span),
        })
    }

    fn interpolation_expr(&mut self) -> Expr {
        let first = self.bump(); // opening Interpolation fragment
        let start = first.span;
        let mut parts = vec![InterpolationPart::Literal(first)];
        loop {
            let inner = self.expression();
            parts.push(InterpolationPart::Expr(inner));
            match self.current_kind() {
                TokenKind::Interpolation => {
                    let token = self.bump();
                    parts.push(InterpolationPart::Literal(token));
                }
                TokenKind::String => {
                    let token = self.bump();
                    let span = start.merge(token.span);
                    parts.push(InterpolationPart::Literal(token));
                    return Expr::Interpolation(InterpolationExpr { parts, span });
                }
                _ => {
                    self.error_at_current("expected the rest of an interpolated string");
                    let span = start.merge(self.current_span());
                    return Expr::Interpolation(InterpolationExpr { parts, span });
                }
            }
        }
    }

    fn error_primary(&mut self) -> Expr {
        let token = self.bump();
        self.diagnostics.push(Diagnostic::error(
            DiagnosticCode::ParseError,
            token.span,
            format!("expected an expression, found {:?}", token.kind),
        ));
        Expr::Null(NullExpr { token })
    }
}
