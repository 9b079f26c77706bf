//! Tokenizer for the Wren scripting language.
//!
//! The scanner is a small state machine: most of the time it is in
//! [`LexerState::Normal`], but entering a string literal pushes
//! [`LexerState::InString`], and a `%(` interpolation escape inside a
//! string pushes [`LexerState::InInterpolation`] on top of that so
//! ordinary expression tokens can be produced until the matching `)`
//! is found.

mod cursor;

use cursor::Cursor;
use wren_common::{keyword_from_str, Token, TokenKind};

#[derive(Debug, Clone, Copy)]
enum LexerState {
    Normal,
    InString { triple: bool },
    InInterpolation { paren_depth: u32 },
}

pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    source: &'src str,
    state_stack: Vec<LexerState>,
    emitted_eof: bool,
    /// Byte offset of an opening quote just consumed by [`Self::lex_token_body`],
    /// handed off to the very next [`Self::lex_string_content`] call so the
    /// quote stays inside the token's span instead of being lost to recursion.
    pending_string_start: Option<u32>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        let mut cursor = Cursor::new(source);
        Self::skip_bom(&mut cursor);
        Self::skip_shebang(&mut cursor);
        Self {
            cursor,
            source,
            state_stack: vec![LexerState::Normal],
            emitted_eof: false,
            pending_string_start: None,
        }
    }

    fn skip_bom(cursor: &mut Cursor<'src>) {
        if cursor.peek() == Some('\u{feff}') {
            cursor.advance();
        }
    }

    fn skip_shebang(cursor: &mut Cursor<'src>) {
        if cursor.peek() == Some('#') && cursor.peek_next() == Some('!') {
            cursor.eat_while(|c| c != '\n');
        }
    }

    pub fn read_token(&mut self) -> Token {
        loop {
            match *self.state_stack.last().expect("state stack never empty") {
                LexerState::InString { triple } => return self.lex_string_content(triple),
                LexerState::InInterpolation { paren_depth } => {
                    if let Some(tok) = self.lex_interpolation_step(paren_depth) {
                        return tok;
                    }
                    // matching ')' found; fall through and resume string scan
                }
                LexerState::Normal => {
                    self.skip_trivia();
                    if self.cursor.is_eof() {
                        return self.eof_token();
                    }
                    if self.cursor.peek() == Some('\n') {
                        return self.single_char(TokenKind::Line);
                    }
                    if self.cursor.peek() == Some('#') {
                        self.consume_attribute();
                        continue;
                    }
                    return self.lex_token_body();
                }
            }
        }
    }

    fn eof_token(&mut self) -> Token {
        let pos = self.cursor.pos();
        self.emitted_eof = true;
        Token::new(TokenKind::Eof, pos, pos)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.cursor.peek() {
                Some(' ') | Some('\t') | Some('\r') => {
                    self.cursor.advance();
                }
                Some('/') if self.cursor.peek_next() == Some('/') => {
                    self.cursor.eat_while(|c| c != '\n');
                }
                Some('/') if self.cursor.peek_next() == Some('*') => {
                    self.skip_block_comment();
                }
                _ => break,
            }
        }
    }

    fn skip_block_comment(&mut self) {
        self.cursor.advance(); // '/'
        self.cursor.advance(); // '*'
        let mut depth = 1u32;
        while depth > 0 {
            match self.cursor.peek() {
                None => return, // unterminated: silently closed at EOF
                Some('/') if self.cursor.peek_next() == Some('*') => {
                    self.cursor.advance();
                    self.cursor.advance();
                    depth += 1;
                }
                Some('*') if self.cursor.peek_next() == Some('/') => {
                    self.cursor.advance();
                    self.cursor.advance();
                    depth -= 1;
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    /// Consumes an attribute line (`#...` or `#!...`), tracking
    /// parenthesis depth so a grouped attribute value can span
    /// multiple lines. Produces no token.
    fn consume_attribute(&mut self) {
        self.cursor.advance(); // '#'
        if self.cursor.peek() == Some('!') {
            self.cursor.advance();
        }
        let mut depth = 0i32;
        loop {
            match self.cursor.peek() {
                None => return,
                Some('(') => {
                    depth += 1;
                    self.cursor.advance();
                }
                Some(')') => {
                    depth -= 1;
                    self.cursor.advance();
                }
                Some('\n') if depth <= 0 => return,
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    fn single_char(&mut self, kind: TokenKind) -> Token {
        let start = self.cursor.pos();
        self.cursor.advance();
        Token::new(kind, start, self.cursor.pos())
    }

    /// Handles one step while the matching expression for a `%(...)`
    /// interpolation is being scanned. Returns `Some(token)` for an
    /// ordinary expression token, or `None` when the matching close
    /// paren for this interpolation has just been found (the state
    /// stack has already been popped; the caller should resume string
    /// scanning).
    fn lex_interpolation_step(&mut self, paren_depth: u32) -> Option<Token> {
        self.skip_trivia();
        if self.cursor.is_eof() {
            return Some(self.eof_token());
        }
        match self.cursor.peek().unwrap() {
            '\n' => Some(self.single_char(TokenKind::Line)),
            '(' => {
                *self.top_interpolation_depth_mut() = paren_depth + 1;
                Some(self.single_char(TokenKind::LeftParen))
            }
            ')' => {
                if paren_depth > 1 {
                    *self.top_interpolation_depth_mut() = paren_depth - 1;
                    Some(self.single_char(TokenKind::RightParen))
                } else {
                    self.state_stack.pop();
                    None
                }
            }
            '#' => {
                self.consume_attribute();
                self.lex_interpolation_step(paren_depth)
            }
            _ => Some(self.lex_token_body()),
        }
    }

    fn top_interpolation_depth_mut(&mut self) -> &mut u32 {
        match self.state_stack.last_mut().unwrap() {
            LexerState::InInterpolation { paren_depth } => paren_depth,
            _ => unreachable!("only called while in an interpolation"),
        }
    }

    /// Scans string content until the closing quote, a `%(`
    /// interpolation escape, or EOF.
    fn lex_string_content(&mut self, triple: bool) -> Token {
        let start = self
            .pending_string_start
            .take()
            .unwrap_or_else(|| self.cursor.pos());
        loop {
            if self.cursor.is_eof() {
                self.state_stack.pop();
                return Token::new(TokenKind::String, start, self.cursor.pos());
            }
            let ch = self.cursor.peek().unwrap();
            if triple {
                if self.remaining().starts_with("\"\"\"") {
                    self.cursor.advance();
                    self.cursor.advance();
                    self.cursor.advance();
                    self.state_stack.pop();
                    return Token::new(TokenKind::String, start, self.cursor.pos());
                }
                self.cursor.advance();
                continue;
            }
            match ch {
                '"' => {
                    self.cursor.advance();
                    self.state_stack.pop();
                    return Token::new(TokenKind::String, start, self.cursor.pos());
                }
                '\\' => {
                    self.cursor.advance();
                    if !self.cursor.is_eof() {
                        self.cursor.advance();
                    }
                }
                '%' if self.cursor.peek_next() == Some('(') => {
                    self.cursor.advance(); // '%'
                    self.cursor.advance(); // '('
                    self.state_stack.push(LexerState::InInterpolation { paren_depth: 1 });
                    return Token::new(TokenKind::Interpolation, start, self.cursor.pos());
                }
                _ => {
                    self.cursor.advance();
                }
            }
        }
    }

    fn remaining(&self) -> &'src str {
        &self.source[self.cursor.pos() as usize..]
    }

    fn lex_token_body(&mut self) -> Token {
        let start = self.cursor.pos();
        let ch = self.cursor.peek().unwrap();
        match ch {
            '"' => {
                let triple = self.remaining().starts_with("\"\"\"");
                if triple {
                    self.cursor.advance();
                    self.cursor.advance();
                    self.cursor.advance();
                } else {
                    self.cursor.advance();
                }
                self.pending_string_start = Some(start);
                self.state_stack.push(LexerState::InString { triple });
                self.read_token()
            }
            c if c.is_ascii_digit() => self.lex_number(start),
            c if is_ident_start(c) => self.lex_ident(start),
            '(' => self.single_char(TokenKind::LeftParen),
            ')' => self.single_char(TokenKind::RightParen),
            '{' => self.single_char(TokenKind::LeftBrace),
            '}' => self.single_char(TokenKind::RightBrace),
            '[' => self.single_char(TokenKind::LeftBracket),
            ']' => self.single_char(TokenKind::RightBracket),
            ',' => self.single_char(TokenKind::Comma),
            ':' => self.single_char(TokenKind::Colon),
            ';' => self.single_char(TokenKind::Semicolon),
            '?' => self.single_char(TokenKind::Question),
            '^' => self.single_char(TokenKind::Caret),
            '~' => self.single_char(TokenKind::Tilde),
            '*' => self.single_char(TokenKind::Star),
            '/' => self.single_char(TokenKind::Slash),
            '%' => self.single_char(TokenKind::Percent),
            '.' => self.lex_dot(start),
            '-' => self.lex_two(start, '>', TokenKind::Minus, TokenKind::Arrow),
            '+' => self.single_char(TokenKind::Plus),
            '=' => self.lex_two(start, '=', TokenKind::Eq, TokenKind::EqEq),
            '!' => self.lex_two(start, '=', TokenKind::Bang, TokenKind::BangEq),
            '<' => self.lex_lt(start),
            '>' => self.lex_gt(start),
            '&' => self.lex_two(start, '&', TokenKind::Amp, TokenKind::AmpAmp),
            '|' => self.lex_two(start, '|', TokenKind::Pipe, TokenKind::PipePipe),
            _ => {
                self.cursor.advance();
                Token::new(TokenKind::Error, start, self.cursor.pos())
            }
        }
    }

    fn lex_two(&mut self, start: u32, second: char, one: TokenKind, two: TokenKind) -> Token {
        self.cursor.advance();
        if self.cursor.peek() == Some(second) {
            self.cursor.advance();
            Token::new(two, start, self.cursor.pos())
        } else {
            Token::new(one, start, self.cursor.pos())
        }
    }

    fn lex_lt(&mut self, start: u32) -> Token {
        self.cursor.advance();
        match self.cursor.peek() {
            Some('=') => {
                self.cursor.advance();
                Token::new(TokenKind::LtEq, start, self.cursor.pos())
            }
            Some('<') => {
                self.cursor.advance();
                Token::new(TokenKind::LtLt, start, self.cursor.pos())
            }
            _ => Token::new(TokenKind::Lt, start, self.cursor.pos()),
        }
    }

    fn lex_gt(&mut self, start: u32) -> Token {
        self.cursor.advance();
        match self.cursor.peek() {
            Some('=') => {
                self.cursor.advance();
                Token::new(TokenKind::GtEq, start, self.cursor.pos())
            }
            Some('>') => {
                self.cursor.advance();
                Token::new(TokenKind::GtGt, start, self.cursor.pos())
            }
            _ => Token::new(TokenKind::Gt, start, self.cursor.pos()),
        }
    }

    fn lex_dot(&mut self, start: u32) -> Token {
        self.cursor.advance();
        if self.cursor.peek() == Some('.') {
            self.cursor.advance();
            if self.cursor.peek() == Some('.') {
                self.cursor.advance();
                return Token::new(TokenKind::DotDotDot, start, self.cursor.pos());
            }
            return Token::new(TokenKind::DotDot, start, self.cursor.pos());
        }
        Token::new(TokenKind::Dot, start, self.cursor.pos())
    }

    fn lex_number(&mut self, start: u32) -> Token {
        if self.cursor.peek() == Some('0')
            && matches!(self.cursor.peek_next(), Some('x') | Some('X'))
        {
            self.cursor.advance();
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_hexdigit());
            return Token::new(TokenKind::Number, start, self.cursor.pos());
        }
        self.cursor.eat_while(|c| c.is_ascii_digit());
        if self.cursor.peek() == Some('.')
            && self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_digit());
        }
        if matches!(self.cursor.peek(), Some('e') | Some('E')) {
            let mut chars = self.remaining().chars();
            chars.next(); // the 'e'/'E' itself
            if matches!(chars.clone().next(), Some('+') | Some('-')) {
                chars.next();
            }
            if chars.next().is_some_and(|c| c.is_ascii_digit()) {
                self.cursor.advance(); // 'e'/'E'
                if matches!(self.cursor.peek(), Some('+') | Some('-')) {
                    self.cursor.advance();
                }
                self.cursor.eat_while(|c| c.is_ascii_digit());
            }
        }
        Token::new(TokenKind::Number, start, self.cursor.pos())
    }

    fn lex_ident(&mut self, start: u32) -> Token {
        self.cursor.advance();
        self.cursor.eat_while(is_ident_continue);
        let text = self.cursor.slice(start, self.cursor.pos());
        let leading_underscores = text.bytes().take_while(|&b| b == b'_').count();
        let kind = if leading_underscores >= 2 {
            TokenKind::StaticField
        } else if leading_underscores == 1 {
            TokenKind::Field
        } else {
            keyword_from_str(text).unwrap_or(TokenKind::Name)
        };
        Token::new(kind, start, self.cursor.pos())
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.emitted_eof {
            return None;
        }
        let tok = self.read_token();
        if tok.kind == TokenKind::Eof {
            self.emitted_eof = true;
        }
        Some(tok)
    }
}

/// Tokenizes `source` in full, including a trailing [`TokenKind::Eof`].
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let tok = lexer.read_token();
        let is_eof = tok.kind == TokenKind::Eof;
        tokens.push(tok);
        if is_eof {
            break;
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    fn texts<'a>(source: &'a str) -> Vec<&'a str> {
        tokenize(source)
            .into_iter()
            .map(|t| t.text(source))
            .collect()
    }

    #[test]
    fn every_token_span_matches_its_text() {
        let source = "var x = 1 + 2 // comment\nreturn x";
        for tok in tokenize(source) {
            assert_eq!(tok.text(source).len() as u32, tok.span.length);
        }
    }

    #[test]
    fn hex_number_is_one_token() {
        assert_eq!(kinds("0xFF"), vec![TokenKind::Number, TokenKind::Eof]);
        assert_eq!(texts("0xFF"), vec!["0xFF", ""]);
    }

    #[test]
    fn float_number_is_one_token() {
        assert_eq!(kinds("3.14"), vec![TokenKind::Number, TokenKind::Eof]);
    }

    #[test]
    fn dot_dot_is_not_consumed_by_fraction() {
        assert_eq!(
            kinds("1..2"),
            vec![
                TokenKind::Number,
                TokenKind::DotDot,
                TokenKind::Number,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn exponent_requires_trailing_digit() {
        assert_eq!(kinds("1e10"), vec![TokenKind::Number, TokenKind::Eof]);
        // 'e' with no digit after is not consumed as part of the number.
        let toks = tokenize("1e");
        assert_eq!(toks[0].kind, TokenKind::Number);
        assert_eq!(toks[0].text("1e"), "1");
    }

    #[test]
    fn minus_vs_arrow() {
        assert_eq!(kinds("a - b"), vec![
            TokenKind::Name,
            TokenKind::Minus,
            TokenKind::Name,
            TokenKind::Eof
        ]);
        assert_eq!(kinds("a->b"), vec![
            TokenKind::Name,
            TokenKind::Arrow,
            TokenKind::Name,
            TokenKind::Eof
        ]);
    }

    #[test]
    fn field_and_static_field_classes() {
        assert_eq!(kinds("_foo"), vec![TokenKind::Field, TokenKind::Eof]);
        assert_eq!(kinds("__foo"), vec![TokenKind::StaticField, TokenKind::Eof]);
        assert_eq!(kinds("foo"), vec![TokenKind::Name, TokenKind::Eof]);
    }

    #[test]
    fn nested_block_comment_fully_consumed() {
        let source = "/* a /* b */ c */ 1";
        assert_eq!(kinds(source), vec![TokenKind::Number, TokenKind::Eof]);
    }

    #[test]
    fn unterminated_block_comment_silently_closes() {
        let source = "/* never closes";
        assert_eq!(kinds(source), vec![TokenKind::Eof]);
    }

    #[test]
    fn simple_string() {
        assert_eq!(kinds("\"hi\""), vec![TokenKind::String, TokenKind::Eof]);
        assert_eq!(texts("\"hi\""), vec!["\"hi\"", ""]);
    }

    #[test]
    fn raw_triple_string() {
        let source = "\"\"\"a \" b\"\"\"";
        assert_eq!(kinds(source), vec![TokenKind::String, TokenKind::Eof]);
    }

    #[test]
    fn string_interpolation_splits_into_three_tokens() {
        let source = "\"hello %(name)\"";
        let toks = tokenize(source);
        let kinds: Vec<_> = toks.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Interpolation,
                TokenKind::Name,
                TokenKind::String,
                TokenKind::Eof,
            ]
        );
        assert_eq!(toks[0].text(source), "\"hello %(");
        assert_eq!(toks[1].text(source), "name");
        assert_eq!(toks[2].text(source), ")\"");
    }

    #[test]
    fn nested_parens_inside_interpolation_are_tracked() {
        let source = "\"%((1 + 2))\"";
        let kinds = kinds(source);
        assert_eq!(
            kinds,
            vec![
                TokenKind::Interpolation,
                TokenKind::LeftParen,
                TokenKind::Number,
                TokenKind::Plus,
                TokenKind::Number,
                TokenKind::RightParen,
                TokenKind::String,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn shebang_is_skipped() {
        let source = "#!/usr/bin/env wren\nvar x = 1";
        let toks = tokenize(source);
        assert_eq!(toks[0].kind, TokenKind::Var);
    }

    #[test]
    fn bom_is_skipped() {
        let source = "\u{feff}var x = 1";
        let toks = tokenize(source);
        assert_eq!(toks[0].kind, TokenKind::Var);
        assert_eq!(toks[0].span.start, 3); // BOM is 3 bytes in UTF-8
    }

    #[test]
    fn attribute_produces_no_token() {
        let source = "#foo = 1\nclass Foo {}";
        let toks = tokenize(source);
        assert_eq!(toks[0].kind, TokenKind::Line);
        assert_eq!(toks[1].kind, TokenKind::Class);
    }

    #[test]
    fn newline_is_a_token() {
        let kinds = kinds("var x\nvar y");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Var,
                TokenKind::Name,
                TokenKind::Line,
                TokenKind::Var,
                TokenKind::Name,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keywords_recognized() {
        assert_eq!(kinds("class"), vec![TokenKind::Class, TokenKind::Eof]);
        assert_eq!(kinds("foreign"), vec![TokenKind::Foreign, TokenKind::Eof]);
        assert_eq!(kinds("construct"), vec![TokenKind::Construct, TokenKind::Eof]);
    }

    #[test]
    fn comparison_operators() {
        assert_eq!(kinds("<="), vec![TokenKind::LtEq, TokenKind::Eof]);
        assert_eq!(kinds(">="), vec![TokenKind::GtEq, TokenKind::Eof]);
        assert_eq!(kinds("<<"), vec![TokenKind::LtLt, TokenKind::Eof]);
        assert_eq!(kinds(">>"), vec![TokenKind::GtGt, TokenKind::Eof]);
        assert_eq!(kinds("&&"), vec![TokenKind::AmpAmp, TokenKind::Eof]);
        assert_eq!(kinds("||"), vec![TokenKind::PipePipe, TokenKind::Eof]);
        assert_eq!(kinds("=="), vec![TokenKind::EqEq, TokenKind::Eof]);
        assert_eq!(kinds("!="), vec![TokenKind::BangEq, TokenKind::Eof]);
    }
}
