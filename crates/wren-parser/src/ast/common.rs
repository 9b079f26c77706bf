use wren_common::{Span, Token};

use super::expr::Expr;
use super::stmt::Stmt;

/// The root node: an ordered sequence of top-level statements.
#[derive(Debug, Clone)]
pub struct Module {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

/// A single declared parameter, with an optional (non-standard) type
/// annotation.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: Token,
    pub type_annotation: Option<TypeAnnotation>,
}

/// A bare type name following a `:` or `->`.
#[derive(Debug, Clone)]
pub struct TypeAnnotation {
    pub name: Token,
}

/// A method or block-argument body.
///
/// Exactly one of `expression` or `statements` is populated; both
/// `None` denotes an empty body (`{}`). `parameters` is only ever
/// populated for block-argument bodies (`{ |a, b| ... }`); a method's
/// own parameter list lives on [`Method`] instead.
#[derive(Debug, Clone)]
pub struct Body {
    pub parameters: Option<Vec<Parameter>>,
    pub expression: Option<Box<Expr>>,
    pub statements: Option<Vec<Stmt>>,
    pub span: Span,
}

/// A method definition inside a class body.
#[derive(Debug, Clone)]
pub struct Method {
    pub is_foreign: bool,
    pub is_static: bool,
    pub is_construct: bool,
    pub is_setter: bool,
    pub name: Token,
    pub parameters: Option<Vec<Parameter>>,
    pub return_type: Option<TypeAnnotation>,
    /// `None` exactly when `is_foreign` is true.
    pub body: Option<Body>,
    pub span: Span,
}

/// A single name imported from a module, with its optional alias.
#[derive(Debug, Clone)]
pub struct ImportName {
    pub name: Token,
    pub alias: Option<Token>,
}
