use wren_common::{Span, Token};

use super::common::{ImportName, Method, TypeAnnotation};
use super::expr::Expr;

#[derive(Debug, Clone)]
pub enum Stmt {
    Var(VarStmt),
    Class(ClassStmt),
    Import(ImportStmt),
    If(IfStmt),
    For(ForStmt),
    While(WhileStmt),
    Return(ReturnStmt),
    Block(BlockStmt),
    Break(BreakStmt),
    Continue(ContinueStmt),
    Expr(Box<Expr>),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Var(s) => s.span,
            Stmt::Class(s) => s.span,
            Stmt::Import(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::For(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::Block(s) => s.span,
            Stmt::Break(s) => s.span,
            Stmt::Continue(s) => s.span,
            Stmt::Expr(e) => e.span(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VarStmt {
    pub name: Token,
    pub type_annotation: Option<TypeAnnotation>,
    pub initializer: Option<Box<Expr>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ClassStmt {
    pub name: Token,
    pub superclass: Option<Token>,
    pub is_foreign: bool,
    pub methods: Vec<Method>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ImportStmt {
    pub path: Token,
    /// `None` for a bare import (`import "foo"` with no `for` clause).
    pub names: Option<Vec<ImportName>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub condition: Box<Expr>,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ForStmt {
    pub variable: Token,
    pub type_annotation: Option<TypeAnnotation>,
    pub iterable: Box<Expr>,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub condition: Box<Expr>,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub value: Option<Box<Expr>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct BlockStmt {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct BreakStmt {
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ContinueStmt {
    pub span: Span,
}
