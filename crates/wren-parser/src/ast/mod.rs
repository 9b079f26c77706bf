//! The Wren abstract syntax tree: a closed sum of node variants, each
//! carrying the tokens needed to recover its source span.

mod common;
mod expr;
mod stmt;

pub use common::{Body, ImportName, Method, Module, Parameter, TypeAnnotation};
pub use expr::{
    AssignmentExpr, BoolExpr, CallExpr, ConditionalExpr, Expr, FieldExpr, GroupingExpr,
    InfixExpr, InterpolationExpr, InterpolationPart, ListExpr, MapExpr, NullExpr, NumExpr,
    PrefixExpr, StaticFieldExpr, StrExpr, SubscriptExpr, SuperExpr, ThisExpr,
};
pub use stmt::{
    BlockStmt, BreakStmt, ClassStmt, ContinueStmt, ForStmt, IfStmt, ImportStmt, ReturnStmt, Stmt,
    VarStmt, WhileStmt,
};
