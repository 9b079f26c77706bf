use wren_common::{Span, Token};

use super::common::Body;

/// An expression node.
///
/// There is no separate "name reference" variant: a bare identifier
/// parses as a [`CallExpr`] with neither a receiver nor an argument
/// list. Downstream passes tell a bare name apart from a real call by
/// checking whether `arguments`/`block_argument` are present.
#[derive(Debug, Clone)]
pub enum Expr {
    Num(NumExpr),
    Str(StrExpr),
    Bool(BoolExpr),
    Null(NullExpr),
    This(ThisExpr),
    Field(FieldExpr),
    StaticField(StaticFieldExpr),
    List(ListExpr),
    Map(MapExpr),
    Interpolation(InterpolationExpr),
    Grouping(GroupingExpr),
    Prefix(PrefixExpr),
    Infix(InfixExpr),
    Call(CallExpr),
    Subscript(SubscriptExpr),
    Assignment(AssignmentExpr),
    Conditional(ConditionalExpr),
    Super(SuperExpr),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Num(e) => e.token.span,
            Expr::Str(e) => e.token.span,
            Expr::Bool(e) => e.token.span,
            Expr::Null(e) => e.token.span,
            Expr::This(e) => e.token.span,
            Expr::Field(e) => e.token.span,
            Expr::StaticField(e) => e.token.span,
            Expr::List(e) => e.span,
            Expr::Map(e) => e.span,
            Expr::Interpolation(e) => e.span,
            Expr::Grouping(e) => e.span,
            Expr::Prefix(e) => e.span,
            Expr::Infix(e) => e.span,
            Expr::Call(e) => e.span,
            Expr::Subscript(e) => e.span,
            Expr::Assignment(e) => e.span,
            Expr::Conditional(e) => e.span,
            Expr::Super(e) => e.span,
        }
    }

    /// True for the bare-name-as-call representation: no receiver, no
    /// argument list, no block argument.
    pub fn is_bare_name(&self) -> bool {
        matches!(
            self,
            Expr::Call(CallExpr {
                receiver: None,
                arguments: None,
                block_argument: None,
                ..
            })
        )
    }
}

#[derive(Debug, Clone)]
pub struct NumExpr {
    pub token: Token,
}

#[derive(Debug, Clone)]
pub struct StrExpr {
    pub token: Token,
}

#[derive(Debug, Clone)]
pub struct BoolExpr {
    pub token: Token,
    pub value: bool,
}

#[derive(Debug, Clone)]
pub struct NullExpr {
    pub token: Token,
}

#[derive(Debug, Clone)]
pub struct ThisExpr {
    pub token: Token,
}

#[derive(Debug, Clone)]
pub struct FieldExpr {
    pub token: Token,
}

#[derive(Debug, Clone)]
pub struct StaticFieldExpr {
    pub token: Token,
}

#[derive(Debug, Clone)]
pub struct ListExpr {
    pub elements: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct MapExpr {
    pub entries: Vec<(Expr, Expr)>,
    pub span: Span,
}

/// One segment of an interpolated string: either a literal fragment
/// (the token kind is `String` or `Interpolation`) or an embedded
/// expression between `%(` and the matching `)`.
#[derive(Debug, Clone)]
pub enum InterpolationPart {
    Literal(Token),
    Expr(Expr),
}

#[derive(Debug, Clone)]
pub struct InterpolationExpr {
    pub parts: Vec<InterpolationPart>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct GroupingExpr {
    pub inner: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct PrefixExpr {
    pub op: Token,
    pub operand: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct InfixExpr {
    pub left: Box<Expr>,
    pub op: Token,
    pub right: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub receiver: Option<Box<Expr>>,
    pub name: Token,
    pub arguments: Option<Vec<Expr>>,
    pub block_argument: Option<Body>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct SubscriptExpr {
    pub receiver: Box<Expr>,
    pub arguments: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct AssignmentExpr {
    pub target: Box<Expr>,
    pub value: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ConditionalExpr {
    pub condition: Box<Expr>,
    pub then_branch: Box<Expr>,
    pub else_branch: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct SuperExpr {
    pub token: Token,
    pub name: Option<Token>,
    pub arguments: Option<Vec<Expr>>,
    pub block_argument: Option<Body>,
    pub span: Span,
}
