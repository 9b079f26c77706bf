//! A generic depth-first traversal over the AST.
//!
//! `Visitor` methods default to descending into every child in source
//! order; a pass overrides only the hooks it cares about and calls the
//! matching `walk_*` free function when it still wants the default
//! descent for that node's children.

use crate::ast::*;

pub trait Visitor {
    fn visit_module(&mut self, module: &Module) {
        walk_module(self, module);
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }

    fn visit_var_stmt(&mut self, stmt: &VarStmt) {
        walk_var_stmt(self, stmt);
    }

    fn visit_class_stmt(&mut self, stmt: &ClassStmt) {
        walk_class_stmt(self, stmt);
    }

    fn visit_import_stmt(&mut self, _stmt: &ImportStmt) {}

    fn visit_if_stmt(&mut self, stmt: &IfStmt) {
        walk_if_stmt(self, stmt);
    }

    fn visit_for_stmt(&mut self, stmt: &ForStmt) {
        walk_for_stmt(self, stmt);
    }

    fn visit_while_stmt(&mut self, stmt: &WhileStmt) {
        walk_while_stmt(self, stmt);
    }

    fn visit_return_stmt(&mut self, stmt: &ReturnStmt) {
        walk_return_stmt(self, stmt);
    }

    fn visit_block_stmt(&mut self, stmt: &BlockStmt) {
        walk_block_stmt(self, stmt);
    }

    fn visit_break_stmt(&mut self, _stmt: &BreakStmt) {}

    fn visit_continue_stmt(&mut self, _stmt: &ContinueStmt) {}

    fn visit_method(&mut self, method: &Method) {
        walk_method(self, method);
    }

    fn visit_body(&mut self, body: &Body) {
        walk_body(self, body);
    }

    fn visit_call_expr(&mut self, expr: &CallExpr) {
        walk_call_expr(self, expr);
    }

    fn visit_assignment_expr(&mut self, expr: &AssignmentExpr) {
        walk_assignment_expr(self, expr);
    }
}

pub fn walk_module<V: Visitor + ?Sized>(v: &mut V, module: &Module) {
    for stmt in &module.statements {
        v.visit_stmt(stmt);
    }
}

pub fn walk_stmt<V: Visitor + ?Sized>(v: &mut V, stmt: &Stmt) {
    match stmt {
        Stmt::Var(s) => v.visit_var_stmt(s),
        Stmt::Class(s) => v.visit_class_stmt(s),
        Stmt::Import(s) => v.visit_import_stmt(s),
        Stmt::If(s) => v.visit_if_stmt(s),
        Stmt::For(s) => v.visit_for_stmt(s),
        Stmt::While(s) => v.visit_while_stmt(s),
        Stmt::Return(s) => v.visit_return_stmt(s),
        Stmt::Block(s) => v.visit_block_stmt(s),
        Stmt::Break(s) => v.visit_break_stmt(s),
        Stmt::Continue(s) => v.visit_continue_stmt(s),
        Stmt::Expr(e) => v.visit_expr(e),
    }
}

pub fn walk_var_stmt<V: Visitor + ?Sized>(v: &mut V, stmt: &VarStmt) {
    if let Some(init) = &stmt.initializer {
        v.visit_expr(init);
    }
}

pub fn walk_class_stmt<V: Visitor + ?Sized>(v: &mut V, stmt: &ClassStmt) {
    for method in &stmt.methods {
        v.visit_method(method);
    }
}

pub fn walk_method<V: Visitor + ?Sized>(v: &mut V, method: &Method) {
    if let Some(body) = &method.body {
        v.visit_body(body);
    }
}

pub fn walk_body<V: Visitor + ?Sized>(v: &mut V, body: &Body) {
    if let Some(expr) = &body.expression {
        v.visit_expr(expr);
    }
    if let Some(statements) = &body.statements {
        for stmt in statements {
            v.visit_stmt(stmt);
        }
    }
}

pub fn walk_if_stmt<V: Visitor + ?Sized>(v: &mut V, stmt: &IfStmt) {
    v.visit_expr(&stmt.condition);
    v.visit_stmt(&stmt.then_branch);
    if let Some(else_branch) = &stmt.else_branch {
        v.visit_stmt(else_branch);
    }
}

pub fn walk_for_stmt<V: Visitor + ?Sized>(v: &mut V, stmt: &ForStmt) {
    v.visit_expr(&stmt.iterable);
    v.visit_stmt(&stmt.body);
}

pub fn walk_while_stmt<V: Visitor + ?Sized>(v: &mut V, stmt: &WhileStmt) {
    v.visit_expr(&stmt.condition);
    v.visit_stmt(&stmt.body);
}

pub fn walk_return_stmt<V: Visitor + ?Sized>(v: &mut V, stmt: &ReturnStmt) {
    if let Some(value) = &stmt.value {
        v.visit_expr(value);
    }
}

pub fn walk_block_stmt<V: Visitor + ?Sized>(v: &mut V, stmt: &BlockStmt) {
    for s in &stmt.statements {
        v.visit_stmt(s);
    }
}

pub fn walk_expr<V: Visitor + ?Sized>(v: &mut V, expr: &Expr) {
    match expr {
        Expr::Num(_)
        | Expr::Str(_)
        | Expr::Bool(_)
        | Expr::Null(_)
        | Expr::This(_)
        | Expr::Field(_)
        | Expr::StaticField(_) => {}
        Expr::List(e) => {
            for el in &e.elements {
                v.visit_expr(el);
            }
        }
        Expr::Map(e) => {
            for (k, val) in &e.entries {
                v.visit_expr(k);
                v.visit_expr(val);
            }
        }
        Expr::Interpolation(e) => {
            for part in &e.parts {
                if let InterpolationPart::Expr(inner) = part {
                    v.visit_expr(inner);
                }
            }
        }
        Expr::Grouping(e) => v.visit_expr(&e.inner),
        Expr::Prefix(e) => v.visit_expr(&e.operand),
        Expr::Infix(e) => {
            v.visit_expr(&e.left);
            v.visit_expr(&e.right);
        }
        Expr::Call(e) => v.visit_call_expr(e),
        Expr::Subscript(e) => {
            v.visit_expr(&e.receiver);
            for arg in &e.arguments {
                v.visit_expr(arg);
            }
        }
        Expr::Assignment(e) => v.visit_assignment_expr(e),
        Expr::Conditional(e) => {
            v.visit_expr(&e.condition);
            v.visit_expr(&e.then_branch);
            v.visit_expr(&e.else_branch);
        }
        Expr::Super(e) => {
            if let Some(args) = &e.arguments {
                for arg in args {
                    v.visit_expr(arg);
                }
            }
            if let Some(block) = &e.block_argument {
                v.visit_body(block);
            }
        }
    }
}

pub fn walk_call_expr<V: Visitor + ?Sized>(v: &mut V, expr: &CallExpr) {
    if let Some(receiver) = &expr.receiver {
        v.visit_expr(receiver);
    }
    if let Some(args) = &expr.arguments {
        for arg in args {
            v.visit_expr(arg);
        }
    }
    if let Some(block) = &expr.block_argument {
        v.visit_body(block);
    }
}

pub fn walk_assignment_expr<V: Visitor + ?Sized>(v: &mut V, expr: &AssignmentExpr) {
    v.visit_expr(&expr.target);
    v.visit_expr(&expr.value);
}
