//! Scope resolution for the Wren analyzer.
//!
//! Wren's lexical scoping has one irregular wrinkle: a class body is
//! not a lexical scope at all. Methods can call each other and
//! reference class-scoped (capitalized) names declared later in the
//! same module without a "use before declaration" complaint, because
//! a lowercase reference crossed by a class body is assumed to be an
//! implicit `this.name` self-send, and an uppercase one is assumed to
//! be some other class that may simply not have been declared yet in
//! this module (forward reference, checked only once the whole module
//! has been seen).

use rustc_hash::FxHashMap;

use wren_common::{Diagnostic, DiagnosticCode, Token};
use wren_parser::ast::{
    Body, CallExpr, ClassStmt, ForStmt, ImportStmt, Method, Module, VarStmt,
};
use wren_parser::visit::{self, Visitor};

const BUILTINS: &[&str] = &[
    "Bool",
    "Class",
    "Fiber",
    "Fn",
    "List",
    "Map",
    "MapKeySequence",
    "MapSequence",
    "MapValueSequence",
    "Null",
    "Num",
    "Object",
    "Range",
    "Sequence",
    "String",
    "StringByteSequence",
    "StringCodePointSequence",
    "System",
    "WhereSequence",
];

/// One entry in the scope stack. A class body is represented as its
/// own variant rather than a regular map, since it never binds names.
enum Frame {
    Regular(FxHashMap<String, DeclSite>),
    Class,
}

#[derive(Clone, Copy)]
enum DeclSite {
    Builtin,
    Declared(Token),
}

struct Resolver<'src> {
    source: &'src str,
    scopes: Vec<Frame>,
    forward_refs: Vec<Token>,
    bare_import_seen: bool,
    diagnostics: Vec<Diagnostic>,
}

impl<'src> Resolver<'src> {
    fn new(source: &'src str) -> Self {
        let mut module_scope = FxHashMap::default();
        for name in BUILTINS {
            module_scope.insert((*name).to_string(), DeclSite::Builtin);
        }
        Self {
            source,
            scopes: vec![Frame::Regular(module_scope)],
            forward_refs: Vec::new(),
            bare_import_seen: false,
            diagnostics: Vec::new(),
        }
    }

    fn begin(&mut self) {
        self.scopes.push(Frame::Regular(FxHashMap::default()));
    }

    fn end(&mut self) {
        self.scopes.pop();
    }

    fn begin_class(&mut self) {
        self.scopes.push(Frame::Class);
    }

    fn end_class(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, token: Token) {
        let name = token.text(self.source).to_string();
        let Frame::Regular(map) = self
            .scopes
            .last_mut()
            .expect("scope stack is never empty")
        else {
            // Class bodies don't introduce lexical bindings.
            return;
        };
        if let Some(prior) = map.get(&name) {
            let message = match prior {
                DeclSite::Declared(prior_token) => {
                    let line = wren_common::SourceBuffer::new(self.source)
                        .line_at(prior_token.span.start);
                    format!("'{name}' is already declared (previously declared on line {line})")
                }
                DeclSite::Builtin => format!("'{name}' is already declared as a built-in name"),
            };
            self.diagnostics.push(Diagnostic::error(
                DiagnosticCode::DuplicateVariable,
                token.span,
                message,
            ));
        } else {
            map.insert(name, DeclSite::Declared(token));
        }
    }

    fn module_scope_has(&self, name: &str) -> bool {
        match &self.scopes[0] {
            Frame::Regular(map) => map.contains_key(name),
            Frame::Class => unreachable!("module scope is always the bottom regular frame"),
        }
    }

    fn resolve(&mut self, token: Token) {
        let name = token.text(self.source);
        for frame in self.scopes.iter().rev() {
            match frame {
                Frame::Regular(map) => {
                    if map.contains_key(name) {
                        return;
                    }
                }
                Frame::Class => {
                    let starts_upper = name
                        .chars()
                        .next()
                        .map(|c| c.is_uppercase())
                        .unwrap_or(false);
                    if !starts_upper {
                        // Implicit `this.name` self-send; not an error.
                        return;
                    }
                    if self.module_scope_has(name) {
                        return;
                    }
                    self.forward_refs.push(token);
                    return;
                }
            }
        }
        self.diagnostics.push(Diagnostic::error(
            DiagnosticCode::UndefinedVariable,
            token.span,
            format!("'{name}' is not defined"),
        ));
    }

    fn check_forward_references(&mut self) {
        let pending = std::mem::take(&mut self.forward_refs);
        for token in pending {
            let name = token.text(self.source);
            if !self.module_scope_has(name) {
                self.diagnostics.push(Diagnostic::error(
                    DiagnosticCode::UndefinedVariable,
                    token.span,
                    format!("'{name}' is not defined"),
                ));
            }
        }
    }
}

impl<'src> Visitor for Resolver<'src> {
    fn visit_module(&mut self, module: &Module) {
        visit::walk_module(self, module);
        if !self.bare_import_seen {
            self.check_forward_references();
        } else {
            log::trace!("resolver: bare import present, suppressing forward-reference check");
        }
    }

    fn visit_var_stmt(&mut self, stmt: &VarStmt) {
        self.declare(stmt.name);
        if let Some(init) = &stmt.initializer {
            self.visit_expr(init);
        }
    }

    fn visit_class_stmt(&mut self, stmt: &ClassStmt) {
        self.declare(stmt.name);
        self.begin_class();
        for method in &stmt.methods {
            self.visit_method(method);
        }
        self.end_class();
    }

    fn visit_method(&mut self, method: &Method) {
        self.begin();
        if let Some(params) = &method.parameters {
            for p in params {
                self.declare(p.name);
            }
        }
        if let Some(body) = &method.body {
            self.visit_body(body);
        }
        self.end();
    }

    fn visit_body(&mut self, body: &Body) {
        self.begin();
        if let Some(params) = &body.parameters {
            for p in params {
                self.declare(p.name);
            }
        }
        if let Some(expr) = &body.expression {
            self.visit_expr(expr);
        }
        if let Some(statements) = &body.statements {
            for s in statements {
                self.visit_stmt(s);
            }
        }
        self.end();
    }

    fn visit_call_expr(&mut self, expr: &CallExpr) {
        if let Some(receiver) = &expr.receiver {
            self.visit_expr(receiver);
        } else {
            self.resolve(expr.name);
        }
        if let Some(args) = &expr.arguments {
            for a in args {
                self.visit_expr(a);
            }
        }
        if let Some(block) = &expr.block_argument {
            self.visit_body(block);
        }
    }

    fn visit_block_stmt(&mut self, stmt: &wren_parser::ast::BlockStmt) {
        self.begin();
        for s in &stmt.statements {
            self.visit_stmt(s);
        }
        self.end();
    }

    fn visit_for_stmt(&mut self, stmt: &ForStmt) {
        self.begin();
        self.declare(stmt.variable);
        self.visit_expr(&stmt.iterable);
        self.visit_stmt(&stmt.body);
        self.end();
    }

    fn visit_import_stmt(&mut self, stmt: &ImportStmt) {
        if let Some(names) = &stmt.names {
            for n in names {
                self.declare(n.alias.unwrap_or(n.name));
            }
        } else {
            self.bare_import_seen = true;
        }
    }
}

/// Resolves scopes and declarations across `module`, producing
/// `duplicate-variable`/`undefined-variable` diagnostics.
pub fn resolve(module: &Module, source: &str) -> Vec<Diagnostic> {
    log::debug!("resolver: starting scope analysis");
    let mut resolver = Resolver::new(source);
    resolver.visit_module(module);
    log::debug!(
        "resolver: finished scope analysis, {} diagnostic(s)",
        resolver.diagnostics.len()
    );
    resolver.diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagnostics_for(source: &str) -> Vec<Diagnostic> {
        let (module, parse_diags) = wren_parser::parse(source);
        assert!(parse_diags.is_empty(), "unexpected parse errors: {parse_diags:?}");
        resolve(&module, source)
    }

    #[test]
    fn declared_then_used_is_clean() {
        assert!(diagnostics_for("var x\nx").is_empty());
    }

    #[test]
    fn undeclared_use_is_an_error() {
        let diags = diagnostics_for("x");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, Some(DiagnosticCode::UndefinedVariable));
    }

    #[test]
    fn redeclaration_in_same_scope_is_an_error() {
        let diags = diagnostics_for("var x\nvar x");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, Some(DiagnosticCode::DuplicateVariable));
    }

    #[test]
    fn lowercase_forward_reference_in_class_body_is_a_self_send() {
        let diags = diagnostics_for("class Foo {\n  bar() { this.baz }\n}");
        assert!(diags.is_empty());
    }

    #[test]
    fn uppercase_forward_reference_without_declaration_is_an_error() {
        let source = "class Foo {\n  bar() { Undeclared.new() }\n}";
        let diags = diagnostics_for(source);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, Some(DiagnosticCode::UndefinedVariable));
    }

    #[test]
    fn uppercase_forward_reference_resolved_later_in_module_is_clean() {
        let source = "class Foo {\n  bar() { Later.new() }\n}\nclass Later {\n  construct new() {}\n}";
        assert!(diagnostics_for(source).is_empty());
    }

    #[test]
    fn lowercase_bare_call_in_class_body_with_no_declaration_is_a_self_send() {
        // `baz` with no receiver inside a method body is the same implicit
        // `this.baz` self-send as the explicit-receiver case above; whether
        // `baz` actually exists as a method is a method-existence question
        // for the type checker, not a scoping question for the resolver.
        let diags = diagnostics_for("class Foo {\n  bar() { baz }\n}");
        assert!(diags.is_empty());
    }

    #[test]
    fn bare_import_suppresses_forward_reference_check() {
        let source = "import \"m\"\nclass Foo {\n  bar() { baz }\n}";
        assert!(diagnostics_for(source).is_empty());
    }

    #[test]
    fn method_parameters_are_declared() {
        assert!(diagnostics_for("class Foo {\n  bar(x) { x }\n}").is_empty());
    }

    #[test]
    fn block_parameters_are_scoped_to_the_block() {
        let source = "class Foo {\n  bar() { [1].map { |x| x } }\n}";
        assert!(diagnostics_for(source).is_empty());
    }

    #[test]
    fn for_loop_variable_is_declared() {
        assert!(diagnostics_for("for (i in [1, 2]) {\n  i\n}").is_empty());
    }

    #[test]
    fn import_alias_binds_only_the_alias() {
        let diags = diagnostics_for("import \"m\" for Foo as Bar\nBar\nFoo");
        // `Foo` was shadowed by the alias and never bound as itself.
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, Some(DiagnosticCode::UndefinedVariable));
    }

    #[test]
    fn builtins_are_preseeded() {
        assert!(diagnostics_for("System.print(\"hi\")").is_empty());
    }
}
