//! A lint-grade type consistency checker.
//!
//! This is not a sound type system: Wren is dynamically typed, and the
//! optional `: Type` annotations this crate understands are not part
//! of the language's actual semantics. All findings here are
//! severity *warning* — a second opinion a caller may freely ignore,
//! never a hard error.

use rustc_hash::{FxHashMap, FxHashSet};

use wren_common::{Diagnostic, DiagnosticCode, Span, Token};
use wren_parser::ast::{
    AssignmentExpr, Body, CallExpr, ClassStmt, Expr, ForStmt, Method, Module, ReturnStmt, Stmt,
    VarStmt,
};
use wren_parser::visit::{self, Visitor};

/// What a pre-scan learned about one user-declared class.
struct ClassInfo {
    instance_methods: FxHashSet<String>,
    static_methods: FxHashSet<String>,
    superclass: Option<String>,
}

fn build_registry(module: &Module, source: &str) -> FxHashMap<String, ClassInfo> {
    let mut registry = FxHashMap::default();
    for stmt in &module.statements {
        let Stmt::Class(class) = stmt else { continue };
        registry.insert(class.name.text(source).to_string(), class_info(class, source));
    }
    registry
}

fn class_info(class: &ClassStmt, source: &str) -> ClassInfo {
    let mut instance_methods = FxHashSet::default();
    let mut static_methods = FxHashSet::default();
    for method in &class.methods {
        let name = method.name.text(source).to_string();
        let set = if method.is_static || method.is_construct {
            &mut static_methods
        } else {
            &mut instance_methods
        };
        if method.is_setter {
            set.insert(format!("{name}="));
        } else {
            set.insert(name);
        }
    }
    ClassInfo {
        instance_methods,
        static_methods,
        superclass: class.superclass.map(|t| t.text(source).to_string()),
    }
}

fn core_instance_methods(name: &str) -> Option<&'static [&'static str]> {
    Some(match name {
        "Object" => &["toString", "type", "is"],
        "Bool" => &["not", "toString"],
        "Null" => &["toString"],
        "Num" => &[
            "abs", "ceil", "floor", "round", "sqrt", "min", "max", "pow", "truncate", "fraction",
            "sign", "toString",
        ],
        "String" => &[
            "count",
            "bytes",
            "codePoints",
            "contains",
            "endsWith",
            "indexOf",
            "replace",
            "split",
            "startsWith",
            "trim",
            "trimEnd",
            "trimStart",
            "toString",
        ],
        "List" => &[
            "add",
            "addAll",
            "clear",
            "count",
            "insert",
            "indexOf",
            "remove",
            "removeAt",
            "sort",
            "toString",
            "iterate",
            "iteratorValue",
            "map",
            "where",
            "all",
            "any",
            "contains",
            "join",
        ],
        "Map" => &[
            "containsKey",
            "count",
            "keys",
            "values",
            "remove",
            "toString",
            "iterate",
            "iteratorValue",
        ],
        "Range" => &[
            "from",
            "to",
            "min",
            "max",
            "clamp",
            "contains",
            "iterate",
            "iteratorValue",
            "toString",
        ],
        "Fiber" => &["call", "error", "isDone", "transfer", "try"],
        "Fn" => &["call", "arity"],
        "Sequence" => &[
            "all", "any", "contains", "count", "each", "join", "map", "reduce", "sum", "toList",
            "where", "first", "isEmpty", "skip", "take", "toString",
        ],
        _ => return None,
    })
}

fn core_static_methods(name: &str) -> Option<&'static [&'static str]> {
    Some(match name {
        "Object" => &["toString"],
        "Num" => &["fromString", "pi", "infinity", "nan", "largest", "smallest"],
        "String" => &["fromCodePoint", "fromByteArray"],
        "List" => &["new", "filled"],
        "Map" => &["new"],
        "Fiber" => &["new", "current", "yield", "suspend", "abort"],
        "Fn" => &["new"],
        "System" => &["print", "write", "clock", "gc", "writeString"],
        _ => return None,
    })
}

fn core_superclass(name: &str) -> Option<&'static str> {
    match name {
        "List" | "Map" | "Range" | "String" => Some("Sequence"),
        _ => None,
    }
}

fn literal_type_of(expr: &Expr) -> Option<&'static str> {
    match expr {
        Expr::Num(_) => Some("Num"),
        Expr::Str(_) => Some("String"),
        Expr::Bool(_) => Some("Bool"),
        Expr::Null(_) => Some("Null"),
        Expr::List(_) => Some("List"),
        Expr::Map(_) => Some("Map"),
        Expr::Interpolation(_) => Some("String"),
        Expr::Grouping(g) => literal_type_of(&g.inner),
        _ => None,
    }
}

#[derive(Default)]
struct Env {
    declared: FxHashMap<String, String>,
    inferred: FxHashMap<String, String>,
}

struct TypeChecker<'src> {
    source: &'src str,
    user_classes: FxHashMap<String, ClassInfo>,
    scopes: Vec<Env>,
    class_stack: Vec<String>,
    return_type_stack: Vec<Option<String>>,
    diagnostics: Vec<Diagnostic>,
}

impl<'src> TypeChecker<'src> {
    fn push_scope(&mut self) {
        self.scopes.push(Env::default());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare_annotated(&mut self, name: &str, ty: String) {
        let scope = self.scopes.last_mut().expect("scope stack is never empty");
        scope.declared.insert(name.to_string(), ty.clone());
        scope.inferred.insert(name.to_string(), ty);
    }

    fn declare_inferred(&mut self, name: &str, ty: String) {
        self.scopes
            .last_mut()
            .expect("scope stack is never empty")
            .inferred
            .insert(name.to_string(), ty);
    }

    fn lookup_inferred(&self, name: &str) -> Option<String> {
        self.scopes.iter().rev().find_map(|s| s.inferred.get(name).cloned())
    }

    fn lookup_declared(&self, name: &str) -> Option<String> {
        self.scopes.iter().rev().find_map(|s| s.declared.get(name).cloned())
    }

    fn current_return_type(&self) -> Option<String> {
        self.return_type_stack.last().cloned().flatten()
    }

    fn warn(&mut self, code: DiagnosticCode, span: Span, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::warning(code, span, message));
    }

    /// Inference used for receivers: literals, `this`, env lookups, and
    /// transparent grouping. Distinct from [`Self::infer_var_type`] in
    /// that it resolves `this` to the enclosing class.
    fn infer_receiver_type(&self, expr: &Expr) -> Option<String> {
        match expr {
            Expr::This(_) => self.class_stack.last().cloned(),
            Expr::Grouping(g) => self.infer_receiver_type(&g.inner),
            Expr::Call(c) if c.receiver.is_none() && c.arguments.is_none() && c.block_argument.is_none() => {
                self.lookup_inferred(c.name.text(self.source))
            }
            _ => literal_type_of(expr).map(|s| s.to_string()),
        }
    }

    /// Inference used for a `var` initializer: literals, bare-name
    /// lookups, and the `ClassName.new(...)` constructor pattern.
    fn infer_var_type(&self, expr: &Expr) -> Option<String> {
        match expr {
            Expr::Grouping(g) => self.infer_var_type(&g.inner),
            Expr::Call(c) if c.receiver.is_none() && c.arguments.is_none() && c.block_argument.is_none() => {
                self.lookup_inferred(c.name.text(self.source))
            }
            Expr::Call(c) => {
                if c.name.text(self.source) == "new" {
                    if let Some(receiver) = &c.receiver {
                        if receiver.is_bare_name() {
                            if let Expr::Call(rc) = receiver.as_ref() {
                                let name = rc.name.text(self.source);
                                if name.chars().next().is_some_and(char::is_uppercase) {
                                    return Some(name.to_string());
                                }
                            }
                        }
                    }
                }
                None
            }
            _ => literal_type_of(expr).map(|s| s.to_string()),
        }
    }

    fn check_method_existence(&mut self, receiver: &Expr, name_token: Token, call_span: Span) {
        let method_name = name_token.text(self.source);
        if receiver.is_bare_name() {
            if let Expr::Call(rc) = receiver {
                let recv_name = rc.name.text(self.source);
                if recv_name.chars().next().is_some_and(char::is_uppercase) {
                    self.check_static_existence(recv_name, method_name, call_span);
                    return;
                }
            }
        }

        let Some(start_ty) = self.infer_receiver_type(receiver) else {
            return;
        };
        if start_ty == "Null" {
            return;
        }

        let mut visited = FxHashSet::default();
        let mut current = Some(start_ty.clone());
        let mut saw_known_class = false;
        while let Some(ty) = current {
            if !visited.insert(ty.clone()) {
                break;
            }
            if let Some(info) = self.user_classes.get(&ty) {
                saw_known_class = true;
                if info.instance_methods.contains(method_name) {
                    return;
                }
                current = info
                    .superclass
                    .clone()
                    .or_else(|| core_superclass(&ty).map(str::to_string));
            } else if let Some(methods) = core_instance_methods(&ty) {
                saw_known_class = true;
                if methods.iter().any(|m| *m == method_name) {
                    return;
                }
                current = core_superclass(&ty).map(str::to_string);
            } else {
                break;
            }
        }

        if core_instance_methods("Object")
            .is_some_and(|methods| methods.iter().any(|m| *m == method_name))
        {
            return;
        }

        if saw_known_class {
            self.warn(
                DiagnosticCode::UnknownMethod,
                call_span,
                format!("no visible method '{method_name}' on '{start_ty}'"),
            );
        }
    }

    fn check_static_existence(&mut self, class_name: &str, method_name: &str, call_span: Span) {
        if let Some(info) = self.user_classes.get(class_name) {
            if !info.static_methods.contains(method_name) {
                self.warn(
                    DiagnosticCode::UnknownMethod,
                    call_span,
                    format!("'{class_name}' has no static method '{method_name}'"),
                );
            }
        } else if let Some(statics) = core_static_methods(class_name) {
            if !statics.iter().any(|m| *m == method_name) {
                self.warn(
                    DiagnosticCode::UnknownMethod,
                    call_span,
                    format!("'{class_name}' has no static method '{method_name}'"),
                );
            }
        }
        // An unrecognized class name might come from an unresolved
        // import; skip rather than risk a false positive.
    }
}

impl<'src> Visitor for TypeChecker<'src> {
    fn visit_var_stmt(&mut self, stmt: &VarStmt) {
        let name = stmt.name.text(self.source);
        match (&stmt.type_annotation, &stmt.initializer) {
            (Some(annotation), Some(init)) => {
                let declared = annotation.name.text(self.source).to_string();
                if let Some(literal) = literal_type_of(init) {
                    if literal != declared {
                        self.warn(
                            DiagnosticCode::TypeMismatch,
                            init.span(),
                            format!(
                                "'{name}' is annotated '{declared}' but initialized with a '{literal}' literal"
                            ),
                        );
                    }
                }
                self.declare_annotated(name, declared);
                self.visit_expr(init);
            }
            (Some(annotation), None) => {
                let declared = annotation.name.text(self.source).to_string();
                if declared != "Null" {
                    self.warn(
                        DiagnosticCode::TypeMismatch,
                        stmt.span,
                        format!("'{name}' is annotated '{declared}' but has no initializer (defaults to Null)"),
                    );
                }
                self.declare_annotated(name, declared);
            }
            (None, Some(init)) => {
                if let Some(ty) = self.infer_var_type(init) {
                    self.declare_inferred(name, ty);
                }
                self.visit_expr(init);
            }
            (None, None) => {}
        }
    }

    fn visit_class_stmt(&mut self, stmt: &ClassStmt) {
        self.class_stack.push(stmt.name.text(self.source).to_string());
        for method in &stmt.methods {
            self.visit_method(method);
        }
        self.class_stack.pop();
    }

    fn visit_method(&mut self, method: &Method) {
        self.push_scope();
        if let Some(params) = &method.parameters {
            for p in params {
                if let Some(annotation) = &p.type_annotation {
                    self.declare_annotated(
                        p.name.text(self.source),
                        annotation.name.text(self.source).to_string(),
                    );
                }
            }
        }
        self.return_type_stack.push(
            method
                .return_type
                .as_ref()
                .map(|t| t.name.text(self.source).to_string()),
        );
        if let Some(body) = &method.body {
            self.visit_body(body);
        }
        self.return_type_stack.pop();
        self.pop_scope();
    }

    fn visit_body(&mut self, body: &Body) {
        self.push_scope();
        if let Some(params) = &body.parameters {
            for p in params {
                if let Some(annotation) = &p.type_annotation {
                    self.declare_annotated(
                        p.name.text(self.source),
                        annotation.name.text(self.source).to_string(),
                    );
                }
            }
        }
        if let Some(expr) = &body.expression {
            if let Some(expected) = self.current_return_type() {
                if let Some(literal) = literal_type_of(expr) {
                    if literal != expected {
                        self.warn(
                            DiagnosticCode::TypeMismatch,
                            expr.span(),
                            format!("body evaluates to a '{literal}' but the method is declared to return '{expected}'"),
                        );
                    }
                }
            }
            self.visit_expr(expr);
        }
        if let Some(statements) = &body.statements {
            for s in statements {
                self.visit_stmt(s);
            }
        }
        self.pop_scope();
    }

    fn visit_for_stmt(&mut self, stmt: &ForStmt) {
        self.push_scope();
        if let Some(annotation) = &stmt.type_annotation {
            self.declare_annotated(
                stmt.variable.text(self.source),
                annotation.name.text(self.source).to_string(),
            );
        }
        self.visit_expr(&stmt.iterable);
        self.visit_stmt(&stmt.body);
        self.pop_scope();
    }

    fn visit_return_stmt(&mut self, stmt: &ReturnStmt) {
        if let Some(expected) = self.current_return_type() {
            match &stmt.value {
                Some(value) => {
                    if let Some(literal) = literal_type_of(value) {
                        if literal != expected {
                            self.warn(
                                DiagnosticCode::TypeMismatch,
                                value.span(),
                                format!("returns a '{literal}' but the method is declared to return '{expected}'"),
                            );
                        }
                    }
                }
                None => {
                    if expected != "Null" {
                        self.warn(
                            DiagnosticCode::TypeMismatch,
                            stmt.span,
                            format!("empty return in a method declared to return '{expected}'"),
                        );
                    }
                }
            }
        }
        if let Some(value) = &stmt.value {
            self.visit_expr(value);
        }
    }

    fn visit_assignment_expr(&mut self, expr: &AssignmentExpr) {
        if expr.target.is_bare_name() {
            if let Expr::Call(c) = expr.target.as_ref() {
                if let Some(declared) = self.lookup_declared(c.name.text(self.source)) {
                    if let Some(literal) = literal_type_of(&expr.value) {
                        if literal != declared {
                            self.warn(
                                DiagnosticCode::TypeMismatch,
                                expr.value.span(),
                                format!(
                                    "'{}' is declared '{declared}' but assigned a '{literal}' literal",
                                    c.name.text(self.source)
                                ),
                            );
                        }
                    }
                }
            }
        }
        self.visit_expr(&expr.target);
        self.visit_expr(&expr.value);
    }

    fn visit_call_expr(&mut self, expr: &CallExpr) {
        if let Some(receiver) = &expr.receiver {
            self.check_method_existence(receiver, expr.name, expr.span);
        }
        visit::walk_call_expr(self, expr);
    }
}

/// Runs the lint-grade type checker over `module`, producing
/// `type-mismatch`/`unknown-method` diagnostics. Callers should skip
/// this pass entirely once an earlier stage has already reported an
/// error-severity diagnostic, since the AST is no longer trustworthy.
pub fn check(module: &Module, source: &str) -> Vec<Diagnostic> {
    log::debug!("typeck: building class registry");
    let user_classes = build_registry(module, source);
    let mut checker = TypeChecker {
        source,
        user_classes,
        scopes: vec![Env::default()],
        class_stack: Vec::new(),
        return_type_stack: Vec::new(),
        diagnostics: Vec::new(),
    };
    checker.visit_module(module);
    log::debug!("typeck: finished, {} diagnostic(s)", checker.diagnostics.len());
    checker.diagnostics
}
