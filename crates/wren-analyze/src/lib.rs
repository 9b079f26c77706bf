//! Pipeline entry point: ties the scanner, parser, resolver, and type
//! checker into the two functions external collaborators call.

use wren_common::Diagnostic;
use wren_parser::ast::Module;

/// The result of analyzing one source file: its parsed AST and every
/// diagnostic collected across the pipeline, in parser → resolver →
/// type-checker order.
#[derive(Debug)]
pub struct AnalysisResult {
    pub module: Module,
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs the full pipeline over `source`. `path` is used only for
/// logging; the result carries no notion of where the text came from.
///
/// The type checker is skipped once the parser or resolver has
/// already reported an error-severity diagnostic, since a malformed
/// or unresolved AST is not a reliable basis for its heuristics.
pub fn analyze(source: &str, path: &str) -> AnalysisResult {
    log::debug!("analyze: starting pipeline for {path}");
    let (module, mut diagnostics) = wren_parser::parse(source);
    log::trace!(
        "analyze: parser produced {} diagnostic(s) for {path}",
        diagnostics.len()
    );

    diagnostics.extend(wren_resolve::resolve(&module, source));
    log::trace!(
        "analyze: resolver brought the running total to {} diagnostic(s) for {path}",
        diagnostics.len()
    );

    if diagnostics.iter().any(Diagnostic::is_error) {
        log::debug!(
            "analyze: skipping type checker for {path}, error-severity diagnostics already present"
        );
    } else {
        diagnostics.extend(wren_typeck::check(&module, source));
    }

    log::info!("analyze: {path} produced {} diagnostic(s)", diagnostics.len());
    AnalysisResult { module, diagnostics }
}

/// Runs only the scanner and parser over `source`, skipping the
/// resolver and type checker entirely.
pub fn parse_only(source: &str, path: &str) -> AnalysisResult {
    log::debug!("analyze: parse_only for {path}");
    let (module, diagnostics) = wren_parser::parse(source);
    AnalysisResult { module, diagnostics }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wren_common::DiagnosticCode;

    #[test]
    fn clean_module_has_no_diagnostics() {
        let result = analyze("class Foo {\n  bar() {}\n}\nFoo.new()", "clean.wren");
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn parse_error_suppresses_type_checker_but_not_resolver() {
        // Malformed class header (missing name): parser recovers and
        // emits a parse-error; the resolver still sees the undefined
        // `anUndeclaredName` use, but the type checker should not run.
        let result = analyze("class {\n}\nanUndeclaredName", "broken.wren");
        assert!(result.diagnostics.iter().any(|d| d.code == Some(DiagnosticCode::ParseError)));
        assert!(result.diagnostics.iter().any(|d| d.code == Some(DiagnosticCode::UndefinedVariable)));
        assert!(!result.diagnostics.iter().any(|d| d.code == Some(DiagnosticCode::UnknownMethod)));
        assert!(!result.diagnostics.iter().any(|d| d.code == Some(DiagnosticCode::TypeMismatch)));
    }

    #[test]
    fn resolver_error_suppresses_type_checker() {
        let result = analyze("anUndeclaredName.foo()", "undeclared.wren");
        assert!(result.diagnostics.iter().any(|d| d.code == Some(DiagnosticCode::UndefinedVariable)));
        assert!(!result.diagnostics.iter().any(|d| d.code == Some(DiagnosticCode::UnknownMethod)));
    }

    #[test]
    fn parse_only_skips_resolver_and_typeck() {
        let result = parse_only("anUndeclaredName", "whatever.wren");
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn parser_diagnostics_precede_resolver_diagnostics() {
        // The malformed class header produces two parse-errors before
        // the resolver ever sees `anUndeclaredName`; appends must keep
        // that relative order.
        let result = analyze("class {\n}\nanUndeclaredName", "ordering.wren");
        let codes: Vec<_> = result.diagnostics.iter().filter_map(|d| d.code).collect();
        let last_parse_error = codes.iter().rposition(|c| *c == DiagnosticCode::ParseError);
        let undefined = codes.iter().position(|c| *c == DiagnosticCode::UndefinedVariable);
        assert!(last_parse_error.is_some());
        assert!(undefined.is_some());
        assert!(last_parse_error < undefined);
    }

    #[test]
    fn resolver_errors_suppress_typeck_even_when_clean_otherwise() {
        // Declaring `x` twice is a resolver error; the otherwise
        // clean type mismatch on the second declaration's assignment
        // must never surface since typeck is skipped entirely.
        let source = "var x: Num = 5\nvar x: Num = 5\nx = \"oops\"";
        let result = analyze(source, "suppressed.wren");
        assert!(result.diagnostics.iter().any(|d| d.code == Some(DiagnosticCode::DuplicateVariable)));
        assert!(!result.diagnostics.iter().any(|d| d.code == Some(DiagnosticCode::TypeMismatch)));
    }
}
