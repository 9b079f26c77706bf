//! Renders [`Diagnostic`]s for humans (pretty, one finding at a time)
//! and for tools (a single JSON array).

use std::fmt::Write as _;

use wren_common::{Diagnostic, Severity, SourceBuffer};

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "Error",
        Severity::Warning => "Warning",
        Severity::Info => "Info",
    }
}

/// Renders one diagnostic as `[path line:col] Severity: message`,
/// followed by the offending source line and a caret underline of
/// length `max(1, span.length)` starting at the span's column.
pub fn render_pretty(path: &str, source: &str, diagnostic: &Diagnostic) -> String {
    let buffer = SourceBuffer::new(source);
    let line = buffer.line_at(diagnostic.span.start);
    let column = buffer.column_at(diagnostic.span.start);
    let source_line = buffer.line_text(line);
    let caret_len = diagnostic.span.length.max(1) as usize;
    let indent = (column as usize).saturating_sub(1);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "[{path} {line}:{column}] {}: {}",
        severity_label(diagnostic.severity),
        diagnostic.message
    );
    let _ = writeln!(out, "{source_line}");
    let _ = write!(out, "{}{}", " ".repeat(indent), "^".repeat(caret_len));
    out
}

/// Renders every diagnostic in `diagnostics` (in order), one per
/// block, separated by a blank line.
pub fn render_pretty_all(path: &str, source: &str, diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| render_pretty(path, source, d))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Serializes `diagnostics` as a single JSON array, in pipeline
/// order. Mirrors `serde_json`'s own fallible idiom rather than
/// panicking inside a library, though serializing a well-formed
/// `Diagnostic` cannot practically fail.
pub fn render_json(diagnostics: &[Diagnostic]) -> serde_json::Result<String> {
    serde_json::to_string(diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wren_analyze::analyze;

    #[test]
    fn pretty_format_matches_the_documented_shape() {
        let source = "var x: Num = \"hi\"";
        let result = analyze(source, "fixture.wren");
        assert_eq!(result.diagnostics.len(), 1);
        let rendered = render_pretty("fixture.wren", source, &result.diagnostics[0]);
        assert!(rendered.starts_with("[fixture.wren 1:14] Warning:"));
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[1], source);
        assert!(lines[2].chars().all(|c| c == ' ' || c == '^'));
    }

    #[test]
    fn caret_length_is_at_least_one() {
        let source = "x";
        let result = analyze(source, "f.wren");
        assert_eq!(result.diagnostics.len(), 1);
        let rendered = render_pretty("f.wren", source, &result.diagnostics[0]);
        let caret_line = rendered.lines().nth(2).unwrap();
        assert_eq!(caret_line.matches('^').count(), 1);
    }

    #[test]
    fn json_array_has_one_entry_per_diagnostic() {
        let source = "var x: Num = \"hi\"";
        let result = analyze(source, "fixture.wren");
        let json = render_json(&result.diagnostics).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let array = value.as_array().unwrap();
        assert_eq!(array.len(), 1);
        assert_eq!(array[0]["severity"], "warning");
        assert_eq!(array[0]["code"], "type-mismatch");
    }

    #[test]
    fn json_array_is_empty_for_a_clean_module() {
        let result = analyze("var x = 5", "clean.wren");
        let json = render_json(&result.diagnostics).unwrap();
        assert_eq!(json, "[]");
    }
}
