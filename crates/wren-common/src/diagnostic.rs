use crate::span::Span;

/// A single finding produced anywhere in the pipeline.
///
/// Diagnostics from all stages share this shape so the reporter never
/// needs to know which stage produced a given entry.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Diagnostic {
    pub message: String,
    pub severity: Severity,
    pub span: Span,
    pub source: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<DiagnosticCode>,
}

impl Diagnostic {
    pub fn new(severity: Severity, code: DiagnosticCode, span: Span, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity,
            span,
            source: "wren-analyzer",
            code: Some(code),
        }
    }

    pub fn error(code: DiagnosticCode, span: Span, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, span, message)
    }

    pub fn warning(code: DiagnosticCode, span: Span, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, span, message)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Stable machine-readable identifiers for known diagnostic kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticCode {
    ParseError,
    DuplicateVariable,
    UndefinedVariable,
    TypeMismatch,
    UnknownMethod,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::ParseError => "parse-error",
            DiagnosticCode::DuplicateVariable => "duplicate-variable",
            DiagnosticCode::UndefinedVariable => "undefined-variable",
            DiagnosticCode::TypeMismatch => "type-mismatch",
            DiagnosticCode::UnknownMethod => "unknown-method",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_has_error_severity() {
        let d = Diagnostic::error(DiagnosticCode::ParseError, Span::new(0, 1), "boom");
        assert!(d.is_error());
    }

    #[test]
    fn warning_is_not_error() {
        let d = Diagnostic::warning(DiagnosticCode::TypeMismatch, Span::new(0, 1), "hmm");
        assert!(!d.is_error());
    }

    #[test]
    fn serializes_lowercase_severity() {
        let d = Diagnostic::error(DiagnosticCode::ParseError, Span::new(0, 1), "boom");
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.contains("\"severity\":\"error\""));
        assert!(json.contains("\"code\":\"parse-error\""));
    }
}
