//! Fixture-driven acceptance tests for the full analysis pipeline.
//!
//! Each `tests/fixtures/*.wren` file states its own expectations inline:
//! a `// expect warning` or `// expect error` comment targets the line
//! it appears on, unless followed by `line N` to target a different
//! 1-based line. A `// skip: <reason>` or `// nontest` comment anywhere
//! in the file excludes it from this test entirely (recorded for a
//! human reader, never asserted on).

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use wren_analyze::analyze;
use wren_common::{Severity, SourceBuffer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum ExpectedSeverity {
    Warning,
    Error,
}

fn marker_severity(line: &str) -> Option<ExpectedSeverity> {
    if line.contains("// expect warning") {
        Some(ExpectedSeverity::Warning)
    } else if line.contains("// expect error") {
        Some(ExpectedSeverity::Error)
    } else {
        None
    }
}

/// A marker targets its own line unless it carries a `line N` override.
fn target_line(line: &str, own_line: u32) -> u32 {
    let Some(idx) = line.find("line ") else {
        return own_line;
    };
    let rest = &line[idx + "line ".len()..];
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(own_line)
}

fn severity_of(severity: Severity) -> ExpectedSeverity {
    match severity {
        Severity::Error => ExpectedSeverity::Error,
        Severity::Warning => ExpectedSeverity::Warning,
        Severity::Info => panic!("fixtures never expect an Info-severity diagnostic"),
    }
}

/// Parses a fixture's `// expect` markers into a per-line multiset of
/// expected severities, or `None` if the fixture opts out via
/// `// skip:` / `// nontest`.
fn parse_expectations(source: &str) -> Option<HashMap<u32, Vec<ExpectedSeverity>>> {
    let mut expectations: HashMap<u32, Vec<ExpectedSeverity>> = HashMap::new();
    for (idx, line) in source.lines().enumerate() {
        if line.contains("// skip:") || line.contains("// nontest") {
            return None;
        }
        let line_no = (idx + 1) as u32;
        if let Some(severity) = marker_severity(line) {
            expectations.entry(target_line(line, line_no)).or_default().push(severity);
        }
    }
    Some(expectations)
}

fn fixture_paths() -> Vec<std::path::PathBuf> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let mut paths: Vec<_> = fs::read_dir(&dir)
        .expect("tests/fixtures must exist")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "wren"))
        .collect();
    paths.sort();
    paths
}

#[test]
fn fixtures_match_expected_diagnostics() {
    let paths = fixture_paths();
    assert!(!paths.is_empty(), "no .wren fixtures found");

    for path in paths {
        let source = fs::read_to_string(&path).expect("fixture must be readable as UTF-8");
        let Some(mut expected) = parse_expectations(&source) else {
            continue;
        };
        for severities in expected.values_mut() {
            severities.sort();
        }

        let display_path = path.display().to_string();
        let result = analyze(&source, &display_path);
        let buffer = SourceBuffer::new(&source);

        let mut actual: HashMap<u32, Vec<ExpectedSeverity>> = HashMap::new();
        for diagnostic in &result.diagnostics {
            let line = buffer.line_at(diagnostic.span.start);
            actual.entry(line).or_default().push(severity_of(diagnostic.severity));
        }
        for severities in actual.values_mut() {
            severities.sort();
        }

        assert_eq!(
            actual, expected,
            "{display_path}: diagnostics didn't match its `// expect` markers"
        );
    }
}
