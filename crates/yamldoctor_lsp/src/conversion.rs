//! LSP type conversion utilities.

use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString, Position, Range};

use yamldoctor_core::{FileReport, IssueRecord, Severity};

/// Source name attached to every published diagnostic.
pub const DIAGNOSTIC_SOURCE: &str = "yaml-doctor";

/// Number of characters highlighted from the reported column.
pub const HIGHLIGHT_WIDTH: u32 = 10;

/// Converts an issue to an LSP diagnostic.
pub fn to_lsp_diagnostic(issue: &IssueRecord) -> Diagnostic {
    let code = (!issue.rule_id.is_empty()).then(|| NumberOrString::String(issue.rule_id.clone()));

    Diagnostic {
        range: issue_range(issue),
        severity: Some(to_lsp_severity(issue.severity)),
        code,
        source: Some(DIAGNOSTIC_SOURCE.to_string()),
        message: issue.message.clone(),
        ..Default::default()
    }
}

/// Converts every issue of a report.
pub fn report_diagnostics(report: &FileReport) -> Vec<Diagnostic> {
    report.issues.iter().map(to_lsp_diagnostic).collect()
}

/// Maps a 1-based line and 0-based column to a fixed-width range.
pub fn issue_range(issue: &IssueRecord) -> Range {
    let line = issue.line.saturating_sub(1);
    Range::new(
        Position::new(line, issue.column),
        Position::new(line, issue.column.saturating_add(HIGHLIGHT_WIDTH)),
    )
}

/// Maps a severity to its LSP counterpart.
pub fn to_lsp_severity(severity: Severity) -> DiagnosticSeverity {
    match severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
        Severity::Info => DiagnosticSeverity::INFORMATION,
        Severity::Hint => DiagnosticSeverity::HINT,
    }
}
