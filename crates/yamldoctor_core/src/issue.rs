//! Positioned issue model.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::FileId;

/// Severity level for issues.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Error - must be fixed.
    Error,
    /// Warning - should be reviewed.
    Warning,
    /// Info - informational message.
    Info,
    /// Hint - lowest priority, also the fallback for unknown labels.
    #[default]
    Hint,
}

impl Severity {
    /// Parses an analyzer severity label, case-insensitively.
    ///
    /// Returns `None` for labels that are not recognized.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warning" | "warn" => Some(Self::Warning),
            "info" | "information" => Some(Self::Info),
            "hint" => Some(Self::Hint),
            _ => None,
        }
    }

    /// Parses a label, mapping anything unrecognized to `Hint`.
    pub fn from_label(label: &str) -> Self {
        Self::parse(label).unwrap_or_default()
    }

    /// Returns the lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Hint => "hint",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRecord {
    /// 1-based line, 0 when the analyzer did not report one.
    pub line: u32,
    /// 0-based column.
    pub column: u32,
    /// Severity level.
    pub severity: Severity,
    /// The issue message.
    pub message: String,
    /// Rule identifier, possibly empty.
    pub rule_id: String,
}

impl IssueRecord {
    /// Creates a new issue at the start of `line`.
    pub fn new(line: u32, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            line,
            column: 0,
            severity,
            message: message.into(),
            rule_id: String::new(),
        }
    }

    /// Sets the column.
    pub fn with_column(mut self, column: u32) -> Self {
        self.column = column;
        self
    }

    /// Sets the rule identifier.
    pub fn with_rule(mut self, rule_id: impl Into<String>) -> Self {
        self.rule_id = rule_id.into();
        self
    }
}

/// All issues for one file from one completed analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileReport {
    /// Store key: the file's path with the analysis root applied.
    pub id: FileId,
    /// The file's path relative to the analysis root.
    pub path: FileId,
    /// Aggregate score of the analysis that produced this report.
    pub score: f64,
    /// Issues in report order.
    pub issues: Vec<IssueRecord>,
}

impl FileReport {
    /// Creates a report with no issues.
    pub fn clean(id: FileId, path: FileId, score: f64) -> Self {
        Self {
            id,
            path,
            score,
            issues: Vec::new(),
        }
    }

    /// Returns true when the file has no issues.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Returns true when any issue is an error.
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    /// Counts issues of the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("error", Severity::Error)]
    #[case("ERROR", Severity::Error)]
    #[case("warning", Severity::Warning)]
    #[case("Warn", Severity::Warning)]
    #[case("info", Severity::Info)]
    #[case("information", Severity::Info)]
    #[case("hint", Severity::Hint)]
    #[case("weird", Severity::Hint)]
    #[case("", Severity::Hint)]
    fn test_from_label(#[case] label: &str, #[case] expected: Severity) {
        assert_eq!(Severity::from_label(label), expected);
    }

    #[test]
    fn test_parse_unknown_is_none() {
        assert_eq!(Severity::parse("critical"), None);
    }

    #[test]
    fn test_issue_builder() {
        let issue = IssueRecord::new(3, Severity::Error, "bad indent")
            .with_column(2)
            .with_rule("E001");

        assert_eq!(issue.line, 3);
        assert_eq!(issue.column, 2);
        assert_eq!(issue.rule_id, "E001");
    }

    #[test]
    fn test_file_report_counts() {
        let mut report = FileReport::clean("/ws/a.yaml".into(), "a.yaml".into(), 80.0);
        assert!(report.is_clean());
        assert!(!report.has_errors());

        report.issues.push(IssueRecord::new(1, Severity::Error, "x"));
        report.issues.push(IssueRecord::new(2, Severity::Warning, "y"));

        assert!(report.has_errors());
        assert_eq!(report.count(Severity::Warning), 1);
        assert_eq!(report.count(Severity::Info), 0);
    }
}
