//! In-process scan engines.
//!
//! [`ScanEngine`] is the seam for plugging a YAML rule engine into
//! [`EmbeddedAnalyzer`](crate::EmbeddedAnalyzer). [`BasicEngine`] is a small
//! built-in engine covering syntax and whitespace hygiene.

use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::AnalyzerError;

/// Result of scanning a root directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Aggregate score in the range 0-100.
    pub score: f64,
    /// Scanned files, including clean ones.
    pub files: Vec<ScannedFile>,
}

/// Issues found in one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannedFile {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Issues in source order.
    pub issues: Vec<ScannedIssue>,
}

/// One finding, in the loosely typed form the library reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannedIssue {
    /// 1-based line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    /// 0-based column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    /// Severity label ("error", "warning", "info", "hint").
    pub severity: String,
    /// Human readable message.
    pub message: String,
    /// Rule code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ScannedIssue {
    fn new(line: u32, column: Option<u32>, severity: &str, code: &str, message: String) -> Self {
        Self {
            line: Some(line),
            column,
            severity: severity.to_string(),
            message,
            code: Some(code.to_string()),
        }
    }
}

/// An engine that can scan a root directory synchronously.
pub trait ScanEngine: Send + Sync {
    /// Engine name used in logs.
    fn name(&self) -> &str;

    /// Scans every relevant file under `root`.
    fn scan(&self, root: &Path) -> Result<ScanResult, AnalyzerError>;
}

/// Syntax error.
pub const CODE_SYNTAX: &str = "E001";
/// Tab used for indentation.
pub const CODE_TAB_INDENT: &str = "W001";
/// Trailing whitespace.
pub const CODE_TRAILING_SPACE: &str = "I001";
/// No newline at end of file.
pub const CODE_FINAL_NEWLINE: &str = "H001";

/// Built-in engine: YAML syntax, tab indentation, trailing whitespace and
/// final newline.
#[derive(Debug, Clone)]
pub struct BasicEngine {
    extensions: Vec<String>,
    exclude: Option<GlobSet>,
}

impl Default for BasicEngine {
    fn default() -> Self {
        Self {
            extensions: vec!["yaml".to_string(), "yml".to_string()],
            exclude: None,
        }
    }
}

impl BasicEngine {
    /// Creates an engine for the given extensions and exclude globs.
    pub fn new(extensions: &[String], exclude: &[String]) -> Result<Self, AnalyzerError> {
        let exclude = if exclude.is_empty() {
            None
        } else {
            let mut builder = GlobSetBuilder::new();
            for pattern in exclude {
                let glob = Glob::new(pattern).map_err(|e| {
                    AnalyzerError::unavailable(format!("invalid exclude pattern: {}", e))
                })?;
                builder.add(glob);
            }
            Some(builder.build().map_err(|e| {
                AnalyzerError::unavailable(format!("failed to build exclude set: {}", e))
            })?)
        };

        Ok(Self {
            extensions: extensions.iter().map(|e| e.to_ascii_lowercase()).collect(),
            exclude,
        })
    }

    /// Discovers YAML files under `root`, skipping hidden directories.
    ///
    /// Paths that are not valid UTF-8 cannot be carried in a JSON report and
    /// are skipped with a warning.
    fn discover(&self, root: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(root)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()))
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| self.is_candidate(root, path))
            .filter(|path| {
                let valid = path.to_str().is_some();
                if !valid {
                    warn!("Skipping non UTF-8 path {}", path.display());
                }
                valid
            })
            .collect();

        files.sort();
        files
    }

    fn is_candidate(&self, root: &Path, path: &Path) -> bool {
        let matches_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)));

        if !matches_extension {
            return false;
        }

        match &self.exclude {
            Some(exclude) => {
                let relative = path.strip_prefix(root).unwrap_or(path);
                !exclude.is_match(relative)
            }
            None => true,
        }
    }
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|s| s.starts_with('.'))
}

impl ScanEngine for BasicEngine {
    fn name(&self) -> &str {
        "basic"
    }

    fn scan(&self, root: &Path) -> Result<ScanResult, AnalyzerError> {
        if !root.exists() {
            return Err(AnalyzerError::execution(format!(
                "scan root does not exist: {}",
                root.display()
            )));
        }

        let paths = self.discover(root);
        debug!("Discovered {} YAML files under {}", paths.len(), root.display());

        let files: Vec<ScannedFile> = paths
            .par_iter()
            .filter_map(|path| match fs::read_to_string(path) {
                Ok(content) => Some(ScannedFile {
                    path: path.clone(),
                    issues: check_content(&content),
                }),
                Err(e) => {
                    warn!("Skipping unreadable file {}: {}", path.display(), e);
                    None
                }
            })
            .collect();

        let score = compute_score(&files);

        Ok(ScanResult { score, files })
    }
}

/// Runs every built-in check over one document.
pub fn check_content(content: &str) -> Vec<ScannedIssue> {
    let mut issues = Vec::new();

    if let Some(issue) = check_syntax(content) {
        issues.push(issue);
    }

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx as u32 + 1;

        let indent_len = line.len() - line.trim_start_matches([' ', '\t']).len();
        if let Some(col) = line[..indent_len].find('\t') {
            issues.push(ScannedIssue::new(
                line_no,
                Some(col as u32),
                "warning",
                CODE_TAB_INDENT,
                "Tab character used for indentation".to_string(),
            ));
        }

        let trimmed_len = line.trim_end_matches([' ', '\t', '\r']).len();
        if trimmed_len < line.trim_end_matches('\r').len() {
            issues.push(ScannedIssue::new(
                line_no,
                Some(trimmed_len as u32),
                "info",
                CODE_TRAILING_SPACE,
                "Trailing whitespace".to_string(),
            ));
        }
    }

    if !content.is_empty() && !content.ends_with('\n') {
        let last_line = content.lines().count().max(1) as u32;
        issues.push(ScannedIssue::new(
            last_line,
            None,
            "hint",
            CODE_FINAL_NEWLINE,
            "No newline at end of file".to_string(),
        ));
    }

    issues.sort_by_key(|issue| issue.line);
    issues
}

fn check_syntax(content: &str) -> Option<ScannedIssue> {
    for document in serde_yaml::Deserializer::from_str(content) {
        if let Err(e) = serde_yaml::Value::deserialize(document) {
            let (line, column) = e
                .location()
                .map(|loc| (loc.line() as u32, Some(loc.column().saturating_sub(1) as u32)))
                .unwrap_or((0, None));
            return Some(ScannedIssue {
                line: Some(line),
                column,
                severity: "error".to_string(),
                message: e.to_string(),
                code: Some(CODE_SYNTAX.to_string()),
            });
        }
    }
    None
}

/// 100 minus 10 per error and 2 per warning, floored at 0.
fn compute_score(files: &[ScannedFile]) -> f64 {
    let (errors, warnings) = files
        .iter()
        .flat_map(|f| f.issues.iter())
        .fold((0u32, 0u32), |(e, w), issue| match issue.severity.as_str() {
            "error" => (e + 1, w),
            "warning" => (e, w + 1),
            _ => (e, w),
        });

    (100.0 - 10.0 * f64::from(errors) - 2.0 * f64::from(warnings)).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn codes(issues: &[ScannedIssue]) -> Vec<&str> {
        issues.iter().filter_map(|i| i.code.as_deref()).collect()
    }

    #[test]
    fn test_clean_document() {
        let issues = check_content("name: demo\nitems:\n  - a\n  - b\n");
        assert!(issues.is_empty(), "unexpected issues: {issues:?}");
    }

    #[test]
    fn test_syntax_error_has_location() {
        let issues = check_content("key: [unclosed\nother: 1\n");
        assert_eq!(codes(&issues), vec![CODE_SYNTAX]);
        assert_eq!(issues[0].severity, "error");
    }

    #[test]
    fn test_whitespace_checks() {
        let issues = check_content("a: 1 \nb:\n\t- x\nc: 2");
        let found = codes(&issues);
        assert!(found.contains(&CODE_TRAILING_SPACE));
        assert!(found.contains(&CODE_TAB_INDENT));
        assert!(found.contains(&CODE_FINAL_NEWLINE));

        let trailing = issues
            .iter()
            .find(|i| i.code.as_deref() == Some(CODE_TRAILING_SPACE))
            .unwrap();
        assert_eq!(trailing.line, Some(1));
        assert_eq!(trailing.column, Some(4));
    }

    #[test]
    fn test_crlf_is_not_trailing_whitespace() {
        let issues = check_content("a: 1\r\nb: 2\r\n");
        assert!(!codes(&issues).contains(&CODE_TRAILING_SPACE));
    }

    #[test]
    fn test_compute_score() {
        let files = vec![ScannedFile {
            path: PathBuf::from("a.yaml"),
            issues: check_content("key: [unclosed\n\t- x\n"),
        }];
        let score = compute_score(&files);
        assert!(score <= 90.0);
        assert!(score >= 0.0);
    }

    #[test]
    fn test_scan_discovers_yaml_only() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.yaml"), "a: 1\n").unwrap();
        fs::write(temp.path().join("b.yml"), "b: 2 \n").unwrap();
        fs::write(temp.path().join("c.txt"), "not yaml\n").unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();
        fs::write(temp.path().join(".git/config.yaml"), "x: 1\n").unwrap();

        let result = BasicEngine::default().scan(temp.path()).unwrap();

        let names: Vec<_> = result
            .files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.yaml", "b.yml"]);
        assert_eq!(result.score, 100.0);
    }

    #[test]
    fn test_scan_respects_exclude() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("vendor")).unwrap();
        fs::write(temp.path().join("vendor/skip.yaml"), "a: 1\n").unwrap();
        fs::write(temp.path().join("keep.yaml"), "a: 1\n").unwrap();

        let engine = BasicEngine::new(&["yaml".to_string()], &["vendor/**".to_string()]).unwrap();
        let result = engine.scan(temp.path()).unwrap();

        assert_eq!(result.files.len(), 1);
        assert!(result.files[0].path.ends_with("keep.yaml"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_scan_skips_non_utf8_paths() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("good.yaml"), "a: 1\n").unwrap();
        fs::write(temp.path().join(OsStr::from_bytes(b"bad\xff.yaml")), "a: 1\n").unwrap();

        let result = BasicEngine::default().scan(temp.path()).unwrap();

        assert_eq!(result.files.len(), 1);
        assert!(result.files[0].path.ends_with("good.yaml"));
        assert!(serde_json::to_value(&result).is_ok());
    }

    #[test]
    fn test_scan_missing_root() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        let err = BasicEngine::default().scan(&missing).unwrap_err();
        assert!(matches!(err, AnalyzerError::ExecutionFailed(_)));
    }
}
