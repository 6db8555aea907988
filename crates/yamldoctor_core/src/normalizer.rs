//! Conversion of raw analyzer reports into canonical file reports.
//!
//! Normalization never fails. Malformed or missing fields fall back to safe
//! defaults and are counted in [`Normalization::degraded`]:
//!
//! | field      | fallback                      |
//! |------------|-------------------------------|
//! | `line`     | `0`                           |
//! | `column`   | `0`                           |
//! | `severity` | [`Severity::Hint`]            |
//! | `code`     | empty string                  |
//! | `message`  | `"(no message)"`              |
//! | `score`    | `0`, clamped to `0..=100`     |
//!
//! File entries without a usable path and issues that are not objects are
//! skipped.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::{FileId, FileReport, IssueRecord, RawReport, Severity, normalize_lexically};

const MISSING_MESSAGE: &str = "(no message)";

/// The two report layouts analyzers produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportShape {
    /// In-process library output: `{ result: { score, files[].issues[] } }`.
    /// Paths are absolute, rules are under `code`, columns are 0-based.
    Library,
    /// Out-of-process JSON document: `{ score, files[].issues[] }`.
    /// Paths are under `path` or `file`, rules under `code` or `rule`,
    /// columns are 1-based.
    Document,
}

impl ReportShape {
    /// Detects the shape from the presence of the `result` wrapper key.
    pub fn detect(value: &Value) -> Self {
        if value.get("result").is_some() {
            Self::Library
        } else {
            Self::Document
        }
    }

    fn path_keys(&self) -> &'static [&'static str] {
        match self {
            Self::Library => &["path"],
            Self::Document => &["path", "file"],
        }
    }

    fn rule_keys(&self) -> &'static [&'static str] {
        match self {
            Self::Library => &["code"],
            Self::Document => &["code", "rule"],
        }
    }

    fn column_base(&self) -> u32 {
        match self {
            Self::Library => 0,
            Self::Document => 1,
        }
    }
}

/// Result of normalizing one raw report.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalization {
    /// Detected report layout.
    pub shape: ReportShape,
    /// Aggregate score, clamped to `0..=100`.
    pub score: f64,
    /// One report per distinct file, in first-seen order.
    pub reports: Vec<FileReport>,
    /// Number of fields or entries that fell back to a default.
    pub degraded: usize,
}

/// Normalizes a raw report into file reports keyed under `root`.
pub fn normalize(raw: &RawReport, root: &Path) -> Vec<FileReport> {
    normalize_with_stats(raw, root).reports
}

/// Normalizes a raw report, also returning the score and degradation count.
pub fn normalize_with_stats(raw: &RawReport, root: &Path) -> Normalization {
    let value = raw.value();
    let shape = ReportShape::detect(value);
    let body = match shape {
        ReportShape::Library => &value["result"],
        ReportShape::Document => value,
    };

    let mut degraded = 0;
    let root = normalize_lexically(root);

    let score = match body.get("score").and_then(read_f64) {
        Some(score) => score.clamp(0.0, 100.0),
        None => {
            degraded += 1;
            0.0
        }
    };

    let mut reports: Vec<FileReport> = Vec::new();
    let mut index: HashMap<FileId, usize> = HashMap::new();

    let files: &[Value] = match body.get("files").and_then(Value::as_array) {
        Some(files) => files.as_slice(),
        None => {
            degraded += 1;
            &[]
        }
    };

    for entry in files {
        let Some(raw_path) = first_str(entry, shape.path_keys()) else {
            degraded += 1;
            continue;
        };

        let (id, path) = canonical_identity(raw_path, &root);
        let issues = extract_issues(entry, shape, &mut degraded);

        match index.get(&id) {
            Some(&pos) => reports[pos].issues.extend(issues),
            None => {
                index.insert(id.clone(), reports.len());
                reports.push(FileReport {
                    id,
                    path,
                    score,
                    issues,
                });
            }
        }
    }

    debug!(
        "Normalized {:?} report: {} files, {} degraded fields",
        shape,
        reports.len(),
        degraded
    );

    Normalization {
        shape,
        score,
        reports,
        degraded,
    }
}

/// Computes the store key and the root-relative identity of a reported path.
///
/// Relative paths are resolved against `root`. Paths outside `root` keep a
/// `../` relative form and their own absolute key.
pub fn canonical_identity(raw_path: &str, root: &Path) -> (FileId, FileId) {
    let cleaned = raw_path.replace('\\', "/");
    let candidate = Path::new(&cleaned);

    let absolute = if candidate.is_absolute() {
        normalize_lexically(candidate)
    } else {
        normalize_lexically(&root.join(candidate))
    };
    let root = normalize_lexically(root);

    let relative: PathBuf = match absolute.strip_prefix(&root) {
        Ok(rel) => rel.to_path_buf(),
        Err(_) => pathdiff::diff_paths(&absolute, &root).unwrap_or_else(|| absolute.clone()),
    };

    (FileId::from_path(&absolute), FileId::from_path(relative))
}

fn extract_issues(entry: &Value, shape: ReportShape, degraded: &mut usize) -> Vec<IssueRecord> {
    let Some(items) = entry.get("issues").and_then(Value::as_array) else {
        *degraded += 1;
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            if !item.is_object() {
                *degraded += 1;
                return None;
            }
            Some(extract_issue(item, shape, degraded))
        })
        .collect()
}

fn extract_issue(item: &Value, shape: ReportShape, degraded: &mut usize) -> IssueRecord {
    let line = match item.get("line") {
        Some(v) => read_u32(v).unwrap_or_else(|| {
            *degraded += 1;
            0
        }),
        None => {
            *degraded += 1;
            0
        }
    };

    let column = match item.get("column") {
        Some(Value::Null) | None => 0,
        Some(v) => match read_u32(v) {
            Some(col) => col.saturating_sub(shape.column_base()),
            None => {
                *degraded += 1;
                0
            }
        },
    };

    let severity = match item.get("severity").and_then(Value::as_str).and_then(Severity::parse) {
        Some(severity) => severity,
        None => {
            *degraded += 1;
            Severity::Hint
        }
    };

    let message = match item.get("message").and_then(Value::as_str) {
        Some(message) if !message.trim().is_empty() => message.to_string(),
        _ => {
            *degraded += 1;
            MISSING_MESSAGE.to_string()
        }
    };

    let rule_id = shape
        .rule_keys()
        .iter()
        .find_map(|key| match item.get(*key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_default();

    IssueRecord {
        line,
        column,
        severity,
        message,
        rule_id,
    }
}

fn first_str<'a>(entry: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| entry.get(*key).and_then(Value::as_str))
        .filter(|s| !s.trim().is_empty())
}

/// Reads a non-negative integer, clamping negatives to 0.
fn read_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Some(u.min(u64::from(u32::MAX)) as u32)
            } else if n.as_i64().is_some() {
                Some(0)
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite())
                    .map(|f| f.max(0.0).min(f64::from(u32::MAX)) as u32)
            }
        }
        Value::String(s) => s.trim().parse::<u64>().ok().map(|u| u.min(u64::from(u32::MAX)) as u32),
        _ => None,
    }
}

fn read_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}
