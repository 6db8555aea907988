//! JSON output formatter

use miette::{IntoDiagnostic, Result};
use yamldoctor_core::{AnalysisSummary, FileReport};

pub fn output_json(summary: &AnalysisSummary, reports: &[FileReport]) -> Result<()> {
    let files: Vec<_> = reports
        .iter()
        .map(|r| {
            serde_json::json!({
                "path": r.path,
                "issues": r.issues,
            })
        })
        .collect();

    let output = serde_json::json!({
        "root": summary.root.display().to_string(),
        "score": summary.score,
        "files": files,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&output).into_diagnostic()?
    );
    Ok(())
}
