//! Output formatting module

mod json;
mod text;

use miette::Result;
use yamldoctor_core::{AnalysisSummary, FileReport};

use crate::cli::OutputFormat;

/// Prints the results and returns true when any error issue was found.
pub fn output_results(
    summary: &AnalysisSummary,
    reports: &[FileReport],
    format: OutputFormat,
) -> Result<bool> {
    let has_errors = reports.iter().any(|r| r.has_errors());

    match format {
        OutputFormat::Json => json::output_json(summary, reports)?,
        OutputFormat::Text => text::output_text(summary, reports),
    }

    Ok(has_errors)
}
