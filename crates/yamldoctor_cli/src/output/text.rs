//! Text output formatter

use yamldoctor_core::{AnalysisSummary, FileReport, Severity};

pub fn output_text(summary: &AnalysisSummary, reports: &[FileReport]) {
    for report in reports {
        if report.is_clean() {
            continue;
        }

        println!("\n{}:", report.path);
        for issue in &report.issues {
            if issue.rule_id.is_empty() {
                println!(
                    "  {}:{} {}: {}",
                    issue.line, issue.column, issue.severity, issue.message
                );
            } else {
                println!(
                    "  {}:{} {} [{}]: {}",
                    issue.line, issue.column, issue.severity, issue.rule_id, issue.message
                );
            }
        }
    }

    let total_issues: usize = reports.iter().map(|r| r.issues.len()).sum();
    let errors: usize = reports.iter().map(|r| r.count(Severity::Error)).sum();
    let warnings: usize = reports.iter().map(|r| r.count(Severity::Warning)).sum();

    println!();
    println!(
        "Checked {} files, found {} issues ({} errors, {} warnings)",
        reports.len(),
        total_issues,
        errors,
        warnings
    );
    println!("Analysis complete. Score: {}/100", summary.score);
}
