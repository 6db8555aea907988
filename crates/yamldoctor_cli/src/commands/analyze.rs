//! Analyze and workspace command implementations

use std::path::{Path, PathBuf};

use miette::{IntoDiagnostic, Result};
use tracing::info;
use yamldoctor_core::{
    AnalysisScope, AnalysisSession, AnalyzerKind, DiagnosticStore, DoctorConfig, FileReport,
};

use crate::cli::{AnalyzerArg, Cli, OutputFormat};
use crate::output::output_results;
use crate::utils::create_tokio_runtime;

/// Analyzes one file or directory. Returns true when error issues were found.
pub fn run_analyze(
    cli: &Cli,
    target: &Path,
    roots: &[PathBuf],
    format: OutputFormat,
) -> Result<bool> {
    let roots = if roots.is_empty() {
        vec![std::env::current_dir().into_diagnostic()?]
    } else {
        roots.to_vec()
    };

    let scope = AnalysisScope::for_target(target).into_diagnostic()?;
    run_scope(cli, scope, roots, format)
}

/// Analyzes the primary workspace root.
pub fn run_workspace(cli: &Cli, roots: &[PathBuf], format: OutputFormat) -> Result<bool> {
    let scope = AnalysisScope::Workspace(roots.to_vec());
    run_scope(cli, scope, roots.to_vec(), format)
}

fn run_scope(
    cli: &Cli,
    scope: AnalysisScope,
    roots: Vec<PathBuf>,
    format: OutputFormat,
) -> Result<bool> {
    let config_dir = roots.first().cloned().unwrap_or_else(|| PathBuf::from("."));
    let config = load_config(cli, &config_dir)?;
    let analyzer = config.analyzer_backend().into_diagnostic()?;

    let store = DiagnosticStore::new();
    let session = AnalysisSession::new(&store, roots);

    let summary = create_tokio_runtime()?
        .block_on(session.run(scope, &analyzer))
        .into_result()
        .into_diagnostic()?;

    let reports: Vec<FileReport> = summary
        .files
        .iter()
        .filter_map(|id| store.get(id))
        .collect();

    output_results(&summary, &reports, format)
}

/// Loads `--config`, else the config discovered in `dir`, else defaults.
pub fn load_config(cli: &Cli, dir: &Path) -> Result<DoctorConfig> {
    let mut config = match &cli.config {
        Some(path) => DoctorConfig::from_file(path).into_diagnostic()?,
        None => match DoctorConfig::discover(dir) {
            Some(path) => {
                info!("Using config: {}", path.display());
                DoctorConfig::from_file(&path).into_diagnostic()?
            }
            None => {
                info!("No config file found, using defaults");
                DoctorConfig::new()
            }
        },
    };

    if let Some(analyzer) = cli.analyzer {
        config.analyzer = match analyzer {
            AnalyzerArg::Embedded => AnalyzerKind::Embedded,
            AnalyzerArg::Container => AnalyzerKind::Container,
        };
    }

    Ok(config)
}
