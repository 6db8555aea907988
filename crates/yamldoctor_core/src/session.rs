//! Analysis orchestration.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::normalizer::normalize_with_stats;
use crate::{
    Analyzer, AnalysisScope, DiagnosticStore, DoctorError, FileId, FileReport, RootLocks,
    normalize_lexically,
};

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSummary {
    /// The root the analyzer ran over.
    pub root: PathBuf,
    /// Aggregate score reported by the analyzer.
    pub score: f64,
    /// Files whose entries were published.
    pub files: Vec<FileId>,
    /// Fields that fell back to defaults during normalization.
    pub degraded: usize,
}

impl AnalysisSummary {
    /// Number of files analyzed.
    pub fn files_analyzed(&self) -> usize {
        self.files.len()
    }
}

/// Result of [`AnalysisSession::run`].
#[derive(Debug)]
pub enum AnalysisOutcome {
    /// The analyzer succeeded and the store was updated.
    Completed(AnalysisSummary),
    /// The run failed and the store was left untouched.
    Failed(DoctorError),
}

impl AnalysisOutcome {
    /// Returns true for `Failed`.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Converts the outcome into a `Result`.
    pub fn into_result(self) -> Result<AnalysisSummary, DoctorError> {
        match self {
            Self::Completed(summary) => Ok(summary),
            Self::Failed(err) => Err(err),
        }
    }
}

/// What a scope resolved to.
#[derive(Debug)]
struct RunPlan {
    root: PathBuf,
    /// Set for `SingleFile`: the only entry to publish.
    target: Option<FileId>,
}

/// Runs analyses and publishes their results into a [`DiagnosticStore`].
#[derive(Debug)]
pub struct AnalysisSession<'a> {
    store: &'a DiagnosticStore,
    workspace_roots: Vec<PathBuf>,
}

impl<'a> AnalysisSession<'a> {
    /// Creates a session publishing into `store`.
    ///
    /// `workspace_roots` are used to find the containing root of a single
    /// file.
    pub fn new(store: &'a DiagnosticStore, workspace_roots: Vec<PathBuf>) -> Self {
        Self {
            store,
            workspace_roots,
        }
    }

    /// Runs one analysis.
    ///
    /// Failures are returned as [`AnalysisOutcome::Failed`]; the store is
    /// only written after the analyzer succeeded.
    pub async fn run<A: Analyzer>(&self, scope: AnalysisScope, analyzer: &A) -> AnalysisOutcome {
        match self.resolve(&scope) {
            Ok(plan) => self.execute(&scope, plan, analyzer).await,
            Err(err) => {
                warn!("Rejected {} analysis: {}", scope.kind(), err);
                AnalysisOutcome::Failed(err)
            }
        }
    }

    /// Like [`run`](Self::run), holding the root's lock for the whole run.
    pub async fn run_exclusive<A: Analyzer>(
        &self,
        scope: AnalysisScope,
        analyzer: &A,
        locks: &RootLocks,
    ) -> AnalysisOutcome {
        let plan = match self.resolve(&scope) {
            Ok(plan) => plan,
            Err(err) => {
                warn!("Rejected {} analysis: {}", scope.kind(), err);
                return AnalysisOutcome::Failed(err);
            }
        };

        let _guard = locks.acquire(&FileId::from_path(&plan.root)).await;
        self.execute(&scope, plan, analyzer).await
    }

    async fn execute<A: Analyzer>(
        &self,
        scope: &AnalysisScope,
        plan: RunPlan,
        analyzer: &A,
    ) -> AnalysisOutcome {
        info!(
            "Analyzing {} with {} analyzer: {}",
            scope.kind(),
            analyzer.name(),
            plan.root.display()
        );

        let raw = match analyzer.analyze(&plan.root).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!("Analysis of {} failed: {}", plan.root.display(), err);
                return AnalysisOutcome::Failed(err.into());
            }
        };

        let normalized = normalize_with_stats(&raw, &plan.root);
        drop(raw);

        if normalized.degraded > 0 {
            warn!(
                "{} report fields were malformed and replaced with defaults",
                normalized.degraded
            );
        }

        let score = normalized.score;
        let files = match plan.target {
            Some(target) => {
                let report = normalized
                    .reports
                    .into_iter()
                    .find(|r| r.id == target)
                    .unwrap_or_else(|| {
                        debug!("No entry for {} in report, treating as clean", target);
                        let path = relative_to(&target, &plan.root);
                        FileReport::clean(target.clone(), path, score)
                    });
                self.store.replace(target.clone(), report);
                vec![target]
            }
            None => {
                let ids: Vec<FileId> = normalized.reports.iter().map(|r| r.id.clone()).collect();
                self.store
                    .replace_many(normalized.reports.into_iter().map(|r| (r.id.clone(), r)));
                ids
            }
        };

        self.store.set_root_score(FileId::from_path(&plan.root), score);

        info!(
            "Analysis complete. Score: {}/100 ({} files)",
            score,
            files.len()
        );

        AnalysisOutcome::Completed(AnalysisSummary {
            root: plan.root,
            score,
            files,
            degraded: normalized.degraded,
        })
    }

    /// Resolves a scope to the root the analyzer should run over.
    fn resolve(&self, scope: &AnalysisScope) -> Result<RunPlan, DoctorError> {
        match scope {
            AnalysisScope::SingleFile(path) => {
                if !path.is_file() {
                    return Err(DoctorError::TargetNotFound(path.clone()));
                }
                let file = absolute(path)?;
                let root = self
                    .containing_root(&file)?
                    .ok_or_else(|| DoctorError::NoWorkspace(path.clone()))?;
                Ok(RunPlan {
                    root,
                    target: Some(FileId::from_path(&file)),
                })
            }
            AnalysisScope::Directory(path) => {
                if !path.is_dir() {
                    return Err(DoctorError::TargetNotFound(path.clone()));
                }
                Ok(RunPlan {
                    root: absolute(path)?,
                    target: None,
                })
            }
            AnalysisScope::Workspace(roots) => {
                // Only the primary root is analyzed.
                let first = roots.first().ok_or(DoctorError::EmptyWorkspace)?;
                if roots.len() > 1 {
                    debug!("Ignoring {} additional workspace roots", roots.len() - 1);
                }
                if !first.is_dir() {
                    return Err(DoctorError::TargetNotFound(first.clone()));
                }
                Ok(RunPlan {
                    root: absolute(first)?,
                    target: None,
                })
            }
        }
    }

    /// Returns the deepest workspace root containing `file`.
    fn containing_root(&self, file: &Path) -> Result<Option<PathBuf>, DoctorError> {
        let mut best: Option<PathBuf> = None;
        for root in &self.workspace_roots {
            let root = absolute(root)?;
            if file.starts_with(&root)
                && best
                    .as_ref()
                    .is_none_or(|b| root.components().count() > b.components().count())
            {
                best = Some(root);
            }
        }
        Ok(best)
    }
}

fn absolute(path: &Path) -> Result<PathBuf, DoctorError> {
    Ok(normalize_lexically(&std::path::absolute(path)?))
}

fn relative_to(id: &FileId, root: &Path) -> FileId {
    match id.as_path().strip_prefix(root) {
        Ok(rel) => FileId::from_path(rel),
        Err(_) => id.clone(),
    }
}
