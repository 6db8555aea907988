//! # yamldoctor_core
//!
//! Diagnostic aggregation and reconciliation engine for YAML Doctor.
//!
//! This crate provides:
//! - The positioned issue model (`IssueRecord`, `FileReport`)
//! - Normalization of heterogeneous analyzer reports
//! - The process-wide `DiagnosticStore`
//! - The `AnalysisSession` orchestrator
//! - Configuration loading
//!
//! ## Example
//!
//! ```rust,ignore
//! use yamldoctor_core::{AnalysisScope, AnalysisSession, DiagnosticStore, DoctorConfig};
//!
//! let config = DoctorConfig::from_file(".yamldoctor.json")?;
//! let analyzer = config.analyzer_backend()?;
//! let store = DiagnosticStore::new();
//!
//! let session = AnalysisSession::new(&store, vec!["/repo".into()]);
//! let outcome = session.run(AnalysisScope::Directory("/repo/k8s".into()), &analyzer).await;
//! println!("{:?}", store.diagnostics(&"/repo/k8s/deploy.yaml".into()));
//! ```

mod config;
mod error;
mod identity;
mod issue;
mod locks;
pub mod normalizer;
mod scope;
mod session;
mod store;

pub use config::{AnalyzerKind, ContainerConfig, DoctorConfig};
pub use error::DoctorError;
pub use identity::{FileId, normalize_lexically};
pub use issue::{FileReport, IssueRecord, Severity};
pub use locks::RootLocks;
pub use normalizer::{Normalization, ReportShape, normalize, normalize_with_stats};
pub use scope::AnalysisScope;
pub use session::{AnalysisOutcome, AnalysisSession, AnalysisSummary};
pub use store::{DiagnosticStore, StoreEvent};

pub use yamldoctor_analyzer::{
    Analyzer, AnalyzerBackend, AnalyzerError, AnalyzerErrorKind, RawReport,
};
