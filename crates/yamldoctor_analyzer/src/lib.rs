//! # yamldoctor_analyzer
//!
//! Analyzer backends for YAML Doctor.
//!
//! An analyzer takes a root directory and returns a [`RawReport`]: an
//! aggregate score plus per-file issue lists in whatever shape the backend
//! produces. Two interchangeable backends exist:
//!
//! - [`EmbeddedAnalyzer`]: runs a [`ScanEngine`] in-process
//! - [`ContainerAnalyzer`]: runs the YAML Doctor CLI inside a container and
//!   reads the JSON report it leaves under the root
//!
//! [`AnalyzerBackend`] selects one of them at startup.

mod analyzer;
mod container;
mod embedded;
pub mod engine;
mod error;
mod report;

pub use analyzer::{Analyzer, AnalyzerBackend};
pub use container::{ContainerAnalyzer, ContainerOptions, MOUNT_POINT};
pub use embedded::EmbeddedAnalyzer;
pub use engine::{BasicEngine, ScanEngine, ScanResult, ScannedFile, ScannedIssue};
pub use error::{AnalyzerError, AnalyzerErrorKind};
pub use report::RawReport;
