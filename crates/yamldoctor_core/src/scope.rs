//! Analysis scopes.

use std::fs;
use std::path::{Path, PathBuf};

use crate::DoctorError;

/// The unit of an analysis request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisScope {
    /// One file; the analyzer runs over its containing workspace root.
    SingleFile(PathBuf),
    /// A directory subtree.
    Directory(PathBuf),
    /// Workspace roots in configured order. Only the first is analyzed.
    Workspace(Vec<PathBuf>),
}

impl AnalysisScope {
    /// Picks `SingleFile` or `Directory` by looking at what `target` is.
    pub fn for_target(target: impl AsRef<Path>) -> Result<Self, DoctorError> {
        let target = target.as_ref();
        let metadata =
            fs::metadata(target).map_err(|_| DoctorError::TargetNotFound(target.to_path_buf()))?;

        if metadata.is_dir() {
            Ok(Self::Directory(target.to_path_buf()))
        } else if metadata.is_file() {
            Ok(Self::SingleFile(target.to_path_buf()))
        } else {
            Err(DoctorError::TargetNotFound(target.to_path_buf()))
        }
    }

    /// Returns a short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SingleFile(_) => "file",
            Self::Directory(_) => "directory",
            Self::Workspace(_) => "workspace",
        }
    }
}
