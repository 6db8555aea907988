//! Canonical file identities.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A normalized, `/`-separated path string used as a stable key.
///
/// Two spellings of the same path (`a/./b.yaml`, `a/x/../b.yaml`,
/// `a\b.yaml`) produce the same `FileId`. Normalization is purely lexical;
/// symlinks are not resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    /// Builds an identity from a path.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let normalized = normalize_lexically(path.as_ref());
        let mut out = String::new();

        for component in normalized.components() {
            match component {
                Component::Prefix(prefix) => {
                    out.push_str(&prefix.as_os_str().to_string_lossy().replace('\\', "/"));
                }
                Component::RootDir => out.push('/'),
                Component::CurDir => {}
                Component::ParentDir | Component::Normal(_) => {
                    if !out.is_empty() && !out.ends_with('/') {
                        out.push('/');
                    }
                    out.push_str(&component.as_os_str().to_string_lossy());
                }
            }
        }

        if out.is_empty() {
            out.push('.');
        }

        Self(out)
    }

    /// Builds an identity from a path string that may use `\` separators.
    pub fn from_raw(raw: &str) -> Self {
        Self::from_path(raw.replace('\\', "/"))
    }

    /// Returns the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the identity as a path.
    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// Returns true if this identity is relative and escapes its root.
    pub fn is_outside_root(&self) -> bool {
        self.0 == ".." || self.0.starts_with("../")
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileId {
    fn from(raw: &str) -> Self {
        Self::from_raw(raw)
    }
}

impl From<&Path> for FileId {
    fn from(path: &Path) -> Self {
        Self::from_path(path)
    }
}

impl From<PathBuf> for FileId {
    fn from(path: PathBuf) -> Self {
        Self::from_path(path)
    }
}

/// Resolves `.` and `..` components without touching the filesystem.
///
/// A `..` that would climb above the root of an absolute path is dropped;
/// leading `..` components of a relative path are kept.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    parts.iter().map(|c| c.as_os_str()).collect()
}
