//! ChangeEvent entity - one raw filesystem notification
//!
//! Produced by the filesystem notifier, consumed by the debouncer and then
//! discarded.

use std::path::{Path, PathBuf};
use std::time::Instant;

/// What happened to a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Modified,
    Removed,
}

/// A timestamped change to a single path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    path: PathBuf,
    kind: ChangeKind,
    at: Instant,
}

impl ChangeEvent {
    /// Create an event stamped with the current instant
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self::at(path, kind, Instant::now())
    }

    /// Create an event with an explicit timestamp
    pub fn at(path: impl Into<PathBuf>, kind: ChangeKind, at: Instant) -> Self {
        Self {
            path: path.into(),
            kind,
            at,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    pub fn timestamp(&self) -> Instant {
        self.at
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }
}
