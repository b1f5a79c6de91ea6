//! Ignore policy value object
//!
//! Decides which changed paths never reach the debouncer. Build output has to
//! be filtered here, otherwise every build would trigger the next one.
//! Matching uses gitignore semantics via the `ignore` crate.

use std::path::{Component, Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use thiserror::Error;

/// Patterns ignored in every project
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    ".git/",
    "build/",
    "obj/",
    "*.o",
    "*.a",
    "*.d",
    "*.elf",
    "*.map",
    "*.swp",
    "*~",
    ".DS_Store",
];

/// Maximum number of user-supplied patterns
const MAX_PATTERNS: usize = 1000;

#[derive(Debug, Error)]
pub enum IgnoreError {
    #[error("invalid ignore pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("too many ignore patterns ({count}, limit {limit})")]
    TooManyPatterns { count: usize, limit: usize },

    #[error("failed to build ignore matcher: {0}")]
    BuildFailed(String),
}

/// Compiled ignore rules rooted at the project directory
#[derive(Debug, Clone)]
pub struct IgnorePolicy {
    root: PathBuf,
    matcher: Gitignore,
    pattern_count: usize,
}

impl IgnorePolicy {
    /// A policy that ignores nothing
    pub fn none(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            matcher: Gitignore::empty(),
            pattern_count: 0,
        }
    }

    /// Default patterns, `extra`, the artifact itself, and the project's
    /// `.gitignore` when present.
    pub fn for_project(
        root: &Path,
        extra: &[String],
        artifact: Option<&Path>,
    ) -> Result<Self, IgnoreError> {
        let mut patterns: Vec<String> = DEFAULT_IGNORE_PATTERNS
            .iter()
            .map(|p| p.to_string())
            .collect();
        patterns.extend(extra.iter().cloned());
        if let Some(pattern) = artifact.and_then(|a| artifact_pattern(root, a)) {
            patterns.push(pattern);
        }

        Self::from_patterns(root, &patterns, Some(&root.join(".gitignore")))
    }

    /// Exact patterns, no defaults
    pub fn from_patterns(
        root: &Path,
        patterns: &[String],
        gitignore: Option<&Path>,
    ) -> Result<Self, IgnoreError> {
        if patterns.len() > MAX_PATTERNS {
            return Err(IgnoreError::TooManyPatterns {
                count: patterns.len(),
                limit: MAX_PATTERNS,
            });
        }

        let mut builder = GitignoreBuilder::new(root);
        if let Some(path) = gitignore.filter(|p| p.is_file()) {
            // An unreadable .gitignore only loses its extra rules
            if let Some(err) = builder.add(path) {
                tracing::debug!(path = %path.display(), error = %err, "skipping .gitignore");
            }
        }

        let mut pattern_count = 0;
        for pattern in patterns {
            let trimmed = pattern.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            pattern_count += 1;
            builder
                .add_line(None, trimmed)
                .map_err(|e| IgnoreError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
        }

        let matcher = builder
            .build()
            .map_err(|e| IgnoreError::BuildFailed(e.to_string()))?;

        Ok(Self {
            root: root.to_path_buf(),
            matcher,
            pattern_count,
        })
    }

    /// Check whether a changed path should be dropped.
    ///
    /// Absolute paths outside the project root are never ignored.
    pub fn is_ignored(&self, path: &Path) -> bool {
        let Some(rel) = relative_to(&self.root, path) else {
            return false;
        };
        if rel.as_os_str().is_empty() {
            return false;
        }
        let is_dir = self.root.join(&rel).is_dir();
        self.matcher
            .matched_path_or_any_parents(&rel, is_dir)
            .is_ignore()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn pattern_count(&self) -> usize {
        self.pattern_count
    }
}

/// Anchored pattern for the artifact file, when it lives inside the project.
///
/// Only the file itself: sources often sit next to the artifact, and build
/// directories are covered by the defaults and the user's list.
fn artifact_pattern(root: &Path, artifact: &Path) -> Option<String> {
    let rel = relative_to(root, artifact)?;
    if rel.as_os_str().is_empty() {
        return None;
    }
    Some(format!("/{}", to_slash(&rel)))
}

/// Relative form of `path` under `root`; relative inputs are taken as-is.
fn relative_to(root: &Path, path: &Path) -> Option<PathBuf> {
    if path.is_relative() {
        let clean: PathBuf = path
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect();
        if clean.components().any(|c| matches!(c, Component::ParentDir)) {
            return None;
        }
        return Some(clean);
    }
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(rel.to_path_buf());
    }
    // notify reports canonical paths; the configured root may not be canonical
    let canonical_root = root.canonicalize().ok()?;
    path.strip_prefix(&canonical_root)
        .ok()
        .map(Path::to_path_buf)
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn default_patterns_ignore_objects_and_git() {
        let dir = tempdir().unwrap();
        let policy = IgnorePolicy::for_project(dir.path(), &[], None).unwrap();

        assert!(policy.is_ignored(&dir.path().join("main.o")));
        assert!(policy.is_ignored(&dir.path().join(".git/index")));
        assert!(policy.is_ignored(&dir.path().join("build/out/app.bin")));
        assert!(!policy.is_ignored(&dir.path().join("src/main.c")));
    }

    #[test]
    fn artifact_itself_is_ignored() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("dist/game.irx");
        let policy = IgnorePolicy::for_project(dir.path(), &[], Some(&artifact)).unwrap();

        assert!(policy.is_ignored(&artifact));
        assert!(!policy.is_ignored(&dir.path().join("src/dist.c")));
    }

    #[test]
    fn sources_next_to_artifact_are_watched() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("src/hello.elf");
        let policy = IgnorePolicy::for_project(dir.path(), &[], Some(&artifact)).unwrap();

        assert!(policy.is_ignored(&artifact));
        assert!(!policy.is_ignored(&dir.path().join("src/main.c")));
        assert!(!policy.is_ignored(&dir.path().join("src/gfx/sprite.h")));
    }

    #[test]
    fn extra_patterns_are_applied() {
        let dir = tempdir().unwrap();
        let policy =
            IgnorePolicy::for_project(dir.path(), &["*.log".to_string()], None).unwrap();
        assert!(policy.is_ignored(Path::new("make.log")));
    }

    #[test]
    fn project_gitignore_is_honored() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".gitignore"), "generated/\n").unwrap();
        let policy = IgnorePolicy::for_project(dir.path(), &[], None).unwrap();
        assert!(policy.is_ignored(&dir.path().join("generated/table.h")));
    }

    #[test]
    fn paths_outside_root_are_not_ignored() {
        let dir = tempdir().unwrap();
        let policy = IgnorePolicy::for_project(dir.path(), &[], None).unwrap();
        assert!(!policy.is_ignored(Path::new("/definitely/elsewhere/main.o")));
        assert!(!policy.is_ignored(Path::new("../sibling/main.o")));
    }

    #[test]
    fn none_ignores_nothing() {
        let policy = IgnorePolicy::none("/tmp/proj");
        assert!(!policy.is_ignored(Path::new("main.o")));
        assert_eq!(policy.pattern_count(), 0);
    }
}
