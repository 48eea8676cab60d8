//! Repo-root validation and glob allow/deny enforcement.
//!
//! Nothing here talks to a subprocess; this crate only ever canonicalizes
//! paths, matches globs, and walks a directory tree.

mod error;
mod globs;
mod scan;

pub use error::GuardError;
pub use scan::{recently_modified, RECENT_SCAN_LIMIT};

use std::path::{Component, Path, PathBuf};

/// Entries that are never writable regardless of `allowed_globs`.
pub const BUILTIN_DENY: &[&str] = &[".git/**", ".ninja/**", ".DS_Store", "**/.DS_Store"];

/// A canonicalized, existing directory that anchors every path in a
/// request. Constructed once per request via [`validate_repo_root`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRoot(PathBuf);

impl RepoRoot {
    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl AsRef<Path> for RepoRoot {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// Canonicalize `path` and confirm it is an existing directory with no
/// unresolved parent-traversal components.
///
/// This is the sole constructor for [`RepoRoot`]; every returned path in a
/// response is guaranteed to resolve within it (or be an explicit config
/// path).
pub fn validate_repo_root(path: &Path) -> Result<RepoRoot, GuardError> {
    let canonical = path
        .canonicalize()
        .map_err(|source| GuardError::InvalidPath {
            path: path.to_path_buf(),
            reason: source.to_string(),
        })?;
    if !canonical.is_dir() {
        return Err(GuardError::InvalidPath {
            path: path.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }
    Ok(RepoRoot(canonical))
}

/// `true` iff `candidate` canonicalizes to a path inside `root`.
///
/// Both sides are canonicalized, so a symlink that resolves outside `root`
/// is treated as outside even if its un-resolved path lives under `root`
/// (see `DESIGN.md`, Open Question 2).
pub fn is_within(candidate: &Path, root: &RepoRoot) -> bool {
    let Ok(canonical_candidate) = candidate.canonicalize() else {
        return false;
    };
    canonical_candidate.starts_with(root.as_path())
}

/// `true` iff `path` contains no `..` component — a cheap pre-canonicalize
/// guard used before a file necessarily exists yet (e.g. a claimed write
/// target that has not been created).
pub fn has_parent_traversal(path: &Path) -> bool {
    path.components()
        .any(|c| matches!(c, Component::ParentDir))
}

/// Per-step glob policy: a write to `relative_path` (repo-root-relative,
/// `/`-separated) is permitted iff it matches at least one
/// `allowed_globs` pattern (or `allowed_globs` is empty, meaning
/// unrestricted), and matches none of `deny_globs` or [`BUILTIN_DENY`].
pub struct GlobPolicy<'a> {
    pub allowed_globs: &'a [String],
    pub deny_globs: &'a [String],
}

impl<'a> GlobPolicy<'a> {
    pub fn is_allowed(&self, relative_path: &str) -> bool {
        globs::is_allowed(relative_path, self.allowed_globs, self.deny_globs)
    }
}

/// Creates the per-repo hidden directory (`.ninja/{logs,tasks,metadata}`)
/// with restrictive permissions, if it does not already exist.
pub fn ensure_internal_dirs(root: &RepoRoot) -> Result<PathBuf, GuardError> {
    let internal = root.as_path().join(".ninja");
    for sub in ["logs", "tasks", "metadata"] {
        let dir = internal.join(sub);
        std::fs::create_dir_all(&dir).map_err(|source| GuardError::Io {
            path: dir.clone(),
            source,
        })?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o700)).map_err(
                |source| GuardError::Io {
                    path: dir.clone(),
                    source,
                },
            )?;
        }
    }
    Ok(internal)
}
