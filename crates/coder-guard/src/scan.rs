use crate::RepoRoot;
use ignore::WalkBuilder;
use std::path::PathBuf;
use std::time::SystemTime;

/// Bounded count of files returned by the suspicious-success fallback scan
/// as a fallback when heuristic path extraction finds nothing.
pub const RECENT_SCAN_LIMIT: usize = 10;

/// Walk `root` (excluding hidden directories and the per-repo internal
/// directory) and return up to [`RECENT_SCAN_LIMIT`] files whose mtime is
/// after `since`, most-recently-modified first.
///
/// Used only as a fallback when the heuristic path extraction found no
/// verifiable touched paths but the CLI output contained action-intent
/// keywords.
pub fn recently_modified(root: &RepoRoot, since: SystemTime) -> Vec<PathBuf> {
    let mut builder = WalkBuilder::new(root.as_path());
    builder.hidden(true);
    builder.git_ignore(true);
    builder.git_global(true);
    builder.git_exclude(true);
    builder.parents(true);
    builder.filter_entry(|entry| entry.file_name() != ".ninja");

    let mut candidates: Vec<(SystemTime, PathBuf)> = Vec::new();

    for entry in builder.build() {
        let Ok(entry) = entry else { continue };
        let Some(file_type) = entry.file_type() else {
            continue;
        };
        if !file_type.is_file() {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        let Ok(modified) = metadata.modified() else {
            continue;
        };
        if modified <= since {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root.as_path()) else {
            continue;
        };
        candidates.push((modified, relative.to_path_buf()));
    }

    candidates.sort_by(|a, b| b.0.cmp(&a.0));
    candidates
        .into_iter()
        .take(RECENT_SCAN_LIMIT)
        .map(|(_, path)| path)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate_repo_root;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn finds_only_files_modified_after_since() {
        let dir = tempdir().unwrap();
        let root = validate_repo_root(dir.path()).unwrap();

        std::fs::write(dir.path().join("old.txt"), "old").unwrap();
        let since = SystemTime::now();
        std::thread::sleep(Duration::from_millis(20));
        std::fs::write(dir.path().join("new.txt"), "new").unwrap();

        let found = recently_modified(&root, since);
        assert_eq!(found, vec![PathBuf::from("new.txt")]);
    }

    #[test]
    fn excludes_internal_directory() {
        let dir = tempdir().unwrap();
        let root = validate_repo_root(dir.path()).unwrap();
        let since = SystemTime::now() - Duration::from_secs(1);

        std::fs::create_dir_all(dir.path().join(".ninja/logs")).unwrap();
        std::fs::write(dir.path().join(".ninja/logs/x.jsonl"), "{}").unwrap();
        std::fs::write(dir.path().join("visible.txt"), "v").unwrap();

        let found = recently_modified(&root, since);
        assert_eq!(found, vec![PathBuf::from("visible.txt")]);
    }

    #[test]
    fn caps_at_scan_limit() {
        let dir = tempdir().unwrap();
        let root = validate_repo_root(dir.path()).unwrap();
        let since = SystemTime::now() - Duration::from_secs(1);

        for i in 0..(RECENT_SCAN_LIMIT + 5) {
            std::fs::write(dir.path().join(format!("f{i}.txt")), "x").unwrap();
        }

        let found = recently_modified(&root, since);
        assert_eq!(found.len(), RECENT_SCAN_LIMIT);
    }
}
