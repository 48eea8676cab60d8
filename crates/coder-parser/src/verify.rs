use coder_guard::RepoRoot;
use std::path::PathBuf;
use std::time::SystemTime;

/// Resolve each suspected path relative to `root`, keeping only paths that
/// actually exist. If nothing survives and `action_intent` is set, fall
/// back to a recently-modified-file scan so a CLI that never echoed a
/// path back still gets credit for files it touched.
pub fn verify_touched_paths(
    root: &RepoRoot,
    suspected: &[String],
    action_intent: bool,
    started_at: SystemTime,
) -> Vec<String> {
    let verified: Vec<String> = suspected
        .iter()
        .filter(|path| root.as_path().join(path).exists())
        .cloned()
        .collect();

    if !verified.is_empty() || !action_intent {
        return verified;
    }

    // Small slack to tolerate clock-resolution and write-then-stat skew.
    let since = started_at
        .checked_sub(std::time::Duration::from_secs(2))
        .unwrap_or(started_at);
    coder_guard::recently_modified(root, since)
        .into_iter()
        .map(path_to_forward_slash_string)
        .collect()
}

fn path_to_forward_slash_string(path: PathBuf) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// The suspicious-success guard: a clean exit with no verified touched
/// paths but clear action-intent language is not actually a success.
pub fn suspicious_success(exit_code: i32, verified_paths: &[String], action_intent: bool) -> bool {
    exit_code == 0 && verified_paths.is_empty() && action_intent
}

/// Pick the last non-blank line of `output` if it reads like a short
/// sentence (ends in terminal punctuation, under a generous length cap);
/// otherwise fall back to a canned summary.
pub fn summarize(output: &str, success: bool) -> String {
    if success {
        if let Some(candidate) = last_sentence_like_line(output) {
            return candidate;
        }
        return "Task completed successfully".to_string();
    }
    "Task failed".to_string()
}

fn last_sentence_like_line(output: &str) -> Option<String> {
    let line = output.lines().rev().find(|l| !l.trim().is_empty())?.trim();
    let looks_sentence = line.len() <= 200
        && (line.ends_with('.') || line.ends_with('!') || line.ends_with('?'))
        && line.chars().next().map(|c| c.is_alphabetic()).unwrap_or(false);
    looks_sentence.then(|| line.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use coder_guard::validate_repo_root;
    use tempfile::tempdir;

    #[test]
    fn keeps_only_existing_paths() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "x").unwrap();
        let root = validate_repo_root(dir.path()).unwrap();
        let verified = verify_touched_paths(
            &root,
            &["a.txt".to_string(), "missing.txt".to_string()],
            false,
            SystemTime::now(),
        );
        assert_eq!(verified, vec!["a.txt".to_string()]);
    }

    #[test]
    fn falls_back_to_recent_scan_when_empty_and_action_intent() {
        let dir = tempdir().unwrap();
        let root = validate_repo_root(dir.path()).unwrap();
        let started_at = SystemTime::now();
        std::thread::sleep(std::time::Duration::from_millis(20));
        std::fs::write(dir.path().join("new.txt"), "x").unwrap();

        let verified = verify_touched_paths(&root, &[], true, started_at - std::time::Duration::from_secs(3));
        assert_eq!(verified, vec!["new.txt".to_string()]);
    }

    #[test]
    fn no_fallback_without_action_intent() {
        let dir = tempdir().unwrap();
        let root = validate_repo_root(dir.path()).unwrap();
        std::fs::write(dir.path().join("new.txt"), "x").unwrap();
        let verified = verify_touched_paths(&root, &[], false, SystemTime::now());
        assert!(verified.is_empty());
    }

    #[test]
    fn suspicious_success_flags_clean_exit_with_no_touched_files() {
        assert!(suspicious_success(0, &[], true));
        assert!(!suspicious_success(0, &["a.txt".to_string()], true));
        assert!(!suspicious_success(0, &[], false));
        assert!(!suspicious_success(1, &[], true));
    }

    #[test]
    fn summary_prefers_last_sentence_like_line() {
        let output = "some log line\nAll done, tests pass.";
        assert_eq!(summarize(output, true), "All done, tests pass.");
    }

    #[test]
    fn summary_falls_back_when_last_line_is_not_sentence_like() {
        let output = "some log line\n42";
        assert_eq!(summarize(output, true), "Task completed successfully");
    }

    #[test]
    fn failed_summary_is_canned() {
        assert_eq!(summarize("whatever", false), "Task failed");
    }
}
