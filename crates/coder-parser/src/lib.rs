//! The shared CLI-output parsing pipeline: error-taxonomy detection,
//! structured-JSON extraction, heuristic touched-path extraction,
//! filesystem verification, and the suspicious-success guard.
//!
//! Every `coder-strategy` variant feeds its raw stdout/stderr through the
//! same pipeline here, supplying only its own CLI-specific heuristic
//! regex patterns as data. This crate never spawns a process or knows
//! about a specific CLI binary.

mod extract;
mod taxonomy;
mod verify;

pub use extract::{extract_structured_result, has_action_intent_keywords, heuristic_touched_paths};

use coder_core::{ErrorKind, PlanExecutionResult, TaskType};
use coder_guard::RepoRoot;
use std::time::SystemTime;

/// The common return shape every `CliStrategy::parse_output` call produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedOutput {
    pub success: bool,
    pub summary: String,
    pub notes: String,
    pub touched_paths: Vec<String>,
    pub error_kind: Option<ErrorKind>,
}

/// Run the full pipeline over one CLI invocation's raw output.
///
/// `cli_patterns` are the calling strategy's CLI-specific heuristic
/// regexes (see `coder-strategy::heuristic_patterns`); `started_at` is
/// when the subprocess was launched, used only by the recently-modified
/// fallback scan.
#[allow(clippy::too_many_arguments)]
pub fn parse_output(
    stdout: &str,
    stderr: &str,
    exit_code: i32,
    repo_root: &RepoRoot,
    task_type: TaskType,
    cli_patterns: &[&str],
    started_at: SystemTime,
) -> ParsedOutput {
    let combined = format!("{stdout}\n{stderr}");

    if exit_code != 0 {
        if let Some(detected) = taxonomy::detect(&combined) {
            tracing::warn!(
                ?task_type,
                error_kind = detected.error_kind.as_str(),
                "CLI run matched a known error taxonomy"
            );
            return ParsedOutput {
                success: false,
                summary: detected.summary,
                notes: "see the run's JSONL log for the raw CLI output".to_string(),
                touched_paths: Vec::new(),
                error_kind: Some(detected.error_kind),
            };
        }
    }

    let action_intent = has_action_intent_keywords(&combined);
    let suspected = heuristic_touched_paths(&combined, cli_patterns);
    let touched_paths = verify::verify_touched_paths(repo_root, &suspected, action_intent, started_at);

    if exit_code != 0 {
        return ParsedOutput {
            success: false,
            summary: "Task failed".to_string(),
            notes: format!("CLI exited with status {exit_code}"),
            touched_paths,
            error_kind: Some(ErrorKind::InternalError),
        };
    }

    let mut success = true;
    let mut notes = String::new();
    if verify::suspicious_success(exit_code, &touched_paths, action_intent) {
        success = false;
        notes = "check the run's log for what the CLI actually did".to_string();
        return ParsedOutput {
            success,
            summary: "Task completed but no files were modified".to_string(),
            notes,
            touched_paths,
            error_kind: None,
        };
    }

    let summary = verify::summarize(&combined, success);
    if notes.is_empty() {
        notes = format!("{} file(s) touched", touched_paths.len());
    }
    ParsedOutput {
        success,
        summary,
        notes,
        touched_paths,
        error_kind: None,
    }
}

/// Try to pull a full [`PlanExecutionResult`] out of `combined_output`'s
/// fenced JSON block, reconciling `files_modified` against what actually
/// exists on disk. `None` means no parseable block was found — the caller
/// (`coder-executor`) falls back to heuristic per-step reconstruction.
pub fn parse_plan_result(
    combined_output: &str,
    repo_root: &RepoRoot,
    started_at: SystemTime,
) -> Option<PlanExecutionResult> {
    let mut result = extract_structured_result(combined_output)?;
    let action_intent = has_action_intent_keywords(combined_output);
    result.files_modified = verify::verify_touched_paths(
        repo_root,
        &result.files_modified,
        action_intent,
        started_at,
    );
    Some(result)
}

/// Quick-task parsing: no fenced JSON is expected, just a short summary
/// plus whatever paths the heuristic extraction and filesystem
/// verification agree were actually touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleParseResult {
    pub summary: String,
    pub touched_paths: Vec<String>,
}

pub fn parse_simple_result(
    output: &str,
    repo_root: &RepoRoot,
    started_at: SystemTime,
) -> SimpleParseResult {
    let action_intent = has_action_intent_keywords(output);
    let suspected = heuristic_touched_paths(output, &[]);
    let touched_paths = verify::verify_touched_paths(repo_root, &suspected, action_intent, started_at);
    let success = !verify::suspicious_success(0, &touched_paths, action_intent);
    SimpleParseResult {
        summary: verify::summarize(output, success),
        touched_paths,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coder_guard::validate_repo_root;
    use tempfile::tempdir;

    fn root() -> (tempfile::TempDir, RepoRoot) {
        let dir = tempdir().unwrap();
        let root = validate_repo_root(dir.path()).unwrap();
        (dir, root)
    }

    #[test]
    fn nonzero_exit_with_known_taxonomy_short_circuits() {
        let (_dir, root) = root();
        let parsed = parse_output(
            "",
            "AuthenticationError: invalid token",
            1,
            &root,
            TaskType::QuickFix,
            &[],
            SystemTime::now(),
        );
        assert!(!parsed.success);
        assert_eq!(parsed.error_kind, Some(ErrorKind::AuthError));
    }

    #[test]
    fn nonzero_exit_without_known_taxonomy_is_generic_failure() {
        let (_dir, root) = root();
        let parsed = parse_output(
            "",
            "boom",
            1,
            &root,
            TaskType::QuickFix,
            &[],
            SystemTime::now(),
        );
        assert!(!parsed.success);
        assert_eq!(parsed.error_kind, Some(ErrorKind::InternalError));
    }

    #[test]
    fn zero_exit_with_verified_touch_is_success() {
        let (dir, root) = root();
        std::fs::write(dir.path().join("a.rs"), "fn main() {}").unwrap();
        let parsed = parse_output(
            "Applied edit to a.rs\nAll done.",
            "",
            0,
            &root,
            TaskType::QuickFix,
            &[r"(?i)Applied edit to ([^\s,]+)"],
            SystemTime::now(),
        );
        assert!(parsed.success);
        assert_eq!(parsed.touched_paths, vec!["a.rs".to_string()]);
        assert_eq!(parsed.summary, "All done.");
    }

    #[test]
    fn zero_exit_no_touched_files_but_action_intent_is_suspicious() {
        let (_dir, root) = root();
        let parsed = parse_output(
            "I modified the settings as requested.",
            "",
            0,
            &root,
            TaskType::QuickFix,
            &[],
            SystemTime::now(),
        );
        assert!(!parsed.success);
        assert_eq!(parsed.summary, "Task completed but no files were modified");
    }

    #[test]
    fn zero_exit_no_action_intent_is_plain_success() {
        let (_dir, root) = root();
        let parsed = parse_output("Nothing to do here.", "", 0, &root, TaskType::QuickFix, &[], SystemTime::now());
        assert!(parsed.success);
    }

    #[test]
    fn parse_plan_result_none_when_no_json_block() {
        let (_dir, root) = root();
        assert!(parse_plan_result("just plain text", &root, SystemTime::now()).is_none());
    }

    #[test]
    fn parse_plan_result_reconciles_files_modified_against_disk() {
        let (dir, root) = root();
        std::fs::write(dir.path().join("real.rs"), "x").unwrap();
        let output = r#"```json
{"overall_status":"success","steps":[{"id":"1","status":"ok","summary":"done","files_touched":["real.rs","ghost.rs"]}],"files_modified":["real.rs","ghost.rs"],"notes":"","execution_time":2.0}
```"#;
        let result = parse_plan_result(output, &root, SystemTime::now()).unwrap();
        assert_eq!(result.files_modified, vec!["real.rs".to_string()]);
    }

    #[test]
    fn parse_simple_result_reports_verified_paths() {
        let (dir, root) = root();
        std::fs::write(dir.path().join("b.py"), "x").unwrap();
        let result = parse_simple_result("wrote b.py\nDone, tests pass.", &root, SystemTime::now());
        assert_eq!(result.touched_paths, vec!["b.py".to_string()]);
        assert_eq!(result.summary, "Done, tests pass.");
    }
}
