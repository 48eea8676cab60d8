//! `coder_apply_patch`: apply a unified diff to the repo root via `git
//! apply` and report the touched paths, downgrading any path outside the
//! declared glob policy exactly like the plan executor does.
//!
//! Parsing `+++`/`---` headers out of the patch text would duplicate
//! `coder-guard`'s filesystem-verification primitive for no benefit, so
//! touched paths are discovered the same way a suspicious-success quick
//! task discovers them: a post-apply scan via `recently_modified`.

use coder_guard::{GlobPolicy, RepoRoot};
use coder_process::{cancel_pair, CommandSpec, ProcessError};
use serde::Serialize;
use std::time::{Duration, SystemTime};
use tempfile::NamedTempFile;

const APPLY_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
pub struct ApplyPatchResult {
    pub status: String,
    pub files_touched: Vec<String>,
    pub stderr: String,
}

pub async fn run(
    repo_root: &RepoRoot,
    patch: &str,
    allowed_globs: &[String],
    deny_globs: &[String],
) -> Result<ApplyPatchResult, ProcessError> {
    let patch_file = NamedTempFile::new().map_err(|source| ProcessError::Spawn {
        program: "git".to_string(),
        source,
    })?;
    std::fs::write(patch_file.path(), patch).map_err(|source| ProcessError::Spawn {
        program: "git".to_string(),
        source,
    })?;

    let started_at = SystemTime::now();

    let spec = CommandSpec {
        program: "git".to_string(),
        args: vec![
            "apply".to_string(),
            "--whitespace=nowarn".to_string(),
            patch_file.path().display().to_string(),
        ],
        env: Vec::new(),
        working_dir: repo_root.as_path().to_path_buf(),
        timeout: APPLY_TIMEOUT,
    };
    let (_cancel_handle, cancel_signal) = cancel_pair();
    let outcome = coder_process::run(spec, cancel_signal).await?;

    if outcome.exit_code != 0 || outcome.timed_out {
        return Ok(ApplyPatchResult {
            status: "fail".to_string(),
            files_touched: Vec::new(),
            stderr: outcome.stderr,
        });
    }

    let policy = GlobPolicy {
        allowed_globs,
        deny_globs,
    };
    let touched = coder_guard::recently_modified(repo_root, started_at);
    let mut files_touched = Vec::with_capacity(touched.len());
    for path in touched {
        let relative = path.to_string_lossy().replace('\\', "/");
        if policy.is_allowed(&relative) {
            files_touched.push(relative);
        }
    }

    Ok(ApplyPatchResult {
        status: "ok".to_string(),
        files_touched,
        stderr: outcome.stderr,
    })
}
