//! `coder_run_tests`: run a sequence of shell commands in the repo root
//! and report each one's outcome. No CLI strategy is involved, so this
//! talks to `coder-process` directly instead of going through
//! `coder-executor`.

use coder_guard::RepoRoot;
use coder_process::{cancel_pair, CommandSpec, ProcessError};
use serde::Serialize;
use std::time::Duration;

/// Commands with no declared timeout get this much wall-clock time each.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Serialize)]
pub struct CommandOutcome {
    pub command: String,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

#[derive(Debug, Serialize)]
pub struct RunTestsResult {
    pub status: String,
    pub results: Vec<CommandOutcome>,
}

/// Runs each command in order via `sh -c`, stopping at none of them —
/// a failing command does not skip the rest, so the caller sees every
/// command's outcome in one response.
pub async fn run(repo_root: &RepoRoot, commands: &[String]) -> Result<RunTestsResult, ProcessError> {
    let mut results = Vec::with_capacity(commands.len());
    let mut all_passed = true;

    for command in commands {
        let spec = CommandSpec {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), command.clone()],
            env: Vec::new(),
            working_dir: repo_root.as_path().to_path_buf(),
            timeout: DEFAULT_TIMEOUT,
        };
        let (_cancel_handle, cancel_signal) = cancel_pair();
        let outcome = coder_process::run(spec, cancel_signal).await?;

        all_passed &= outcome.exit_code == 0 && !outcome.timed_out;
        results.push(CommandOutcome {
            command: command.clone(),
            exit_code: outcome.exit_code,
            stdout: outcome.stdout,
            stderr: outcome.stderr,
            timed_out: outcome.timed_out,
        });
    }

    Ok(RunTestsResult {
        status: if all_passed { "ok" } else { "fail" }.to_string(),
        results,
    })
}
