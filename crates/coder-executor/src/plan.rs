use crate::error::ExecutorError;
use crate::routing;
use crate::PlanExecutor;
use coder_core::{ErrorKind, Plan, PlanExecutionResult, PlanStep, StepResult, StepStatus, TaskType};
use coder_guard::{GlobPolicy, RepoRoot};
use coder_logging::LogEventBuilder;
use coder_parser::ParsedOutput;
use coder_process::cancel_pair;
use coder_strategy::{CommandInput, ExecutionMode};
use std::time::{Instant, SystemTime};

pub async fn execute_sequential(
    executor: &PlanExecutor,
    repo_root: &RepoRoot,
    steps: Vec<PlanStep>,
    model: Option<&str>,
) -> Result<PlanExecutionResult, ExecutorError> {
    run(executor, repo_root, steps, None, model).await
}

pub async fn execute_parallel(
    executor: &PlanExecutor,
    repo_root: &RepoRoot,
    steps: Vec<PlanStep>,
    fanout: usize,
    model: Option<&str>,
) -> Result<PlanExecutionResult, ExecutorError> {
    run(executor, repo_root, steps, Some(fanout), model).await
}

async fn run(
    executor: &PlanExecutor,
    repo_root: &RepoRoot,
    steps: Vec<PlanStep>,
    fanout: Option<usize>,
    model: Option<&str>,
) -> Result<PlanExecutionResult, ExecutorError> {
    if steps.is_empty() {
        return Err(ExecutorError::InvalidRequest("plan must declare at least one step".to_string()));
    }
    let plan = Plan { steps: steps.clone(), fanout };
    if plan.has_duplicate_ids() {
        return Err(ExecutorError::InvalidRequest("step ids must be unique within a plan".to_string()));
    }

    let combined_task = steps.iter().map(|s| s.task.as_str()).collect::<Vec<_>>().join("\n");
    let context_paths = union_context_paths(&steps);

    let (strategy, component, bin_override) = routing::resolve(executor, &combined_task, &context_paths)?;

    let mut mode = if fanout.is_some() { ExecutionMode::Parallel } else { ExecutionMode::Sequential };
    let mut fallback_note = String::new();
    let effective_fanout = match fanout {
        Some(n) if !strategy.capabilities().supports_multi_agent => {
            fallback_note = format!(
                "{} does not support parallel execution; ran sequentially instead",
                strategy.operator()
            );
            mode = ExecutionMode::Sequential;
            None
        }
        other => other,
    };

    let repo_root_display = repo_root.as_path().display().to_string();
    let prompt = match effective_fanout {
        Some(n) => coder_prompt::build_parallel_plan_prompt(&repo_root_display, &steps, n),
        None => coder_prompt::build_sequential_plan_prompt(&repo_root_display, &steps),
    };

    let resolved_model = routing::resolve_model(&component.models, mode, model);

    let command_input = CommandInput {
        prompt: &prompt,
        repo_root: repo_root.as_path(),
        file_paths: &context_paths,
        model: resolved_model.as_deref(),
        mode,
        session_id: None,
        continue_last: false,
        bin_override: bin_override.as_deref(),
        extra_env: &[],
    };
    let built = strategy.build_command(&command_input);
    let timeout_seconds = built.timeout_seconds;
    let spec = built.into_command_spec();

    let logger = executor.logger();
    let started_wall = Instant::now();
    let started_at = SystemTime::now();
    let (_cancel_handle, cancel_signal) = cancel_pair();
    let outcome = coder_process::run(spec, cancel_signal).await?;
    let execution_time = started_wall.elapsed().as_secs_f64();
    let operator_name = strategy.operator().as_str();

    let combined = format!("{}\n{}", outcome.stdout, outcome.stderr);

    let mut step_results = if outcome.timed_out {
        logger.log(LogEventBuilder::error("plan execution timed out").cli_name(operator_name));
        synthesize_timeout(&steps, timeout_seconds)
    } else if let Some(result) = coder_parser::parse_plan_result(&combined, repo_root, started_at) {
        result.steps
    } else {
        let parsed = coder_parser::parse_output(
            &outcome.stdout,
            &outcome.stderr,
            outcome.exit_code,
            repo_root,
            TaskType::Feature,
            strategy.heuristic_patterns(),
            started_at,
        );
        if !parsed.success {
            logger.log(LogEventBuilder::error(parsed.summary.clone()).cli_name(operator_name));
        }
        synthesize(&steps, &parsed)
    };

    enforce_glob_policy(&mut step_results, &steps);

    Ok(PlanExecutionResult::from_steps(step_results, fallback_note, execution_time))
}

fn union_context_paths(steps: &[PlanStep]) -> Vec<String> {
    let mut all: Vec<String> = steps.iter().flat_map(|s| s.context_paths.iter().cloned()).collect();
    all.sort();
    all.dedup();
    all
}

/// No parseable JSON block and the process timed out: every declared
/// step carries the same timeout failure, since the CLI never reported
/// which step it was on when the deadline hit.
fn synthesize_timeout(steps: &[PlanStep], timeout_seconds: u64) -> Vec<StepResult> {
    let message = format!("timeout after {timeout_seconds} s");
    steps
        .iter()
        .map(|step| StepResult::fail(&step.id, "Task timed out", ErrorKind::Timeout, message.clone()))
        .collect()
}

/// No parseable JSON block, no timeout: reconstruct per-step results from
/// the shared `ParsedOutput` — a detected error kind (subprocess failure)
/// fails every step with the same error; otherwise `success` makes every
/// step `ok`.
/// The one case that cannot collapse to "all the same" is the
/// suspicious-success / parse-failure outcome: nothing confirms *which*
/// step actually ran, so the first step carries the parse failure and
/// the rest are left `ok`, which is what keeps `overall_status` landing
/// on `partial` per the exit-zero "parse failure" clause instead of
/// `failed`.
fn synthesize(steps: &[PlanStep], parsed: &ParsedOutput) -> Vec<StepResult> {
    if let Some(error_kind) = parsed.error_kind {
        return steps
            .iter()
            .map(|step| StepResult::fail(&step.id, parsed.summary.clone(), error_kind, parsed.notes.clone()))
            .collect();
    }
    if parsed.success {
        return steps
            .iter()
            .map(|step| StepResult::ok(&step.id, parsed.summary.clone(), parsed.touched_paths.clone()))
            .collect();
    }
    steps
        .iter()
        .enumerate()
        .map(|(idx, step)| {
            if idx == 0 {
                StepResult::fail(&step.id, parsed.summary.clone(), ErrorKind::ParseFailure, parsed.notes.clone())
            } else {
                StepResult::ok(&step.id, "assumed complete (unparseable CLI output)", Vec::new())
            }
        })
        .collect()
}

/// Open Question 1 (see `DESIGN.md`): a glob-violating write downgrades
/// only the owning step to `fail`, not the whole plan. Matched against
/// `coder_guard::GlobPolicy::is_allowed` per step rather than the plan's
/// own globs, since `allowed_globs`/`deny_globs` are declared per step.
fn enforce_glob_policy(steps: &mut [StepResult], plan_steps: &[PlanStep]) {
    for result in steps.iter_mut() {
        let Some(plan_step) = plan_steps.iter().find(|p| p.id == result.id) else {
            continue;
        };
        let policy = GlobPolicy {
            allowed_globs: &plan_step.allowed_globs,
            deny_globs: &plan_step.deny_globs,
        };
        let mut kept = Vec::with_capacity(result.files_touched.len());
        let mut violating = Vec::new();
        for path in result.files_touched.drain(..) {
            if policy.is_allowed(&path) {
                kept.push(path);
            } else {
                violating.push(path);
            }
        }
        result.files_touched = kept;
        if !violating.is_empty() && result.status != StepStatus::Fail {
            result.status = StepStatus::Fail;
            result.error_kind = Some(ErrorKind::InvalidRequest);
            result.error_message = Some(format!("write(s) outside allowed globs: {}", violating.join(", ")));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coder_core::OverallStatus;

    fn step(id: &str) -> PlanStep {
        PlanStep {
            id: id.to_string(),
            title: "t".to_string(),
            task: "do it".to_string(),
            context_paths: vec![],
            allowed_globs: vec!["src/**".to_string()],
            deny_globs: vec![],
        }
    }

    #[test]
    fn synthesize_marks_every_step_failed_on_detected_error_kind() {
        let steps = vec![step("a"), step("b")];
        let parsed = ParsedOutput {
            success: false,
            summary: "Auth failed".to_string(),
            notes: "see log".to_string(),
            touched_paths: vec![],
            error_kind: Some(ErrorKind::AuthError),
        };
        let results = synthesize(&steps, &parsed);
        assert!(results.iter().all(|r| r.status == StepStatus::Fail));
        assert_eq!(OverallStatus::from_steps(&results), OverallStatus::Failed);
    }

    #[test]
    fn synthesize_marks_every_step_ok_on_success() {
        let steps = vec![step("a"), step("b")];
        let parsed = ParsedOutput {
            success: true,
            summary: "done".to_string(),
            notes: String::new(),
            touched_paths: vec!["src/a.rs".to_string()],
            error_kind: None,
        };
        let results = synthesize(&steps, &parsed);
        assert_eq!(OverallStatus::from_steps(&results), OverallStatus::Success);
    }

    #[test]
    fn synthesize_parse_failure_yields_partial_for_multi_step_plan() {
        let steps = vec![step("a"), step("b")];
        let parsed = ParsedOutput {
            success: false,
            summary: "no files touched".to_string(),
            notes: "check log".to_string(),
            touched_paths: vec![],
            error_kind: None,
        };
        let results = synthesize(&steps, &parsed);
        assert_eq!(results[0].status, StepStatus::Fail);
        assert_eq!(results[1].status, StepStatus::Ok);
        assert_eq!(OverallStatus::from_steps(&results), OverallStatus::Partial);
    }

    #[test]
    fn glob_policy_downgrades_only_violating_step() {
        let steps = vec![step("a"), step("b")];
        let mut results = vec![
            StepResult::ok("a", "done", vec!["src/a.rs".to_string(), "secrets.env".to_string()]),
            StepResult::ok("b", "done", vec!["src/b.rs".to_string()]),
        ];
        enforce_glob_policy(&mut results, &steps);
        assert_eq!(results[0].status, StepStatus::Fail);
        assert_eq!(results[0].error_kind, Some(ErrorKind::InvalidRequest));
        assert_eq!(results[0].files_touched, vec!["src/a.rs".to_string()]);
        assert_eq!(results[1].status, StepStatus::Ok);
    }
}
