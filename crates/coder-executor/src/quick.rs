use crate::error::ExecutorError;
use crate::result::QuickTaskResult;
use crate::routing;
use crate::PlanExecutor;
use coder_core::{ErrorKind, OverallStatus, TaskType};
use coder_guard::{GlobPolicy, RepoRoot};
use coder_logging::LogEventBuilder;
use coder_parser::has_action_intent_keywords;
use coder_process::cancel_pair;
use coder_prompt::{build_quick_task_prompt, QuickTaskInput};
use coder_strategy::{CommandInput, ExecutionMode};
use std::time::{Instant, SystemTime};

pub async fn execute(
    executor: &PlanExecutor,
    repo_root: &RepoRoot,
    task: &str,
    context_paths: &[String],
    allowed_globs: &[String],
    deny_globs: &[String],
    model: Option<&str>,
) -> Result<QuickTaskResult, ExecutorError> {
    let (strategy, component, bin_override) = routing::resolve(executor, task, context_paths)?;
    let resolved_model = routing::resolve_model(&component.models, ExecutionMode::Quick, model);

    let repo_root_display = repo_root.as_path().display().to_string();
    let prompt = build_quick_task_prompt(&QuickTaskInput {
        task,
        context_paths,
        allowed_globs,
        deny_globs,
        repo_root: &repo_root_display,
    });

    let command_input = CommandInput {
        prompt: &prompt,
        repo_root: repo_root.as_path(),
        file_paths: context_paths,
        model: resolved_model.as_deref(),
        mode: ExecutionMode::Quick,
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

    if outcome.timed_out {
        let mut event = LogEventBuilder::error("quick task timed out").cli_name(operator_name);
        if let Some(model) = &resolved_model {
            event = event.model(model.clone());
        }
        logger.log(event);
        return Ok(QuickTaskResult::fail(
            "Task timed out",
            ErrorKind::Timeout,
            format!("timeout after {timeout_seconds} s"),
            Vec::new(),
            execution_time,
        ));
    }

    let combined = format!("{}\n{}", outcome.stdout, outcome.stderr);

    if outcome.exit_code != 0 {
        let parsed = coder_parser::parse_output(
            &outcome.stdout,
            &outcome.stderr,
            outcome.exit_code,
            repo_root,
            TaskType::QuickFix,
            strategy.heuristic_patterns(),
            started_at,
        );
        logger.log(LogEventBuilder::error(parsed.summary.clone()).cli_name(operator_name));
        return Ok(QuickTaskResult::fail(
            parsed.summary,
            parsed.error_kind.unwrap_or(ErrorKind::InternalError),
            parsed.notes,
            parsed.touched_paths,
            execution_time,
        ));
    }

    // The prompt only asks for a plain summary, but a verbose CLI may
    // still wrap its answer in a fenced JSON block; honor it if present
    // rather than re-deriving the same facts heuristically.
    let (success, summary, mut touched_paths) =
        match coder_parser::parse_plan_result(&combined, repo_root, started_at) {
            Some(result) => {
                let notes = if result.notes.is_empty() {
                    "Task completed".to_string()
                } else {
                    result.notes
                };
                (result.overall_status == OverallStatus::Success, notes, result.files_modified)
            }
            None => {
                let simple = coder_parser::parse_simple_result(&combined, repo_root, started_at);
                let suspicious = has_action_intent_keywords(&combined) && simple.touched_paths.is_empty();
                (!suspicious, simple.summary, simple.touched_paths)
            }
        };

    let policy = GlobPolicy { allowed_globs, deny_globs };
    let (kept, violating): (Vec<String>, Vec<String>) = touched_paths.drain(..).partition(|p| policy.is_allowed(p));
    touched_paths = kept;

    if !violating.is_empty() {
        logger.log(LogEventBuilder::warn("quick task wrote outside its allowed globs").cli_name(operator_name));
        return Ok(QuickTaskResult::fail(
            "write(s) outside allowed globs",
            ErrorKind::InvalidRequest,
            format!("rejected paths: {}", violating.join(", ")),
            touched_paths,
            execution_time,
        ));
    }

    if !success {
        logger.log(LogEventBuilder::warn(summary.clone()).cli_name(operator_name));
        return Ok(QuickTaskResult::fail(
            summary,
            ErrorKind::ParseFailure,
            "check the run's log for what the CLI actually did",
            touched_paths,
            execution_time,
        ));
    }

    logger.log(LogEventBuilder::info(summary.clone()).cli_name(operator_name));
    Ok(QuickTaskResult::ok(summary, touched_paths, execution_time))
}
