//! Pure instruction-string construction for the three task modes.
//!
//! No filesystem or network access; the same inputs always produce
//! byte-identical output, which is why this
//! crate's only dependencies are `serde`/`serde_json` for the types it
//! borrows, never an I/O crate.

use coder_core::PlanStep;
use std::fmt::Write as _;

/// Inputs for a single-step, no-plan-semantics request.
pub struct QuickTaskInput<'a> {
    pub task: &'a str,
    pub context_paths: &'a [String],
    pub allowed_globs: &'a [String],
    pub deny_globs: &'a [String],
    pub repo_root: &'a str,
}

/// Build the quick-task prompt: one paragraph of task description,
/// context paths, globs, and repo root, followed by the output contract.
pub fn build_quick_task_prompt(input: &QuickTaskInput<'_>) -> String {
    let mut out = String::new();
    writeln!(out, "{}", input.task.trim()).unwrap();
    out.push('\n');

    if !input.context_paths.is_empty() {
        writeln!(out, "Context files:").unwrap();
        for path in input.context_paths {
            writeln!(out, "{path}").unwrap();
        }
        out.push('\n');
    }

    write_glob_section(&mut out, input.allowed_globs, input.deny_globs);

    writeln!(out, "Repo root: {}", input.repo_root).unwrap();
    out.push('\n');
    writeln!(
        out,
        "When you are done, emit a short summary and then one path per line for every file you touched."
    )
    .unwrap();
    out
}

/// Build the sequential-plan prompt: a title, the global repo root, a
/// numbered list of steps, and a trailing block instructing the CLI to
/// preserve context across steps and emit a fenced `json` result object.
pub fn build_sequential_plan_prompt(repo_root: &str, steps: &[PlanStep]) -> String {
    let mut out = String::new();
    writeln!(out, "Sequential plan").unwrap();
    writeln!(out, "Repo root: {repo_root}").unwrap();
    out.push('\n');

    for (idx, step) in steps.iter().enumerate() {
        write_step(&mut out, idx + 1, step);
    }

    write_trailing_json_contract(&mut out, false, None);
    out
}

/// Build the parallel-plan prompt: same framing as sequential, but steps
/// are described as independent and a fan-out limit is declared.
pub fn build_parallel_plan_prompt(repo_root: &str, steps: &[PlanStep], fanout: usize) -> String {
    let mut out = String::new();
    writeln!(out, "Parallel plan (fan-out limit: {fanout})").unwrap();
    writeln!(out, "Repo root: {repo_root}").unwrap();
    out.push('\n');
    writeln!(
        out,
        "The following steps are independent of one another. You may execute up to {fanout} of them concurrently."
    )
    .unwrap();
    out.push('\n');

    for (idx, step) in steps.iter().enumerate() {
        write_step(&mut out, idx + 1, step);
    }

    write_trailing_json_contract(&mut out, true, Some(fanout));
    out
}

fn write_step(out: &mut String, number: usize, step: &PlanStep) {
    writeln!(out, "Step {number} (id: {}): {}", step.id, step.title).unwrap();
    writeln!(out, "{}", step.task.trim()).unwrap();
    if !step.context_paths.is_empty() {
        writeln!(out, "Context files:").unwrap();
        for path in &step.context_paths {
            writeln!(out, "{path}").unwrap();
        }
    }
    write_glob_section(out, &step.allowed_globs, &step.deny_globs);
    out.push('\n');
}

fn write_glob_section(out: &mut String, allowed_globs: &[String], deny_globs: &[String]) {
    if !allowed_globs.is_empty() {
        writeln!(out, "Allowed globs: {}", allowed_globs.join(", ")).unwrap();
    }
    if !deny_globs.is_empty() {
        writeln!(out, "Deny globs: {}", deny_globs.join(", ")).unwrap();
    }
}

fn write_trailing_json_contract(out: &mut String, parallel: bool, fanout: Option<usize>) {
    writeln!(
        out,
        "Execute the steps {} preserve context across steps.",
        if parallel {
            "independently, up to the declared fan-out; you should"
        } else {
            "in the order given; preserve context from earlier steps into later ones, and"
        }
    )
    .unwrap();
    if let Some(fanout) = fanout {
        writeln!(out, "Declared fan-out limit: {fanout}.").unwrap();
    }
    out.push('\n');
    writeln!(
        out,
        "When all steps are complete, emit a single JSON object fenced by a \
         ```json code fence, containing: `overall_status`, a `steps` array with \
         one entry per step (`id`, `status`, `summary`, `files_touched`, \
         `error_message`), and a `files_modified` array listing the union of all \
         touched files."
    )
    .unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(id: &str) -> PlanStep {
        PlanStep {
            id: id.to_string(),
            title: "Title".to_string(),
            task: "Do the thing".to_string(),
            context_paths: vec!["src/lib.rs".to_string()],
            allowed_globs: vec!["src/**".to_string()],
            deny_globs: vec![],
        }
    }

    #[test]
    fn quick_task_prompt_is_deterministic() {
        let input = QuickTaskInput {
            task: "add a greet() function",
            context_paths: &["src/main.rs".to_string()],
            allowed_globs: &["src/**".to_string()],
            deny_globs: &[],
            repo_root: "/tmp/r1",
        };
        let a = build_quick_task_prompt(&input);
        let b = build_quick_task_prompt(&input);
        assert_eq!(a, b);
        assert!(a.contains("add a greet() function"));
        assert!(a.contains("src/main.rs"));
        assert!(a.contains("Repo root: /tmp/r1"));
    }

    #[test]
    fn sequential_prompt_numbers_steps_in_order_and_has_json_fence_instruction() {
        let steps = vec![step("a"), step("b")];
        let prompt = build_sequential_plan_prompt("/tmp/r1", &steps);
        assert!(prompt.contains("Step 1 (id: a)"));
        assert!(prompt.contains("Step 2 (id: b)"));
        assert!(prompt.contains("```json"));
        assert!(prompt.contains("in the order given"));
    }

    #[test]
    fn parallel_prompt_declares_fanout_and_independence() {
        let steps = vec![step("a"), step("b")];
        let prompt = build_parallel_plan_prompt("/tmp/r1", &steps, 2);
        assert!(prompt.contains("fan-out limit: 2"));
        assert!(prompt.contains("independently"));
        assert!(prompt.contains("```json"));
    }

    #[test]
    fn byte_identical_for_identical_inputs() {
        let steps = vec![step("a")];
        let p1 = build_sequential_plan_prompt("/tmp/r", &steps);
        let p2 = build_sequential_plan_prompt("/tmp/r", &steps);
        assert_eq!(p1, p2);
    }
}
