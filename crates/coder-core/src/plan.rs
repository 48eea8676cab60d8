use crate::error::ErrorKind;
use serde::{Deserialize, Serialize};

/// One unit of work in a plan, as received in an MCP request.
///
/// `allowed_globs` non-empty means writes outside those globs are
/// forbidden (enforced by `coder-guard`, verified post-hoc by
/// `coder-parser`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStepRequest {
    pub id: String,
    pub title: String,
    pub task: String,
    #[serde(default)]
    pub context_paths: Vec<String>,
    #[serde(default)]
    pub allowed_globs: Vec<String>,
    #[serde(default)]
    pub deny_globs: Vec<String>,
}

/// `PlanStepRequest` after validation: step ids are confirmed unique within
/// the owning plan and the struct is treated as immutable from here on.
pub type PlanStep = PlanStepRequest;

/// An ordered (sequential) or unordered-with-fanout (parallel) collection
/// of steps submitted in one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub steps: Vec<PlanStep>,
    /// `None` for sequential plans; `Some(n)` declares the fan-out limit
    /// for a parallel plan.
    pub fanout: Option<usize>,
}

impl Plan {
    pub fn has_duplicate_ids(&self) -> bool {
        let mut seen = std::collections::HashSet::with_capacity(self.steps.len());
        for step in &self.steps {
            if !seen.insert(step.id.as_str()) {
                return true;
            }
        }
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Ok,
    Fail,
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Success,
    Partial,
    Failed,
}

impl OverallStatus {
    /// `success` iff every step is `ok`; `failed` iff none are; else
    /// `partial`. This is the single place that invariant is computed so
    /// every caller gets the same answer.
    pub fn from_steps(steps: &[StepResult]) -> Self {
        if steps.is_empty() {
            return OverallStatus::Failed;
        }
        let ok_count = steps.iter().filter(|s| s.status == StepStatus::Ok).count();
        if ok_count == steps.len() {
            OverallStatus::Success
        } else if ok_count == 0 {
            OverallStatus::Failed
        } else {
            OverallStatus::Partial
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    pub id: String,
    pub status: StepStatus,
    pub summary: String,
    pub files_touched: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl StepResult {
    pub fn ok(id: impl Into<String>, summary: impl Into<String>, files_touched: Vec<String>) -> Self {
        Self {
            id: id.into(),
            status: StepStatus::Ok,
            summary: summary.into(),
            files_touched,
            error_message: None,
            error_kind: None,
        }
    }

    pub fn fail(
        id: impl Into<String>,
        summary: impl Into<String>,
        error_kind: ErrorKind,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            status: StepStatus::Fail,
            summary: summary.into(),
            files_touched: Vec::new(),
            error_message: Some(error_message.into()),
            error_kind: Some(error_kind),
        }
    }

    pub fn skipped(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: StepStatus::Skipped,
            summary: "skipped".to_string(),
            files_touched: Vec::new(),
            error_message: None,
            error_kind: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanExecutionResult {
    pub overall_status: OverallStatus,
    pub steps: Vec<StepResult>,
    pub files_modified: Vec<String>,
    pub notes: String,
    pub execution_time: f64,
}

impl PlanExecutionResult {
    pub fn from_steps(steps: Vec<StepResult>, notes: String, execution_time: f64) -> Self {
        let overall_status = OverallStatus::from_steps(&steps);
        let mut files_modified: Vec<String> = steps
            .iter()
            .flat_map(|s| s.files_touched.iter().cloned())
            .collect();
        files_modified.sort();
        files_modified.dedup();
        Self {
            overall_status,
            steps,
            files_modified,
            notes,
            execution_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_iff_all_ok() {
        let steps = vec![
            StepResult::ok("a", "done", vec!["a.txt".into()]),
            StepResult::ok("b", "done", vec!["b.txt".into()]),
        ];
        assert_eq!(OverallStatus::from_steps(&steps), OverallStatus::Success);
    }

    #[test]
    fn failed_iff_none_ok() {
        let steps = vec![
            StepResult::fail("a", "bad", ErrorKind::Timeout, "timeout after 2 s"),
            StepResult::skipped("b"),
        ];
        assert_eq!(OverallStatus::from_steps(&steps), OverallStatus::Failed);
    }

    #[test]
    fn partial_otherwise() {
        let steps = vec![
            StepResult::ok("a", "done", vec!["a.txt".into()]),
            StepResult::fail("b", "bad", ErrorKind::Timeout, "timeout after 2 s"),
        ];
        assert_eq!(OverallStatus::from_steps(&steps), OverallStatus::Partial);
    }

    #[test]
    fn empty_plan_is_failed_not_success() {
        assert_eq!(OverallStatus::from_steps(&[]), OverallStatus::Failed);
    }

    #[test]
    fn detects_duplicate_step_ids() {
        let plan = Plan {
            steps: vec![
                PlanStep {
                    id: "a".into(),
                    title: "t".into(),
                    task: "do it".into(),
                    context_paths: vec![],
                    allowed_globs: vec![],
                    deny_globs: vec![],
                },
                PlanStep {
                    id: "a".into(),
                    title: "t2".into(),
                    task: "do it again".into(),
                    context_paths: vec![],
                    allowed_globs: vec![],
                    deny_globs: vec![],
                },
            ],
            fanout: None,
        };
        assert!(plan.has_duplicate_ids());
    }

    #[test]
    fn files_modified_is_deduped_union() {
        let steps = vec![
            StepResult::ok("a", "done", vec!["x.txt".into(), "y.txt".into()]),
            StepResult::ok("b", "done", vec!["y.txt".into()]),
        ];
        let result = PlanExecutionResult::from_steps(steps, String::new(), 1.0);
        assert_eq!(result.files_modified, vec!["x.txt".to_string(), "y.txt".to_string()]);
    }
}
