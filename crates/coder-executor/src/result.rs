use coder_core::{ErrorKind, StepStatus};
use serde::{Deserialize, Serialize};

/// The `StepResult`-shaped object `execute_quick_task` returns: a quick
/// task has no plan semantics, so there is no step `id` to carry, but the
/// other fields line up with `StepResult` field-for-field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickTaskResult {
    pub status: StepStatus,
    pub summary: String,
    pub touched_paths: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    pub execution_time: f64,
}

impl QuickTaskResult {
    pub fn ok(summary: impl Into<String>, touched_paths: Vec<String>, execution_time: f64) -> Self {
        Self {
            status: StepStatus::Ok,
            summary: summary.into(),
            touched_paths,
            error_message: None,
            error_kind: None,
            execution_time,
        }
    }

    pub fn fail(
        summary: impl Into<String>,
        error_kind: ErrorKind,
        error_message: impl Into<String>,
        touched_paths: Vec<String>,
        execution_time: f64,
    ) -> Self {
        Self {
            status: StepStatus::Fail,
            summary: summary.into(),
            touched_paths,
            error_message: Some(error_message.into()),
            error_kind: Some(error_kind),
            execution_time,
        }
    }
}
