//! Request schemas for every tool in the catalogue. `schemars` derives the
//! JSON Schema `rmcp` advertises to clients and validates incoming calls
//! against; unknown fields are rejected by construction since every field
//! here is named explicitly (no catch-all `Value` maps).

use coder_core::PlanStep;
use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SimpleTaskRequest {
    pub task: String,
    pub repo_root: String,
    #[serde(default)]
    pub context_paths: Vec<String>,
    #[serde(default)]
    pub allowed_globs: Vec<String>,
    #[serde(default)]
    pub deny_globs: Vec<String>,
    pub model: Option<String>,
}

/// One step of a plan, as received over MCP. Mirrors `coder_core::PlanStep`
/// field-for-field rather than deriving `JsonSchema` on the domain type
/// itself, keeping the wire schema a boundary concern.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct PlanStepInput {
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

impl From<PlanStepInput> for PlanStep {
    fn from(input: PlanStepInput) -> Self {
        PlanStep {
            id: input.id,
            title: input.title,
            task: input.task,
            context_paths: input.context_paths,
            allowed_globs: input.allowed_globs,
            deny_globs: input.deny_globs,
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExecutePlanSequentialRequest {
    pub repo_root: String,
    pub steps: Vec<PlanStepInput>,
    pub model: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExecutePlanParallelRequest {
    pub repo_root: String,
    pub steps: Vec<PlanStepInput>,
    pub fanout: Option<usize>,
    pub model: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RunTestsRequest {
    pub repo_root: String,
    pub commands: Vec<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ApplyPatchRequest {
    pub repo_root: String,
    pub patch: String,
    #[serde(default)]
    pub allowed_globs: Vec<String>,
    #[serde(default)]
    pub deny_globs: Vec<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct QueryLogsRequest {
    pub session_id: Option<String>,
    pub task_id: Option<String>,
    pub cli_name: Option<String>,
    pub level: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct MultiAgentTaskRequest {
    pub task: String,
    pub repo_root: String,
    #[serde(default)]
    pub context_paths: Vec<String>,
    #[serde(default)]
    pub allowed_globs: Vec<String>,
    #[serde(default)]
    pub deny_globs: Vec<String>,
    pub model: Option<String>,
}
