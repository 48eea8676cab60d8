//! The MCP tool server: schema-validated request structs dispatched
//! through [`coder_executor::PlanExecutor`], each response collapsed to a
//! single `type: "text"` content item carrying a JSON object.
//!
//! Built on `rmcp`'s `#[tool_router]`/`#[tool]` macros rather than a
//! hand-rolled JSON-RPC loop, so the request schema is generated and
//! enforced by `schemars` instead of hand-checked per field.

mod requests;
mod response;
mod roster;
mod stubs;
mod tools;

pub use roster::{AgentDescriptor, MultiAgentRoster};

use coder_executor::PlanExecutor;
use coder_guard::RepoRoot;
use coder_logging::{LogEventBuilder, LogQuery, StructuredLogger};
use requests::{
    ApplyPatchRequest, ExecutePlanParallelRequest, ExecutePlanSequentialRequest,
    MultiAgentTaskRequest, QueryLogsRequest, RunTestsRequest, SimpleTaskRequest,
};
use response::{error_status, invalid_repo_root, json_content};
use rmcp::{
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use std::path::Path;
use std::sync::Arc;

/// Resolves a request's `repo_root` string into a canonical [`RepoRoot`],
/// rejecting it as a protocol-level `invalid_params` error — the one
/// error class that never reaches `PlanExecutor` at all.
fn resolve_repo_root(path: &str) -> Result<RepoRoot, McpError> {
    coder_guard::validate_repo_root(Path::new(path)).map_err(|e| invalid_repo_root(path, e))
}

#[derive(Clone)]
pub struct CoderToolServer {
    executor: Arc<PlanExecutor>,
    logger: Arc<StructuredLogger>,
    roster: MultiAgentRoster,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl CoderToolServer {
    pub fn new(executor: Arc<PlanExecutor>, logger: Arc<StructuredLogger>) -> Self {
        Self {
            executor,
            logger,
            roster: MultiAgentRoster::default(),
            tool_router: Self::tool_router(),
        }
    }

    pub fn with_roster(mut self, roster: MultiAgentRoster) -> Self {
        self.roster = roster;
        self
    }

    #[tool(description = "Run a single quick-fix task against a CLI coding agent, scoped to a repo root and an optional glob allow/deny list.")]
    async fn coder_simple_task(
        &self,
        Parameters(req): Parameters<SimpleTaskRequest>,
    ) -> Result<CallToolResult, McpError> {
        let repo_root = resolve_repo_root(&req.repo_root)?;
        self.logger
            .log(LogEventBuilder::info("coder_simple_task dispatched"));
        match self
            .executor
            .execute_quick_task(
                &repo_root,
                &req.task,
                &req.context_paths,
                &req.allowed_globs,
                &req.deny_globs,
                req.model.as_deref(),
            )
            .await
        {
            Ok(result) => json_content(&result),
            Err(e) => error_status(e.error_kind(), e.to_string()),
        }
    }

    #[tool(description = "Execute a multi-step plan sequentially, one step's context feeding the next.")]
    async fn coder_execute_plan_sequential(
        &self,
        Parameters(req): Parameters<ExecutePlanSequentialRequest>,
    ) -> Result<CallToolResult, McpError> {
        let repo_root = resolve_repo_root(&req.repo_root)?;
        let steps = req.steps.into_iter().map(Into::into).collect();
        self.logger
            .log(LogEventBuilder::info("coder_execute_plan_sequential dispatched"));
        match self
            .executor
            .execute_sequential_plan(&repo_root, steps, req.model.as_deref())
            .await
        {
            Ok(result) => json_content(&result),
            Err(e) => error_status(e.error_kind(), e.to_string()),
        }
    }

    #[tool(description = "Execute a multi-step plan in parallel (fan-out), falling back to sequential when the selected operator cannot run multiple agents at once.")]
    async fn coder_execute_plan_parallel(
        &self,
        Parameters(req): Parameters<ExecutePlanParallelRequest>,
    ) -> Result<CallToolResult, McpError> {
        let repo_root = resolve_repo_root(&req.repo_root)?;
        let fanout = req.fanout.unwrap_or(req.steps.len().max(1));
        let steps = req.steps.into_iter().map(Into::into).collect();
        self.logger
            .log(LogEventBuilder::info("coder_execute_plan_parallel dispatched"));
        match self
            .executor
            .execute_parallel_plan(&repo_root, steps, fanout, req.model.as_deref())
            .await
        {
            Ok(result) => json_content(&result),
            Err(e) => error_status(e.error_kind(), e.to_string()),
        }
    }

    #[tool(description = "Run a sequence of shell commands in the repo root (e.g. a test suite) and report each one's exit code, stdout, and stderr.")]
    async fn coder_run_tests(
        &self,
        Parameters(req): Parameters<RunTestsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let repo_root = resolve_repo_root(&req.repo_root)?;
        self.logger.log(LogEventBuilder::info("coder_run_tests dispatched"));
        match tools::run_tests::run(&repo_root, &req.commands).await {
            Ok(result) => json_content(&result),
            Err(e) => error_status(coder_core::ErrorKind::InternalError, e.to_string()),
        }
    }

    #[tool(description = "Apply a unified diff to the repo root via `git apply`, reporting the files it touched after enforcing the glob allow/deny list.")]
    async fn coder_apply_patch(
        &self,
        Parameters(req): Parameters<ApplyPatchRequest>,
    ) -> Result<CallToolResult, McpError> {
        let repo_root = resolve_repo_root(&req.repo_root)?;
        self.logger.log(LogEventBuilder::info("coder_apply_patch dispatched"));
        match tools::apply_patch::run(&repo_root, &req.patch, &req.allowed_globs, &req.deny_globs).await {
            Ok(result) => json_content(&result),
            Err(e) => error_status(coder_core::ErrorKind::InternalError, e.to_string()),
        }
    }

    #[tool(description = "Query structured logs for this module, filtered by session id, task id, CLI name, or level.")]
    async fn coder_query_logs(
        &self,
        Parameters(req): Parameters<QueryLogsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let query = LogQuery {
            session_id: req.session_id,
            task_id: req.task_id,
            cli_name: req.cli_name,
            level: req.level,
            limit: req.limit,
        };
        let events = self.logger.query(&query);
        json_content(&events)
    }

    #[tool(description = "List the configured multi-agent roster, if any. Returns a structured unavailable status when no roster is configured.")]
    async fn coder_get_agents(&self) -> Result<CallToolResult, McpError> {
        if self.roster.is_empty() {
            return error_status(
                coder_core::ErrorKind::InvalidRequest,
                "no multi-agent roster is configured for this module",
            );
        }
        json_content(&self.roster)
    }

    #[tool(description = "Run a task across the configured multi-agent roster. Equivalent to a quick task with a trigger word appended; returns a structured unavailable status when no roster is configured.")]
    async fn coder_multi_agent_task(
        &self,
        Parameters(req): Parameters<MultiAgentTaskRequest>,
    ) -> Result<CallToolResult, McpError> {
        if self.roster.is_empty() {
            return error_status(
                coder_core::ErrorKind::InvalidRequest,
                "no multi-agent roster is configured for this module",
            );
        }
        let repo_root = resolve_repo_root(&req.repo_root)?;
        let task = format!("{} [multi-agent]", req.task);
        self.logger
            .log(LogEventBuilder::info("coder_multi_agent_task dispatched"));
        match self
            .executor
            .execute_quick_task(
                &repo_root,
                &task,
                &req.context_paths,
                &req.allowed_globs,
                &req.deny_globs,
                req.model.as_deref(),
            )
            .await
        {
            Ok(result) => json_content(&result),
            Err(e) => error_status(e.error_kind(), e.to_string()),
        }
    }
}

#[tool_handler]
impl ServerHandler for CoderToolServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Coder dispatches coding tasks to whichever CLI agent is configured \
                 (quick fixes, sequential plans, parallel fan-out), runs test commands, \
                 and applies patches, all scoped to a declared repo root and glob policy."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
