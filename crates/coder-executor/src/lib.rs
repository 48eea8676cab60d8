//! Glues routing, strategy selection, subprocess execution, output
//! parsing, and glob enforcement into the three execution modes the MCP
//! tool layer calls: a single quick task, a sequential plan, and a
//! parallel (fan-out) plan.
//!
//! Each call is self-contained — no session state is held here between
//! calls beyond the cached `CliStrategy` (see [`cache`]), which is only
//! ever a memoization of what `config.json` + the environment already say.

mod cache;
mod error;
mod plan;
mod quick;
mod result;
mod routing;

pub use cache::{CacheKey, StrategyCache};
pub use error::ExecutorError;
pub use result::QuickTaskResult;

use coder_config::ConfigStore;
use coder_core::{Operator, PlanExecutionResult, PlanStep};
use coder_guard::RepoRoot;
use coder_logging::StructuredLogger;
use std::sync::Arc;

/// Owns the config store, the structured logger, and the single-slot
/// strategy cache a module's MCP tools share across requests.
pub struct PlanExecutor {
    config_store: ConfigStore,
    logger: Arc<StructuredLogger>,
    cache: StrategyCache,
    preferred_operator: Option<Operator>,
}

impl PlanExecutor {
    pub fn new(config_store: ConfigStore, logger: Arc<StructuredLogger>) -> Self {
        Self {
            config_store,
            logger,
            cache: StrategyCache::new(),
            preferred_operator: None,
        }
    }

    /// Pin a specific operator for every request this executor handles,
    /// bypassing `coder-router`'s preference-then-capability selection
    /// (still subject to availability).
    pub fn with_preferred_operator(mut self, operator: Operator) -> Self {
        self.preferred_operator = Some(operator);
        self
    }

    pub(crate) fn config_store(&self) -> &ConfigStore {
        &self.config_store
    }

    pub(crate) fn logger(&self) -> &StructuredLogger {
        &self.logger
    }

    pub(crate) fn cache(&self) -> &StrategyCache {
        &self.cache
    }

    pub(crate) fn preferred_operator(&self) -> Option<Operator> {
        self.preferred_operator
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn execute_quick_task(
        &self,
        repo_root: &RepoRoot,
        task: &str,
        context_paths: &[String],
        allowed_globs: &[String],
        deny_globs: &[String],
        model: Option<&str>,
    ) -> Result<QuickTaskResult, ExecutorError> {
        quick::execute(self, repo_root, task, context_paths, allowed_globs, deny_globs, model).await
    }

    pub async fn execute_sequential_plan(
        &self,
        repo_root: &RepoRoot,
        steps: Vec<PlanStep>,
        model: Option<&str>,
    ) -> Result<PlanExecutionResult, ExecutorError> {
        plan::execute_sequential(self, repo_root, steps, model).await
    }

    pub async fn execute_parallel_plan(
        &self,
        repo_root: &RepoRoot,
        steps: Vec<PlanStep>,
        fanout: usize,
        model: Option<&str>,
    ) -> Result<PlanExecutionResult, ExecutorError> {
        plan::execute_parallel(self, repo_root, steps, fanout, model).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coder_core::ErrorKind;
    use serial_test::serial;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn fake_cli(dir: &std::path::Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn executor() -> (tempfile::TempDir, PlanExecutor) {
        let dir = tempdir().unwrap();
        let config_store = ConfigStore::new(dir.path().join("config.json"));
        let logger = Arc::new(StructuredLogger::new("coder", dir.path().join("logs")).unwrap());
        (dir, PlanExecutor::new(config_store, logger))
    }

    #[tokio::test]
    #[serial]
    async fn quick_task_reports_cli_not_found_when_no_operator_is_available() {
        let (dir, executor) = executor();
        let repo = tempdir().unwrap();
        let repo_root = coder_guard::validate_repo_root(repo.path()).unwrap();
        std::env::remove_var("NINJA_CODE_BIN");
        let _ = dir;

        let result = executor
            .execute_quick_task(&repo_root, "fix the bug", &[], &[], &[], None)
            .await;
        assert!(matches!(result, Err(ExecutorError::Router(_))));
    }

    #[tokio::test]
    #[serial]
    async fn quick_task_succeeds_against_a_fake_operator_binary() {
        let (scratch, executor) = executor();
        let repo = tempdir().unwrap();
        let repo_root = coder_guard::validate_repo_root(repo.path()).unwrap();
        std::fs::write(repo.path().join("a.rs"), "fn main() {}").unwrap();

        let bin = fake_cli(scratch.path(), "fakecli", "echo 'Applied edit to a.rs'; exit 0");
        std::env::set_var("NINJA_CODE_BIN", &bin);

        let result = executor
            .execute_quick_task(&repo_root, "fix a.rs", &[], &[], &[], None)
            .await
            .unwrap();
        std::env::remove_var("NINJA_CODE_BIN");

        assert_eq!(result.status, coder_core::StepStatus::Ok);
        assert_eq!(result.touched_paths, vec!["a.rs".to_string()]);
    }

    #[tokio::test]
    #[serial]
    async fn sequential_plan_rejects_duplicate_step_ids() {
        let (_scratch, executor) = executor();
        let repo = tempdir().unwrap();
        let repo_root = coder_guard::validate_repo_root(repo.path()).unwrap();
        let steps = vec![
            PlanStep {
                id: "a".to_string(),
                title: "t".to_string(),
                task: "do it".to_string(),
                context_paths: vec![],
                allowed_globs: vec![],
                deny_globs: vec![],
            },
            PlanStep {
                id: "a".to_string(),
                title: "t2".to_string(),
                task: "do it again".to_string(),
                context_paths: vec![],
                allowed_globs: vec![],
                deny_globs: vec![],
            },
        ];
        let result = executor.execute_sequential_plan(&repo_root, steps, None).await;
        match result {
            Err(ExecutorError::InvalidRequest(_)) => {}
            other => panic!("expected InvalidRequest, got {other:?}"),
        }
    }

    #[tokio::test]
    #[serial]
    async fn sequential_plan_rejects_empty_plan() {
        let (_scratch, executor) = executor();
        let repo = tempdir().unwrap();
        let repo_root = coder_guard::validate_repo_root(repo.path()).unwrap();
        let result = executor.execute_sequential_plan(&repo_root, vec![], None).await;
        assert!(matches!(result, Err(ExecutorError::InvalidRequest(_))));
    }

    #[tokio::test]
    #[serial]
    async fn sequential_plan_times_out_and_fails_every_step() {
        let (scratch, executor) = executor();
        let repo = tempdir().unwrap();
        let repo_root = coder_guard::validate_repo_root(repo.path()).unwrap();

        let bin = fake_cli(scratch.path(), "fakecli", "sleep 5; exit 0");
        std::env::set_var("NINJA_CODE_BIN", &bin);
        std::env::set_var("NINJA_AIDER_TIMEOUT", "1");

        let steps = vec![PlanStep {
            id: "a".to_string(),
            title: "t".to_string(),
            task: "do it".to_string(),
            context_paths: vec![],
            allowed_globs: vec![],
            deny_globs: vec![],
        }];
        let result = executor.execute_sequential_plan(&repo_root, steps, None).await.unwrap();
        std::env::remove_var("NINJA_CODE_BIN");
        std::env::remove_var("NINJA_AIDER_TIMEOUT");

        assert_eq!(result.overall_status, coder_core::OverallStatus::Failed);
        assert_eq!(result.steps[0].error_kind, Some(ErrorKind::Timeout));
    }
}
