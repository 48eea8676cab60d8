use coder_core::ErrorKind;
use thiserror::Error;

/// Errors `PlanExecutor` raises before a subprocess even runs — a bad
/// request, nothing to route to, or a config/process failure underneath.
/// Per-step subprocess failures are not modeled here; they are carried
/// as `StepResult`s inside an `Ok(PlanExecutionResult)`.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Router(#[from] coder_router::RouterError),

    #[error(transparent)]
    Config(#[from] coder_config::ConfigError),

    #[error(transparent)]
    Process(#[from] coder_process::ProcessError),
}

impl ExecutorError {
    pub fn error_kind(&self) -> ErrorKind {
        match self {
            ExecutorError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            ExecutorError::Router(e) => e.error_kind(),
            ExecutorError::Config(_) => ErrorKind::InternalError,
            ExecutorError::Process(_) => ErrorKind::InternalError,
        }
    }
}
