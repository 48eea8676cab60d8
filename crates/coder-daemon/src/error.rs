use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown module '{0}'")]
    UnknownModule(String),

    #[error("module '{0}' is not running")]
    NotRunning(String),

    #[error("module '{0}' is already running (pid={1})")]
    AlreadyRunning(String, u32),

    #[error("http error: {0}")]
    Http(String),
}
