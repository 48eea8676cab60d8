use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("io error while capturing output: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to wait for child process: {0}")]
    Wait(std::io::Error),
}
