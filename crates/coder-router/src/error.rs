use coder_core::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("no configured CLI operator is available on this machine")]
    NoOperatorAvailable,
}

impl RouterError {
    pub fn error_kind(&self) -> ErrorKind {
        match self {
            RouterError::NoOperatorAvailable => ErrorKind::CliNotFound,
        }
    }
}
