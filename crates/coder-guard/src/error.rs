use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GuardError {
    #[error("invalid repo root '{path}': {reason}")]
    InvalidPath { path: PathBuf, reason: String },

    #[error("io error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid glob pattern '{pattern}': {source}")]
    BadGlob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}
