use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credential '{0}' not found")]
    NotFound(String),

    #[error("encryption error: {0}")]
    Encryption(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("invalid value: {0}")]
    Value(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
