use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config document: {0}")]
    Malformed(String),

    #[error("unknown top-level key(s) in config document: {0:?}")]
    UnknownKeys(Vec<String>),

    #[error("operator '{0}' is not in the registered strategy set")]
    UnregisteredOperator(String),

    #[error("credential store error: {0}")]
    Credential(#[from] coder_credentials::CredentialError),
}
