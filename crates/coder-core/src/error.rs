use std::fmt;

/// Stable, closed taxonomy of failure kinds surfaced to MCP clients.
///
/// Every component error type maps into one of these at its outer boundary;
/// the string form is what travels in a tool response's `error_kind` field,
/// so it must not change casually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidRequest,
    AuthError,
    InsufficientCredits,
    CliNotFound,
    Timeout,
    ParseFailure,
    InternalError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::AuthError => "auth_error",
            ErrorKind::InsufficientCredits => "insufficient_credits",
            ErrorKind::CliNotFound => "cli_not_found",
            ErrorKind::Timeout => "timeout",
            ErrorKind::ParseFailure => "parse_failure",
            ErrorKind::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
