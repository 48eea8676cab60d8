//! Every tool returns one `type: "text"` content item carrying a JSON
//! object, whether the underlying operation succeeded or failed — a
//! component error maps into the response's `status`/`error_kind` fields
//! rather than becoming an MCP protocol-level error. Only malformed
//! request arguments (an unresolvable `repo_root`, for instance) are
//! rejected as `McpError::invalid_params`, since those never reach the
//! plan executor at all.

use coder_core::ErrorKind;
use rmcp::model::{CallToolResult, Content};
use rmcp::ErrorData as McpError;
use serde::Serialize;

pub fn json_content<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string(value).map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

/// A component error surfaced as a successful tool call whose JSON body
/// carries the failure, matching every other tool's response shape
/// instead of a distinct protocol-error path.
pub fn error_status(error_kind: ErrorKind, message: impl Into<String>) -> Result<CallToolResult, McpError> {
    let body = serde_json::json!({
        "status": "error",
        "error_kind": error_kind.as_str(),
        "error_message": message.into(),
    });
    Ok(CallToolResult::success(vec![Content::text(body.to_string())]))
}

pub fn invalid_repo_root(path: &str, reason: impl std::fmt::Display) -> McpError {
    McpError::invalid_params(format!("invalid repo_root '{path}': {reason}"), None)
}
