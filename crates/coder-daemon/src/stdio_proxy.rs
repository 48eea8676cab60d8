//! The ephemeral stdio-to-HTTP bridge editors launch when they only
//! speak stdio MCP but want to reach an already-running daemon.
//!
//! Reads one newline-delimited JSON-RPC message at a time from stdin,
//! forwards each as a `POST /messages` to the target daemon, and writes
//! the JSON-RPC response
//! back to stdout as one line. Never spawns the daemon itself — that is
//! `controller::start`'s job; if the daemon is unreachable, each request
//! gets its own JSON-RPC error reply instead of the proxy dying.

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

pub struct StdioProxy {
    client: reqwest::Client,
    messages_url: String,
}

impl StdioProxy {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client: reqwest::Client::new(),
            messages_url: format!("{}/messages", base_url.trim_end_matches('/')),
        }
    }

    /// Drains stdin until EOF, one JSON-RPC frame per line, forwarding
    /// each to the daemon and writing its reply to stdout.
    pub async fn run(&self) -> std::io::Result<()> {
        let stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        let mut reader = BufReader::new(stdin);
        let mut line = String::new();

        loop {
            line.clear();
            let bytes = reader.read_line(&mut line).await?;
            if bytes == 0 {
                return Ok(());
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let reply = self.forward_one(trimmed).await;
            let mut payload = serde_json::to_string(&reply).unwrap_or_default();
            payload.push('\n');
            stdout.write_all(payload.as_bytes()).await?;
            stdout.flush().await?;
        }
    }

    async fn forward_one(&self, frame: &str) -> Value {
        let request_id: Option<Value> = serde_json::from_str::<Value>(frame)
            .ok()
            .and_then(|v| v.get("id").cloned());

        let response = self
            .client
            .post(&self.messages_url)
            .header("content-type", "application/json")
            .body(frame.to_string())
            .send()
            .await;

        match response {
            Ok(resp) => match resp.text().await {
                Ok(text) => serde_json::from_str(&text).unwrap_or_else(|_| {
                    jsonrpc_error(request_id.clone(), -32700, "invalid JSON-RPC reply from daemon")
                }),
                Err(e) => jsonrpc_error(request_id, -32002, &format!("failed to read daemon reply: {e}")),
            },
            Err(e) => jsonrpc_error(
                request_id,
                -32001,
                &format!("daemon unreachable at {}: {e}", self.messages_url),
            ),
        }
    }
}

fn jsonrpc_error(id: Option<Value>, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": code,
            "message": message,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_daemon_yields_a_jsonrpc_error_per_request() {
        let proxy = StdioProxy::new("http://127.0.0.1:1");
        let reply = proxy
            .forward_one(r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#)
            .await;
        assert_eq!(reply["error"]["code"], -32001);
        assert_eq!(reply["id"], 1);
    }
}
