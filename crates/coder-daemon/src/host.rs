//! Long-lived HTTP/SSE hosting and the stdio direct-serve path for one
//! module's [`coder_mcp::CoderToolServer`].
//!
//! Both transports dispatch to the exact same `ServerHandler`; only the
//! framing differs — transport duality without code duplication. This
//! suite's daemon hosts one module's tool server directly rather than
//! proxying a registry of many.

use crate::error::DaemonError;
use coder_mcp::CoderToolServer;
use rmcp::transport::sse_server::SseServerConfig;
use rmcp::transport::SseServer;
use std::net::{IpAddr, SocketAddr};
use tokio_util::sync::CancellationToken;

/// `GET /sse` delivers the server-to-client event stream; `POST
/// /messages` carries client-to-server JSON-RPC requests.
const SSE_PATH: &str = "/sse";
const MESSAGES_PATH: &str = "/messages";

pub struct HttpHandle {
    pub addr: SocketAddr,
    shutdown: CancellationToken,
    server_task: tokio::task::JoinHandle<()>,
}

impl HttpHandle {
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        let _ = self.server_task.await;
    }
}

/// Binds an HTTP/SSE endpoint on `bind:port` (loopback by default) and
/// serves `server` to every connecting client directly — no separate
/// proxy hop.
pub async fn serve_http(
    server: CoderToolServer,
    bind: IpAddr,
    port: u16,
) -> Result<HttpHandle, DaemonError> {
    let bind_addr = SocketAddr::new(bind, port);
    let shutdown = CancellationToken::new();

    let (sse_server, router) = SseServer::new(SseServerConfig {
        bind: bind_addr,
        sse_path: SSE_PATH.to_string(),
        post_path: MESSAGES_PATH.to_string(),
        ct: shutdown.clone(),
        sse_keep_alive: None,
    });
    let _service_ct = sse_server.with_service_directly(move || server.clone());

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .map_err(|e| DaemonError::Http(format!("failed to bind {bind_addr}: {e}")))?;
    let local_addr = listener
        .local_addr()
        .map_err(|e| DaemonError::Http(e.to_string()))?;

    let server_shutdown = shutdown.clone();
    let server_task = tokio::spawn(async move {
        if let Err(error) = axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                server_shutdown.cancelled().await;
            })
            .await
        {
            tracing::warn!(error = %error, "daemon HTTP server stopped with error");
        }
    });

    Ok(HttpHandle {
        addr: local_addr,
        shutdown,
        server_task,
    })
}

/// Serves `server` over stdio directly: the default transport for
/// editors that spawn the process themselves rather than talking to a
/// long-lived daemon.
pub async fn serve_stdio(server: CoderToolServer) -> Result<(), DaemonError> {
    use rmcp::ServiceExt;
    let running = server
        .serve(rmcp::transport::io::stdio())
        .await
        .map_err(|e| DaemonError::Http(e.to_string()))?;
    running
        .waiting()
        .await
        .map_err(|e| DaemonError::Http(e.to_string()))?;
    Ok(())
}
