//! Long-lived process hosting: per-module HTTP/SSE daemons, the
//! `ninja-daemon` start/stop/status/restart controller, and the stdio-to-
//! HTTP proxy for editors that only speak stdio MCP.
//!
//! Transport duality: stdio and HTTP/SSE dispatch to the same
//! `CoderToolServer`; only the framing differs. `StdioProxy` is a
//! separate concern — it bridges an *already-running* daemon, it does
//! not serve a tool router itself.

mod controller;
mod error;
mod host;
mod pidfile;
mod ports;
mod stdio_proxy;

pub use controller::{restart, start, status, stop, ModuleStatus};
pub use error::DaemonError;
pub use host::{serve_http, serve_stdio, HttpHandle};
pub use ports::{default_port, is_known_module, resolve_port, KNOWN_MODULES};
pub use stdio_proxy::StdioProxy;
