//! `ninja-coder`: the Coder module's MCP server. Stdio by default (an
//! editor spawns this process directly); `--http` hosts the same tool
//! router on a loopback HTTP/SSE endpoint instead, for a long-lived
//! daemon.

use clap::Parser;
use coder_config::ConfigStore;
use coder_executor::PlanExecutor;
use coder_logging::StructuredLogger;
use coder_mcp::CoderToolServer;
use std::net::IpAddr;
use std::sync::Arc;

/// Exit codes: 0 success, 1 user error, 2 environment/dependency error,
/// 3 internal failure.
mod exit {
    pub const SUCCESS: i32 = 0;
    pub const ENVIRONMENT: i32 = 2;
    pub const INTERNAL: i32 = 3;
}

#[derive(Parser, Debug)]
#[command(name = "ninja-coder", about = "MCP tool server for AI coding agent orchestration")]
struct Args {
    /// Serve over stdio (default transport).
    #[arg(long, default_value_t = false)]
    stdio: bool,

    /// Serve over HTTP/SSE instead of stdio.
    #[arg(long, default_value_t = false)]
    http: bool,

    /// Loopback port for `--http` (defaults to the module's published port, 8100).
    #[arg(long)]
    port: Option<u16>,

    /// Bind address for `--http` (loopback by default).
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
}

#[tokio::main]
async fn main() {
    coder_logging::init_console_subscriber();
    let args = Args::parse();
    std::process::exit(run(args).await);
}

async fn run(args: Args) -> i32 {
    let config_store = ConfigStore::at_default_path();
    let logger = match StructuredLogger::for_module("coder") {
        Ok(logger) => Arc::new(logger),
        Err(error) => {
            eprintln!("failed to initialize coder logger: {error}");
            return exit::ENVIRONMENT;
        }
    };
    let executor = Arc::new(PlanExecutor::new(config_store, logger.clone()));
    let server = CoderToolServer::new(executor, logger);

    if args.http {
        let host: IpAddr = match args.host.parse() {
            Ok(host) => host,
            Err(error) => {
                eprintln!("invalid --host '{}': {error}", args.host);
                return exit::ENVIRONMENT;
            }
        };
        let port = args.port.or_else(|| coder_daemon::resolve_port("coder")).unwrap_or(8100);
        match coder_daemon::serve_http(server, host, port).await {
            Ok(handle) => {
                println!("ninja-coder listening on http://{}", handle.addr);
                tokio::signal::ctrl_c().await.ok();
                handle.shutdown().await;
                exit::SUCCESS
            }
            Err(error) => {
                eprintln!("failed to start HTTP/SSE endpoint: {error}");
                exit::INTERNAL
            }
        }
    } else {
        match coder_daemon::serve_stdio(server).await {
            Ok(()) => exit::SUCCESS,
            Err(error) => {
                eprintln!("stdio MCP server failed: {error}");
                exit::INTERNAL
            }
        }
    }
}
