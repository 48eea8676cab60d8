//! Contract-only declarations for the Researcher and Secretary tool
//! catalogs. Those modules get their own `DaemonHost`-managed process and
//! their own tool-router server (not built here); these types exist so
//! the request/response shape is pinned in one place rather than
//! reinvented when those servers are written. Nothing in this crate
//! constructs or dispatches them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ResearcherQueryRequest {
    pub query: String,
    pub repo_root: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResearcherQueryResponse {
    pub status: String,
    pub findings: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SecretaryTaskRequest {
    pub task: String,
}

#[derive(Debug, Serialize)]
pub struct SecretaryTaskResponse {
    pub status: String,
    pub summary: String,
}
