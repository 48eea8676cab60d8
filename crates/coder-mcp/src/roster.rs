//! `coder_get_agents`/`coder_multi_agent_task` stay in the tool catalogue
//! even though this suite ships no multi-agent backend: the roster they
//! read is `Option`-backed and empty by default, so both tools answer
//! with a structured "unavailable" status instead of disappearing from
//! the catalogue or erroring.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct AgentDescriptor {
    pub name: String,
    pub role: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MultiAgentRoster {
    pub agents: Vec<AgentDescriptor>,
}

impl MultiAgentRoster {
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
