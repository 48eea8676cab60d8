//! Per-CLI command construction and output-parsing hints.
//!
//! Modeled as a closed, data-carrying enum rather than a trait object:
//! a data-enum pattern (not trait + dynamic dispatch) fits a fixed set
//! of tools, and this family is exactly as fixed — four supported CLIs,
//! never loaded dynamically.

mod capabilities;
mod command;
mod heuristics;
mod timeout;

pub use capabilities::Capabilities;
pub use command::{BuiltCommand, CommandInput};
pub use heuristics::heuristic_patterns;
pub use timeout::{env_override_var, timeout_for, ExecutionMode};

use coder_core::{Operator, TaskType};

/// Per-operator adapter: command construction plus the CLI-specific
/// heuristic regex patterns `coder-parser` plugs into the shared output
/// pipeline. Thin wrapper over `Operator` — there is no per-call
/// state, so constructing one is free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CliStrategy(Operator);

impl CliStrategy {
    pub fn new(operator: Operator) -> Self {
        Self(operator)
    }

    pub fn operator(&self) -> Operator {
        self.0
    }

    pub fn capabilities(&self) -> Capabilities {
        capabilities::for_operator(self.0)
    }

    pub fn build_command(&self, input: &CommandInput<'_>) -> BuiltCommand {
        command::build(self.0, input)
    }

    /// CLI-specific regex source strings for heuristic touched-path
    /// extraction. Generic patterns ("wrote|created|
    /// modified|updated|edited X") are the shared core and live in
    /// `coder-parser`; this is only the per-CLI additions (e.g. Aider's
    /// "Applied edit to X").
    pub fn heuristic_patterns(&self) -> &'static [&'static str] {
        heuristics::heuristic_patterns(self.0)
    }

    /// Env-override-aware timeout for this operator and execution mode.
    pub fn timeout(&self, mode: ExecutionMode) -> std::time::Duration {
        timeout::timeout_for(self.0, mode)
    }

    /// `true` iff this strategy's declared capabilities make it a
    /// reasonable fit for `task_type`, used by `coder-router`.
    pub fn handles_task_type(&self, task_type: TaskType) -> bool {
        self.capabilities().preferred_tasks.contains(&task_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_operator_has_a_strategy() {
        for op in Operator::ALL {
            let strategy = CliStrategy::new(op);
            assert_eq!(strategy.operator(), op);
        }
    }
}
