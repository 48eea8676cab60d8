use coder_core::Operator;
use std::time::Duration;

/// Mode a command is being built for — the timeout table keys on
/// this, not on `TaskType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Quick,
    Sequential,
    Parallel,
}

fn default_seconds(operator: Operator, mode: ExecutionMode) -> u64 {
    match (operator, mode) {
        (Operator::Aider, ExecutionMode::Quick) => 300,
        (Operator::Aider, ExecutionMode::Sequential) => 900,
        (Operator::Aider, ExecutionMode::Parallel) => 1200,
        (Operator::Opencode, ExecutionMode::Quick) => 300,
        (Operator::Opencode, ExecutionMode::Sequential) => 1200,
        (Operator::Opencode, ExecutionMode::Parallel) => 1200,
        (Operator::Gemini, ExecutionMode::Quick) => 300,
        (Operator::Gemini, ExecutionMode::Sequential) => 900,
        (Operator::Gemini, ExecutionMode::Parallel) => 900,
        (Operator::Claude, _) => 300,
    }
}

/// Env var name for this operator's timeout override, e.g.
/// `NINJA_AIDER_TIMEOUT`.
pub fn env_override_var(operator: Operator) -> String {
    format!("NINJA_{}_TIMEOUT", operator.env_infix())
}

/// Resolve the timeout for `operator`/`mode`: the fixed default table,
/// overridden by `NINJA_<CLI>_TIMEOUT` when set and parseable as a
/// non-negative integer of seconds.
pub fn timeout_for(operator: Operator, mode: ExecutionMode) -> Duration {
    if let Ok(raw) = std::env::var(env_override_var(operator)) {
        if let Ok(seconds) = raw.trim().parse::<u64>() {
            return Duration::from_secs(seconds);
        }
        tracing::warn!(
            operator = %operator,
            value = %raw,
            "ignoring unparseable timeout override"
        );
    }
    Duration::from_secs(default_seconds(operator, mode))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn aider_defaults_match_spec_table() {
        assert_eq!(timeout_for(Operator::Aider, ExecutionMode::Quick).as_secs(), 300);
        assert_eq!(timeout_for(Operator::Aider, ExecutionMode::Sequential).as_secs(), 900);
        assert_eq!(timeout_for(Operator::Aider, ExecutionMode::Parallel).as_secs(), 1200);
    }

    #[test]
    #[serial]
    fn env_override_wins() {
        std::env::set_var("NINJA_AIDER_TIMEOUT", "2");
        assert_eq!(timeout_for(Operator::Aider, ExecutionMode::Quick).as_secs(), 2);
        std::env::remove_var("NINJA_AIDER_TIMEOUT");
    }

    #[test]
    #[serial]
    fn malformed_override_falls_back_to_default() {
        std::env::set_var("NINJA_CLAUDE_TIMEOUT", "not-a-number");
        assert_eq!(timeout_for(Operator::Claude, ExecutionMode::Quick).as_secs(), 300);
        std::env::remove_var("NINJA_CLAUDE_TIMEOUT");
    }
}
