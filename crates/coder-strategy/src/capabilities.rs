use coder_core::{Operator, TaskType};

/// Routing-relevant facts about one operator, per the shared CLI contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub supports_sessions: bool,
    pub supports_multi_agent: bool,
    pub supports_file_context: bool,
    pub preferred_tasks: Vec<TaskType>,
}

pub(crate) fn for_operator(operator: Operator) -> Capabilities {
    match operator {
        Operator::Aider => Capabilities {
            supports_sessions: false,
            supports_multi_agent: false,
            supports_file_context: true,
            preferred_tasks: vec![TaskType::QuickFix, TaskType::Refactor],
        },
        Operator::Opencode => Capabilities {
            supports_sessions: true,
            supports_multi_agent: true,
            supports_file_context: true,
            preferred_tasks: vec![
                TaskType::MultiAgent,
                TaskType::Architecture,
                TaskType::Feature,
            ],
        },
        Operator::Gemini => Capabilities {
            supports_sessions: false,
            supports_multi_agent: false,
            supports_file_context: true,
            preferred_tasks: vec![TaskType::Refactor, TaskType::Feature],
        },
        Operator::Claude => Capabilities {
            supports_sessions: false,
            supports_multi_agent: false,
            supports_file_context: false,
            preferred_tasks: vec![TaskType::QuickFix],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_opencode_supports_multi_agent() {
        for op in Operator::ALL {
            let caps = for_operator(op);
            assert_eq!(caps.supports_multi_agent, op == Operator::Opencode);
        }
    }

    #[test]
    fn claude_has_no_file_context_support() {
        assert!(!for_operator(Operator::Claude).supports_file_context);
    }
}
