use crate::error::RouterError;
use coder_core::{Operator, TaskAnalysis, TaskType};
use tracing::warn;

/// Default operator suggested for a task type when no preference or
/// capability rule applies. Mirrors the same suggestion a strategy's own
/// declared `preferred_tasks` would make, kept local here since this
/// crate has no dependency on `coder-strategy`.
fn suggested_operator(task_type: TaskType) -> Operator {
    match task_type {
        TaskType::QuickFix => Operator::Aider,
        TaskType::Refactor => Operator::Aider,
        TaskType::Feature => Operator::Opencode,
        TaskType::Architecture => Operator::Opencode,
        TaskType::MultiAgent => Operator::Opencode,
    }
}

fn is_available(operator: Operator, available: &[Operator]) -> bool {
    available.contains(&operator)
}

/// Stateless: pick an operator for `analysis` from `available`, honoring
/// `preferred` first.
///
/// 1. The user's preferred operator, if it is in `available`.
/// 2. Capability rules: multi-agent or session-requiring tasks want
///    OpenCode; a simple quick fix wants Aider; otherwise the task
///    type's suggested operator.
/// 3. Any available operator at all, with a warning.
pub fn select(
    analysis: &TaskAnalysis,
    preferred: Option<Operator>,
    available: &[Operator],
) -> Result<Operator, RouterError> {
    if let Some(preferred) = preferred {
        if is_available(preferred, available) {
            return Ok(preferred);
        }
    }

    if analysis.requires_multi_agent && is_available(Operator::Opencode, available) {
        return Ok(Operator::Opencode);
    }
    if analysis.requires_session && is_available(Operator::Opencode, available) {
        return Ok(Operator::Opencode);
    }
    if analysis.task_type == TaskType::QuickFix
        && matches!(analysis.complexity, coder_core::TaskComplexity::Simple)
        && is_available(Operator::Aider, available)
    {
        return Ok(Operator::Aider);
    }
    let suggested = suggested_operator(analysis.task_type);
    if is_available(suggested, available) {
        return Ok(suggested);
    }

    match available.first() {
        Some(&fallback) => {
            warn!(
                ?preferred,
                task_type = ?analysis.task_type,
                fallback = %fallback,
                "no preferred or rule-matched operator available, falling back"
            );
            Ok(fallback)
        }
        None => Err(RouterError::NoOperatorAvailable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze;

    #[test]
    fn honors_available_preference() {
        let analysis = analyze("add a new feature", &[]);
        let chosen = select(&analysis, Some(Operator::Claude), &[Operator::Aider, Operator::Claude]).unwrap();
        assert_eq!(chosen, Operator::Claude);
    }

    #[test]
    fn ignores_unavailable_preference_and_applies_rules() {
        let analysis = analyze("fix a small bug", &[]);
        let chosen = select(&analysis, Some(Operator::Claude), &[Operator::Aider, Operator::Opencode]).unwrap();
        assert_eq!(chosen, Operator::Aider);
    }

    #[test]
    fn multi_agent_tasks_prefer_opencode() {
        let analysis = analyze("run a multi-agent review", &[]);
        let chosen = select(&analysis, None, &[Operator::Aider, Operator::Opencode]).unwrap();
        assert_eq!(chosen, Operator::Opencode);
    }

    #[test]
    fn falls_back_to_any_available_operator_with_warning() {
        let analysis = analyze("fix a small bug", &[]);
        let chosen = select(&analysis, None, &[Operator::Gemini]).unwrap();
        assert_eq!(chosen, Operator::Gemini);
    }

    #[test]
    fn errors_when_nothing_is_available() {
        let analysis = analyze("fix a small bug", &[]);
        let err = select(&analysis, None, &[]).unwrap_err();
        assert_eq!(err.error_kind(), coder_core::ErrorKind::CliNotFound);
    }
}
