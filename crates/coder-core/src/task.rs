/// Closed complexity tiers produced by the task analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskComplexity {
    Simple,
    Moderate,
    Complex,
    FullStack,
}

/// Closed task-shape taxonomy produced by the task analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    QuickFix,
    Refactor,
    Feature,
    Architecture,
    MultiAgent,
}

/// Output of the (pure) task analyzer over a task description and its
/// declared context paths.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TaskAnalysis {
    pub complexity: TaskComplexity,
    pub task_type: TaskType,
    pub estimated_files: usize,
    pub requires_session: bool,
    pub requires_multi_agent: bool,
    pub keywords: Vec<String>,
}
