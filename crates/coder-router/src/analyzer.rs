use coder_core::{TaskAnalysis, TaskComplexity, TaskType};
use regex::Regex;
use std::sync::OnceLock;

struct KeywordSet {
    task_type: TaskType,
    words: &'static [&'static str],
}

const TASK_TYPE_KEYWORDS: &[KeywordSet] = &[
    KeywordSet {
        task_type: TaskType::MultiAgent,
        words: &["multi-agent", "multi agent", "swarm", "multiple agents"],
    },
    KeywordSet {
        task_type: TaskType::Architecture,
        words: &["architecture", "redesign", "migrate", "migration", "overhaul"],
    },
    KeywordSet {
        task_type: TaskType::Refactor,
        words: &["refactor", "restructure", "clean up", "rename"],
    },
    KeywordSet {
        task_type: TaskType::QuickFix,
        words: &["fix", "bug", "typo", "patch", "hotfix"],
    },
    KeywordSet {
        task_type: TaskType::Feature,
        words: &["add", "implement", "feature", "support for", "build"],
    },
];

const COMPLEXITY_KEYWORDS: &[(&[&str], TaskComplexity)] = &[
    (&["full stack", "frontend and backend", "end to end"], TaskComplexity::FullStack),
    (&["architecture", "redesign", "overhaul", "migration"], TaskComplexity::Complex),
    (&["refactor", "implement", "feature"], TaskComplexity::Moderate),
];

/// Compile one `\b(word|word)\b` alternation per call site, case
/// insensitive, so "refactor" matches but "refactored" inside an
/// unrelated identifier like "prefactoring" does not.
fn boundary_pattern(words: &[&str]) -> Regex {
    let escaped: Vec<String> = words.iter().map(|w| regex::escape(w)).collect();
    Regex::new(&format!(r"(?i)\b({})\b", escaped.join("|"))).expect("static keyword pattern")
}

fn task_type_patterns() -> &'static [(TaskType, Regex)] {
    static PATTERNS: OnceLock<Vec<(TaskType, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        TASK_TYPE_KEYWORDS
            .iter()
            .map(|set| (set.task_type, boundary_pattern(set.words)))
            .collect()
    })
}

fn complexity_patterns() -> &'static [(Regex, TaskComplexity)] {
    static PATTERNS: OnceLock<Vec<(Regex, TaskComplexity)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        COMPLEXITY_KEYWORDS
            .iter()
            .map(|(words, complexity)| (boundary_pattern(words), *complexity))
            .collect()
    })
}

fn classify_task_type(task: &str) -> (TaskType, Vec<String>) {
    let mut matched = Vec::new();
    for (task_type, pattern) in task_type_patterns() {
        if let Some(found) = pattern.find(task) {
            matched.push(found.as_str().to_ascii_lowercase());
            return (*task_type, matched);
        }
    }
    (TaskType::Feature, matched)
}

fn classify_complexity(task: &str, context_paths: &[String]) -> (TaskComplexity, Vec<String>) {
    let mut matched = Vec::new();
    if context_paths.len() >= 6 {
        return (TaskComplexity::Complex, matched);
    }
    for (pattern, complexity) in complexity_patterns() {
        if let Some(found) = pattern.find(task) {
            matched.push(found.as_str().to_ascii_lowercase());
            return (*complexity, matched);
        }
    }
    if context_paths.len() >= 2 {
        return (TaskComplexity::Moderate, matched);
    }
    (TaskComplexity::Simple, matched)
}

fn estimate_files(complexity: TaskComplexity, context_paths: &[String]) -> usize {
    if !context_paths.is_empty() {
        return context_paths.len();
    }
    match complexity {
        TaskComplexity::Simple => 1,
        TaskComplexity::Moderate => 3,
        TaskComplexity::Complex => 6,
        TaskComplexity::FullStack => 10,
    }
}

/// Pure classification of a task description plus its declared context
/// paths. Same inputs always produce the same [`TaskAnalysis`].
pub fn analyze(task: &str, context_paths: &[String]) -> TaskAnalysis {
    let (task_type, mut type_keywords) = classify_task_type(task);
    let (complexity, mut complexity_keywords) = classify_complexity(task, context_paths);

    let mut keywords = Vec::new();
    keywords.append(&mut type_keywords);
    keywords.append(&mut complexity_keywords);
    keywords.sort();
    keywords.dedup();

    let requires_multi_agent = task_type == TaskType::MultiAgent;
    let requires_session = requires_multi_agent
        || matches!(complexity, TaskComplexity::Complex | TaskComplexity::FullStack);

    TaskAnalysis {
        complexity,
        task_type,
        estimated_files: estimate_files(complexity, context_paths),
        requires_session,
        requires_multi_agent,
        keywords,
    }
}
