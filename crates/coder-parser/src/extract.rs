use coder_core::PlanExecutionResult;
use regex::Regex;
use std::sync::OnceLock;

fn fenced_json_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)```json\s*(\{.*?\})\s*```").expect("static fenced-json pattern")
    })
}

/// Find the last fenced ` ```json ``` ` block in `output` and parse it as a
/// [`PlanExecutionResult`]. A CLI that emits intermediate JSON examples
/// before its final answer still yields the right block this way.
pub fn extract_structured_result(output: &str) -> Option<PlanExecutionResult> {
    let last_match = fenced_json_pattern().captures_iter(output).last()?;
    let body = last_match.get(1)?.as_str();
    serde_json::from_str(body).ok()
}

fn generic_touched_path_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [r"(?i)(?:wrote|created|modified|updated|edited) ([^\s,]+)"]
            .iter()
            .map(|p| Regex::new(p).expect("static generic touched-path pattern"))
            .collect()
    })
}

/// `true` iff `candidate` looks like an actual path reference: it has a
/// path separator or a recognizable extension, and it does not end with a
/// bare trailing dot (an artifact of matching inside a sentence).
fn looks_like_path(candidate: &str) -> bool {
    if candidate.ends_with('.') {
        return false;
    }
    let has_extension = candidate.contains('.')
        && candidate
            .rsplit('.')
            .next()
            .map(|ext| !ext.is_empty() && ext.len() <= 8)
            .unwrap_or(false);
    candidate.contains('/') || candidate.contains('\\') || has_extension
}

/// Run the generic patterns plus `cli_patterns` over `combined_output` and
/// return the deduplicated, first-seen-order list of suspected touched
/// paths that survive [`looks_like_path`].
pub fn heuristic_touched_paths(combined_output: &str, cli_patterns: &[&str]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut ordered = Vec::new();

    let mut push_matches = |re: &Regex| {
        for captures in re.captures_iter(combined_output) {
            let Some(path) = captures.get(1) else { continue };
            let path = path.as_str();
            if !looks_like_path(path) {
                continue;
            }
            if seen.insert(path.to_string()) {
                ordered.push(path.to_string());
            }
        }
    };

    for re in generic_touched_path_patterns() {
        push_matches(re);
    }
    for pattern in cli_patterns {
        match Regex::new(pattern) {
            Ok(re) => push_matches(&re),
            Err(error) => {
                tracing::warn!(pattern, %error, "skipping malformed CLI heuristic pattern");
            }
        }
    }

    ordered
}

/// `true` iff `combined_output` contains any action-intent keyword,
/// matched case-insensitively as a prefix (so "modif" also matches
/// "modifies"/"modified").
pub fn has_action_intent_keywords(combined_output: &str) -> bool {
    const KEYWORDS: &[&str] = &[
        "write", "create", "modif", "updat", "edit", "add", "implement",
    ];
    let lowered = combined_output.to_ascii_lowercase();
    KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use coder_core::OverallStatus;

    #[test]
    fn extracts_fenced_json_block() {
        let output = "some preamble\n```json\n{\"overall_status\":\"success\",\"steps\":[],\"files_modified\":[],\"notes\":\"\",\"execution_time\":1.0}\n```\ntrailer";
        let result = extract_structured_result(output).unwrap();
        assert_eq!(result.overall_status, OverallStatus::Success);
    }

    #[test]
    fn picks_last_block_when_several_present() {
        let output = "```json\n{\"bad\": true}\n```\n```json\n{\"overall_status\":\"failed\",\"steps\":[],\"files_modified\":[],\"notes\":\"x\",\"execution_time\":0.5}\n```";
        let result = extract_structured_result(output).unwrap();
        assert_eq!(result.overall_status, OverallStatus::Failed);
    }

    #[test]
    fn no_fence_returns_none() {
        assert!(extract_structured_result("plain text, no json here").is_none());
    }

    #[test]
    fn heuristic_extraction_dedupes_preserving_order() {
        let output = "Applied edit to src/a.rs\nwrote src/a.rs\nCreated src/b.rs";
        let paths = heuristic_touched_paths(output, &[r"(?i)Applied edit to ([^\s,]+)"]);
        assert_eq!(paths, vec!["src/a.rs".to_string(), "src/b.rs".to_string()]);
    }

    #[test]
    fn rejects_matches_without_separator_or_extension() {
        let output = "modified everything";
        let paths = heuristic_touched_paths(output, &[]);
        assert!(paths.is_empty());
    }

    #[test]
    fn rejects_trailing_dot_matches() {
        let output = "updated the file.";
        let paths = heuristic_touched_paths(output, &[]);
        assert!(paths.is_empty());
    }

    #[test]
    fn detects_action_intent_keywords() {
        assert!(has_action_intent_keywords("I modified the config"));
        assert!(!has_action_intent_keywords("Everything looks fine already"));
    }

    #[test]
    fn touched_path_pattern_accepts_relative_file_without_slash() {
        let paths = heuristic_touched_paths("created config.toml", &[]);
        assert_eq!(paths, vec!["config.toml".to_string()]);
    }
}
