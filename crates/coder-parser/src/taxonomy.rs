use coder_core::ErrorKind;
use regex::Regex;
use std::sync::OnceLock;

fn auth_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(?i)AuthenticationError",
            r"(?i)User not found",
            r"(?i)Unauthorized",
            r"\b401\b",
            r"\b403\b",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("static auth pattern"))
        .collect()
    })
}

fn credits_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(?i)insufficient credits",
            r"(?i)requires more credits",
            r"(?i)can only afford",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("static credits pattern"))
        .collect()
    })
}

fn generic_api_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [r"(?i)APIError", r"(?i)RateLimitError", r"(?i)ServiceUnavailable"]
            .iter()
            .map(|p| Regex::new(p).expect("static generic api pattern"))
            .collect()
    })
}

/// A detected failure kind plus the summary to surface to the caller.
pub struct Detected {
    pub error_kind: ErrorKind,
    pub summary: String,
}

/// Classify `combined_output` against the fixed error taxonomies. Only
/// called when `exit_code != 0`; a match here short-circuits the rest of
/// the parse pipeline.
pub fn detect(combined_output: &str) -> Option<Detected> {
    if auth_patterns().iter().any(|re| re.is_match(combined_output)) {
        return Some(Detected {
            error_kind: ErrorKind::AuthError,
            summary: "Authentication failed; check the operator's credentials".to_string(),
        });
    }
    if credits_patterns().iter().any(|re| re.is_match(combined_output)) {
        return Some(Detected {
            error_kind: ErrorKind::InsufficientCredits,
            summary: "Insufficient credits; add credits at the provider's billing page"
                .to_string(),
        });
    }
    if generic_api_patterns().iter().any(|re| re.is_match(combined_output)) {
        return Some(Detected {
            error_kind: ErrorKind::InternalError,
            summary: "The CLI reported an API error; see logs for the raw output".to_string(),
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_auth_failure() {
        let found = detect("Error: AuthenticationError: invalid token").unwrap();
        assert_eq!(found.error_kind, ErrorKind::AuthError);
    }

    #[test]
    fn detects_credits_failure() {
        let found = detect("you have insufficient credits to continue").unwrap();
        assert_eq!(found.error_kind, ErrorKind::InsufficientCredits);
    }

    #[test]
    fn detects_generic_api_error() {
        let found = detect("openai.APIError: server had an error").unwrap();
        assert_eq!(found.error_kind, ErrorKind::InternalError);
    }

    #[test]
    fn clean_output_detects_nothing() {
        assert!(detect("Applied edit to src/lib.rs\nDone.").is_none());
    }

    #[test]
    fn http_status_codes_match_as_word_boundaries() {
        assert!(detect("request failed with 401").is_some());
        assert!(detect("processed 4013 records").is_none());
    }
}
