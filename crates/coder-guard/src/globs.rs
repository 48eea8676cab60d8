use crate::BUILTIN_DENY;

const MATCH_OPTS: glob::MatchOptions = glob::MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

fn matches_any(path: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|pattern| {
        glob::Pattern::new(pattern)
            .map(|p| p.matches_with(path, MATCH_OPTS))
            .unwrap_or(false)
    })
}

fn matches_any_owned(path: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|pattern| {
        glob::Pattern::new(pattern)
            .map(|p| p.matches_with(path, MATCH_OPTS))
            .unwrap_or(false)
    })
}

/// A write to `relative_path` is allowed iff `allowed_globs` is empty
/// (unrestricted) or it matches at least one entry, and it matches
/// neither `deny_globs` nor the built-in deny list.
pub(crate) fn is_allowed(relative_path: &str, allowed_globs: &[String], deny_globs: &[String]) -> bool {
    if matches_any(relative_path, BUILTIN_DENY) {
        return false;
    }
    if matches_any_owned(relative_path, deny_globs) {
        return false;
    }
    if allowed_globs.is_empty() {
        return true;
    }
    matches_any_owned(relative_path, allowed_globs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_allowed_means_unrestricted() {
        assert!(is_allowed("src/main.rs", &[], &[]));
    }

    #[test]
    fn matches_allowed_glob() {
        let allowed = vec!["src/**".to_string()];
        assert!(is_allowed("src/foo/bar.rs", &allowed, &[]));
        assert!(!is_allowed("tests/foo.rs", &allowed, &[]));
    }

    #[test]
    fn deny_glob_overrides_allowed() {
        let allowed = vec!["src/**".to_string()];
        let deny = vec!["src/secret.rs".to_string()];
        assert!(!is_allowed("src/secret.rs", &allowed, &deny));
    }

    #[test]
    fn builtin_deny_always_wins() {
        let allowed = vec!["**".to_string()];
        assert!(!is_allowed(".git/config", &allowed, &[]));
        assert!(!is_allowed(".ninja/logs/x.jsonl", &allowed, &[]));
    }

    #[test]
    fn empty_allowed_list_with_empty_globs_vector_still_denies_builtin() {
        assert!(!is_allowed(".git/HEAD", &[], &[]));
    }
}
