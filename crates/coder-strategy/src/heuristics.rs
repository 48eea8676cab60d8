use coder_core::Operator;

/// CLI-specific heuristic regex *source strings* for touched-path
/// extraction. These supplement the generic
/// `(wrote|created|modified|updated|edited) X` patterns that live in
/// `coder-parser` as the shared core; a pattern here is only kept when a
/// match contains a path separator or file extension and does not end
/// with a dot (`coder-parser` enforces that filter, not this crate).
pub(crate) fn heuristic_patterns(operator: Operator) -> &'static [&'static str] {
    match operator {
        Operator::Aider => &[
            r"(?i)Applied edit to ([^\s,]+)",
            r"(?i)Added ([^\s,]+) to the chat",
            r"(?i)Created ([^\s,]+)",
        ],
        Operator::Opencode => &[
            r"(?i)Wrote ([^\s,]+)",
            r"(?i)Patched ([^\s,]+)",
        ],
        Operator::Gemini => &[r"(?i)Updated file[:]? ([^\s,]+)"],
        Operator::Claude => &[r"(?i)Created file ([^\s,]+)"],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn every_operator_pattern_compiles() {
        for op in Operator::ALL {
            for pattern in heuristic_patterns(op) {
                Regex::new(pattern).unwrap_or_else(|e| panic!("bad pattern {pattern}: {e}"));
            }
        }
    }
}
