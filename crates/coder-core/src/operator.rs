use std::fmt;
use std::str::FromStr;

/// The external AI coding CLI binaries this suite knows how to drive.
///
/// Closed by design: an operator name that does not match one of these
/// variants is rejected at the boundary (config validation, MCP request
/// validation) rather than silently coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Aider,
    Opencode,
    Gemini,
    Claude,
}

impl Operator {
    pub const ALL: [Operator; 4] = [
        Operator::Aider,
        Operator::Opencode,
        Operator::Gemini,
        Operator::Claude,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Aider => "aider",
            Operator::Opencode => "opencode",
            Operator::Gemini => "gemini",
            Operator::Claude => "claude",
        }
    }

    /// Environment-variable infix used for per-CLI timeout overrides
    /// (`NINJA_<CLI>_TIMEOUT`).
    pub fn env_infix(&self) -> &'static str {
        match self {
            Operator::Aider => "AIDER",
            Operator::Opencode => "OPENCODE",
            Operator::Gemini => "GEMINI",
            Operator::Claude => "CLAUDE",
        }
    }

    pub fn supports_sessions(&self) -> bool {
        matches!(self, Operator::Opencode)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "aider" => Ok(Operator::Aider),
            "opencode" => Ok(Operator::Opencode),
            "gemini" => Ok(Operator::Gemini),
            "claude" => Ok(Operator::Claude),
            other => Err(format!("unknown operator '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_str() {
        for op in Operator::ALL {
            let parsed: Operator = op.as_str().parse().unwrap();
            assert_eq!(parsed, op);
        }
    }

    #[test]
    fn rejects_unknown_operator() {
        assert!("codex".parse::<Operator>().is_err());
    }

    #[test]
    fn only_opencode_supports_sessions() {
        assert!(Operator::Opencode.supports_sessions());
        assert!(!Operator::Aider.supports_sessions());
        assert!(!Operator::Gemini.supports_sessions());
        assert!(!Operator::Claude.supports_sessions());
    }
}
