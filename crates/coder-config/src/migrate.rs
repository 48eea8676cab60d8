use crate::error::ConfigError;
use crate::store::ConfigStore;
use chrono::Utc;
use coder_core::{ComponentConfig, ConfigDocument, ModelsConfig, Operator};
use coder_credentials::CredentialStore;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// One parsed `KEY=VALUE` line, or a warning for a malformed one.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ParsedLine {
    Entry { key: String, value: String },
    Warning { line_no: usize, reason: String },
}

/// Parse `KEY=VALUE` lines (optionally `export `-prefixed), honoring
/// single/double quotes and `#` comments; malformed lines are reported,
/// not fatal.
fn parse_env_lines(contents: &str) -> Vec<ParsedLine> {
    let mut out = Vec::new();
    for (idx, raw_line) in contents.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line).trim();
        let Some((key, value)) = line.split_once('=') else {
            out.push(ParsedLine::Warning {
                line_no,
                reason: format!("no '=' found in line: {raw_line:?}"),
            });
            continue;
        };
        let key = key.trim();
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            out.push(ParsedLine::Warning {
                line_no,
                reason: format!("invalid variable name: {key:?}"),
            });
            continue;
        }
        let value = unquote(value.trim());
        out.push(ParsedLine::Entry {
            key: key.to_string(),
            value,
        });
    }
    out
}

fn strip_comment(line: &str) -> &str {
    // A `#` inside a quoted value is not a comment marker; only an
    // unquoted `#` starts one.
    let mut in_single = false;
    let mut in_double = false;
    for (i, c) in line.char_indices() {
        match c {
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '#' if !in_single && !in_double => return &line[..i],
            _ => {}
        }
    }
    line
}

fn unquote(value: &str) -> String {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return value[1..value.len() - 1].to_string();
        }
    }
    value.to_string()
}

fn is_credential_key(key: &str) -> bool {
    const SUFFIXES: &[&str] = &["_API_KEY", "_KEY", "_TOKEN", "_SECRET", "_PASSWORD"];
    let upper = key.to_ascii_uppercase();
    SUFFIXES.iter().any(|suffix| upper.ends_with(suffix))
}

/// Fixed table mapping non-credential legacy env keys into the typed
/// config tree.
fn apply_config_mapping(doc: &mut ConfigDocument, key: &str, value: &str) -> bool {
    fn component_mut<'a>(doc: &'a mut ConfigDocument, name: &str) -> &'a mut ComponentConfig {
        let slot = match name {
            "coder" => &mut doc.coder,
            "researcher" => &mut doc.researcher,
            _ => &mut doc.secretary,
        };
        slot.get_or_insert_with(|| ComponentConfig {
            operator: Operator::Aider,
            operator_settings: BTreeMap::new(),
            models: ModelsConfig::default(),
        })
    }

    match key.to_ascii_uppercase().as_str() {
        "NINJA_CODE_BIN" => {
            if let Ok(op) = Operator::from_str(value) {
                component_mut(doc, "coder").operator = op;
                return true;
            }
            false
        }
        "NINJA_CODE_MODEL" => {
            component_mut(doc, "coder").models.default = Some(value.to_string());
            true
        }
        "NINJA_CODE_MODEL_QUICK" => {
            component_mut(doc, "coder").models.quick = Some(value.to_string());
            true
        }
        "NINJA_CODE_MODEL_HEAVY" => {
            component_mut(doc, "coder").models.heavy = Some(value.to_string());
            true
        }
        "NINJA_CODE_MODEL_PARALLEL" => {
            component_mut(doc, "coder").models.parallel = Some(value.to_string());
            true
        }
        "NINJA_RESEARCH_BIN" => {
            if let Ok(op) = Operator::from_str(value) {
                component_mut(doc, "researcher").operator = op;
                return true;
            }
            false
        }
        "NINJA_RESEARCH_MODEL" => {
            component_mut(doc, "researcher").models.default = Some(value.to_string());
            true
        }
        "NINJA_SECRETARY_BIN" => {
            if let Ok(op) = Operator::from_str(value) {
                component_mut(doc, "secretary").operator = op;
                return true;
            }
            false
        }
        "NINJA_SECRETARY_MODEL" => {
            component_mut(doc, "secretary").models.default = Some(value.to_string());
            true
        }
        _ => false,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MigrationLog {
    pub migrated_at: chrono::DateTime<Utc>,
    pub source_env_file: PathBuf,
    pub backup_path: PathBuf,
    pub credentials_migrated: Vec<String>,
    pub config_keys_mapped: Vec<String>,
    pub warnings: Vec<String>,
}

/// Outcome of `migrate_from_legacy`: `Skipped` when the one-shot
/// precondition (`config.json` absent, legacy env-file present) does not
/// hold, which makes re-running the migration idempotent.
#[derive(Debug)]
pub enum MigrationOutcome {
    Skipped,
    Migrated(MigrationLog),
}

/// Run the legacy env-file migration, step by step.
pub fn migrate_from_legacy(
    config_store: &ConfigStore,
    legacy_env_path: &Path,
    credential_store: &CredentialStore,
    backup_dir: &Path,
    migrations_dir: &Path,
) -> Result<MigrationOutcome, ConfigError> {
    if config_store.path().exists() || !legacy_env_path.exists() {
        return Ok(MigrationOutcome::Skipped);
    }

    // Step 1: timestamped backup.
    std::fs::create_dir_all(backup_dir)?;
    let timestamp = Utc::now().format("%Y%m%dT%H%M%SZ");
    let backup_path = backup_dir.join(format!(
        "{}.{timestamp}.bak",
        legacy_env_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("env")
    ));
    std::fs::copy(legacy_env_path, &backup_path)?;

    // Step 2: parse.
    let contents = std::fs::read_to_string(legacy_env_path)?;
    let parsed = parse_env_lines(&contents);

    let mut doc = ConfigDocument::default();
    let mut credentials_migrated = Vec::new();
    let mut config_keys_mapped = Vec::new();
    let mut warnings = Vec::new();

    for line in parsed {
        match line {
            ParsedLine::Warning { line_no, reason } => {
                warnings.push(format!("line {line_no}: {reason}"));
            }
            ParsedLine::Entry { key, value } => {
                if is_credential_key(&key) {
                    // Step 3.
                    let provider = coder_credentials::infer_provider(&key);
                    credential_store.set(&key, &value, Some(provider))?;
                    credentials_migrated.push(key);
                } else if apply_config_mapping(&mut doc, &key, &value) {
                    // Step 4.
                    config_keys_mapped.push(key);
                } else {
                    warnings.push(format!("unmapped legacy key skipped: {key}"));
                }
            }
        }
    }

    config_store.save(&doc)?;

    // Step 5: rename source file, write migration log, emit log entry.
    let migrated_path = legacy_env_path.with_extension(
        legacy_env_path
            .extension()
            .map(|e| format!("{}.migrated", e.to_string_lossy()))
            .unwrap_or_else(|| "migrated".to_string()),
    );
    std::fs::rename(legacy_env_path, &migrated_path)?;

    let log = MigrationLog {
        migrated_at: Utc::now(),
        source_env_file: legacy_env_path.to_path_buf(),
        backup_path,
        credentials_migrated,
        config_keys_mapped,
        warnings,
    };

    std::fs::create_dir_all(migrations_dir)?;
    let log_path = migrations_dir.join(format!("{timestamp}.json"));
    let log_json = serde_json::to_string_pretty(&log).map_err(|e| ConfigError::Malformed(e.to_string()))?;
    std::fs::write(&log_path, log_json)?;

    tracing::info!(
        credentials = log.credentials_migrated.len(),
        config_keys = log.config_keys_mapped.len(),
        warnings = log.warnings.len(),
        "migrated legacy env-file configuration to config.json"
    );

    Ok(MigrationOutcome::Migrated(log))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parses_quoted_exported_and_commented_lines() {
        let contents = "export FOO=\"bar baz\"\n# a comment\nBARE=plain # trailing comment\nBAD LINE\nEMPTY=''\n";
        let parsed = parse_env_lines(contents);
        assert_eq!(
            parsed,
            vec![
                ParsedLine::Entry { key: "FOO".into(), value: "bar baz".into() },
                ParsedLine::Entry { key: "BARE".into(), value: "plain".into() },
                ParsedLine::Warning { line_no: 4, reason: "no '=' found in line: \"BAD LINE\"".into() },
                ParsedLine::Entry { key: "EMPTY".into(), value: "".into() },
            ]
        );
    }

    #[test]
    fn recognizes_credential_key_suffixes() {
        assert!(is_credential_key("OPENROUTER_API_KEY"));
        assert!(is_credential_key("SOME_TOKEN"));
        assert!(is_credential_key("DB_PASSWORD"));
        assert!(!is_credential_key("NINJA_CODE_BIN"));
    }

    fn setup() -> (tempfile::TempDir, ConfigStore, CredentialStore, PathBuf) {
        let dir = tempdir().unwrap();
        let config_store = ConfigStore::new(dir.path().join("config.json"));
        let credential_store =
            CredentialStore::open(&dir.path().join("credentials.db"), Some("pw")).unwrap();
        let env_path = dir.path().join("legacy.env");
        std::fs::write(
            &env_path,
            "export NINJA_CODE_BIN=aider\nOPENROUTER_API_KEY=sk-or-123\nNINJA_CODE_MODEL=gpt-5\nJUNK_VAR=nope\n",
        )
        .unwrap();
        (dir, config_store, credential_store, env_path)
    }

    #[test]
    fn migrates_env_file_end_to_end() {
        let (dir, config_store, credential_store, env_path) = setup();
        let backup_dir = dir.path().join("config.backup");
        let migrations_dir = dir.path().join("migrations");

        let outcome =
            migrate_from_legacy(&config_store, &env_path, &credential_store, &backup_dir, &migrations_dir)
                .unwrap();

        let MigrationOutcome::Migrated(log) = outcome else {
            panic!("expected migration to run");
        };
        assert_eq!(log.credentials_migrated, vec!["OPENROUTER_API_KEY".to_string()]);
        assert!(log.config_keys_mapped.contains(&"NINJA_CODE_BIN".to_string()));
        assert!(log.warnings.iter().any(|w| w.contains("JUNK_VAR")));

        assert_eq!(credential_store.get("OPENROUTER_API_KEY").unwrap(), "sk-or-123");
        let doc = config_store.load().unwrap();
        assert_eq!(doc.coder.unwrap().operator, Operator::Aider);
        assert!(!env_path.exists());
        assert!(env_path.with_extension("env.migrated").exists());
    }

    #[test]
    fn migration_is_idempotent_on_second_run() {
        let (dir, config_store, credential_store, env_path) = setup();
        let backup_dir = dir.path().join("config.backup");
        let migrations_dir = dir.path().join("migrations");

        migrate_from_legacy(&config_store, &env_path, &credential_store, &backup_dir, &migrations_dir)
            .unwrap();
        let doc_after_first = config_store.load().unwrap();
        let creds_after_first = credential_store.list().unwrap();

        // Second run: env file is gone (renamed away), config.json exists now.
        let outcome =
            migrate_from_legacy(&config_store, &env_path, &credential_store, &backup_dir, &migrations_dir)
                .unwrap();
        assert!(matches!(outcome, MigrationOutcome::Skipped));

        let doc_after_second = config_store.load().unwrap();
        let creds_after_second = credential_store.list().unwrap();
        assert_eq!(doc_after_first, doc_after_second);
        assert_eq!(creds_after_first.len(), creds_after_second.len());
    }
}
