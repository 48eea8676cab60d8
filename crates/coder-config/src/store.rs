use crate::error::ConfigError;
use crate::{paths, validate};
use coder_core::ConfigDocument;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Typed, hierarchical configuration document backed by `config.json`
/// Atomic save (write-temp-fsync-rename); legacy env-file migration
/// lives in [`crate::migrate`].
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn at_default_path() -> Self {
        Self::new(paths::default_config_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the default document if no file exists yet.
    pub fn load(&self) -> Result<ConfigDocument, ConfigError> {
        if !self.path.exists() {
            return Ok(ConfigDocument::default());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        let raw: serde_json::Value = serde_json::from_str(&contents)
            .map_err(|e| ConfigError::Malformed(e.to_string()))?;
        validate::reject_unknown_keys(&raw)?;
        let doc: ConfigDocument =
            serde_json::from_value(raw).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        validate::validate_registered_operators(&doc)?;
        Ok(doc)
    }

    /// Write `doc` atomically: serialize, validate, write to a sibling
    /// temp file with mode `0600`, `fsync`, then rename over the target.
    /// Parent directory is created with mode `0700`.
    pub fn save(&self, doc: &ConfigDocument) -> Result<(), ConfigError> {
        validate::validate_registered_operators(doc)?;
        let raw = serde_json::to_value(doc).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        validate::reject_unknown_keys(&raw)?;

        if let Some(parent) = self.path.parent() {
            paths::ensure_dir_0700(parent)?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        {
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&tmp_path)?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
            }
            let pretty = serde_json::to_string_pretty(&raw)
                .map_err(|e| ConfigError::Malformed(e.to_string()))?;
            file.write_all(pretty.as_bytes())?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp_path, &self.path)?;
        // fsync the parent directory entry too, so the rename itself is durable.
        if let Some(parent) = self.path.parent() {
            if let Ok(dir) = File::open(parent) {
                let _ = dir.sync_all();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coder_core::{ComponentConfig, ModelsConfig, Operator};
    use tempfile::tempdir;

    fn sample_doc() -> ConfigDocument {
        ConfigDocument {
            coder: Some(ComponentConfig {
                operator: Operator::Aider,
                operator_settings: Default::default(),
                models: ModelsConfig {
                    default: Some("gpt-5".to_string()),
                    ..Default::default()
                },
            }),
            researcher: None,
            secretary: None,
        }
    }

    #[test]
    fn load_missing_file_returns_default() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("config.json"));
        assert_eq!(store.load().unwrap(), ConfigDocument::default());
    }

    #[test]
    fn save_then_load_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("nested/config.json"));
        let doc = sample_doc();
        store.save(&doc).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn save_sets_restrictive_permissions() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("config.json"));
        store.save(&sample_doc()).unwrap();

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let meta = std::fs::metadata(store.path()).unwrap();
            assert_eq!(meta.permissions().mode() & 0o777, 0o600);
            let parent_meta = std::fs::metadata(store.path().parent().unwrap()).unwrap();
            assert_eq!(parent_meta.permissions().mode() & 0o777, 0o700);
        }
    }

    #[test]
    fn load_rejects_unknown_top_level_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"bogus": {}}"#).unwrap();
        let store = ConfigStore::new(path);
        assert!(matches!(store.load(), Err(ConfigError::UnknownKeys(_))));
    }
}
