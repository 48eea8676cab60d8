use crate::crypto;
use crate::error::CredentialError;
use chrono::{DateTime, Utc};
use coder_core::{mask_value, CredentialInfo, CredentialRecord};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS encryption_meta (
    id INTEGER PRIMARY KEY CHECK (id = 0),
    kdf_id TEXT NOT NULL,
    salt BLOB NOT NULL,
    created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS credentials (
    name TEXT PRIMARY KEY,
    provider TEXT,
    ciphertext BLOB NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    last_used TEXT
);
";

/// Encrypted at-rest credential database. One `CredentialStore` per
/// process; a single mutex serializes every access to the underlying
/// connection — a "thread-local connections, single-writer" model
/// collapses cleanly onto one guarded `Connection` since SQLite itself
/// only allows one writer at a time.
pub struct CredentialStore {
    conn: Mutex<Connection>,
    master_key: [u8; crypto::KEY_LEN],
}

impl CredentialStore {
    /// Open (creating if absent) the database at `db_path`, deriving the
    /// master key from machine identity and `passphrase`.
    pub fn open(db_path: &Path, passphrase: Option<&str>) -> Result<Self, CredentialError> {
        crate::paths::ensure_parent_dir(db_path)?;
        let is_new = !db_path.exists();
        let conn = Connection::open(db_path)?;
        conn.execute_batch(SCHEMA)?;
        if is_new {
            crate::paths::restrict_file_perms(db_path)?;
        }

        let salt: [u8; crypto::SALT_LEN] = conn
            .query_row(
                "SELECT salt FROM encryption_meta WHERE id = 0",
                [],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?
            .map(|bytes| {
                let mut salt = [0u8; crypto::SALT_LEN];
                salt.copy_from_slice(&bytes);
                salt
            })
            .unwrap_or_else(|| {
                let salt = crypto::random_salt();
                conn.execute(
                    "INSERT INTO encryption_meta (id, kdf_id, salt, created_at) VALUES (0, ?1, ?2, ?3)",
                    params!["pbkdf2-hmac-sha256", salt.to_vec(), Utc::now().to_rfc3339()],
                )
                .expect("insert encryption metadata");
                salt
            });

        let master_key = crypto::derive_master_key(&salt, passphrase);
        Ok(Self {
            conn: Mutex::new(conn),
            master_key,
        })
    }

    pub fn set(
        &self,
        name: &str,
        value: &str,
        provider: Option<&str>,
    ) -> Result<(), CredentialError> {
        if name.is_empty() {
            return Err(CredentialError::Value("credential name must not be empty".into()));
        }
        if value.is_empty() {
            return Err(CredentialError::Value("credential value must not be empty".into()));
        }
        let ciphertext = crypto::encrypt(&self.master_key, value)?;
        let conn = self.conn.lock().unwrap_or_else(|p| p.into_inner());
        let now = Utc::now().to_rfc3339();
        let existing_created_at: Option<String> = conn
            .query_row(
                "SELECT created_at FROM credentials WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        let created_at = existing_created_at.unwrap_or_else(|| now.clone());
        conn.execute(
            "INSERT INTO credentials (name, provider, ciphertext, created_at, updated_at, last_used)
             VALUES (?1, ?2, ?3, ?4, ?5, NULL)
             ON CONFLICT(name) DO UPDATE SET
                provider = excluded.provider,
                ciphertext = excluded.ciphertext,
                updated_at = excluded.updated_at",
            params![name, provider, ciphertext, created_at, now],
        )?;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<String, CredentialError> {
        let record = self.get_record(name)?;
        Ok(record.value)
    }

    pub fn get_record(&self, name: &str) -> Result<CredentialRecord, CredentialError> {
        let conn = self.conn.lock().unwrap_or_else(|p| p.into_inner());
        let row: Option<(Vec<u8>, Option<String>, String, String)> = conn
            .query_row(
                "SELECT ciphertext, provider, created_at, updated_at FROM credentials WHERE name = ?1",
                params![name],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;
        let Some((ciphertext, provider, created_at, updated_at)) = row else {
            return Err(CredentialError::NotFound(name.to_string()));
        };
        conn.execute(
            "UPDATE credentials SET last_used = ?1 WHERE name = ?2",
            params![Utc::now().to_rfc3339(), name],
        )?;
        let value = crypto::decrypt(&self.master_key, &ciphertext)?;
        Ok(CredentialRecord {
            name: name.to_string(),
            value,
            provider,
            created_at: parse_ts(&created_at),
            updated_at: parse_ts(&updated_at),
        })
    }

    pub fn exists(&self, name: &str) -> Result<bool, CredentialError> {
        let conn = self.conn.lock().unwrap_or_else(|p| p.into_inner());
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM credentials WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn list(&self) -> Result<Vec<CredentialInfo>, CredentialError> {
        let conn = self.conn.lock().unwrap_or_else(|p| p.into_inner());
        let mut stmt = conn.prepare(
            "SELECT name, provider, ciphertext, created_at, updated_at, last_used
             FROM credentials ORDER BY name",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, Vec<u8>>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, Option<String>>(5)?,
            ))
        })?;
        let mut out = Vec::new();
        for row in rows {
            let (name, provider, ciphertext, created_at, updated_at, last_used) = row?;
            let masked_value = crypto::decrypt(&self.master_key, &ciphertext)
                .map(|v| mask_value(&v))
                .unwrap_or_else(|_| "<undecryptable>".to_string());
            out.push(CredentialInfo {
                name,
                provider,
                masked_value,
                created_at: parse_ts(&created_at),
                updated_at: parse_ts(&updated_at),
                last_used: last_used.map(|ts| parse_ts(&ts)),
            });
        }
        Ok(out)
    }

    /// Overwrite the stored ciphertext blob with random bytes of equal
    /// length, then delete the row.
    pub fn delete(&self, name: &str) -> Result<bool, CredentialError> {
        let conn = self.conn.lock().unwrap_or_else(|p| p.into_inner());
        let existing: Option<Vec<u8>> = conn
            .query_row(
                "SELECT ciphertext FROM credentials WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        let Some(ciphertext) = existing else {
            return Ok(false);
        };
        use rand::RngCore;
        let mut garbage = vec![0u8; ciphertext.len()];
        rand::thread_rng().fill_bytes(&mut garbage);
        conn.execute(
            "UPDATE credentials SET ciphertext = ?1 WHERE name = ?2",
            params![garbage, name],
        )?;
        conn.execute("DELETE FROM credentials WHERE name = ?1", params![name])?;
        Ok(true)
    }
}

fn parse_ts(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store(dir: &Path) -> CredentialStore {
        CredentialStore::open(&dir.join("credentials.db"), Some("test-pass")).unwrap()
    }

    #[test]
    fn set_then_get_round_trips() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        store.set("OPENROUTER_API_KEY", "sk-or-abc123", Some("openrouter")).unwrap();
        assert_eq!(store.get("OPENROUTER_API_KEY").unwrap(), "sk-or-abc123");
    }

    #[test]
    fn get_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        assert!(matches!(store.get("nope"), Err(CredentialError::NotFound(_))));
    }

    #[test]
    fn set_rejects_empty_name_or_value() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        assert!(store.set("", "v", None).is_err());
        assert!(store.set("n", "", None).is_err());
    }

    #[test]
    fn delete_removes_row_and_raw_value_absent_from_file() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("credentials.db");
        let store = CredentialStore::open(&db_path, Some("pw")).unwrap();
        store.set("SECRET_TOKEN", "top-secret-value-xyz", None).unwrap();
        assert!(store.delete("SECRET_TOKEN").unwrap());
        assert!(matches!(store.get("SECRET_TOKEN"), Err(CredentialError::NotFound(_))));

        drop(store);
        let raw = std::fs::read(&db_path).unwrap();
        let needle = b"top-secret-value-xyz";
        assert!(
            !raw.windows(needle.len()).any(|w| w == needle),
            "plaintext secret must not be recoverable from the raw db file"
        );
    }

    #[test]
    fn delete_missing_returns_false() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        assert!(!store.delete("nope").unwrap());
    }

    #[test]
    fn list_masks_values() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        store.set("KEY", "1234567890", Some("anthropic")).unwrap();
        let list = store.list().unwrap();
        assert_eq!(list.len(), 1);
        assert_ne!(list[0].masked_value, "1234567890");
        assert_eq!(list[0].provider.as_deref(), Some("anthropic"));
    }

    #[test]
    fn overwrite_updates_value_and_preserves_created_at() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        store.set("KEY", "first", None).unwrap();
        let first = store.get_record("KEY").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(10));
        store.set("KEY", "second", None).unwrap();
        let second = store.get_record("KEY").unwrap();
        assert_eq!(second.value, "second");
        assert_eq!(first.created_at, second.created_at);
    }
}
