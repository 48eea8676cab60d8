use std::path::PathBuf;

pub const APP_NAME: &str = "ninja-coder";

/// `credentials.db` under the user config directory, following the persisted
/// state layout.
pub fn default_db_path() -> PathBuf {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().join("credentials.db"))
        .unwrap_or_else(|| PathBuf::from("credentials.db"))
}

/// Create the parent directory with mode `0700` if missing.
pub fn ensure_parent_dir(db_path: &std::path::Path) -> std::io::Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(parent, std::fs::Permissions::from_mode(0o700))?;
        }
    }
    Ok(())
}

/// Restrict the db file itself to mode `0600` after creation.
pub fn restrict_file_perms(db_path: &std::path::Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(db_path, std::fs::Permissions::from_mode(0o600))?;
    }
    #[cfg(not(unix))]
    {
        let _ = db_path;
    }
    Ok(())
}
