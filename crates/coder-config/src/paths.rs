use std::path::PathBuf;

pub const APP_NAME: &str = "ninja-coder";

/// `config.json` under the user config directory.
pub fn default_config_path() -> PathBuf {
    project_config_dir().join("config.json")
}

/// `config.backup/` under the user config directory, for legacy-env
/// snapshots taken during migration.
pub fn default_backup_dir() -> PathBuf {
    project_config_dir().join("config.backup")
}

/// `migrations/` under the user config directory, for migration logs.
pub fn default_migrations_dir() -> PathBuf {
    project_config_dir().join("migrations")
}

fn project_config_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn ensure_dir_0700(dir: &std::path::Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o700))?;
    }
    Ok(())
}
