use std::path::PathBuf;

/// XDG app name used for all ninja-coder on-disk state.
pub const APP_NAME: &str = "ninja-coder";

/// Default cache-directory location for `logs/<module>-YYYYMMDD.jsonl`
/// following the persisted-state layout used across this workspace.
pub fn default_logs_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.cache_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from(".").join("logs"))
}
