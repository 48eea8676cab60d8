//! The fixed module table and the cache-directory layout a running
//! daemon's PID file, log file, and loopback port are resolved from.

use std::path::PathBuf;

/// Default loopback port per module (`NINJA_<MODULE>_PORT` overrides).
pub fn default_port(module: &str) -> Option<u16> {
    match module {
        "coder" => Some(8100),
        "researcher" => Some(8101),
        "secretary" => Some(8102),
        "resources" => Some(8106),
        "prompts" => Some(8107),
        _ => None,
    }
}

/// Resolves the loopback port for `module`: `NINJA_<MODULE>_PORT` env var
/// first, then the default table.
pub fn resolve_port(module: &str) -> Option<u16> {
    let env_key = format!("NINJA_{}_PORT", module.to_ascii_uppercase());
    if let Ok(value) = std::env::var(&env_key) {
        if let Ok(port) = value.parse() {
            return Some(port);
        }
    }
    default_port(module)
}

fn cache_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", coder_logging::APP_NAME)
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".cache"))
}

pub fn daemons_dir() -> PathBuf {
    cache_dir().join("daemons")
}

pub fn pid_path(module: &str) -> PathBuf {
    daemons_dir().join(format!("{module}.pid"))
}

pub fn log_path(module: &str) -> PathBuf {
    daemons_dir().join(format!("{module}.log"))
}

pub const KNOWN_MODULES: &[&str] = &["coder", "researcher", "secretary", "resources", "prompts"];

pub fn is_known_module(module: &str) -> bool {
    KNOWN_MODULES.contains(&module)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ports_match_the_published_table() {
        assert_eq!(default_port("coder"), Some(8100));
        assert_eq!(default_port("researcher"), Some(8101));
        assert_eq!(default_port("secretary"), Some(8102));
        assert_eq!(default_port("resources"), Some(8106));
        assert_eq!(default_port("prompts"), Some(8107));
        assert_eq!(default_port("bogus"), None);
    }

    #[test]
    fn env_override_wins_over_default_port() {
        std::env::set_var("NINJA_CODER_PORT", "9999");
        assert_eq!(resolve_port("coder"), Some(9999));
        std::env::remove_var("NINJA_CODER_PORT");
    }
}
