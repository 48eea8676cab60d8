//! `ninja-daemon start|stop|status|restart [module]`: one PID file per
//! module, background-spawn via re-exec, graceful-then-forced stop.
//! Generalizes a single always-on hub-process lifecycle into a
//! per-module table, one PID file per module under a cache directory.

use crate::error::DaemonError;
use crate::pidfile;
use crate::ports;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

const STOP_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct ModuleStatus {
    pub module: String,
    pub running: bool,
    pub pid: Option<u32>,
    pub port: Option<u16>,
    pub url: Option<String>,
    pub log_path: PathBuf,
}

fn require_known(module: &str) -> Result<(), DaemonError> {
    if ports::is_known_module(module) {
        Ok(())
    } else {
        Err(DaemonError::UnknownModule(module.to_string()))
    }
}

/// Locates the binary that serves `module`: this workspace's own
/// `ninja-coder` for the `coder` module (via `current_exe`'s sibling),
/// otherwise `ninja-<module>` resolved on `PATH` — the out-of-scope
/// Researcher/Secretary modules are genuinely external binaries this
/// suite does not ship.
fn locate_module_binary(module: &str) -> Result<PathBuf, DaemonError> {
    if module == "coder" {
        let exe = std::env::current_exe()?;
        let sibling = exe.with_file_name("ninja-coder");
        if sibling.exists() {
            return Ok(sibling);
        }
    }
    which::which(format!("ninja-{module}"))
        .map_err(|_| DaemonError::NotRunning(format!("no binary found for module '{module}'")))
}

/// `start`: a no-op (returns the existing status) if the PID file points
/// at a live process; otherwise spawns `<binary> --http --port N --host
/// 127.0.0.1`, redirecting stdio to the module's log file, and records
/// the new PID.
pub fn start(module: &str) -> Result<ModuleStatus, DaemonError> {
    require_known(module)?;
    let pid_path = ports::pid_path(module);
    if let Some(pid) = pidfile::read_live_pid(&pid_path) {
        return status(module).map(|mut s| {
            s.pid = Some(pid);
            s
        });
    }

    let binary = locate_module_binary(module)?;
    let port = ports::resolve_port(module).unwrap_or(0);
    let log_path = ports::log_path(module);
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;
    let log_file_err = log_file.try_clone()?;

    let child = std::process::Command::new(&binary)
        .arg("--http")
        .arg("--port")
        .arg(port.to_string())
        .arg("--host")
        .arg("127.0.0.1")
        .stdin(Stdio::null())
        .stdout(Stdio::from(log_file))
        .stderr(Stdio::from(log_file_err))
        .spawn()?;

    pidfile::write_pid(&pid_path, child.id())?;
    std::mem::forget(child); // daemon outlives this controller call.

    Ok(ModuleStatus {
        module: module.to_string(),
        running: true,
        pid: pidfile::read_pid(&pid_path),
        port: Some(port),
        url: Some(format!("http://127.0.0.1:{port}")),
        log_path,
    })
}

pub async fn stop(module: &str) -> Result<(), DaemonError> {
    require_known(module)?;
    let pid_path = ports::pid_path(module);
    let Some(pid) = pidfile::read_live_pid(&pid_path) else {
        pidfile::remove_pid(&pid_path)?;
        return Err(DaemonError::NotRunning(module.to_string()));
    };
    pidfile::stop_process(pid, STOP_GRACE).await;
    pidfile::remove_pid(&pid_path)?;
    Ok(())
}

pub fn status(module: &str) -> Result<ModuleStatus, DaemonError> {
    require_known(module)?;
    let pid_path = ports::pid_path(module);
    let pid = pidfile::read_live_pid(&pid_path);
    let port = ports::resolve_port(module);
    Ok(ModuleStatus {
        module: module.to_string(),
        running: pid.is_some(),
        pid,
        port: pid.and(port),
        url: pid.and(port).map(|p| format!("http://127.0.0.1:{p}")),
        log_path: ports::log_path(module),
    })
}

pub async fn restart(module: &str) -> Result<ModuleStatus, DaemonError> {
    match stop(module).await {
        Ok(()) | Err(DaemonError::NotRunning(_)) => {}
        Err(e) => return Err(e),
    }
    start(module)
}
