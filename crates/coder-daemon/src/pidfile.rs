//! PID-file lifecycle bookkeeping: one file per module under
//! `daemons/<module>.pid`.

use std::path::Path;

/// `true` iff a process with this pid currently exists. Uses `kill(pid,
/// 0)` (no signal delivered, only existence/permission checked) rather
/// than a full process-table scan — this suite only ever needs to know
/// about pids it wrote itself.
pub fn process_is_alive(pid: u32) -> bool {
    #[cfg(unix)]
    {
        // SAFETY: kill with signal 0 performs no action beyond the
        // existence/permission check; pid is a plain integer.
        unsafe { libc::kill(pid as i32, 0) == 0 }
    }
    #[cfg(not(unix))]
    {
        let _ = pid;
        false
    }
}

pub fn read_pid(pid_path: &Path) -> Option<u32> {
    std::fs::read_to_string(pid_path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
}

/// Reads the pid file and returns the pid only if that process is still
/// alive; a stale pid file (process gone) is treated as "not running".
pub fn read_live_pid(pid_path: &Path) -> Option<u32> {
    read_pid(pid_path).filter(|pid| process_is_alive(*pid))
}

/// Writes `pid` under an advisory write lock on the pid file itself, so
/// two racing `start` calls for the same module cannot both believe they
/// won.
pub fn write_pid(pid_path: &Path, pid: u32) -> std::io::Result<()> {
    use std::io::Write;

    if let Some(parent) = pid_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(pid_path)?;
    let mut lock = fd_lock::RwLock::new(file);
    let mut guard = lock.write()?;
    guard.write_all(format!("{pid}\n").as_bytes())?;
    guard.flush()
}

pub fn remove_pid(pid_path: &Path) -> std::io::Result<()> {
    if pid_path.exists() {
        std::fs::remove_file(pid_path)?;
    }
    Ok(())
}

/// Send a graceful terminate, wait up to `grace`, then force-kill if the
/// process is still alive. Mirrors `coder-process::terminate_group`'s two
/// step shape, applied to a single daemon pid rather than a process group.
pub async fn stop_process(pid: u32, grace: std::time::Duration) {
    #[cfg(unix)]
    {
        // SAFETY: pid is a plain integer; SIGTERM is async-signal-safe.
        unsafe {
            libc::kill(pid as i32, libc::SIGTERM);
        }
        let deadline = tokio::time::Instant::now() + grace;
        while tokio::time::Instant::now() < deadline {
            if !process_is_alive(pid) {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
        if process_is_alive(pid) {
            // SAFETY: see above.
            unsafe {
                libc::kill(pid as i32, libc::SIGKILL);
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = (pid, grace);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_and_reads_back_a_pid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("coder.pid");
        write_pid(&path, 4242).unwrap();
        assert_eq!(read_pid(&path), Some(4242));
    }

    #[test]
    fn current_process_is_alive() {
        assert!(process_is_alive(std::process::id()));
    }

    #[test]
    fn a_pid_that_cannot_exist_is_not_alive() {
        // pid 1 is typically init and alive, but an absurdly large pid
        // almost certainly is not assigned on any real system.
        assert!(!process_is_alive(u32::MAX - 1));
    }

    #[test]
    fn remove_pid_is_a_noop_when_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.pid");
        assert!(remove_pid(&path).is_ok());
    }
}
