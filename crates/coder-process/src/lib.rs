//! Subprocess lifecycle management with a single bounded wait and
//! deliberately no inactivity watchdog.
//!
//! Long silences from the child are allowed — only the
//! strategy-declared absolute timeout, or an explicit cancel signal, ends
//! the wait. An earlier inactivity-timeout design (killing on
//! stdout/stderr silence) caused premature kills of long multi-agent
//! runs; that path is not carried forward here.

mod error;

pub use error::ProcessError;

use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::sync::oneshot;

/// How long to wait after a graceful terminate before force-killing the
/// process group.
pub const GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Everything `ProcessDriver::run` needs to spawn one child: the chosen
/// strategy already rendered `argv`/`env`/`working_dir`/`timeout_seconds`
/// via `build_command`.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub working_dir: PathBuf,
    pub timeout: Duration,
}

/// The unprocessed result of running a command: `coder-parser` turns this
/// into a `StepResult`.
#[derive(Debug, Clone)]
pub struct RawOutcome {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub wall_time: Duration,
    pub timed_out: bool,
}

/// Consumed once to request early termination (e.g. the MCP transport
/// observed client disconnect). Sending on the paired `Sender` is
/// equivalent to the timeout firing early.
pub type CancelSignal = oneshot::Receiver<()>;
pub type CancelHandle = oneshot::Sender<()>;

pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    oneshot::channel()
}

/// Spawns the command in its own process group, waits for exit, timeout,
/// or cancellation (whichever comes first), and returns the captured
/// output. Never relies on stream EOF as the completion signal — the
/// process-exit wait is the one blocking primitive, bounded by
/// `spec.timeout`.
pub async fn run(spec: CommandSpec, cancel: CancelSignal) -> Result<RawOutcome, ProcessError> {
    let mut command = Command::new(&spec.program);
    command
        .args(&spec.args)
        .current_dir(&spec.working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    for (key, value) in &spec.env {
        command.env(key, value);
    }

    #[cfg(unix)]
    use std::os::unix::process::CommandExt as _;
    #[cfg(unix)]
    // SAFETY: setsid() is async-signal-safe and runs before exec in the child.
    unsafe {
        command.pre_exec(|| {
            libc::setsid();
            Ok(())
        });
    }

    let mut child = command.spawn().map_err(|source| ProcessError::Spawn {
        program: spec.program.clone(),
        source,
    })?;

    let stdout = child.stdout.take().expect("stdout was piped");
    let stderr = child.stderr.take().expect("stderr was piped");
    let stdout_task = tokio::spawn(read_to_string(stdout));
    let stderr_task = tokio::spawn(read_to_string(stderr));

    let started = Instant::now();
    let mut cancel = cancel;
    let timed_out;

    tokio::select! {
        _ = child.wait() => {
            timed_out = false;
        }
        _ = tokio::time::sleep(spec.timeout) => {
            tracing::warn!(timeout_secs = spec.timeout.as_secs(), "process timed out, terminating group");
            terminate_group(&mut child).await;
            timed_out = true;
        }
        _ = &mut cancel => {
            tracing::info!("cancel signal received, terminating process group");
            terminate_group(&mut child).await;
            timed_out = false;
        }
    }

    let status = child.wait().await.map_err(ProcessError::Wait)?;
    let wall_time = started.elapsed();

    let stdout = stdout_task.await.unwrap_or_default();
    let stderr = stderr_task.await.unwrap_or_default();

    let exit_code = status.code().unwrap_or(if timed_out { 124 } else { 1 });

    Ok(RawOutcome {
        stdout,
        stderr,
        exit_code,
        wall_time,
        timed_out,
    })
}

async fn read_to_string<R: tokio::io::AsyncRead + Unpin>(mut reader: R) -> String {
    let mut buf = Vec::new();
    let _ = reader.read_to_end(&mut buf).await;
    String::from_utf8_lossy(&buf).into_owned()
}

/// Graceful terminate, wait up to [`GRACE_PERIOD`], then force-kill the
/// whole process group.
async fn terminate_group(child: &mut tokio::process::Child) {
    let Some(pid) = child.id() else {
        let _ = child.start_kill();
        return;
    };

    #[cfg(unix)]
    {
        // SAFETY: kill() is async-signal-safe; a negative pid targets the group.
        unsafe {
            libc::kill(-(pid as i32), libc::SIGTERM);
        }
    }
    #[cfg(not(unix))]
    {
        let _ = child.start_kill();
    }

    let graceful = tokio::time::timeout(GRACE_PERIOD, child.wait()).await;
    if graceful.is_err() {
        #[cfg(unix)]
        {
            // SAFETY: see above.
            unsafe {
                libc::kill(-(pid as i32), libc::SIGKILL);
            }
        }
        #[cfg(not(unix))]
        {
            let _ = child.start_kill();
        }
    }
}
