//! OS process launching for managed servers.
//!
//! [`ProcessLauncher`] is the only OS-facing surface the supervisor depends
//! on: spawn an executable with arguments, a working directory and redirected
//! output, and deliver a graceful termination signal. [`OsLauncher`] is the
//! real implementation; tests substitute their own.

use crate::config::{Config, JavaConfig};
use crate::error::{Error, Result};
use async_process::{Child, Command, Stdio};
use async_trait::async_trait;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::sync::Arc;
use std::time::Duration;

#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

/// Default upper bound on a process launch.
pub const DEFAULT_LAUNCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Default time a terminated process may take to exit before it is killed.
pub const DEFAULT_STOP_GRACE_PERIOD: Duration = Duration::from_secs(30);

/// Everything needed to spawn one server process.
#[derive(Debug)]
pub struct LaunchCommand {
    /// Executable to run.
    pub program: PathBuf,
    /// Arguments passed to the executable.
    pub args: Vec<String>,
    /// Working directory of the child.
    pub working_dir: PathBuf,
    /// Destination of the child's stdout.
    pub stdout: File,
    /// Destination of the child's stderr.
    pub stderr: File,
}

/// Capability to start and signal OS processes.
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Spawns the process described by `command`.
    async fn spawn(&self, command: LaunchCommand) -> Result<Child>;

    /// Asks process `pid` to exit gracefully. Does not wait for it to exit.
    ///
    /// The caller keeps the process handle installed while this runs, so a
    /// failed signal never exposes a half-stopped server.
    async fn terminate(&self, pid: u32) -> Result<()>;
}

/// [`ProcessLauncher`] backed by `async-process`.
///
/// Children are spawned with kill-on-drop, so a handle that is dropped while
/// the process is still alive (a launch that finished after its timeout, or a
/// control plane torn down without [`shutdown`](crate::ControlPlane::shutdown))
/// takes its process with it.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsLauncher;

#[async_trait]
impl ProcessLauncher for OsLauncher {
    async fn spawn(&self, command: LaunchCommand) -> Result<Child> {
        tracing::debug!(
            program = %command.program.display(),
            args = ?command.args,
            working_dir = %command.working_dir.display(),
            "Spawning process"
        );

        // Spawning forks and execs synchronously; keep it off the async workers.
        tokio::task::spawn_blocking(move || {
            let mut cmd = Command::new(&command.program);
            cmd.args(&command.args)
                .current_dir(&command.working_dir)
                .stdin(Stdio::null())
                .stdout(std::process::Stdio::from(command.stdout))
                .stderr(std::process::Stdio::from(command.stderr))
                .kill_on_drop(true);

            cmd.spawn().map_err(|e| {
                Error::Launch(format!(
                    "Failed to start {}: {}",
                    command.program.display(),
                    e
                ))
            })
        })
        .await
        .map_err(|e| Error::Launch(format!("Launch task failed: {}", e)))?
    }

    async fn terminate(&self, pid: u32) -> Result<()> {
        send_terminate(pid)
            .map_err(|e| Error::Process(format!("Failed to signal process {}: {}", pid, e)))
    }
}

#[cfg(unix)]
fn send_terminate(pid: u32) -> io::Result<()> {
    match signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
        Ok(()) => Ok(()),
        // Already exited; the reaper collects it.
        Err(nix::errno::Errno::ESRCH) => Ok(()),
        Err(e) => Err(io::Error::other(e)),
    }
}

#[cfg(not(unix))]
fn send_terminate(_pid: u32) -> io::Result<()> {
    // No graceful signal outside Unix; `reap` kills without a grace period.
    Ok(())
}

/// Waits for a terminated child to exit, killing it after `grace`.
///
/// Always reaps the child, so no zombie is left behind.
pub async fn reap(mut child: Child, grace: Duration) -> Result<ExitStatus> {
    let pid = child.id();
    let grace = if cfg!(unix) { grace } else { Duration::ZERO };

    match tokio::time::timeout(grace, child.status()).await {
        Ok(status) => {
            status.map_err(|e| Error::Process(format!("Failed to reap process {}: {}", pid, e)))
        }
        Err(_) => {
            tracing::warn!(pid, grace = ?grace, "Process ignored termination, killing it");
            if let Err(e) = child.kill() {
                if e.kind() != io::ErrorKind::InvalidInput {
                    return Err(Error::Process(format!("Failed to kill process {}: {}", pid, e)));
                }
            }
            child
                .status()
                .await
                .map_err(|e| Error::Process(format!("Failed to reap process {}: {}", pid, e)))
        }
    }
}

/// Launch settings shared by every managed server.
#[derive(Clone)]
pub struct ServerRuntime {
    launcher: Arc<dyn ProcessLauncher>,
    java: JavaConfig,
    launch_timeout: Duration,
    stop_grace_period: Duration,
}

impl ServerRuntime {
    /// Creates a runtime with default timeouts.
    pub fn new(launcher: Arc<dyn ProcessLauncher>, java: JavaConfig) -> Self {
        Self {
            launcher,
            java,
            launch_timeout: DEFAULT_LAUNCH_TIMEOUT,
            stop_grace_period: DEFAULT_STOP_GRACE_PERIOD,
        }
    }

    /// Creates an [`OsLauncher`] runtime from the control plane settings.
    pub fn from_config(config: &Config) -> Self {
        Self::new(Arc::new(OsLauncher), config.java.clone())
            .with_launch_timeout(config.launch_timeout())
            .with_stop_grace_period(config.stop_grace_period())
    }

    /// Sets the launch timeout.
    pub fn with_launch_timeout(mut self, timeout: Duration) -> Self {
        self.launch_timeout = timeout;
        self
    }

    /// Sets the stop grace period.
    pub fn with_stop_grace_period(mut self, grace: Duration) -> Self {
        self.stop_grace_period = grace;
        self
    }

    pub fn launcher(&self) -> &dyn ProcessLauncher {
        self.launcher.as_ref()
    }

    pub fn java(&self) -> &JavaConfig {
        &self.java
    }

    pub fn launch_timeout(&self) -> Duration {
        self.launch_timeout
    }

    pub fn stop_grace_period(&self) -> Duration {
        self.stop_grace_period
    }
}

impl std::fmt::Debug for ServerRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerRuntime")
            .field("java", &self.java)
            .field("launch_timeout", &self.launch_timeout)
            .field("stop_grace_period", &self.stop_grace_period)
            .finish_non_exhaustive()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn log_file(dir: &tempfile::TempDir) -> File {
        File::create(dir.path().join("out.log")).unwrap()
    }

    #[tokio::test]
    async fn test_terminate_and_reap_sleep() {
        let dir = tempfile::tempdir().unwrap();
        let file = log_file(&dir);
        let command = LaunchCommand {
            program: PathBuf::from("sleep"),
            args: vec!["30".to_string()],
            working_dir: dir.path().to_path_buf(),
            stderr: file.try_clone().unwrap(),
            stdout: file,
        };

        let child = OsLauncher.spawn(command).await.unwrap();
        OsLauncher.terminate(child.id()).await.unwrap();

        let status = reap(child, Duration::from_secs(5)).await.unwrap();
        assert!(!status.success());
    }

    #[tokio::test]
    async fn test_reap_kills_after_grace() {
        let dir = tempfile::tempdir().unwrap();
        let file = log_file(&dir);
        let command = LaunchCommand {
            program: PathBuf::from("sh"),
            args: vec!["-c".to_string(), "trap '' TERM; sleep 30".to_string()],
            working_dir: dir.path().to_path_buf(),
            stderr: file.try_clone().unwrap(),
            stdout: file,
        };

        let child = OsLauncher.spawn(command).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        OsLauncher.terminate(child.id()).await.unwrap();

        let started = std::time::Instant::now();
        let status = reap(child, Duration::from_millis(200)).await.unwrap();
        assert!(!status.success());
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_spawn_missing_executable_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = log_file(&dir);
        let command = LaunchCommand {
            program: dir.path().join("no-such-java"),
            args: vec![],
            working_dir: dir.path().to_path_buf(),
            stderr: file.try_clone().unwrap(),
            stdout: file,
        };

        let err = OsLauncher.spawn(command).await.unwrap_err();
        assert!(matches!(err, Error::Launch(_)));
    }
}
