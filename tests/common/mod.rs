// Shared fixtures for the integration tests. Each test crate uses a subset.
#![allow(dead_code)]

use async_process::Child;
use async_trait::async_trait;
use iron_golem::config::JavaConfig;
use iron_golem::error::{Error, Result};
use iron_golem::server::{LaunchCommand, OsLauncher, ProcessLauncher, ServerRuntime};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Stand-in for `java`: logs a line to each stream, then idles until signalled.
pub const IDLE_SERVER: &str = r#"#!/bin/sh
echo "Starting minecraft server $*"
echo "Can't keep up!" 1>&2
exec sleep 30
"#;

/// Stand-in for `java` that exits straight away.
pub const CRASHING_SERVER: &str = "#!/bin/sh\nexit 3\n";

// Writes an executable shell script and returns its path
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut permissions = fs::metadata(&path).unwrap().permissions();
        permissions.set_mode(0o755);
        fs::set_permissions(&path, permissions).unwrap();
    }

    path
}

// Creates `root/name` with a server.jar and the given properties
pub fn install_server(root: &Path, name: &str, properties: &str) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("server.jar"), b"").unwrap();
    fs::write(dir.join("server.properties"), properties).unwrap();
    dir
}

pub fn java_config(executable: PathBuf) -> JavaConfig {
    JavaConfig {
        executable,
        ..JavaConfig::default()
    }
}

pub fn runtime_with(launcher: Arc<dyn ProcessLauncher>, java: PathBuf) -> Arc<ServerRuntime> {
    Arc::new(
        ServerRuntime::new(launcher, java_config(java))
            .with_launch_timeout(Duration::from_secs(10))
            .with_stop_grace_period(Duration::from_secs(2)),
    )
}

pub fn os_runtime(java: PathBuf) -> Arc<ServerRuntime> {
    runtime_with(Arc::new(OsLauncher), java)
}

// Routes library logs to the test harness; set RUST_LOG to see them
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// Polls `condition` until it holds or `timeout` elapses
pub async fn wait_for(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    condition()
}

/// Launcher that takes `delay` before spawning through [`OsLauncher`].
pub struct SlowLauncher {
    pub delay: Duration,
}

#[async_trait]
impl ProcessLauncher for SlowLauncher {
    async fn spawn(&self, command: LaunchCommand) -> Result<Child> {
        tokio::time::sleep(self.delay).await;
        OsLauncher.spawn(command).await
    }

    async fn terminate(&self, pid: u32) -> Result<()> {
        OsLauncher.terminate(pid).await
    }
}

/// Launcher whose termination signal takes `delay` to deliver and, if
/// `fails` is set, is never delivered.
pub struct SlowSignalLauncher {
    pub delay: Duration,
    pub fails: bool,
}

#[async_trait]
impl ProcessLauncher for SlowSignalLauncher {
    async fn spawn(&self, command: LaunchCommand) -> Result<Child> {
        OsLauncher.spawn(command).await
    }

    async fn terminate(&self, pid: u32) -> Result<()> {
        tokio::time::sleep(self.delay).await;
        if self.fails {
            return Err(Error::Process(format!(
                "Failed to signal process {}: Operation not permitted",
                pid
            )));
        }
        OsLauncher.terminate(pid).await
    }
}
