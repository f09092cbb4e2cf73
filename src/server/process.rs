// src/server/process.rs
use crate::config::ServerProperties;
use crate::error::{Error, Result};
use crate::server::launcher::{self, LaunchCommand, ServerRuntime};
use async_process::Child;
use serde::{Serialize, Serializer};
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// File whose presence marks a directory as a server installation.
pub const SERVER_JAR: &str = "server.jar";
/// Properties file read at registration.
pub const SERVER_PROPERTIES: &str = "server.properties";
/// Combined stdout/stderr of the running server, recreated on every start.
pub const SERVER_LOG: &str = "server.log";

const SERVER_IP_KEY: &str = "server-ip";
const SERVER_PORT_KEY: &str = "server-port";

/// Unique identifier for a managed server
///
/// Assigned once by the registry and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ServerId(u64);

impl From<u64> for ServerId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a managed server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ServerStatus {
    /// No process is held for the server
    Stopped,
    /// The server process is alive
    Running,
}

/// Network address a server binds to, read from `server-ip`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindAddress {
    /// Empty or missing `server-ip`: all interfaces. Displayed as `*`.
    Wildcard,
    /// A specific host or IP address.
    Host(String),
}

impl BindAddress {
    fn from_property(value: Option<&str>) -> Self {
        match value {
            None | Some("") => Self::Wildcard,
            Some(host) => Self::Host(host.to_string()),
        }
    }
}

impl fmt::Display for BindAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wildcard => f.write_str("*"),
            Self::Host(host) => f.write_str(host),
        }
    }
}

impl Serialize for BindAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Point-in-time view of a managed server, as shown to operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSummary {
    /// Server ID
    pub id: ServerId,
    /// Name of the installation directory
    pub name: String,
    /// Address the server listens on
    pub bind_address: BindAddress,
    /// Port the server listens on
    pub port: u16,
    /// Current status
    pub status: ServerStatus,
    /// OS process id while running
    pub pid: Option<u32>,
}

#[derive(Debug)]
struct RunningProcess {
    child: Child,
    // Held so the log stays open exactly as long as the server runs.
    _log: File,
}

/// One supervised server installation.
///
/// A server is either `Stopped` or `Running`; it is `Running` exactly while a
/// live process handle is held. Transitions are serialized per server: a
/// `start` or `stop` that arrives while another is in flight fails with
/// [`Error::ConflictingOperation`]. Status reads never wait on a transition.
#[derive(Debug)]
pub struct ManagedServer {
    id: ServerId,
    install_path: PathBuf,
    name: String,
    properties: ServerProperties,
    port: u16,
    runtime: Arc<ServerRuntime>,
    /// Held for the whole duration of a start or stop
    transition: tokio::sync::Mutex<()>,
    /// Never held across an await
    process: Mutex<Option<RunningProcess>>,
}

impl ManagedServer {
    /// Create a managed server for the installation at `install_path`.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedConfig` if `server-port` is missing or is not
    /// a valid port number.
    pub fn new(
        id: ServerId,
        install_path: PathBuf,
        properties: ServerProperties,
        runtime: Arc<ServerRuntime>,
    ) -> Result<Self> {
        let port = parse_port(&properties).map_err(|e| match e {
            Error::MalformedConfig(msg) => {
                Error::MalformedConfig(format!("{}: {}", install_path.display(), msg))
            }
            other => other,
        })?;

        let name = install_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| install_path.display().to_string());

        Ok(Self {
            id,
            install_path,
            name,
            properties,
            port,
            runtime,
            transition: tokio::sync::Mutex::new(()),
            process: Mutex::new(None),
        })
    }

    /// Get the server ID
    pub fn id(&self) -> ServerId {
        self.id
    }

    /// Get the server name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the installation directory
    pub fn install_path(&self) -> &Path {
        &self.install_path
    }

    /// Address the server binds to.
    pub fn bind_address(&self) -> BindAddress {
        BindAddress::from_property(self.properties.get(SERVER_IP_KEY))
    }

    /// Port the server listens on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Path of the log file written while running.
    pub fn log_path(&self) -> PathBuf {
        self.install_path.join(SERVER_LOG)
    }

    /// Get the server status
    ///
    /// A process that has exited on its own is released here and the server
    /// reports `Stopped`.
    pub fn status(&self) -> ServerStatus {
        match self.observe_pid() {
            Some(_) => ServerStatus::Running,
            None => ServerStatus::Stopped,
        }
    }

    /// OS process id while running.
    pub fn pid(&self) -> Option<u32> {
        self.observe_pid()
    }

    /// Snapshot of this server for display.
    pub fn summary(&self) -> ServerSummary {
        let pid = self.observe_pid();
        ServerSummary {
            id: self.id,
            name: self.name.clone(),
            bind_address: self.bind_address(),
            port: self.port,
            status: if pid.is_some() {
                ServerStatus::Running
            } else {
                ServerStatus::Stopped
            },
            pid,
        }
    }

    /// Start the server process
    ///
    /// Truncates `server.log`, launches the Java server with the installation
    /// as working directory and records the process handle.
    ///
    /// # Errors
    ///
    /// * `Error::ConflictingOperation` if another start/stop is in flight
    /// * `Error::AlreadyRunning` if the server is running; the existing
    ///   process is left untouched
    /// * `Error::Launch` / `Error::LaunchTimeout` if the process could not be
    ///   launched; the server stays `Stopped`
    #[tracing::instrument(skip(self), fields(server_id = %self.id, server = %self.name))]
    pub async fn start(&self) -> Result<()> {
        let _transition = self.begin_transition()?;

        if self.observe_pid().is_some() {
            tracing::warn!("Start requested for a server that is already running");
            return Err(Error::AlreadyRunning(self.id));
        }

        let (command, log) = self.launch_command()?;
        let timeout = self.runtime.launch_timeout();

        let child = match tokio::time::timeout(timeout, self.runtime.launcher().spawn(command)).await
        {
            Ok(Ok(child)) => child,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Failed to launch server process");
                return Err(e);
            }
            Err(_) => {
                tracing::error!(timeout = ?timeout, "Server process launch timed out");
                return Err(Error::LaunchTimeout(format!(
                    "server {} did not launch within {:?}",
                    self.id, timeout
                )));
            }
        };

        tracing::info!(pid = child.id(), "Server started");
        *self.lock_process() = Some(RunningProcess { child, _log: log });

        Ok(())
    }

    /// Stop the server process
    ///
    /// Sends a graceful termination signal and marks the server `Stopped`
    /// without waiting for the process to exit. The process is reaped in the
    /// background and killed if it outlives the grace period.
    ///
    /// # Errors
    ///
    /// * `Error::ConflictingOperation` if another start/stop is in flight
    /// * `Error::NotRunning` if the server is stopped
    /// * `Error::Process` if the signal could not be delivered; the server
    ///   stays `Running`
    #[tracing::instrument(skip(self), fields(server_id = %self.id, server = %self.name))]
    pub async fn stop(&self) -> Result<()> {
        if let Some(child) = self.release().await? {
            let grace = self.runtime.stop_grace_period();
            let id = self.id;

            tokio::spawn(async move {
                match launcher::reap(child, grace).await {
                    Ok(status) => tracing::debug!(server_id = %id, %status, "Server process exited"),
                    Err(e) => tracing::warn!(server_id = %id, error = %e, "Failed to reap server process"),
                }
            });
        }

        tracing::info!("Server stopped");
        Ok(())
    }

    /// Stop the server process and wait for it to exit.
    ///
    /// Same transition as [`stop`](Self::stop), but the caller waits until
    /// the process has exited or has been killed after the grace period.
    /// Returns `None` if a status read already collected the exit while the
    /// signal was being delivered.
    #[tracing::instrument(skip(self), fields(server_id = %self.id, server = %self.name))]
    pub async fn stop_and_wait(&self) -> Result<Option<ExitStatus>> {
        let Some(child) = self.release().await? else {
            tracing::info!("Server stopped; process had already exited");
            return Ok(None);
        };

        let status = launcher::reap(child, self.runtime.stop_grace_period()).await?;
        tracing::info!(%status, "Server stopped and exited");
        Ok(Some(status))
    }

    /// Signals the running process, then removes it from the server's state.
    ///
    /// The handle stays installed until the signal has been delivered, so
    /// readers see `Running` throughout and a failed signal changes nothing.
    async fn release(&self) -> Result<Option<Child>> {
        let _transition = self.begin_transition()?;

        let Some(pid) = self.observe_pid() else {
            tracing::warn!("Stop requested for a server that is not running");
            return Err(Error::NotRunning(self.id));
        };

        self.runtime.launcher().terminate(pid).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to signal server process");
            e
        })?;

        // Dropping the rest of the entry closes the log file. `None` means a
        // reader saw the process exit while it was being signalled.
        Ok(self
            .lock_process()
            .take()
            .map(|RunningProcess { child, .. }| child))
    }

    fn begin_transition(&self) -> Result<tokio::sync::MutexGuard<'_, ()>> {
        self.transition.try_lock().map_err(|_| {
            tracing::warn!(server_id = %self.id, "Rejected request: another operation is in progress");
            Error::ConflictingOperation(self.id)
        })
    }

    /// Builds the Java command line and truncates the log it writes to.
    fn launch_command(&self) -> Result<(LaunchCommand, File)> {
        let log_path = self.log_path();
        let log = File::create(&log_path).map_err(|e| {
            Error::Launch(format!("Failed to create {}: {}", log_path.display(), e))
        })?;
        let duplicate = || {
            log.try_clone()
                .map_err(|e| Error::Launch(format!("Failed to duplicate log handle: {}", e)))
        };
        let stdout = duplicate()?;
        let stderr = duplicate()?;

        let java = self.runtime.java();
        let mut args = java.heap_args();
        args.extend(java.extra_args.iter().cloned());
        args.push("-jar".to_string());
        args.push(self.install_path.join(SERVER_JAR).to_string_lossy().into_owned());
        args.push("nogui".to_string());

        let command = LaunchCommand {
            program: java.executable.clone(),
            args,
            working_dir: self.install_path.clone(),
            stdout,
            stderr,
        };
        Ok((command, log))
    }

    /// Pid of the live process, releasing the handle if the process exited.
    fn observe_pid(&self) -> Option<u32> {
        let mut process = self.lock_process();
        let running = process.as_mut()?;

        match running.child.try_status() {
            Ok(None) => Some(running.child.id()),
            Ok(Some(status)) => {
                tracing::info!(server_id = %self.id, %status, "Server process exited on its own");
                *process = None;
                None
            }
            Err(e) => {
                tracing::warn!(server_id = %self.id, error = %e, "Failed to poll server process");
                Some(running.child.id())
            }
        }
    }

    fn lock_process(&self) -> MutexGuard<'_, Option<RunningProcess>> {
        // The guarded value is a plain Option, always consistent.
        self.process.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn parse_port(properties: &ServerProperties) -> Result<u16> {
    let raw = properties.get(SERVER_PORT_KEY).ok_or_else(|| {
        Error::MalformedConfig(format!("missing required property '{}'", SERVER_PORT_KEY))
    })?;

    raw.trim().parse::<u16>().map_err(|_| {
        Error::MalformedConfig(format!(
            "'{}' must be a port number, got '{}'",
            SERVER_PORT_KEY, raw
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JavaConfig;
    use crate::server::launcher::OsLauncher;

    fn runtime() -> Arc<ServerRuntime> {
        Arc::new(ServerRuntime::new(Arc::new(OsLauncher), JavaConfig::default()))
    }

    fn server(props: &str) -> Result<ManagedServer> {
        ManagedServer::new(
            ServerId::from(7),
            PathBuf::from("/srv/minecraft/survival"),
            ServerProperties::parse_from_str(props).unwrap(),
            runtime(),
        )
    }

    #[test]
    fn test_empty_ip_is_wildcard() {
        let server = server("server-ip=\nserver-port=\"25565\"\n# comment\n").unwrap();
        assert_eq!(server.bind_address(), BindAddress::Wildcard);
        assert_eq!(server.bind_address().to_string(), "*");
        assert_eq!(server.port(), 25565);
    }

    #[test]
    fn test_explicit_ip() {
        let server = server("server-ip=10.0.0.5\nserver-port=25566\n").unwrap();
        assert_eq!(server.bind_address(), BindAddress::Host("10.0.0.5".to_string()));
    }

    #[test]
    fn test_missing_ip_is_wildcard() {
        let server = server("server-port=25565\n").unwrap();
        assert_eq!(server.bind_address(), BindAddress::Wildcard);
    }

    #[test]
    fn test_port_must_be_numeric() {
        let err = server("server-port=minecraft\n").unwrap_err();
        assert!(matches!(err, Error::MalformedConfig(_)));

        let err = server("server-port=70000\n").unwrap_err();
        assert!(matches!(err, Error::MalformedConfig(_)));
    }

    #[test]
    fn test_port_is_required() {
        let err = server("server-ip=\n").unwrap_err();
        match err {
            Error::MalformedConfig(msg) => assert!(msg.contains("/srv/minecraft/survival")),
            other => panic!("expected MalformedConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_new_server_is_stopped() {
        let server = server("server-port=25565\n").unwrap();
        assert_eq!(server.name(), "survival");
        assert_eq!(server.status(), ServerStatus::Stopped);
        assert_eq!(server.pid(), None);
        assert_eq!(server.log_path(), PathBuf::from("/srv/minecraft/survival/server.log"));
    }

    #[test]
    fn test_summary_serializes_wildcard() {
        let server = server("server-ip=\nserver-port=25565\n").unwrap();
        let json = serde_json::to_value(server.summary()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 7,
                "name": "survival",
                "bindAddress": "*",
                "port": 25565,
                "status": "Stopped",
                "pid": null
            })
        );
    }

    #[test]
    fn test_launch_command() {
        let dir = tempfile::tempdir().unwrap();
        let server = ManagedServer::new(
            ServerId::from(0),
            dir.path().to_path_buf(),
            ServerProperties::parse_from_str("server-port=25565").unwrap(),
            runtime(),
        )
        .unwrap();

        let (command, _log) = server.launch_command().unwrap();
        let jar = dir.path().join(SERVER_JAR).to_string_lossy().into_owned();

        assert_eq!(command.program, PathBuf::from("/usr/bin/java"));
        assert_eq!(command.args, vec!["-Xmx1024M", "-Xms1024M", "-jar", jar.as_str(), "nogui"]);
        assert_eq!(command.working_dir, dir.path());
        assert!(dir.path().join(SERVER_LOG).exists());
    }

    #[tokio::test]
    async fn test_stop_when_stopped() {
        let server = server("server-port=25565\n").unwrap();
        let err = server.stop().await.unwrap_err();
        assert!(matches!(err, Error::NotRunning(id) if id == ServerId::from(7)));
        assert_eq!(server.status(), ServerStatus::Stopped);
    }
}
