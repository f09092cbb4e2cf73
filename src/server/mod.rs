/// Server supervision module for Iron Golem.
///
/// This module discovers server installations on disk and manages the
/// lifecycle of their processes. All public operations are instrumented with
/// `tracing` spans.
///
/// # Components
///
/// * `launcher` - The OS-facing process launcher and shared launch settings
/// * `process` - A single managed server and its start/stop state machine
/// * `registry` - Discovery and the authoritative collection of servers
///
/// # Examples
///
/// Starting and stopping a discovered server:
///
/// ```no_run
/// use iron_golem::config::JavaConfig;
/// use iron_golem::server::{OsLauncher, ServerId, ServerRegistry, ServerRuntime, ServerStatus};
/// use std::sync::Arc;
///
/// # async fn run() -> iron_golem::Result<()> {
/// let runtime = Arc::new(ServerRuntime::new(Arc::new(OsLauncher), JavaConfig::default()));
/// let registry = ServerRegistry::build_from("/srv/minecraft", runtime)?;
///
/// let server = registry.get(ServerId::from(0))?;
/// server.start().await?;
/// assert_eq!(server.status(), ServerStatus::Running);
///
/// server.stop().await?;
/// assert_eq!(server.status(), ServerStatus::Stopped);
/// # Ok(())
/// # }
/// ```
pub mod launcher;
mod process;
pub mod registry;

pub use launcher::{LaunchCommand, OsLauncher, ProcessLauncher, ServerRuntime};
pub use process::{
    BindAddress, ManagedServer, SERVER_JAR, SERVER_LOG, SERVER_PROPERTIES, ServerId,
    ServerStatus, ServerSummary,
};
pub use registry::{ServerRegistry, discover};
