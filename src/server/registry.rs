use crate::config::ServerProperties;
use crate::error::{Error, Result};
use crate::server::launcher::ServerRuntime;
use crate::server::process::{ManagedServer, SERVER_JAR, SERVER_PROPERTIES, ServerId};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Lists the server installations directly under `root`.
///
/// An installation is an immediate subdirectory containing a regular file
/// named `server.jar`. Other entries are skipped. The order is whatever the
/// filesystem enumerates.
///
/// # Errors
///
/// Returns `Error::DiscoveryFailed` if `root` cannot be read.
pub fn discover(root: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    let entries = std::fs::read_dir(root).map_err(|e| {
        Error::DiscoveryFailed(format!("Failed to read {}: {}", root.display(), e))
    })?;

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            Error::DiscoveryFailed(format!("Failed to read {}: {}", root.display(), e))
        })?;
        let path = entry.path();

        if !path.is_dir() {
            continue;
        }
        if !path.join(SERVER_JAR).is_file() {
            tracing::debug!(path = %path.display(), "Skipping directory without server.jar");
            continue;
        }

        tracing::info!(path = %path.display(), "Discovered server directory");
        dirs.push(path);
    }

    Ok(dirs)
}

/// The authoritative collection of managed servers.
///
/// Ids come from a counter owned by the registry: they start at 0, follow
/// registration order and are never reused. Iteration follows id order, which
/// for a registry built by [`build_from`](Self::build_from) is discovery
/// order.
///
/// # Examples
///
/// ```no_run
/// use iron_golem::config::{Config, JavaConfig};
/// use iron_golem::server::{OsLauncher, ServerRegistry, ServerRuntime};
/// use std::sync::Arc;
///
/// let runtime = Arc::new(ServerRuntime::new(Arc::new(OsLauncher), JavaConfig::default()));
/// let registry = ServerRegistry::build_from("/srv/minecraft", runtime).unwrap();
/// for server in registry.list() {
///     println!("#{} {} on {}:{}", server.id(), server.name(), server.bind_address(), server.port());
/// }
/// ```
#[derive(Debug)]
pub struct ServerRegistry {
    servers: BTreeMap<ServerId, ManagedServer>,
    next_id: u64,
    runtime: Arc<ServerRuntime>,
}

impl ServerRegistry {
    /// Create an empty registry whose servers launch through `runtime`.
    pub fn new(runtime: Arc<ServerRuntime>) -> Self {
        Self {
            servers: BTreeMap::new(),
            next_id: 0,
            runtime,
        }
    }

    /// Discover every installation under `root` and register it.
    ///
    /// Fails fast: one bad installation aborts the whole build.
    ///
    /// # Errors
    ///
    /// Returns `Error::DiscoveryFailed` if `root` cannot be read or any
    /// installation's `server.properties` is missing or malformed.
    #[tracing::instrument(skip(root, runtime), fields(root = %root.as_ref().display()))]
    pub fn build_from(root: impl AsRef<Path>, runtime: Arc<ServerRuntime>) -> Result<Self> {
        let mut registry = Self::new(runtime);

        for dir in discover(root.as_ref())? {
            registry.register(&dir).map_err(|e| {
                tracing::error!(path = %dir.display(), error = %e, "Failed to register server");
                match e {
                    Error::DiscoveryFailed(msg) => Error::DiscoveryFailed(msg),
                    other => Error::DiscoveryFailed(format!("{}: {}", dir.display(), other)),
                }
            })?;
        }

        tracing::info!(num_servers = registry.len(), "Server registry built");
        Ok(registry)
    }

    /// Register the installation at `dir`, reading its `server.properties`.
    ///
    /// The id is only consumed if registration succeeds.
    pub fn register(&mut self, dir: impl AsRef<Path>) -> Result<ServerId> {
        let dir = dir.as_ref();
        let install_path = dir.canonicalize().map_err(|e| {
            Error::DiscoveryFailed(format!("Failed to resolve {}: {}", dir.display(), e))
        })?;
        let properties = ServerProperties::from_file(install_path.join(SERVER_PROPERTIES))?;

        let id = ServerId::from(self.next_id);
        let server = ManagedServer::new(id, install_path, properties, Arc::clone(&self.runtime))?;
        self.next_id += 1;

        tracing::debug!(server_id = %id, server = %server.name(), "Registered server");
        self.servers.insert(id, server);
        Ok(id)
    }

    /// Get a server by id
    pub fn get(&self, id: ServerId) -> Result<&ManagedServer> {
        self.servers.get(&id).ok_or(Error::UnknownServer(id))
    }

    /// All servers in registration order
    pub fn list(&self) -> impl Iterator<Item = &ManagedServer> {
        self.servers.values()
    }

    /// Number of registered servers
    pub fn len(&self) -> usize {
        self.servers.len()
    }

    /// Returns `true` if no server is registered
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}
