/*!
 # Iron Golem

 A small control plane for Minecraft servers hosted on a single machine.

 ## Overview

 Iron Golem provides functionality to:
 - Discover server installations (directories containing `server.jar`)
 - Read each server's bind address and port from `server.properties`
 - Start and stop each server as a supervised child process
 - Expose list/start/stop over a JSON HTTP API

 ## Basic Usage

 ```no_run
 use iron_golem::{ControlPlane, Result, ServerId};
 use iron_golem::config::Config;

 #[tokio::main]
 async fn main() -> Result<()> {
     let mut config = Config::default();
     config.servers_dir = "/srv/minecraft".into();

     // Discover every server under the directory
     let plane = ControlPlane::from_config(&config)?;

     for server in plane.list_servers() {
         println!("#{} {} {}:{} {:?}", server.id, server.name, server.bind_address, server.port, server.status);
     }

     // Start and stop one of them
     plane.start_server(ServerId::from(0)).await?;
     plane.stop_server(ServerId::from(0)).await?;

     // Stop everything that is still running
     plane.shutdown().await?;
     Ok(())
 }
 ```

 ## Features

 - **Supervision**: one process per server, guarded against double starts
   and concurrent transitions
 - **Configuration**: JSON or YAML settings, per-server `server.properties`
 - **HTTP API**: Actix Web routes over the control operations
 - **Error Handling**: one error type, mapped to HTTP statuses

 ## License

 This project is licensed under the terms in the LICENSE file.
*/

pub mod config;
pub mod error;
pub mod http;
pub mod server;

pub use config::Config;
pub use error::{Error, Result};
pub use server::{BindAddress, ManagedServer, ServerId, ServerRegistry, ServerStatus, ServerSummary};

use futures::future::join_all;
use server::ServerRuntime;
use std::sync::Arc;

/// Control operations over the fleet of managed servers
///
/// This struct is the contract the presentation layer is built on: list the
/// servers, start one, stop one. It owns the registry; callers share the
/// plane (typically behind an `Arc`) and every operation takes `&self`.
/// All public methods are instrumented with `tracing` spans.
#[derive(Debug)]
pub struct ControlPlane {
    registry: ServerRegistry,
}

impl ControlPlane {
    /// Create a control plane over an already built registry
    pub fn new(registry: ServerRegistry) -> Self {
        Self { registry }
    }

    /// Validate the configuration and discover the servers it points at
    ///
    /// This method is instrumented with `tracing`.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigInvalid` for bad settings and
    /// `Error::DiscoveryFailed` if any installation cannot be registered.
    #[tracing::instrument(skip(config), fields(servers_dir = %config.servers_dir.display()))]
    pub fn from_config(config: &Config) -> Result<Self> {
        config::validate_config(config)?;

        let runtime = Arc::new(ServerRuntime::from_config(config));
        let registry = ServerRegistry::build_from(&config.servers_dir, runtime)?;

        tracing::info!(num_servers = registry.len(), "Control plane ready");
        Ok(Self::new(registry))
    }

    /// Summaries of every server, in discovery order
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self))]
    pub fn list_servers(&self) -> Vec<ServerSummary> {
        tracing::debug!("Listing servers");
        self.registry.list().map(ManagedServer::summary).collect()
    }

    /// Summary of a single server
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self), fields(server_id = %id))]
    pub fn server(&self, id: ServerId) -> Result<ServerSummary> {
        self.lookup(id).map(ManagedServer::summary)
    }

    /// Start a server
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self), fields(server_id = %id))]
    pub async fn start_server(&self, id: ServerId) -> Result<ServerSummary> {
        tracing::info!("Attempting to start server");
        let server = self.lookup(id)?;

        server.start().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to start server");
            e
        })?;

        tracing::info!("Server started successfully");
        Ok(server.summary())
    }

    /// Stop a server
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self), fields(server_id = %id))]
    pub async fn stop_server(&self, id: ServerId) -> Result<ServerSummary> {
        tracing::info!("Attempting to stop server");
        let server = self.lookup(id)?;

        server.stop().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to stop server");
            e
        })?;

        tracing::info!("Server stopped successfully");
        Ok(server.summary())
    }

    /// Stop every running server and wait for the processes to exit
    ///
    /// Servers are stopped concurrently. Each waits at most the configured
    /// grace period before being killed. Errors are collected; a single
    /// failure is returned as is, several are aggregated.
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Stopping all running servers");

        let running: Vec<&ManagedServer> = self
            .registry
            .list()
            .filter(|server| server.status() == ServerStatus::Running)
            .collect();

        let results = join_all(running.iter().map(|server| server.stop_and_wait())).await;

        let mut errors: Vec<(ServerId, Error)> = running
            .iter()
            .zip(results)
            .filter_map(|(server, result)| match result {
                // Exited between the status check and the stop.
                Err(Error::NotRunning(_)) => None,
                Err(e) => Some((server.id(), e)),
                Ok(_) => None,
            })
            .collect();

        if errors.is_empty() {
            tracing::info!(num_stopped = running.len(), "All servers stopped");
            return Ok(());
        }

        tracing::warn!(error_count = errors.len(), "Some servers failed to stop");
        if errors.len() == 1 {
            Err(errors.remove(0).1)
        } else {
            let error_msg = errors
                .iter()
                .map(|(id, e)| format!("{}: {}", id, e))
                .collect::<Vec<_>>()
                .join("; ");
            Err(Error::Other(format!(
                "Multiple servers failed to stop: {}",
                error_msg
            )))
        }
    }

    fn lookup(&self, id: ServerId) -> Result<&ManagedServer> {
        self.registry.get(id).map_err(|e| {
            tracing::warn!("Request for unknown server");
            e
        })
    }
}
