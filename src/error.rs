/// Error handling module for Iron Golem.
///
/// This module defines the error types used throughout the library.
/// Startup errors (configuration and discovery) are fatal for the control
/// process, while per-request errors are reported to the caller and leave
/// the addressed server's recorded state untouched.
///
/// # Example
///
/// ```
/// use iron_golem::error::{Error, Result};
///
/// fn handle_error(result: Result<()>) {
///     match result {
///         Ok(_) => println!("Operation succeeded"),
///         Err(Error::UnknownServer(id)) => println!("No server with id {}", id),
///         Err(Error::AlreadyRunning(id)) => println!("Server {} is already running", id),
///         Err(Error::LaunchTimeout(msg)) => println!("Launch timed out: {}", msg),
///         Err(e) => println!("Other error: {}", e),
///     }
/// }
/// ```
use crate::server::ServerId;
use thiserror::Error;

/// Errors that can occur in the iron-golem library.
#[derive(Error, Debug)]
pub enum Error {
    /// A properties file does not exist or cannot be read.
    #[error("Configuration not found: {0}")]
    ConfigNotFound(String),

    /// A properties file contains a line that is not a `key=value` pair, or a
    /// value the control plane needs cannot be interpreted.
    ///
    /// This error occurs when:
    /// - A non-comment line has no `=` separator
    /// - `server-port` is missing or not a valid port number
    #[error("Malformed configuration: {0}")]
    MalformedConfig(String),

    /// Failed to parse the control plane settings file.
    ///
    /// This error occurs when:
    /// - The settings file cannot be read
    /// - The JSON or YAML is malformed
    /// - Field types are incorrect
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),

    /// The control plane settings parse but contain invalid values.
    ///
    /// This error occurs when:
    /// - The Java executable path is empty
    /// - A heap size is not of the form `<digits>[K|M|G]`
    /// - The worker count or launch timeout is zero
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    /// Building the registry from the servers directory failed.
    ///
    /// This is fatal: the control plane never serves a partial fleet.
    #[error("Server discovery failed: {0}")]
    DiscoveryFailed(String),

    /// No server with the requested id is registered.
    #[error("Unknown server: {0}")]
    UnknownServer(ServerId),

    /// The server is already running.
    ///
    /// This error occurs when:
    /// - Attempting to start a server that's already running
    #[error("Server {0} is already running")]
    AlreadyRunning(ServerId),

    /// The server is not running.
    ///
    /// This error occurs when:
    /// - Attempting to stop a server that's not running
    #[error("Server {0} is not running")]
    NotRunning(ServerId),

    /// Another start or stop of the same server is still in flight.
    #[error("Another operation is in progress for server {0}")]
    ConflictingOperation(ServerId),

    /// The server process did not launch within the configured timeout.
    #[error("Launch timed out: {0}")]
    LaunchTimeout(String),

    /// The server process could not be launched.
    ///
    /// This error occurs when:
    /// - The log file cannot be created
    /// - The Java executable does not exist or isn't executable
    #[error("Failed to launch server process: {0}")]
    Launch(String),

    /// Error when signalling or reaping a server process.
    #[error("Server process error: {0}")]
    Process(String),

    /// Any other error not covered by the above categories.
    #[error("Other error: {0}")]
    Other(String),
}

/// Result type for iron-golem operations.
pub type Result<T> = std::result::Result<T, Error>;
