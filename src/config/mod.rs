//! Configuration module for Iron Golem.
//!
//! Two kinds of configuration live here:
//!
//! * [`ServerProperties`]: the flat `key=value` `server.properties` file found
//!   in every server installation, from which the bind address and port are
//!   read.
//! * [`Config`]: the control plane's own settings (servers directory, HTTP
//!   listener, Java runtime, timeouts), loaded from JSON or YAML.
//!
//! # Examples
//!
//! Loading control plane settings from a file:
//!
//! ```no_run
//! use iron_golem::config::{Config, validate_config};
//!
//! let config = Config::from_file("iron-golem.yaml").unwrap();
//! validate_config(&config).unwrap();
//! println!("Serving servers from {}", config.servers_dir.display());
//! ```
//!
//! Reading a server's properties:
//!
//! ```no_run
//! use iron_golem::config::ServerProperties;
//!
//! let props = ServerProperties::from_file("survival/server.properties").unwrap();
//! println!("port = {:?}", props.get("server-port"));
//! ```
mod parser;
mod properties;
pub mod validator;

pub use parser::{Config, DEFAULT_WORKERS, HttpConfig, JavaConfig};
pub use properties::ServerProperties;
pub use validator::validate_config;
