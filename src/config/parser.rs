use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default number of Actix Web workers for the HTTP API.
pub const DEFAULT_WORKERS: usize = 4;

/// Settings for the Java runtime used to launch every server.
///
/// The launch command is
/// `<executable> -Xmx<max_heap> -Xms<min_heap> <extra_args...> -jar <dir>/server.jar nogui`.
///
/// # Examples
///
/// ```
/// use iron_golem::config::JavaConfig;
///
/// let java = JavaConfig {
///     executable: "/opt/jdk-21/bin/java".into(),
///     max_heap: "4G".to_string(),
///     min_heap: "1G".to_string(),
///     extra_args: vec!["-XX:+UseG1GC".to_string()],
/// };
/// assert_eq!(java.heap_args(), vec!["-Xmx4G", "-Xms1G"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JavaConfig {
    /// Path to the `java` executable.
    pub executable: PathBuf,
    /// Maximum heap size, passed as `-Xmx`.
    pub max_heap: String,
    /// Initial heap size, passed as `-Xms`.
    pub min_heap: String,
    /// Additional JVM arguments placed before `-jar`.
    pub extra_args: Vec<String>,
}

impl JavaConfig {
    /// The `-Xmx`/`-Xms` arguments for this runtime.
    pub fn heap_args(&self) -> Vec<String> {
        vec![
            format!("-Xmx{}", self.max_heap),
            format!("-Xms{}", self.min_heap),
        ]
    }
}

impl Default for JavaConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("/usr/bin/java"),
            max_heap: "1024M".to_string(),
            min_heap: "1024M".to_string(),
            extra_args: Vec::new(),
        }
    }
}

/// Settings for the HTTP control API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpConfig {
    /// Address to listen on.
    pub address: String,
    /// Port to listen on.
    pub port: u16,
    /// Number of worker threads; `None` means [`DEFAULT_WORKERS`].
    pub workers: Option<usize>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "localhost".to_string(),
            port: 10000,
            workers: None,
        }
    }
}

/// Main configuration for the Iron Golem control plane.
///
/// Every field has a default, so an empty document is a valid configuration.
///
/// # JSON Schema
///
/// ```json
/// {
///   "serversDir": "/srv/minecraft",
///   "http": { "address": "0.0.0.0", "port": 10000, "workers": 2 },
///   "java": {
///     "executable": "/usr/bin/java",
///     "maxHeap": "2048M",
///     "minHeap": "1024M",
///     "extraArgs": []
///   },
///   "launchTimeoutSecs": 30,
///   "stopGracePeriodSecs": 30
/// }
/// ```
///
/// # Examples
///
/// ```
/// use iron_golem::config::Config;
///
/// let config = Config::parse_from_str(r#"{ "serversDir": "/srv/minecraft" }"#).unwrap();
/// assert_eq!(config.servers_dir.to_str(), Some("/srv/minecraft"));
/// assert_eq!(config.http.port, 10000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Directory whose immediate subdirectories are server installations.
    pub servers_dir: PathBuf,
    /// HTTP API settings.
    pub http: HttpConfig,
    /// Java runtime settings shared by every server.
    pub java: JavaConfig,
    /// Upper bound on how long launching a server process may take.
    pub launch_timeout_secs: u64,
    /// How long a stopped server may take to exit before it is killed.
    pub stop_grace_period_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            servers_dir: PathBuf::from("."),
            http: HttpConfig::default(),
            java: JavaConfig::default(),
            launch_timeout_secs: 30,
            stop_grace_period_secs: 30,
        }
    }
}

impl Config {
    /// Loads a configuration from a file path.
    ///
    /// Files ending in `.yaml` or `.yml` are parsed as YAML, anything else as
    /// JSON.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigParse` if:
    /// * The file cannot be read
    /// * The file contents are not valid JSON/YAML
    /// * The document does not conform to the expected schema
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigParse(format!("Failed to read config file: {}", e)))?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::parse_from_yaml_str(&content),
            _ => Self::parse_from_str(&content),
        }
    }

    /// Parses a configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigParse` if the string is not valid JSON or does
    /// not conform to the expected schema.
    pub fn parse_from_str(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| Error::ConfigParse(format!("Failed to parse JSON config: {}", e)))
    }

    /// Parses a configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigParse` if the string is not valid YAML or does
    /// not conform to the expected schema.
    pub fn parse_from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigParse(format!("Failed to parse YAML config: {}", e)))
    }

    /// Launch timeout as a [`Duration`].
    pub fn launch_timeout(&self) -> Duration {
        Duration::from_secs(self.launch_timeout_secs)
    }

    /// Stop grace period as a [`Duration`].
    pub fn stop_grace_period(&self) -> Duration {
        Duration::from_secs(self.stop_grace_period_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = Config::parse_from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.java.executable, PathBuf::from("/usr/bin/java"));
        assert_eq!(config.http.address, "localhost");
        assert_eq!(config.launch_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_parse_full_json() {
        let config_str = r#"{
            "serversDir": "/srv/minecraft",
            "http": { "address": "0.0.0.0", "port": 8080, "workers": 2 },
            "java": { "executable": "/opt/java", "maxHeap": "2G", "extraArgs": ["-XX:+UseG1GC"] },
            "launchTimeoutSecs": 5,
            "stopGracePeriodSecs": 10
        }"#;

        let config = Config::parse_from_str(config_str).unwrap();

        assert_eq!(config.servers_dir, PathBuf::from("/srv/minecraft"));
        assert_eq!(config.http.address, "0.0.0.0");
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.http.workers, Some(2));
        assert_eq!(config.java.executable, PathBuf::from("/opt/java"));
        assert_eq!(config.java.heap_args(), vec!["-Xmx2G", "-Xms1024M"]);
        assert_eq!(config.java.extra_args, vec!["-XX:+UseG1GC"]);
        assert_eq!(config.stop_grace_period(), Duration::from_secs(10));
    }

    #[test]
    fn test_parse_yaml() {
        let config = Config::parse_from_yaml_str("serversDir: servers\nhttp:\n  port: 9000\n").unwrap();
        assert_eq!(config.servers_dir, PathBuf::from("servers"));
        assert_eq!(config.http.port, 9000);
        assert_eq!(config.http.address, "localhost");
    }

    #[test]
    fn test_rejects_wrong_types() {
        let err = Config::parse_from_str(r#"{ "http": { "port": "high" } }"#).unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }
}
