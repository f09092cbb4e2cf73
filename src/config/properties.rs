use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::Path;

/// Key/value pairs read from a `server.properties` file.
///
/// The format is a flat list of `key=value` lines. Blank lines and lines
/// starting with `#` are ignored, every `"` character is removed from keys and
/// values, and a repeated key overwrites the earlier value.
///
/// Lines are split on the first `=` only, so a value may itself contain `=`.
/// Escapes and line continuations of the full Java properties format are not
/// supported.
///
/// # Examples
///
/// ```
/// use iron_golem::config::ServerProperties;
///
/// let props = ServerProperties::parse_from_str("server-ip=\nserver-port=\"25565\"\n# comment\n").unwrap();
/// assert_eq!(props.get("server-ip"), Some(""));
/// assert_eq!(props.get("server-port"), Some("25565"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerProperties {
    values: HashMap<String, String>,
}

impl ServerProperties {
    /// Reads and parses a properties file.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigNotFound` if the file cannot be read and
    /// `Error::MalformedConfig` if a line has no `=` separator.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigNotFound(format!("{}: {}", path.display(), e)))?;

        Self::parse_lines(&content, &path.display().to_string())
    }

    /// Parses properties from an in-memory string.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedConfig` if a line has no `=` separator.
    pub fn parse_from_str(content: &str) -> Result<Self> {
        Self::parse_lines(content, "<string>")
    }

    fn parse_lines(content: &str, source: &str) -> Result<Self> {
        let mut values = HashMap::new();

        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (key, value) = line.split_once('=').ok_or_else(|| {
                Error::MalformedConfig(format!(
                    "{}:{}: expected `key=value`, found `{}`",
                    source,
                    index + 1,
                    line
                ))
            })?;

            values.insert(unquote(key), unquote(value));
        }

        Ok(Self { values })
    }

    /// Returns the value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the file contained no properties.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn unquote(raw: &str) -> String {
    raw.replace('"', "")
}
