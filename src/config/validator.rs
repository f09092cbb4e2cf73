use crate::config::{Config, HttpConfig, JavaConfig};
use crate::error::{Error, Result};

/// Validates the Java runtime settings
pub fn validate_java_config(java: &JavaConfig) -> Result<()> {
    if java.executable.as_os_str().is_empty() {
        return Err(Error::ConfigInvalid("Java executable is empty".to_string()));
    }

    for (name, value) in [("maxHeap", &java.max_heap), ("minHeap", &java.min_heap)] {
        if !is_heap_size(value) {
            return Err(Error::ConfigInvalid(format!(
                "java.{} must look like 1024M or 2G, got '{}'",
                name, value
            )));
        }
    }

    Ok(())
}

/// Validates the HTTP API settings
pub fn validate_http_config(http: &HttpConfig) -> Result<()> {
    if http.address.is_empty() {
        return Err(Error::ConfigInvalid("HTTP address is empty".to_string()));
    }

    if http.workers == Some(0) {
        return Err(Error::ConfigInvalid(
            "HTTP workers must be at least 1".to_string(),
        ));
    }

    Ok(())
}

/// Full configuration validation
pub fn validate_config(config: &Config) -> Result<()> {
    validate_java_config(&config.java)?;
    validate_http_config(&config.http)?;

    if config.launch_timeout_secs == 0 {
        return Err(Error::ConfigInvalid(
            "launchTimeoutSecs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

// Digits with an optional K/M/G suffix, as accepted by -Xmx/-Xms.
fn is_heap_size(value: &str) -> bool {
    let digits = value.trim_end_matches(['k', 'K', 'm', 'M', 'g', 'G']);
    let suffix_len = value.len() - digits.len();
    !digits.is_empty() && suffix_len <= 1 && digits.chars().all(|c| c.is_ascii_digit())
}
