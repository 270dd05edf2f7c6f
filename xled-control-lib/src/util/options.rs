use std::fmt;
use std::time::Duration;

use crate::util::error::{Error, Result};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Address of a device, usable as the authority part of a URL.
///
/// Accepts `ip`, `name` or `ip:port`. Surrounding whitespace is trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Host(String);

impl Host {
    pub fn parse(host: &str) -> Result<Self> {
        let host = host.trim();
        if host.is_empty() {
            return Err(Error::configuration("host is required"));
        }
        if host.contains("://") {
            return Err(Error::configuration(format!(
                "host `{host}` must not contain a scheme"
            )));
        }
        if host.contains('/') || host.chars().any(char::is_whitespace) {
            return Err(Error::configuration(format!(
                "host `{host}` is not a valid address"
            )));
        }
        Ok(Host(host.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Settings used to reach a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    pub host: String,
    /// Connect and request timeout of the HTTP transport.
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        ClientOptions {
            host: String::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientOptions {
    pub fn new(host: impl Into<String>) -> Self {
        ClientOptions {
            host: host.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_rejects_empty() {
        for host in ["", "   ", "\t"] {
            assert!(matches!(
                Host::parse(host),
                Err(Error::Configuration { .. })
            ));
        }
    }

    #[test]
    fn test_host_rejects_url() {
        assert!(Host::parse("http://192.168.1.2").is_err());
        assert!(Host::parse("192.168.1.2/xled").is_err());
        assert!(Host::parse("192.168 .1.2").is_err());
    }

    #[test]
    fn test_host_accepts_address() {
        assert_eq!(Host::parse(" 10.0.0.7 ").unwrap().as_str(), "10.0.0.7");
        assert_eq!(Host::parse("tree.local:8080").unwrap().to_string(), "tree.local:8080");
    }

    #[test]
    fn test_default_options() {
        let options = ClientOptions::default();
        assert!(options.host.is_empty());
        assert_eq!(options.timeout, DEFAULT_TIMEOUT);
    }
}
