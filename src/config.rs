//! Client configuration
//!
//! Centralized configuration with sensible defaults.
//!
//! Loading credentials from configuration files is left to the embedding
//! application; this crate only consumes the finished values.

use std::time::Duration;

/// Address family preference for the TCP connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressFamily {
    /// Use whatever the resolver returns first
    #[default]
    Any,

    /// Only connect over IPv4
    Ipv4,

    /// Only connect over IPv6
    Ipv6,
}

/// Connection configuration for a client instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Server Location
    // -------------------------------------------------------------------------
    /// Server hostname
    pub host: String,

    /// Server TCP port
    pub port: u16,

    /// Address family preference
    pub address_family: AddressFamily,

    // -------------------------------------------------------------------------
    // Credentials
    // -------------------------------------------------------------------------
    /// Username for the challenge-response handshake
    pub username: String,

    /// Password for the challenge-response handshake
    pub password: String,

    // -------------------------------------------------------------------------
    // Behavior
    // -------------------------------------------------------------------------
    /// Socket read timeout. `None` (the default) blocks indefinitely on a
    /// silent server.
    pub read_timeout: Option<Duration>,

    /// Delay before the event-stream loop retries a failed connection.
    pub retry_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 9599,
            address_family: AddressFamily::Any,
            username: String::new(),
            password: String::new(),
            read_timeout: None,
            retry_interval: Duration::from_secs(1),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the server hostname
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server TCP port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the address family preference
    pub fn address_family(mut self, family: AddressFamily) -> Self {
        self.config.address_family = family;
        self
    }

    /// Set the username
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.config.username = username.into();
        self
    }

    /// Set the password
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.password = password.into();
        self
    }

    /// Set the socket read timeout
    pub fn read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.read_timeout = timeout;
        self
    }

    /// Set the event-stream reconnect delay
    pub fn retry_interval(mut self, interval: Duration) -> Self {
        self.config.retry_interval = interval;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
