//! Client configuration

use crate::error::{ClientError, Result};
use std::time::Duration;
use tagwire_codec::DecodeOptions;
use tagwire_config::{CodecConfig, EndpointConfig, TagwireConfig};

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server address to connect to (`host:port`, resolved on connect)
    pub server_addr: String,

    /// Connection timeout
    pub connect_timeout: Duration,

    /// Timeout for one request/response exchange
    pub io_timeout: Duration,

    /// Largest frame accepted or sent
    pub max_frame_size: usize,

    /// Nesting limit when decoding responses
    pub recursion_limit: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_endpoint(&EndpointConfig::default(), &CodecConfig::default())
    }
}

impl ClientConfig {
    /// Create new client config
    pub fn new(server_addr: impl Into<String>) -> Self {
        Self {
            server_addr: server_addr.into(),
            ..Default::default()
        }
    }

    /// Build from the endpoint and codec sections of a loaded configuration
    pub fn from_endpoint(endpoint: &EndpointConfig, codec: &CodecConfig) -> Self {
        Self {
            server_addr: endpoint.addr(),
            connect_timeout: Duration::from_secs(endpoint.connect_timeout_secs),
            io_timeout: Duration::from_secs(endpoint.io_timeout_secs),
            max_frame_size: codec.max_frame_size,
            recursion_limit: codec.recursion_limit,
        }
    }

    /// Set connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set request timeout
    pub fn with_io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    /// Set max frame size
    pub fn with_max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size;
        self
    }

    /// Set decode nesting limit
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Decode options derived from this config
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions::new().with_recursion_limit(self.recursion_limit)
    }

    /// Check the config before connecting
    pub fn validate(&self) -> Result<()> {
        if self.server_addr.is_empty() {
            return Err(ClientError::InvalidConfig("empty server address".to_string()));
        }
        if self.connect_timeout.is_zero() || self.io_timeout.is_zero() {
            return Err(ClientError::InvalidConfig("timeouts must be non-zero".to_string()));
        }
        if self.max_frame_size == 0 || self.recursion_limit == 0 {
            return Err(ClientError::InvalidConfig(
                "frame size and recursion limit must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<&TagwireConfig> for ClientConfig {
    fn from(config: &TagwireConfig) -> Self {
        Self::from_endpoint(&config.client, &config.codec)
    }
}
