//! Configuration validation errors

use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required string field is missing or blank
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    /// A required list is empty
    #[error("{0} must list at least one entry")]
    EmptyList(&'static str),

    /// Port outside 1..=65535
    #[error("{field} must be between 1 and 65535, got {value}")]
    InvalidPort { field: &'static str, value: i32 },

    /// Negative TTL
    #[error("dns.ttl must not be negative, got {0}")]
    InvalidTtl(i64),

    /// Address endpoint is not an http(s) URL
    #[error("address_endpoint must be an http:// or https:// URL, got: {0}")]
    InvalidEndpoint(String),

    /// Failed to parse JSON configuration
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// Failed to read configuration file
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Create an IO error with path context
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
