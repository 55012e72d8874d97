//! Default configuration values
//!
//! Used both as serde field defaults and as CLI defaults so the two stay in sync.

use crate::protocol::Protocol;

/// Config file read when neither `--config` nor `ELB_LIFECYCLE_CONFIG` is given
pub const DEFAULT_CONFIG_PATH: &str = "config/default.json";

/// Port the instance serves on behind the load balancer
pub const DEFAULT_TARGET_PORT: i32 = 10000;

/// Protocol between the load balancer and the instance
pub const DEFAULT_TARGET_PROTOCOL: Protocol = Protocol::Http;

/// Public listener port
pub const DEFAULT_LISTENER_PORT: i32 = 443;

/// TTL in seconds for both CNAME records
pub const DEFAULT_RECORD_TTL: i64 = 300;

/// Timeout for the instance address lookup
pub const DEFAULT_ADDRESS_TIMEOUT_SECS: u64 = 10;

/// Upper bound on waiting for a target group to detach from its load balancers.
/// Load balancer deletion usually releases the association within a minute.
pub const DEFAULT_DETACH_WAIT_TIMEOUT_SECS: u64 = 300;

/// First polling delay for the detach wait
pub const DEFAULT_DETACH_WAIT_INITIAL_DELAY_SECS: u64 = 2;

/// Polling delay cap for the detach wait
pub const DEFAULT_DETACH_WAIT_MAX_DELAY_SECS: u64 = 15;

// Serde default functions for struct field defaults

pub fn default_target_port() -> i32 {
    DEFAULT_TARGET_PORT
}

pub fn default_target_protocol() -> Protocol {
    DEFAULT_TARGET_PROTOCOL
}

pub fn default_listener_port() -> i32 {
    DEFAULT_LISTENER_PORT
}

pub fn default_record_ttl() -> i64 {
    DEFAULT_RECORD_TTL
}
