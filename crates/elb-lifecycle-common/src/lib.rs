//! elb-lifecycle-common - Shared types and defaults
//!
//! Kept free of AWS SDK dependencies so configuration and logging vocabulary
//! can be shared without pulling in the service clients.
//!
//! ## Modules
//!
//! - [`defaults`]: Default ports, TTLs, paths and wait timings
//! - [`protocol`]: Listener/target protocol names
//! - [`resource_kind`]: The provider resources this tool manages

pub mod defaults;
pub mod protocol;
pub mod resource_kind;

pub use protocol::Protocol;
pub use resource_kind::ResourceKind;
