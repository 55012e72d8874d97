//! Shared test utilities for elb-lifecycle
//!
//! ## Modules
//!
//! - [`aws`]: AWS region detection and unique resource names

pub mod aws;

pub use aws::{get_test_region, test_resource_name, test_run_id};
