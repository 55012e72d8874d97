//! AWS test utilities
//!
//! Provides region detection and unique name generation for AWS integration tests.

use chrono::Utc;

/// ELBv2 load balancer and target group names are limited to 32 characters.
pub const MAX_ELB_NAME_LEN: usize = 32;

/// Get the AWS region for tests.
///
/// Checks environment variables in order:
/// 1. AWS_REGION
/// 2. AWS_DEFAULT_REGION
/// 3. Falls back to us-east-2
pub fn get_test_region() -> String {
    std::env::var("AWS_REGION")
        .or_else(|_| std::env::var("AWS_DEFAULT_REGION"))
        .unwrap_or_else(|_| "us-east-2".to_string())
}

/// Generate a unique run ID for test resources.
///
/// Format: `t{timestamp_secs}-{counter}`. Kept short so that prefixed
/// resource names fit the ELBv2 name limit.
pub fn test_run_id() -> String {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);

    let ts = Utc::now().timestamp();
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("t{}-{}", ts, counter)
}

/// Generate a unique ELBv2 resource name with the given prefix.
///
/// Truncated to [`MAX_ELB_NAME_LEN`]; ELBv2 also rejects names ending in a
/// hyphen, so any trailing hyphen left by truncation is stripped.
pub fn test_resource_name(prefix: &str) -> String {
    let mut name = format!("{}-{}", prefix, test_run_id());
    name.truncate(MAX_ELB_NAME_LEN);
    name.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_format() {
        let run_id = test_run_id();
        assert!(run_id.starts_with('t'));
        let parts: Vec<&str> = run_id[1..].split('-').collect();
        assert_eq!(parts.len(), 2);
        parts[0].parse::<i64>().expect("Should be valid timestamp");
        parts[1].parse::<u32>().expect("Should be valid counter");
    }

    #[test]
    fn test_run_id_unique() {
        let id1 = test_run_id();
        let id2 = test_run_id();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_resource_name_fits_elb_limit() {
        let name = test_resource_name("elb-lifecycle-integration-test");
        assert!(name.len() <= MAX_ELB_NAME_LEN);
        assert!(!name.ends_with('-'));
        assert!(name.starts_with("elb-lifecycle"));
    }
}
