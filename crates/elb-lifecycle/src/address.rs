//! Instance address lookup
//!
//! The instance publishes its current address at a plain HTTP endpoint
//! (typically the EC2 metadata service); the response body is the address.

use anyhow::{Context, Result};
use elb_lifecycle_common::defaults::DEFAULT_ADDRESS_TIMEOUT_SECS;
use std::time::Duration;
use tracing::debug;

/// Source of the instance's current network address
#[allow(async_fn_in_trait)] // Internal use only, Send+Sync bounds on trait are sufficient
#[cfg_attr(test, mockall::automock)]
pub trait AddressSource: Send + Sync {
    async fn fetch_address(&self) -> Result<String>;
}

/// Fetches the address with an HTTP GET against a fixed URL
pub struct HttpAddressSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAddressSource {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_ADDRESS_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl AddressSource for HttpAddressSource {
    async fn fetch_address(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .with_context(|| format!("Failed to fetch instance address from {}", self.endpoint))?
            .error_for_status()
            .with_context(|| format!("Address endpoint {} returned an error", self.endpoint))?;

        let address = response
            .text()
            .await
            .context("Failed to read response body")?
            .trim()
            .to_string();

        if address.is_empty() {
            anyhow::bail!("Address endpoint {} returned an empty body", self.endpoint);
        }

        debug!(address = %address, endpoint = %self.endpoint, "Fetched instance address");
        Ok(address)
    }
}
