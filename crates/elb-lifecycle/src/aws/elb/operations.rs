//! ELBv2 operations trait for testing

use super::ElbClient;
use super::types::{
    CreatedLoadBalancer, ListenerSpec, LoadBalancerSpec, TargetGroupSpec, TargetRegistration,
};
use crate::aws::error::AwsError;

/// Trait for the ELBv2 calls the workflows make.
///
/// Lets the provisioning and teardown workflows be unit tested without
/// hitting real AWS. Every method returns the typed [`AwsError`] so callers
/// branch on conditions, not error strings.
#[allow(async_fn_in_trait)] // Internal use only, Send+Sync bounds on trait are sufficient
#[cfg_attr(test, mockall::automock)]
pub trait LoadBalancerOperations: Send + Sync {
    /// Create the load balancer, returning its ARN and DNS name
    async fn create_load_balancer(
        &self,
        spec: &LoadBalancerSpec,
    ) -> Result<CreatedLoadBalancer, AwsError>;

    /// Create the target group, returning its ARN
    async fn create_target_group(&self, spec: &TargetGroupSpec) -> Result<String, AwsError>;

    /// Register the instance as a target
    async fn register_targets(&self, registration: &TargetRegistration) -> Result<(), AwsError>;

    /// Create the listener, returning its ARN
    async fn create_listener(&self, spec: &ListenerSpec) -> Result<String, AwsError>;

    /// Resolve a load balancer ARN by name
    async fn find_load_balancer(&self, name: &str) -> Result<String, AwsError>;

    /// Delete a load balancer (and with it, its listeners)
    async fn delete_load_balancer(&self, arn: &str) -> Result<(), AwsError>;

    /// Resolve a target group ARN by name
    async fn find_target_group(&self, name: &str) -> Result<String, AwsError>;

    /// Block until no load balancer references the target group
    async fn wait_for_target_group_detached(&self, arn: &str) -> Result<(), AwsError>;

    /// Delete a target group
    async fn delete_target_group(&self, arn: &str) -> Result<(), AwsError>;
}

impl LoadBalancerOperations for ElbClient {
    async fn create_load_balancer(
        &self,
        spec: &LoadBalancerSpec,
    ) -> Result<CreatedLoadBalancer, AwsError> {
        ElbClient::create_load_balancer(self, spec).await
    }

    async fn create_target_group(&self, spec: &TargetGroupSpec) -> Result<String, AwsError> {
        ElbClient::create_target_group(self, spec).await
    }

    async fn register_targets(&self, registration: &TargetRegistration) -> Result<(), AwsError> {
        ElbClient::register_targets(self, registration).await
    }

    async fn create_listener(&self, spec: &ListenerSpec) -> Result<String, AwsError> {
        ElbClient::create_listener(self, spec).await
    }

    async fn find_load_balancer(&self, name: &str) -> Result<String, AwsError> {
        ElbClient::find_load_balancer(self, name).await
    }

    async fn delete_load_balancer(&self, arn: &str) -> Result<(), AwsError> {
        ElbClient::delete_load_balancer(self, arn).await
    }

    async fn find_target_group(&self, name: &str) -> Result<String, AwsError> {
        ElbClient::find_target_group(self, name).await
    }

    async fn wait_for_target_group_detached(&self, arn: &str) -> Result<(), AwsError> {
        ElbClient::wait_for_target_group_detached(self, arn).await
    }

    async fn delete_target_group(&self, arn: &str) -> Result<(), AwsError> {
        ElbClient::delete_target_group(self, arn).await
    }
}
