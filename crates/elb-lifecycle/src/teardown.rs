//! Teardown workflow
//!
//! Deletes the load balancer, then the target group once nothing references
//! it. Either resource being absent already is a normal outcome, so running
//! teardown twice is safe.

use crate::aws::elb::LoadBalancerOperations;
use crate::aws::error::AwsError;
use anyhow::{Context, Result};
use elb_lifecycle_common::ResourceKind;
use tracing::{error, info};

/// What happened to one resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownResult {
    /// Resource was found and deleted
    Deleted,
    /// Resource did not exist
    AlreadyAbsent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeardownReport {
    pub load_balancer: TeardownResult,
    pub target_group: TeardownResult,
}

/// Look up a load balancer by name and delete it
pub async fn delete_load_balancer<E: LoadBalancerOperations>(
    elb: &E,
    name: &str,
) -> Result<(), AwsError> {
    let arn = elb.find_load_balancer(name).await?;
    elb.delete_load_balancer(&arn).await
}

/// Look up a target group by name, wait until it is detached from every
/// load balancer, then delete it
pub async fn delete_target_group<E: LoadBalancerOperations>(
    elb: &E,
    name: &str,
) -> Result<(), AwsError> {
    let arn = elb.find_target_group(name).await?;
    elb.wait_for_target_group_detached(&arn).await?;
    elb.delete_target_group(&arn).await
}

/// Run the teardown workflow.
///
/// Not-found conditions are logged and reported as
/// [`TeardownResult::AlreadyAbsent`]. Any other error stops the run before
/// later stages and is returned.
pub async fn teardown<E: LoadBalancerOperations>(
    elb: &E,
    load_balancer_name: &str,
    target_group_name: &str,
) -> Result<TeardownReport> {
    let load_balancer = match delete_load_balancer(elb, load_balancer_name).await {
        Ok(()) => TeardownResult::Deleted,
        Err(e) if e.is_load_balancer_not_found() => {
            info!(
                resource = %ResourceKind::LoadBalancer,
                name = %load_balancer_name,
                code = ?e.code(),
                "Already absent, continuing with target group"
            );
            TeardownResult::AlreadyAbsent
        }
        Err(e) => {
            error!(resource = %ResourceKind::LoadBalancer, name = %load_balancer_name, error = %e, "Teardown failed");
            return Err(e).with_context(|| {
                format!("Failed to delete load balancer '{load_balancer_name}'")
            });
        }
    };

    let target_group = match delete_target_group(elb, target_group_name).await {
        Ok(()) => TeardownResult::Deleted,
        Err(e) if e.is_target_group_not_found() => {
            info!(
                resource = %ResourceKind::TargetGroup,
                name = %target_group_name,
                code = ?e.code(),
                "Already absent"
            );
            TeardownResult::AlreadyAbsent
        }
        Err(e) => {
            error!(resource = %ResourceKind::TargetGroup, name = %target_group_name, error = %e, "Teardown failed");
            return Err(e).with_context(|| {
                format!("Failed to delete target group '{target_group_name}'")
            });
        }
    };

    let report = TeardownReport {
        load_balancer,
        target_group,
    };
    info!(?report, "Teardown complete");
    Ok(report)
}
