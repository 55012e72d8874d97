//! Provisioning workflow
//!
//! Fetch the instance address, create the load balancer and target group,
//! then wire them together (register target, HTTPS listener) and point the
//! two CNAMEs at the new endpoints.
//!
//! Steps 1-3 run concurrently and any failure aborts the run once all three
//! have finished. Failures while wiring are logged and reported as
//! [`ProvisionOutcome::Partial`]. In both cases resources already created are
//! left in place unless rollback was requested.

use crate::address::AddressSource;
use crate::aws::elb::{
    CreatedLoadBalancer, ListenerSpec, LoadBalancerOperations, TargetRegistration,
};
use crate::aws::error::AwsError;
use crate::aws::route53::{DnsChangeBatch, DnsOperations};
use crate::config::Config;
use anyhow::{Context, Result};
use std::fmt;
use tracing::{error, info, warn};

/// Pipeline steps, used to report where a partial run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionStep {
    FetchAddress,
    CreateLoadBalancer,
    CreateTargetGroup,
    RegisterTargets,
    CreateListener,
    UpsertDnsRecords,
}

impl ProvisionStep {
    pub fn as_str(self) -> &'static str {
        match self {
            ProvisionStep::FetchAddress => "fetch instance address",
            ProvisionStep::CreateLoadBalancer => "create load balancer",
            ProvisionStep::CreateTargetGroup => "create target group",
            ProvisionStep::RegisterTargets => "register targets",
            ProvisionStep::CreateListener => "create listener",
            ProvisionStep::UpsertDnsRecords => "upsert DNS records",
        }
    }
}

impl fmt::Display for ProvisionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProvisionOptions {
    /// Delete the load balancer and target group if wiring fails
    pub rollback_on_failure: bool,
}

/// Everything a run created or submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedResources {
    pub instance_address: String,
    pub load_balancer: CreatedLoadBalancer,
    pub target_group_arn: String,
    pub listener_arn: Option<String>,
    pub dns_change_id: Option<String>,
}

#[derive(Debug)]
pub enum ProvisionOutcome {
    Complete(ProvisionedResources),
    Partial {
        resources: ProvisionedResources,
        failed_step: ProvisionStep,
        error: AwsError,
        rolled_back: bool,
    },
}

impl ProvisionOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, ProvisionOutcome::Complete(_))
    }

    pub fn resources(&self) -> &ProvisionedResources {
        match self {
            ProvisionOutcome::Complete(resources) => resources,
            ProvisionOutcome::Partial { resources, .. } => resources,
        }
    }
}

/// Requests that can only be built once steps 1-3 have returned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependentRequests {
    pub registration: TargetRegistration,
    pub listener: ListenerSpec,
    pub dns: DnsChangeBatch,
}

impl DependentRequests {
    pub fn build(
        config: &Config,
        instance_address: &str,
        load_balancer: &CreatedLoadBalancer,
        target_group_arn: &str,
    ) -> Self {
        Self {
            registration: TargetRegistration::new(
                target_group_arn,
                &config.target_group.target_instance,
            ),
            listener: ListenerSpec::https_forward(
                load_balancer,
                target_group_arn,
                &config.listener.certificate_arn,
                config.listener.port,
            ),
            dns: DnsChangeBatch::for_endpoints(
                &config.dns.hosted_zone_id,
                config.dns.ttl,
                (config.dns.instance_record.as_str(), instance_address),
                (
                    config.dns.load_balancer_record.as_str(),
                    load_balancer.dns_name.as_str(),
                ),
            ),
        }
    }
}

/// Run the provisioning workflow.
///
/// Returns `Err` only when one of the first three steps fails. Those steps run
/// concurrently and all of them complete, so a load balancer or target group
/// can exist even though a sibling step failed. Such leftovers are logged by
/// ARN, and deleted when `options.rollback_on_failure` is set. The caller is
/// expected to have run [`Config::validate_for_provision`].
pub async fn provision<E, D, A>(
    config: &Config,
    elb: &E,
    dns: &D,
    address_source: &A,
    options: ProvisionOptions,
) -> Result<ProvisionOutcome>
where
    E: LoadBalancerOperations,
    D: DnsOperations,
    A: AddressSource,
{
    let lb_spec = config.load_balancer_spec();
    let tg_spec = config.target_group_spec();

    let (address, load_balancer, target_group) = tokio::join!(
        async {
            address_source
                .fetch_address()
                .await
                .with_context(|| format!("Failed to {}", ProvisionStep::FetchAddress))
        },
        async {
            elb.create_load_balancer(&lb_spec).await.with_context(|| {
                format!("Failed to {} '{}'", ProvisionStep::CreateLoadBalancer, lb_spec.name)
            })
        },
        async {
            elb.create_target_group(&tg_spec).await.with_context(|| {
                format!("Failed to {} '{}'", ProvisionStep::CreateTargetGroup, tg_spec.name)
            })
        },
    );

    let (instance_address, load_balancer, target_group_arn) =
        match (address, load_balancer, target_group) {
            (Ok(address), Ok(lb), Ok(tg_arn)) => (address, lb, tg_arn),
            (address, load_balancer, target_group) => {
                let lb_arn = load_balancer.as_ref().ok().map(|lb| lb.arn.as_str());
                let tg_arn = target_group.as_ref().ok().map(String::as_str);
                discard_setup(elb, lb_arn, tg_arn, options).await;

                let error = [address.err(), load_balancer.err(), target_group.err()]
                    .into_iter()
                    .flatten()
                    .next()
                    .unwrap_or_else(|| anyhow::anyhow!("Provisioning setup failed"));
                return Err(error);
            }
        };

    info!(
        address = %instance_address,
        lb_arn = %load_balancer.arn,
        tg_arn = %target_group_arn,
        "Load balancer and target group created"
    );

    let requests =
        DependentRequests::build(config, &instance_address, &load_balancer, &target_group_arn);

    let mut resources = ProvisionedResources {
        instance_address,
        load_balancer,
        target_group_arn,
        listener_arn: None,
        dns_change_id: None,
    };

    match wire(elb, dns, &requests, &mut resources).await {
        Ok(()) => {
            info!(
                lb_dns = %resources.load_balancer.dns_name,
                listener_arn = ?resources.listener_arn,
                change_id = ?resources.dns_change_id,
                "Provisioning complete"
            );
            Ok(ProvisionOutcome::Complete(resources))
        }
        Err((failed_step, err)) => {
            error!(step = %failed_step, error = %err, "Provisioning stopped");
            let rolled_back = if options.rollback_on_failure {
                rollback(
                    elb,
                    Some(resources.load_balancer.arn.as_str()),
                    Some(resources.target_group_arn.as_str()),
                )
                .await
            } else {
                warn!(
                    lb_arn = %resources.load_balancer.arn,
                    tg_arn = %resources.target_group_arn,
                    "Leaving created resources in place"
                );
                false
            };
            Ok(ProvisionOutcome::Partial {
                resources,
                failed_step,
                error: err,
                rolled_back,
            })
        }
    }
}

/// Steps 5-7, in order, stopping at the first failure
async fn wire<E, D>(
    elb: &E,
    dns: &D,
    requests: &DependentRequests,
    resources: &mut ProvisionedResources,
) -> Result<(), (ProvisionStep, AwsError)>
where
    E: LoadBalancerOperations,
    D: DnsOperations,
{
    elb.register_targets(&requests.registration)
        .await
        .map_err(|e| (ProvisionStep::RegisterTargets, e))?;

    let listener_arn = elb
        .create_listener(&requests.listener)
        .await
        .map_err(|e| (ProvisionStep::CreateListener, e))?;
    resources.listener_arn = Some(listener_arn);

    resources.dns_change_id = dns
        .upsert_records(&requests.dns)
        .await
        .map_err(|e| (ProvisionStep::UpsertDnsRecords, e))?;

    Ok(())
}

/// Handle resources left by a failed setup step
async fn discard_setup<E: LoadBalancerOperations>(
    elb: &E,
    lb_arn: Option<&str>,
    tg_arn: Option<&str>,
    options: ProvisionOptions,
) {
    if lb_arn.is_none() && tg_arn.is_none() {
        return;
    }
    if options.rollback_on_failure {
        rollback(elb, lb_arn, tg_arn).await;
    } else {
        warn!(
            lb_arn = ?lb_arn,
            tg_arn = ?tg_arn,
            "Setup failed, leaving created resources in place"
        );
    }
}

/// Delete what this run created. Returns whether every deletion succeeded.
async fn rollback<E: LoadBalancerOperations>(
    elb: &E,
    lb_arn: Option<&str>,
    tg_arn: Option<&str>,
) -> bool {
    info!(lb_arn = ?lb_arn, tg_arn = ?tg_arn, "Rolling back created resources");

    let mut clean = true;
    if let Some(lb_arn) = lb_arn {
        if let Err(e) = elb.delete_load_balancer(lb_arn).await {
            warn!(lb_arn = %lb_arn, error = %e, "Rollback: load balancer deletion failed");
            clean = false;
        }
    }

    if let Some(tg_arn) = tg_arn {
        let tg_result = match elb.wait_for_target_group_detached(tg_arn).await {
            Ok(()) => elb.delete_target_group(tg_arn).await,
            Err(e) => Err(e),
        };
        if let Err(e) = tg_result {
            warn!(tg_arn = %tg_arn, error = %e, "Rollback: target group deletion failed");
            clean = false;
        }
    }

    clean
}
