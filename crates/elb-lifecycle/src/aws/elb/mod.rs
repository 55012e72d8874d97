//! ELBv2 load balancer, target group and listener management

mod operations;
mod types;

pub use operations::LoadBalancerOperations;
pub use types::{
    CreatedLoadBalancer, ListenerSpec, LoadBalancerSpec, TargetGroupSpec, TargetRegistration,
};

#[cfg(test)]
pub use operations::MockLoadBalancerOperations;

use crate::aws::context::{AwsContext, FromAwsContext};
use crate::aws::error::{AwsError, classify_sdk_error};
use crate::wait::{WaitConfig, wait_for_resource};
use aws_sdk_elasticloadbalancingv2::Client;
use aws_sdk_elasticloadbalancingv2::types::{
    Action, ActionTypeEnum, Certificate, ProtocolEnum, TargetDescription,
};
use elb_lifecycle_common::{Protocol, ResourceKind};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// ELBv2 client for the load balancer, its listener and target group
pub struct ElbClient {
    client: Client,
    detach_wait: WaitConfig,
    cancel: Option<CancellationToken>,
}

impl FromAwsContext for ElbClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.elbv2_client(),
            detach_wait: WaitConfig::target_group_detach(),
            cancel: None,
        }
    }
}

fn protocol_enum(protocol: Protocol) -> ProtocolEnum {
    match protocol {
        Protocol::Http => ProtocolEnum::Http,
        Protocol::Https => ProtocolEnum::Https,
    }
}

fn instance_target(instance_id: &str) -> TargetDescription {
    TargetDescription::builder().id(instance_id).build()
}

fn forward_action(target_group_arn: &str) -> Action {
    Action::builder()
        .r#type(ActionTypeEnum::Forward)
        .target_group_arn(target_group_arn)
        .build()
}

impl ElbClient {
    /// Create a new ELBv2 client (loads AWS config from environment)
    pub async fn new(region: &str) -> Self {
        let ctx = AwsContext::new(region).await;
        Self::from_context(&ctx)
    }

    /// Override the polling schedule used while waiting for target group detachment
    pub fn with_detach_wait(mut self, config: WaitConfig) -> Self {
        self.detach_wait = config;
        self
    }

    /// Abort the detach wait when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub async fn create_load_balancer(
        &self,
        spec: &LoadBalancerSpec,
    ) -> Result<CreatedLoadBalancer, AwsError> {
        info!(
            name = %spec.name,
            subnets = ?spec.subnets,
            security_groups = ?spec.security_groups,
            "Creating load balancer"
        );

        let response = self
            .client
            .create_load_balancer()
            .name(&spec.name)
            .set_subnets(Some(spec.subnets.clone()))
            .set_security_groups(Some(spec.security_groups.clone()))
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, &spec.name))?;

        let lb = response
            .load_balancers()
            .first()
            .ok_or(AwsError::MissingField {
                operation: "CreateLoadBalancer",
                resource: ResourceKind::LoadBalancer,
                field: "entry",
            })?;
        let arn = lb.load_balancer_arn().ok_or(AwsError::MissingField {
            operation: "CreateLoadBalancer",
            resource: ResourceKind::LoadBalancer,
            field: "ARN",
        })?;
        let dns_name = lb.dns_name().ok_or(AwsError::MissingField {
            operation: "CreateLoadBalancer",
            resource: ResourceKind::LoadBalancer,
            field: "DNS name",
        })?;

        info!(lb_arn = %arn, dns_name = %dns_name, "Created load balancer");

        Ok(CreatedLoadBalancer {
            arn: arn.to_string(),
            dns_name: dns_name.to_string(),
        })
    }

    pub async fn create_target_group(&self, spec: &TargetGroupSpec) -> Result<String, AwsError> {
        info!(
            name = %spec.name,
            port = spec.port,
            protocol = %spec.protocol,
            vpc_id = %spec.vpc_id,
            "Creating target group"
        );

        let response = self
            .client
            .create_target_group()
            .name(&spec.name)
            .port(spec.port)
            .protocol(protocol_enum(spec.protocol))
            .vpc_id(&spec.vpc_id)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, &spec.name))?;

        let arn = response
            .target_groups()
            .first()
            .and_then(|tg| tg.target_group_arn())
            .ok_or(AwsError::MissingField {
                operation: "CreateTargetGroup",
                resource: ResourceKind::TargetGroup,
                field: "ARN",
            })?;

        info!(tg_arn = %arn, "Created target group");
        Ok(arn.to_string())
    }

    pub async fn register_targets(&self, registration: &TargetRegistration) -> Result<(), AwsError> {
        info!(
            tg_arn = %registration.target_group_arn,
            instance_id = %registration.instance_id,
            "Registering instance in target group"
        );

        self.client
            .register_targets()
            .target_group_arn(&registration.target_group_arn)
            .targets(instance_target(&registration.instance_id))
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, &registration.target_group_arn))?;

        debug!(instance_id = %registration.instance_id, "Instance registered");
        Ok(())
    }

    pub async fn create_listener(&self, spec: &ListenerSpec) -> Result<String, AwsError> {
        info!(
            lb_arn = %spec.load_balancer_arn,
            tg_arn = %spec.target_group_arn,
            port = spec.port,
            protocol = %spec.protocol,
            "Creating listener"
        );

        let response = self
            .client
            .create_listener()
            .load_balancer_arn(&spec.load_balancer_arn)
            .port(spec.port)
            .protocol(protocol_enum(spec.protocol))
            .certificates(
                Certificate::builder()
                    .certificate_arn(&spec.certificate_arn)
                    .build(),
            )
            .default_actions(forward_action(&spec.target_group_arn))
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, &spec.load_balancer_arn))?;

        let arn = response
            .listeners()
            .first()
            .and_then(|l| l.listener_arn())
            .ok_or(AwsError::MissingField {
                operation: "CreateListener",
                resource: ResourceKind::Listener,
                field: "ARN",
            })?;

        info!(listener_arn = %arn, "Created listener");
        Ok(arn.to_string())
    }

    /// Resolve a load balancer ARN by name.
    ///
    /// An empty result is reported the same way as the provider's
    /// `LoadBalancerNotFound` code.
    pub async fn find_load_balancer(&self, name: &str) -> Result<String, AwsError> {
        let response = self
            .client
            .describe_load_balancers()
            .names(name)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, name))?;

        let arn = response
            .load_balancers()
            .first()
            .and_then(|lb| lb.load_balancer_arn())
            .ok_or_else(|| AwsError::LoadBalancerNotFound {
                name: name.to_string(),
            })?;

        debug!(name = %name, lb_arn = %arn, "Found load balancer");
        Ok(arn.to_string())
    }

    pub async fn delete_load_balancer(&self, arn: &str) -> Result<(), AwsError> {
        info!(lb_arn = %arn, "Deleting load balancer");

        self.client
            .delete_load_balancer()
            .load_balancer_arn(arn)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, arn))?;

        info!(lb_arn = %arn, "Load balancer deleted");
        Ok(())
    }

    /// Resolve a target group ARN by name.
    pub async fn find_target_group(&self, name: &str) -> Result<String, AwsError> {
        let response = self
            .client
            .describe_target_groups()
            .names(name)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, name))?;

        let arn = response
            .target_groups()
            .first()
            .and_then(|tg| tg.target_group_arn())
            .ok_or_else(|| AwsError::TargetGroupNotFound {
                name: name.to_string(),
            })?;

        debug!(name = %name, tg_arn = %arn, "Found target group");
        Ok(arn.to_string())
    }

    /// Poll until the target group's `LoadBalancerArns` list is empty.
    ///
    /// A target group that no longer exists counts as detached.
    pub async fn wait_for_target_group_detached(&self, arn: &str) -> Result<(), AwsError> {
        info!(tg_arn = %arn, "Waiting for target group to detach from load balancers");

        wait_for_resource(
            self.detach_wait.clone(),
            self.cancel.as_ref(),
            move || async move {
                let response = self
                    .client
                    .describe_target_groups()
                    .target_group_arns(arn)
                    .send()
                    .await;

                match response {
                    Ok(resp) => {
                        let attached = resp
                            .target_groups()
                            .first()
                            .map(|tg| tg.load_balancer_arns().len())
                            .unwrap_or(0);
                        debug!(tg_arn = %arn, attached, "Target group associations");
                        Ok(attached == 0)
                    }
                    Err(e) => {
                        let err = classify_sdk_error(&e, arn);
                        if err.is_target_group_not_found() {
                            Ok(true)
                        } else {
                            Err(anyhow::Error::from(err))
                        }
                    }
                }
            },
            arn,
        )
        .await
        .map_err(|e| match e.downcast::<AwsError>() {
            Ok(aws) => aws,
            Err(other) => AwsError::Wait {
                resource_id: arn.to_string(),
                message: other.to_string(),
            },
        })?;

        info!(tg_arn = %arn, "Target group detached");
        Ok(())
    }

    pub async fn delete_target_group(&self, arn: &str) -> Result<(), AwsError> {
        info!(tg_arn = %arn, "Deleting target group");

        self.client
            .delete_target_group()
            .target_group_arn(arn)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, arn))?;

        info!(tg_arn = %arn, "Target group deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_enum_mapping() {
        assert_eq!(protocol_enum(Protocol::Http), ProtocolEnum::Http);
        assert_eq!(protocol_enum(Protocol::Https), ProtocolEnum::Https);
    }

    #[test]
    fn test_instance_target_carries_instance_id() {
        let target = instance_target("i-0abc");
        assert_eq!(target.id(), Some("i-0abc"));
        assert_eq!(target.port(), None);
    }

    #[test]
    fn test_forward_action_targets_group() {
        let action = forward_action("arn:tg:1");
        assert_eq!(action.r#type(), Some(&ActionTypeEnum::Forward));
        assert_eq!(action.target_group_arn(), Some("arn:tg:1"));
    }
}
