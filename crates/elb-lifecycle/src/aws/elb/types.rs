//! ELBv2 request and response values
//!
//! Dependent requests are built from the outputs of earlier calls, so an ARN
//! only reaches a later call after the provider has returned it.

use elb_lifecycle_common::Protocol;

/// Parameters for creating the load balancer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadBalancerSpec {
    pub name: String,
    pub subnets: Vec<String>,
    pub security_groups: Vec<String>,
}

/// What CreateLoadBalancer returned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedLoadBalancer {
    pub arn: String,
    /// Provider-assigned DNS name, the value of the load balancer CNAME
    pub dns_name: String,
}

/// Parameters for creating the target group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetGroupSpec {
    pub name: String,
    pub port: i32,
    pub protocol: Protocol,
    pub vpc_id: String,
}

/// Registration of a single instance in a target group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRegistration {
    pub target_group_arn: String,
    pub instance_id: String,
}

impl TargetRegistration {
    pub fn new(target_group_arn: impl Into<String>, instance_id: impl Into<String>) -> Self {
        Self {
            target_group_arn: target_group_arn.into(),
            instance_id: instance_id.into(),
        }
    }
}

/// A listener whose default action forwards to one target group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerSpec {
    pub load_balancer_arn: String,
    pub target_group_arn: String,
    pub certificate_arn: String,
    pub port: i32,
    pub protocol: Protocol,
}

impl ListenerSpec {
    /// HTTPS listener on `port` of `load_balancer`, forwarding to `target_group_arn`
    pub fn https_forward(
        load_balancer: &CreatedLoadBalancer,
        target_group_arn: impl Into<String>,
        certificate_arn: impl Into<String>,
        port: i32,
    ) -> Self {
        Self {
            load_balancer_arn: load_balancer.arn.clone(),
            target_group_arn: target_group_arn.into(),
            certificate_arn: certificate_arn.into(),
            port,
            protocol: Protocol::Https,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_https_forward_threads_arns() {
        let lb = CreatedLoadBalancer {
            arn: "arn:lb:1".to_string(),
            dns_name: "lb1.example.com".to_string(),
        };
        let spec = ListenerSpec::https_forward(&lb, "arn:tg:1", "arn:cert:1", 443);
        assert_eq!(spec.load_balancer_arn, "arn:lb:1");
        assert_eq!(spec.target_group_arn, "arn:tg:1");
        assert_eq!(spec.certificate_arn, "arn:cert:1");
        assert_eq!(spec.protocol, Protocol::Https);
        assert_eq!(spec.port, 443);
    }
}
