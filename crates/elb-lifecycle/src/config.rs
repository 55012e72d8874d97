//! Configuration loading from JSON
//!
//! One file describes both workflows. Teardown only needs the two resource
//! names, so everything else is optional at parse time and checked by
//! [`Config::validate_for_provision`].

use crate::aws::elb::{LoadBalancerSpec, TargetGroupSpec};
use crate::error::ConfigError;
use elb_lifecycle_common::Protocol;
use elb_lifecycle_common::defaults::{
    default_listener_port, default_record_ttl, default_target_port, default_target_protocol,
};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// AWS credential profile and region
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AwsSettings {
    /// Shared-config profile used for credentials
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoadBalancerSettings {
    pub name: String,
    #[serde(default)]
    pub subnets: Vec<String>,
    #[serde(default)]
    pub security_groups: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetGroupSettings {
    pub name: String,
    #[serde(default)]
    pub vpc_id: String,
    /// EC2 instance registered as the only target
    #[serde(default)]
    pub target_instance: String,
    #[serde(default = "default_target_port")]
    pub port: i32,
    #[serde(default = "default_target_protocol")]
    pub protocol: Protocol,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListenerSettings {
    /// ACM certificate served by the HTTPS listener
    #[serde(default)]
    pub certificate_arn: String,
    #[serde(default = "default_listener_port")]
    pub port: i32,
}

impl Default for ListenerSettings {
    fn default() -> Self {
        Self {
            certificate_arn: String::new(),
            port: default_listener_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DnsSettings {
    #[serde(default)]
    pub hosted_zone_id: String,
    /// CNAME pointing at the instance address
    #[serde(default)]
    pub instance_record: String,
    /// CNAME pointing at the load balancer DNS name
    #[serde(default)]
    pub load_balancer_record: String,
    #[serde(default = "default_record_ttl")]
    pub ttl: i64,
}

impl Default for DnsSettings {
    fn default() -> Self {
        Self {
            hosted_zone_id: String::new(),
            instance_record: String::new(),
            load_balancer_record: String::new(),
            ttl: default_record_ttl(),
        }
    }
}

/// Configuration for both workflows
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub aws: AwsSettings,
    pub load_balancer: LoadBalancerSettings,
    pub target_group: TargetGroupSettings,
    #[serde(default)]
    pub listener: ListenerSettings,
    #[serde(default)]
    pub dns: DnsSettings,
    /// URL whose response body is the instance's current address
    #[serde(default)]
    pub address_endpoint: String,
}

fn require(value: &str, field: &'static str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Empty(field));
    }
    Ok(())
}

fn require_list(values: &[String], field: &'static str) -> Result<(), ConfigError> {
    if values.is_empty() {
        return Err(ConfigError::EmptyList(field));
    }
    if values.iter().any(|v| v.trim().is_empty()) {
        return Err(ConfigError::Empty(field));
    }
    Ok(())
}

fn require_port(value: i32, field: &'static str) -> Result<(), ConfigError> {
    if !(1..=65535).contains(&value) {
        return Err(ConfigError::InvalidPort { field, value });
    }
    Ok(())
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::io(path.display().to_string(), e))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Apply command-line overrides for the AWS profile and region
    pub fn with_aws_overrides(mut self, region: Option<String>, profile: Option<String>) -> Self {
        if region.is_some() {
            self.aws.region = region;
        }
        if profile.is_some() {
            self.aws.profile = profile;
        }
        self
    }

    /// Region to load the AWS config for
    pub fn region(&self) -> Result<&str, ConfigError> {
        match self.aws.region.as_deref() {
            Some(r) if !r.trim().is_empty() => Ok(r),
            _ => Err(ConfigError::Empty("aws.region")),
        }
    }

    /// Check the fields teardown uses
    pub fn validate_for_teardown(&self) -> Result<(), ConfigError> {
        self.region()?;
        require(&self.load_balancer.name, "load_balancer.name")?;
        require(&self.target_group.name, "target_group.name")?;
        Ok(())
    }

    /// Check every field provisioning uses
    pub fn validate_for_provision(&self) -> Result<(), ConfigError> {
        self.validate_for_teardown()?;

        require_list(&self.load_balancer.subnets, "load_balancer.subnets")?;
        require_list(
            &self.load_balancer.security_groups,
            "load_balancer.security_groups",
        )?;

        require(&self.target_group.vpc_id, "target_group.vpc_id")?;
        require(
            &self.target_group.target_instance,
            "target_group.target_instance",
        )?;
        require_port(self.target_group.port, "target_group.port")?;

        require(&self.listener.certificate_arn, "listener.certificate_arn")?;
        require_port(self.listener.port, "listener.port")?;

        require(&self.dns.hosted_zone_id, "dns.hosted_zone_id")?;
        require(&self.dns.instance_record, "dns.instance_record")?;
        require(&self.dns.load_balancer_record, "dns.load_balancer_record")?;
        if self.dns.ttl < 0 {
            return Err(ConfigError::InvalidTtl(self.dns.ttl));
        }

        require(&self.address_endpoint, "address_endpoint")?;
        if !(self.address_endpoint.starts_with("http://")
            || self.address_endpoint.starts_with("https://"))
        {
            return Err(ConfigError::InvalidEndpoint(self.address_endpoint.clone()));
        }

        Ok(())
    }

    pub fn load_balancer_spec(&self) -> LoadBalancerSpec {
        LoadBalancerSpec {
            name: self.load_balancer.name.clone(),
            subnets: self.load_balancer.subnets.clone(),
            security_groups: self.load_balancer.security_groups.clone(),
        }
    }

    pub fn target_group_spec(&self) -> TargetGroupSpec {
        TargetGroupSpec {
            name: self.target_group.name.clone(),
            port: self.target_group.port,
            protocol: self.target_group.protocol,
            vpc_id: self.target_group.vpc_id.clone(),
        }
    }
}
