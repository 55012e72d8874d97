//! AWS client modules
//!
//! This module provides wrappers around AWS SDK clients for:
//! - ELBv2: load balancer, target group and listener lifecycle
//! - Route 53: CNAME upserts for the instance and load balancer endpoints

pub mod context;
pub mod elb;
pub mod error;
pub mod route53;

pub use context::{AwsContext, FromAwsContext};
pub use elb::{ElbClient, LoadBalancerOperations};
pub use error::{AwsError, classify_aws_error, classify_sdk_error};
pub use route53::{DnsChangeBatch, DnsOperations, RecordUpsert, Route53Client};
