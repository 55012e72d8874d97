//! elb-lifecycle - ALB lifecycle management around an EC2 instance
//!
//! Creates a load balancer, target group, HTTPS listener and two Route 53
//! CNAMEs when the instance starts, and tears the load balancer and target
//! group down again when it stops.

pub mod address;
pub mod aws;
pub mod config;
pub mod error;
pub mod provision;
pub mod teardown;
pub mod wait;
