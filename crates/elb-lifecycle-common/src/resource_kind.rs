//! Provider resource kinds

use std::fmt;

/// Provider-side resources managed by elb-lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Application load balancer (owns its listeners)
    LoadBalancer,
    /// Listener on the load balancer
    Listener,
    /// Target group (cannot be deleted while a load balancer references it)
    TargetGroup,
    /// Route 53 CNAME record set
    DnsRecord,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::LoadBalancer => "load balancer",
            ResourceKind::Listener => "listener",
            ResourceKind::TargetGroup => "target group",
            ResourceKind::DnsRecord => "DNS record",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names() {
        assert_eq!(ResourceKind::LoadBalancer.to_string(), "load balancer");
        assert_eq!(ResourceKind::TargetGroup.to_string(), "target group");
        assert_eq!(format!("{}", ResourceKind::DnsRecord), "DNS record");
    }
}
