//! Load balancer protocol names

use serde::{Deserialize, Serialize};
use std::fmt;

/// Protocol used by a target group or listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    Http,
    Https,
}

impl Protocol {
    /// The wire name ELBv2 expects ("HTTP" / "HTTPS")
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Http => "HTTP",
            Protocol::Https => "HTTPS",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_uppercase() {
        let p: Protocol = serde_json::from_str("\"HTTPS\"").unwrap();
        assert_eq!(p, Protocol::Https);
        assert!(serde_json::from_str::<Protocol>("\"TCP\"").is_err());
    }

    #[test]
    fn test_display_matches_wire_name() {
        assert_eq!(Protocol::Http.to_string(), "HTTP");
        assert_eq!(Protocol::Https.as_str(), "HTTPS");
    }
}
