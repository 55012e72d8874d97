//! AWS error classification and handling
//!
//! Provides typed errors for ELBv2 and Route 53 operations using the
//! `.code()` method from `ProvideErrorMetadata` instead of string matching
//! on Debug output.

use aws_sdk_elasticloadbalancingv2::error::ProvideErrorMetadata;
use elb_lifecycle_common::ResourceKind;
use thiserror::Error;

/// Closed set of provider conditions returned by the client traits
#[derive(Debug, Error)]
pub enum AwsError {
    /// No load balancer with this name (expected during teardown)
    #[error("Load balancer not found: '{name}'")]
    LoadBalancerNotFound { name: String },

    /// No target group with this name (expected during teardown)
    #[error("Target group not found: '{name}'")]
    TargetGroupNotFound { name: String },

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    Throttled,

    /// Resource is still referenced by another resource
    #[error("Resource is in use: {message}")]
    ResourceInUse { message: String },

    /// A successful response lacked a value later calls depend on
    #[error("{operation} response has no {resource} {field}")]
    MissingField {
        operation: &'static str,
        resource: ResourceKind,
        field: &'static str,
    },

    /// Request could not be assembled (missing required builder field)
    #[error("Failed to build {operation} request: {message}")]
    Build {
        operation: &'static str,
        message: String,
    },

    /// Polling for a resource state did not complete
    #[error("Wait for {resource_id} failed: {message}")]
    Wait {
        resource_id: String,
        message: String,
    },

    /// Generic AWS SDK error with code and message
    #[error("AWS error{}: {message}", fmt_code(.code))]
    Sdk {
        code: Option<String>,
        message: String,
    },
}

impl AwsError {
    pub fn is_load_balancer_not_found(&self) -> bool {
        matches!(self, AwsError::LoadBalancerNotFound { .. })
    }

    pub fn is_target_group_not_found(&self) -> bool {
        matches!(self, AwsError::TargetGroupNotFound { .. })
    }

    /// Provider error code, if the error came from the provider
    pub fn code(&self) -> Option<&str> {
        match self {
            AwsError::LoadBalancerNotFound { .. } => Some(LOAD_BALANCER_NOT_FOUND),
            AwsError::TargetGroupNotFound { .. } => Some(TARGET_GROUP_NOT_FOUND),
            AwsError::Sdk { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

fn fmt_code(code: &Option<String>) -> String {
    code.as_deref().map(|c| format!(" ({c})")).unwrap_or_default()
}

pub const LOAD_BALANCER_NOT_FOUND: &str = "LoadBalancerNotFound";
pub const TARGET_GROUP_NOT_FOUND: &str = "TargetGroupNotFound";

/// Known AWS error codes for throttling/rate limiting
const THROTTLING_CODES: &[&str] = &["Throttling", "ThrottlingException", "RequestLimitExceeded"];

/// Known AWS error codes for resources still referenced elsewhere
const IN_USE_CODES: &[&str] = &["ResourceInUse", "PriorRequestNotComplete"];

/// Classify an AWS error code.
///
/// `name` is the resource name the request was about; it is carried into the
/// not-found variants so log lines say what was missing.
pub fn classify_aws_error(code: Option<&str>, message: Option<&str>, name: &str) -> AwsError {
    let message = message.unwrap_or("Unknown error").to_string();

    match code {
        Some(LOAD_BALANCER_NOT_FOUND) => AwsError::LoadBalancerNotFound {
            name: name.to_string(),
        },
        Some(TARGET_GROUP_NOT_FOUND) => AwsError::TargetGroupNotFound {
            name: name.to_string(),
        },
        Some(c) if THROTTLING_CODES.contains(&c) => AwsError::Throttled,
        Some(c) if IN_USE_CODES.contains(&c) => AwsError::ResourceInUse { message },
        _ => AwsError::Sdk {
            code: code.map(|s| s.to_string()),
            message,
        },
    }
}

/// Classify any SDK error that exposes error metadata.
///
/// Works for every `SdkError<OperationError>` from both the ELBv2 and Route 53
/// clients. Transport failures carry no code and fall through to
/// [`AwsError::Sdk`] with the display chain as message.
pub fn classify_sdk_error<E>(err: &E, name: &str) -> AwsError
where
    E: ProvideErrorMetadata + std::error::Error,
{
    let message = match ProvideErrorMetadata::message(err) {
        Some(m) => m.to_string(),
        None => error_chain(err),
    };
    classify_aws_error(ProvideErrorMetadata::code(err), Some(&message), name)
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
