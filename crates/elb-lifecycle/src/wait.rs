//! Resource waiting with exponential backoff and cancellation support.
//!
//! Used for the one polling step in the system: waiting for a target group to
//! lose its load balancer associations before it can be deleted.

use anyhow::Result;
use backon::{BackoffBuilder, ExponentialBuilder};
use elb_lifecycle_common::defaults::{
    DEFAULT_DETACH_WAIT_INITIAL_DELAY_SECS, DEFAULT_DETACH_WAIT_MAX_DELAY_SECS,
    DEFAULT_DETACH_WAIT_TIMEOUT_SECS,
};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Configuration for resource waiting with exponential backoff.
#[derive(Debug, Clone)]
pub struct WaitConfig {
    /// Initial delay between checks
    pub initial_delay: Duration,
    /// Maximum delay between checks (cap for exponential growth)
    pub max_delay: Duration,
    /// Maximum total time to wait before timeout
    pub timeout: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            timeout: Duration::from_secs(60),
        }
    }
}

impl WaitConfig {
    /// Schedule for waiting on a target group to detach after its load
    /// balancer was deleted
    pub fn target_group_detach() -> Self {
        Self {
            initial_delay: Duration::from_secs(DEFAULT_DETACH_WAIT_INITIAL_DELAY_SECS),
            max_delay: Duration::from_secs(DEFAULT_DETACH_WAIT_MAX_DELAY_SECS),
            timeout: Duration::from_secs(DEFAULT_DETACH_WAIT_TIMEOUT_SECS),
        }
    }
}

/// Wait for a resource to reach a condition with exponential backoff.
///
/// `check` returns `Ok(true)` when the condition holds and `Ok(false)` to
/// poll again. An `Err` from `check` ends the wait immediately.
///
/// # Example
/// ```ignore
/// wait_for_resource(
///     WaitConfig::target_group_detach(),
///     Some(&cancel_token),
///     || async { Ok(target_group_is_detached().await?) },
///     "arn:aws:elasticloadbalancing:...",
/// ).await?;
/// ```
pub async fn wait_for_resource<F, Fut>(
    config: WaitConfig,
    cancel: Option<&CancellationToken>,
    check: F,
    resource_name: &str,
) -> Result<()>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let start = std::time::Instant::now();
    let mut attempts = 0u32;

    let backoff = ExponentialBuilder::default()
        .with_min_delay(config.initial_delay)
        .with_max_delay(config.max_delay)
        .with_factor(2.0)
        .with_jitter()
        .build();

    let mut delays = backoff.into_iter();

    loop {
        attempts += 1;

        if let Some(token) = cancel {
            if token.is_cancelled() {
                anyhow::bail!("Wait for {} cancelled", resource_name);
            }
        }

        if start.elapsed() >= config.timeout {
            anyhow::bail!(
                "Timeout waiting for {} after {:?} ({} attempts)",
                resource_name,
                config.timeout,
                attempts
            );
        }

        match check().await {
            Ok(true) => {
                debug!(resource = %resource_name, attempts, "Resource ready");
                return Ok(());
            }
            Ok(false) => {
                let delay = delays.next().unwrap_or(config.max_delay);
                debug!(
                    resource = %resource_name,
                    attempt = attempts,
                    delay_ms = delay.as_millis(),
                    "Resource not ready, retrying"
                );

                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = async {
                        if let Some(token) = cancel {
                            token.cancelled().await
                        } else {
                            std::future::pending::<()>().await
                        }
                    } => {
                        anyhow::bail!("Wait for {} cancelled", resource_name);
                    }
                }
            }
            Err(e) => {
                warn!(resource = %resource_name, error = %e, "Resource check failed");
                return Err(e);
            }
        }
    }
}

/// Run `work` to completion unless `cancel` fires first.
///
/// Dropping `work` on cancellation abandons any in-flight request, so
/// resources it was creating may be left behind.
pub async fn run_until_cancelled<T, Fut>(
    cancel: &CancellationToken,
    work: Fut,
    what: &str,
) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    tokio::select! {
        result = work => result,
        _ = cancel.cancelled() => {
            warn!(operation = %what, "Interrupted");
            anyhow::bail!("Interrupted during {}", what)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_config() -> WaitConfig {
        WaitConfig {
            initial_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(20),
            timeout: Duration::from_millis(500),
        }
    }

    #[tokio::test]
    async fn test_returns_once_condition_holds() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        wait_for_resource(
            fast_config(),
            None,
            move || async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                Ok::<_, anyhow::Error>(n >= 3)
            },
            "tg",
        )
        .await
        .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_times_out() {
        let config = WaitConfig {
            timeout: Duration::from_millis(50),
            ..fast_config()
        };
        let err = wait_for_resource(
            config,
            None,
            || async { Ok::<_, anyhow::Error>(false) },
            "tg",
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("Timeout waiting for tg"));
    }

    #[tokio::test]
    async fn test_check_error_stops_wait() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let err = wait_for_resource(
            fast_config(),
            None,
            move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<bool, _>(anyhow::anyhow!("access denied"))
            },
            "tg",
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "access denied");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_token_aborts() {
        let token = CancellationToken::new();
        token.cancel();
        let err = wait_for_resource(
            fast_config(),
            Some(&token),
            || async { Ok::<_, anyhow::Error>(false) },
            "tg",
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("cancelled"));
    }

    #[tokio::test]
    async fn test_run_until_cancelled_interrupts_pending_work() {
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let err = run_until_cancelled(
            &token,
            async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok::<_, anyhow::Error>(())
            },
            "provisioning",
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Interrupted during provisioning");
    }

    #[tokio::test]
    async fn test_run_until_cancelled_returns_result() {
        let token = CancellationToken::new();
        let value = run_until_cancelled(&token, async { Ok::<_, anyhow::Error>(7) }, "teardown")
            .await
            .unwrap();
        assert_eq!(value, 7);

        let err = run_until_cancelled(
            &token,
            async { Err::<(), _>(anyhow::anyhow!("access denied")) },
            "teardown",
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "access denied");
    }

    #[test]
    fn test_target_group_detach_schedule() {
        let config = WaitConfig::target_group_detach();
        assert!(config.initial_delay < config.max_delay);
        assert!(config.max_delay < config.timeout);
    }
}
