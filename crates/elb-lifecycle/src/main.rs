//! elb-lifecycle: create or tear down an ALB for an EC2 instance
//!
//! Intended to be run from instance start/stop hooks.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use elb_lifecycle::address::HttpAddressSource;
use elb_lifecycle::aws::{AwsContext, ElbClient, FromAwsContext, Route53Client};
use elb_lifecycle::config::Config;
use elb_lifecycle::provision::{self, ProvisionOptions, ProvisionOutcome};
use elb_lifecycle::teardown;
use elb_lifecycle::wait::run_until_cancelled;
use elb_lifecycle_common::defaults::DEFAULT_CONFIG_PATH;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "elb-lifecycle")]
#[command(about = "Create and tear down an ALB around an EC2 instance")]
#[command(version)]
struct Args {
    /// Path to the JSON configuration file
    #[arg(long, global = true, env = "ELB_LIFECYCLE_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// AWS region (overrides aws.region in the config file)
    #[arg(long, global = true)]
    region: Option<String>,

    /// AWS profile to use (overrides aws.profile in the config file)
    #[arg(long, global = true)]
    aws_profile: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the load balancer, target group, listener and DNS records
    Create {
        /// Delete the load balancer and target group if a later step fails
        #[arg(long)]
        rollback_on_failure: bool,
    },

    /// Delete the load balancer and target group
    Delete,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print error in a user-friendly way
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();

    let _ = writeln!(stderr, "\n\x1b[1;31mError:\x1b[0m {e}");

    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  \x1b[33mCaused by:\x1b[0m {cause}");
        source = cause.source();
    }

    if std::env::var("RUST_BACKTRACE").is_err() {
        let _ = writeln!(
            stderr,
            "\n\x1b[2mSet RUST_BACKTRACE=1 for a detailed backtrace\x1b[0m"
        );
    } else {
        let backtrace = e.backtrace();
        if backtrace.status() == std::backtrace::BacktraceStatus::Captured {
            let _ = writeln!(stderr, "\n\x1b[2mBacktrace:\x1b[0m\n{backtrace}");
        }
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?
        .with_aws_overrides(args.region, args.aws_profile);

    match args.command {
        Command::Create {
            rollback_on_failure,
        } => {
            config
                .validate_for_provision()
                .context("Invalid configuration for create")?;
            handle_create(&config, rollback_on_failure).await
        }
        Command::Delete => {
            config
                .validate_for_teardown()
                .context("Invalid configuration for delete")?;
            handle_delete(&config).await
        }
    }
}

async fn aws_context(config: &Config) -> Result<AwsContext> {
    let region = config.region()?;
    if let Some(profile) = &config.aws.profile {
        info!(profile = %profile, "Using AWS profile");
    }
    Ok(AwsContext::with_profile(region, config.aws.profile.as_deref()).await)
}

/// Cancel the token on Ctrl-C. Callers must race their work against it, since
/// installing the handler replaces the default SIGINT exit.
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            child.cancel();
        }
    });
    token
}

/// Handle the create command
async fn handle_create(config: &Config, rollback_on_failure: bool) -> Result<()> {
    let cancel = cancel_on_ctrl_c();
    let aws = aws_context(config).await?;
    let elb = ElbClient::from_context(&aws).with_cancellation(cancel.clone());
    let dns = Route53Client::from_context(&aws);
    let address_source = HttpAddressSource::new(&config.address_endpoint)?;

    info!(
        region = %aws.region(),
        load_balancer = %config.load_balancer.name,
        target_group = %config.target_group.name,
        address_endpoint = %address_source.endpoint(),
        rollback_on_failure,
        "Starting provisioning"
    );

    let outcome = run_until_cancelled(
        &cancel,
        provision::provision(
            config,
            &elb,
            &dns,
            &address_source,
            ProvisionOptions {
                rollback_on_failure,
            },
        ),
        "provisioning",
    )
    .await?;

    // A partial run was already logged at error level and still exits 0
    if let ProvisionOutcome::Partial {
        failed_step,
        rolled_back,
        ..
    } = &outcome
    {
        let resources = outcome.resources();
        warn!(
            step = %failed_step,
            rolled_back,
            lb_arn = %resources.load_balancer.arn,
            tg_arn = %resources.target_group_arn,
            listener_arn = ?resources.listener_arn,
            "Exiting after partial provisioning"
        );
    }

    Ok(())
}

/// Handle the delete command
async fn handle_delete(config: &Config) -> Result<()> {
    let cancel = cancel_on_ctrl_c();
    let aws = aws_context(config).await?;
    let elb = ElbClient::from_context(&aws).with_cancellation(cancel.clone());

    info!(
        region = %aws.region(),
        load_balancer = %config.load_balancer.name,
        target_group = %config.target_group.name,
        "Starting teardown"
    );

    run_until_cancelled(
        &cancel,
        teardown::teardown(&elb, &config.load_balancer.name, &config.target_group.name),
        "teardown",
    )
    .await?;
    Ok(())
}
