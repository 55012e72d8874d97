//! ELBv2 integration tests - actually call AWS APIs
//!
//! These tests are marked `#[ignore]` and only run with:
//! ```
//! AWS_PROFILE=your_profile cargo test --test aws_elb_integration -- --ignored
//! ```
//!
//! The target group lifecycle test also needs `ELB_TEST_VPC_ID`.

use elb_lifecycle::aws::ElbClient;
use elb_lifecycle::aws::elb::TargetGroupSpec;
use elb_lifecycle::teardown::{self, TeardownResult};
use elb_lifecycle::wait::WaitConfig;
use elb_lifecycle_common::Protocol;
use elb_lifecycle_test_utils::{get_test_region, test_resource_name};
use std::time::Duration;

#[tokio::test]
#[ignore]
async fn test_find_missing_load_balancer() {
    let client = ElbClient::new(&get_test_region()).await;
    let name = test_resource_name("missing-lb");

    let err = client
        .find_load_balancer(&name)
        .await
        .expect_err("Load balancer should not exist");
    assert!(
        err.is_load_balancer_not_found(),
        "Expected LoadBalancerNotFound, got: {err}"
    );
}

#[tokio::test]
#[ignore]
async fn test_find_missing_target_group() {
    let client = ElbClient::new(&get_test_region()).await;
    let name = test_resource_name("missing-tg");

    let err = client
        .find_target_group(&name)
        .await
        .expect_err("Target group should not exist");
    assert!(
        err.is_target_group_not_found(),
        "Expected TargetGroupNotFound, got: {err}"
    );
}

/// Teardown with nothing to delete succeeds and reports both as absent
#[tokio::test]
#[ignore]
async fn test_teardown_nothing_to_delete() {
    let client = ElbClient::new(&get_test_region()).await;
    let lb_name = test_resource_name("gone-lb");
    let tg_name = test_resource_name("gone-tg");

    let report = teardown::teardown(&client, &lb_name, &tg_name)
        .await
        .expect("Teardown of missing resources should succeed");
    assert_eq!(report.load_balancer, TeardownResult::AlreadyAbsent);
    assert_eq!(report.target_group, TeardownResult::AlreadyAbsent);
}

/// Create a target group, then tear it down with no load balancer present
#[tokio::test]
#[ignore]
async fn test_target_group_lifecycle() {
    let Ok(vpc_id) = std::env::var("ELB_TEST_VPC_ID") else {
        eprintln!("ELB_TEST_VPC_ID not set, skipping");
        return;
    };

    let client = ElbClient::new(&get_test_region())
        .await
        .with_detach_wait(WaitConfig {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
            timeout: Duration::from_secs(60),
        });

    let lb_name = test_resource_name("it-lb");
    let tg_name = test_resource_name("it-tg");

    let arn = client
        .create_target_group(&TargetGroupSpec {
            name: tg_name.clone(),
            port: 10000,
            protocol: Protocol::Http,
            vpc_id,
        })
        .await
        .expect("Should create target group");
    assert!(arn.contains(":targetgroup/"), "Unexpected ARN: {arn}");

    let found = client
        .find_target_group(&tg_name)
        .await
        .expect("Should find target group");
    assert_eq!(found, arn);

    let report = teardown::teardown(&client, &lb_name, &tg_name)
        .await
        .expect("Teardown should succeed");
    assert_eq!(report.load_balancer, TeardownResult::AlreadyAbsent);
    assert_eq!(report.target_group, TeardownResult::Deleted);

    // Second run sees nothing
    let report = teardown::teardown(&client, &lb_name, &tg_name)
        .await
        .expect("Second teardown should succeed");
    assert_eq!(report.target_group, TeardownResult::AlreadyAbsent);
}
