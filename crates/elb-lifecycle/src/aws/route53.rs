//! Route 53 record management
//!
//! Both CNAMEs are written with a single UPSERT batch, so repeated runs
//! overwrite whatever the records pointed at before.

use crate::aws::context::{AwsContext, FromAwsContext};
use crate::aws::error::{AwsError, classify_sdk_error};
use aws_sdk_route53::Client;
use aws_sdk_route53::types::{
    Change, ChangeAction, ChangeBatch, ResourceRecord, ResourceRecordSet, RrType,
};
use elb_lifecycle_common::ResourceKind;
use tracing::info;

/// One CNAME to create or overwrite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordUpsert {
    pub name: String,
    pub value: String,
    pub ttl: i64,
}

/// A batch of CNAME upserts against one hosted zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsChangeBatch {
    pub hosted_zone_id: String,
    pub changes: Vec<RecordUpsert>,
}

impl DnsChangeBatch {
    /// The two records provisioning maintains: the instance record pointing at
    /// the instance address and the load balancer record pointing at the
    /// load balancer's DNS name.
    pub fn for_endpoints(
        hosted_zone_id: impl Into<String>,
        ttl: i64,
        instance_record: (&str, &str),
        load_balancer_record: (&str, &str),
    ) -> Self {
        let upsert = |(name, value): (&str, &str)| RecordUpsert {
            name: name.to_string(),
            value: value.to_string(),
            ttl,
        };
        Self {
            hosted_zone_id: hosted_zone_id.into(),
            changes: vec![upsert(instance_record), upsert(load_balancer_record)],
        }
    }
}

/// Trait for Route 53 calls, mocked in workflow tests
#[allow(async_fn_in_trait)] // Internal use only, Send+Sync bounds on trait are sufficient
#[cfg_attr(test, mockall::automock)]
pub trait DnsOperations: Send + Sync {
    /// Apply all upserts in one request, returning the change id
    async fn upsert_records(&self, batch: &DnsChangeBatch) -> Result<Option<String>, AwsError>;
}

/// Route 53 client for the two endpoint CNAMEs
pub struct Route53Client {
    client: Client,
}

impl FromAwsContext for Route53Client {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.route53_client(),
        }
    }
}

fn build_error(e: impl std::fmt::Display) -> AwsError {
    AwsError::Build {
        operation: "ChangeResourceRecordSets",
        message: e.to_string(),
    }
}

fn cname_upsert(record: &RecordUpsert) -> Result<Change, AwsError> {
    let record_set = ResourceRecordSet::builder()
        .name(&record.name)
        .r#type(RrType::Cname)
        .ttl(record.ttl)
        .resource_records(
            ResourceRecord::builder()
                .value(&record.value)
                .build()
                .map_err(build_error)?,
        )
        .build()
        .map_err(build_error)?;

    Change::builder()
        .action(ChangeAction::Upsert)
        .resource_record_set(record_set)
        .build()
        .map_err(build_error)
}

impl Route53Client {
    pub async fn upsert_records(&self, batch: &DnsChangeBatch) -> Result<Option<String>, AwsError> {
        for change in &batch.changes {
            info!(
                resource = %ResourceKind::DnsRecord,
                zone = %batch.hosted_zone_id,
                name = %change.name,
                value = %change.value,
                ttl = change.ttl,
                "Upserting CNAME"
            );
        }

        let changes = batch
            .changes
            .iter()
            .map(cname_upsert)
            .collect::<Result<Vec<_>, _>>()?;

        let change_batch = ChangeBatch::builder()
            .set_changes(Some(changes))
            .build()
            .map_err(build_error)?;

        let response = self
            .client
            .change_resource_record_sets()
            .hosted_zone_id(&batch.hosted_zone_id)
            .change_batch(change_batch)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, &batch.hosted_zone_id))?;

        let change_id = response.change_info().map(|info| info.id().to_string());
        info!(change_id = ?change_id, "DNS change submitted");
        Ok(change_id)
    }
}

impl DnsOperations for Route53Client {
    async fn upsert_records(&self, batch: &DnsChangeBatch) -> Result<Option<String>, AwsError> {
        Route53Client::upsert_records(self, batch).await
    }
}
