//! Record Store
//!
//! The managed data store behind every tenant-scoped operation. Services only
//! see the [`RecordStore`] trait; [`RestRecordStore`] talks to a
//! PostgREST-style HTTP endpoint.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use serde_json::Value;

mod errors;
pub mod records;
mod rest;

pub use errors::StoreError;
pub use records::*;
pub use rest::{RestRecordStore, RestStoreConfig};

/// Reads and writes against the external record store.
#[automock]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Point lookup by tenant id.
    async fn find_tenant_by_id(&self, id: TenantUuid) -> Result<Option<TenantRecord>, StoreError>;

    /// Point lookup by public slug.
    async fn find_tenant_by_slug(&self, slug: &str) -> Result<Option<TenantRecord>, StoreError>;

    /// The tenant's active program.
    async fn find_program(&self, tenant: TenantUuid) -> Result<Option<ProgramRecord>, StoreError>;

    /// Overwrite a program's configuration blob.
    async fn update_program_config(
        &self,
        program: ProgramUuid,
        config: &Value,
    ) -> Result<(), StoreError>;

    /// Persist a freshly issued SSO exchange token.
    async fn insert_sso_token(&self, token: &SsoTokenRecord) -> Result<(), StoreError>;

    /// Campaign notifications sent this calendar month.
    async fn count_campaign_recipients_this_month(
        &self,
        tenant: TenantUuid,
        now: Timestamp,
    ) -> Result<u32, StoreError>;

    /// Record campaign notifications sent at `now`.
    async fn record_campaign_recipients(
        &self,
        tenant: TenantUuid,
        count: u32,
        now: Timestamp,
    ) -> Result<(), StoreError>;

    /// Check and mark a reward code redeemed in one atomic step.
    async fn redeem_reward_atomic(
        &self,
        code: &str,
        tenant: TenantUuid,
    ) -> Result<RedemptionOutcome, StoreError>;
}
