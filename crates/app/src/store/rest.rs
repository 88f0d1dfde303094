//! PostgREST-style record store client.

use async_trait::async_trait;
use jiff::{Timestamp, tz::TimeZone};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};

use crate::store::{
    ProgramRecord, ProgramUuid, RecordStore, RedemptionOutcome, SsoTokenRecord, StoreError,
    TenantRecord, TenantUuid,
};

const TENANTS: &str = "tenants";
const PROGRAMS: &str = "programs";
const SSO_TOKENS: &str = "sso_tokens";
const CAMPAIGN_SENDS: &str = "campaign_sends";
const REDEEM_REWARD_FN: &str = "redeem_reward_atomic";

/// Connection settings for the record store.
#[derive(Debug, Clone)]
pub struct RestStoreConfig {
    /// Base URL, e.g. `"https://project.example.co"`.
    pub url: String,

    /// Service-role key sent as `apikey` and bearer token.
    pub service_key: String,
}

/// HTTP client for the record store.
#[derive(Debug, Clone)]
pub struct RestRecordStore {
    config: RestStoreConfig,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct RecipientsRow {
    recipients: u32,
}

impl RestRecordStore {
    /// Create a new client from the given configuration.
    #[must_use]
    pub fn new(config: RestStoreConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    fn table(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.config.url.trim_end_matches('/'))
    }

    fn rpc(&self, function: &str) -> String {
        format!("{}/rest/v1/rpc/{function}", self.config.url.trim_end_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.service_key)
            .bearer_auth(&self.config.service_key)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = self.authorize(request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();

            return Err(StoreError::Status { status, body });
        }

        Ok(response)
    }

    async fn first<T: DeserializeOwned>(
        &self,
        table: &str,
        filter: &[(&str, String)],
    ) -> Result<Option<T>, StoreError> {
        let response = self
            .send(
                self.http
                    .get(self.table(table))
                    .query(filter)
                    .query(&[("select", "*"), ("limit", "1")]),
            )
            .await?;

        let rows: Vec<T> = response.json().await?;

        Ok(rows.into_iter().next())
    }
}

/// Midnight UTC on the first day of `now`'s month.
fn month_start(now: Timestamp) -> Result<Timestamp, jiff::Error> {
    Ok(now
        .to_zoned(TimeZone::UTC)
        .date()
        .first_of_month()
        .to_zoned(TimeZone::UTC)?
        .timestamp())
}

#[async_trait]
impl RecordStore for RestRecordStore {
    #[tracing::instrument(
        name = "store.find_tenant_by_id",
        skip(self),
        fields(tenant_id = %id),
        err
    )]
    async fn find_tenant_by_id(&self, id: TenantUuid) -> Result<Option<TenantRecord>, StoreError> {
        self.first(TENANTS, &[("id", format!("eq.{id}"))]).await
    }

    #[tracing::instrument(name = "store.find_tenant_by_slug", skip(self), err)]
    async fn find_tenant_by_slug(&self, slug: &str) -> Result<Option<TenantRecord>, StoreError> {
        self.first(TENANTS, &[("slug", format!("eq.{slug}"))]).await
    }

    #[tracing::instrument(
        name = "store.find_program",
        skip(self),
        fields(tenant_id = %tenant),
        err
    )]
    async fn find_program(&self, tenant: TenantUuid) -> Result<Option<ProgramRecord>, StoreError> {
        self.first(
            PROGRAMS,
            &[
                ("tenant_id", format!("eq.{tenant}")),
                ("activo", "eq.true".to_string()),
            ],
        )
        .await
    }

    #[tracing::instrument(
        name = "store.update_program_config",
        skip(self, config),
        fields(program_id = %program),
        err
    )]
    async fn update_program_config(
        &self,
        program: ProgramUuid,
        config: &Value,
    ) -> Result<(), StoreError> {
        self.send(
            self.http
                .patch(self.table(PROGRAMS))
                .query(&[("id", format!("eq.{program}"))])
                .header("Prefer", "return=minimal")
                .json(&json!({ "config": config })),
        )
        .await?;

        Ok(())
    }

    #[tracing::instrument(
        name = "store.insert_sso_token",
        skip(self, token),
        fields(tenant_id = %token.tenant_id),
        err
    )]
    async fn insert_sso_token(&self, token: &SsoTokenRecord) -> Result<(), StoreError> {
        self.send(
            self.http
                .post(self.table(SSO_TOKENS))
                .header("Prefer", "return=minimal")
                .json(token),
        )
        .await?;

        Ok(())
    }

    #[tracing::instrument(
        name = "store.count_campaign_recipients_this_month",
        skip(self),
        fields(tenant_id = %tenant),
        err
    )]
    async fn count_campaign_recipients_this_month(
        &self,
        tenant: TenantUuid,
        now: Timestamp,
    ) -> Result<u32, StoreError> {
        let since = month_start(now).unwrap_or(now);

        let response = self
            .send(self.http.get(self.table(CAMPAIGN_SENDS)).query(&[
                ("tenant_id", format!("eq.{tenant}")),
                ("sent_at", format!("gte.{since}")),
                ("select", "recipients".to_string()),
            ]))
            .await?;

        let rows: Vec<RecipientsRow> = response.json().await?;

        Ok(rows
            .iter()
            .fold(0_u32, |total, row| total.saturating_add(row.recipients)))
    }

    #[tracing::instrument(
        name = "store.record_campaign_recipients",
        skip(self),
        fields(tenant_id = %tenant),
        err
    )]
    async fn record_campaign_recipients(
        &self,
        tenant: TenantUuid,
        count: u32,
        now: Timestamp,
    ) -> Result<(), StoreError> {
        self.send(
            self.http
                .post(self.table(CAMPAIGN_SENDS))
                .header("Prefer", "return=minimal")
                .json(&json!({
                    "tenant_id": tenant,
                    "recipients": count,
                    "sent_at": now,
                })),
        )
        .await?;

        Ok(())
    }

    #[tracing::instrument(
        name = "store.redeem_reward_atomic",
        skip(self, code),
        fields(tenant_id = %tenant),
        err
    )]
    async fn redeem_reward_atomic(
        &self,
        code: &str,
        tenant: TenantUuid,
    ) -> Result<RedemptionOutcome, StoreError> {
        let response = self
            .send(
                self.http
                    .post(self.rpc(REDEEM_REWARD_FN))
                    .json(&json!({ "p_code": code, "p_tenant_id": tenant })),
            )
            .await?;

        let body: Value = response.json().await?;

        Ok(RedemptionOutcome::from_response(body)?)
    }
}
