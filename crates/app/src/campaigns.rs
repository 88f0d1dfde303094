//! Campaign dispatch.

use std::sync::Arc;

use jiff::Timestamp;
use lealtad::billing::{BillingPlan, Capacity, EntitlementError};
use serde::Serialize;
use thiserror::Error;
use tracing::{Span, error, info, warn};

use crate::{
    gate::Denial,
    notifications::{Notification, NotificationDispatcher},
    store::{RecordStore, StoreError, TenantRecord},
};

/// Campaign failures.
#[derive(Debug, Error)]
pub enum CampaignError {
    /// The campaign would exceed the plan's monthly recipient cap.
    #[error("plan limit reached")]
    Entitlement(#[source] EntitlementError),

    /// The store failed.
    #[error("storage error")]
    Store(#[source] StoreError),
}

impl From<EntitlementError> for CampaignError {
    fn from(error: EntitlementError) -> Self {
        Self::Entitlement(error)
    }
}

impl From<StoreError> for CampaignError {
    fn from(error: StoreError) -> Self {
        Self::Store(error)
    }
}

impl From<CampaignError> for Denial {
    fn from(error: CampaignError) -> Self {
        match error {
            CampaignError::Entitlement(_) => Self::forbidden("plan limit reached"),
            CampaignError::Store(_) => Self::internal(),
        }
    }
}

/// Delivery counts for one campaign.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CampaignReport {
    /// Recipients the dispatcher accepted.
    pub sent: u32,

    /// Recipients that failed.
    pub failed: u32,
}

/// Sends campaigns within the plan's monthly recipient allowance.
#[derive(Clone)]
pub struct CampaignService {
    store: Arc<dyn RecordStore>,
    dispatcher: Arc<dyn NotificationDispatcher>,
}

impl CampaignService {
    /// Create a new service.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, dispatcher: Arc<dyn NotificationDispatcher>) -> Self {
        Self { store, dispatcher }
    }

    /// Send `notification` to every recipient.
    ///
    /// The whole list must fit in what is left of this month's allowance;
    /// a campaign is never truncated to fit. Individual delivery failures
    /// are logged and counted.
    ///
    /// # Errors
    ///
    /// Returns [`CampaignError::Entitlement`] before sending anything when
    /// the list is too long.
    #[tracing::instrument(
        name = "campaigns.dispatch",
        skip(self, tenant, recipients, notification),
        fields(
            tenant_id = %tenant.id,
            recipients = recipients.len(),
            sent = tracing::field::Empty,
            failed = tracing::field::Empty
        ),
        err
    )]
    pub async fn dispatch(
        &self,
        tenant: &TenantRecord,
        recipients: &[String],
        notification: &Notification,
        now: Timestamp,
    ) -> Result<CampaignReport, CampaignError> {
        if recipients.is_empty() {
            return Ok(CampaignReport::default());
        }

        let plan = BillingPlan::for_code(tenant.effective_plan());
        let requested = u32::try_from(recipients.len()).unwrap_or(u32::MAX);

        let in_use = self
            .store
            .count_campaign_recipients_this_month(tenant.id, now)
            .await?;

        plan.check_capacity(Capacity::MonthlyRecipients, in_use, requested)
            .inspect_err(|_exceeded| {
                warn!(in_use, requested, "campaign exceeds monthly allowance");
            })?;

        let mut report = CampaignReport::default();

        for recipient in recipients {
            match self.dispatcher.send(recipient, notification).await {
                Ok(()) => report.sent += 1,
                Err(source) => {
                    warn!(error = %source, recipient = %recipient, "notification failed");
                    report.failed += 1;
                }
            }
        }

        if report.sent > 0
            && let Err(source) = self
                .store
                .record_campaign_recipients(tenant.id, report.sent, now)
                .await
        {
            error!(error = %source, "failed to record campaign recipients");
        }

        Span::current().record("sent", report.sent);
        Span::current().record("failed", report.failed);

        info!("campaign dispatched");

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        notifications::{MockNotificationDispatcher, NotificationError},
        store::MockRecordStore,
        test_helpers::tenant,
    };

    use super::*;

    fn notification() -> Notification {
        Notification {
            title: "Doble sello".to_string(),
            body: "Solo hoy".to_string(),
        }
    }

    fn recipients(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("customer-{i}")).collect()
    }

    #[tokio::test]
    async fn over_allowance_sends_nothing() -> TestResult {
        let mut record = tenant("cafe-luna");

        record.plan = Some("pyme".to_string());

        let mut store = MockRecordStore::new();

        store
            .expect_count_campaign_recipients_this_month()
            .once()
            .return_once(|_, _| Ok(499));

        store.expect_record_campaign_recipients().never();

        let mut dispatcher = MockNotificationDispatcher::new();

        dispatcher.expect_send().never();

        let error = CampaignService::new(Arc::new(store), Arc::new(dispatcher))
            .dispatch(&record, &recipients(2), &notification(), Timestamp::now())
            .await
            .err()
            .ok_or("expected refusal")?;

        assert!(matches!(
            error,
            CampaignError::Entitlement(EntitlementError::CapacityExceeded { remaining: 1, .. })
        ));
        assert_eq!(Denial::from(error).status, 403);

        Ok(())
    }

    #[tokio::test]
    async fn exact_remaining_allowance_is_accepted() -> TestResult {
        let mut record = tenant("cafe-luna");

        record.plan = Some("pyme".to_string());

        let id = record.id;
        let mut store = MockRecordStore::new();

        store
            .expect_count_campaign_recipients_this_month()
            .once()
            .return_once(|_, _| Ok(497));

        store
            .expect_record_campaign_recipients()
            .once()
            .withf(move |tenant, count, _| *tenant == id && *count == 2)
            .return_once(|_, _, _| Ok(()));

        let mut dispatcher = MockNotificationDispatcher::new();
        let mut calls = 0;

        dispatcher.expect_send().times(3).returning(move |_, _| {
            calls += 1;

            if calls == 2 {
                Err(NotificationError::Unreachable)
            } else {
                Ok(())
            }
        });

        let report = CampaignService::new(Arc::new(store), Arc::new(dispatcher))
            .dispatch(&record, &recipients(3), &notification(), Timestamp::now())
            .await?;

        assert_eq!(report, CampaignReport { sent: 2, failed: 1 });

        Ok(())
    }

    #[tokio::test]
    async fn empty_campaign_is_a_no_op() -> TestResult {
        let mut store = MockRecordStore::new();

        store.expect_count_campaign_recipients_this_month().never();

        let dispatcher = MockNotificationDispatcher::new();

        let report = CampaignService::new(Arc::new(store), Arc::new(dispatcher))
            .dispatch(&tenant("cafe-luna"), &[], &notification(), Timestamp::now())
            .await?;

        assert_eq!(report, CampaignReport::default());

        Ok(())
    }
}
