//! Reward Redemption
//!
//! Checking and marking a reward as redeemed happens in one atomic store
//! procedure; this module validates the code, calls it and classifies the
//! refusal it may return.

use std::sync::Arc;

use jiff::{SignedDuration, Timestamp};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    gate::Denial,
    store::{RecordStore, RedeemedReward, RedemptionOutcome, StoreError, TenantUuid},
};

const MIN_CODE_LEN: usize = 4;
const MAX_CODE_LEN: usize = 32;

/// Redemption failures.
#[derive(Debug, Error)]
pub enum RedemptionError {
    /// The code has the wrong shape.
    #[error("invalid code")]
    InvalidCode,

    /// No reward with this code for this tenant.
    #[error("reward not found")]
    NotFound,

    /// The reward was redeemed before.
    #[error("reward already redeemed")]
    AlreadyRedeemed,

    /// The reward's redemption window has passed.
    #[error("reward expired")]
    Expired,

    /// The procedure refused for another reason.
    #[error("reward unavailable")]
    Rejected(String),

    /// The store failed.
    #[error("storage error")]
    Store(#[source] StoreError),
}

impl From<StoreError> for RedemptionError {
    fn from(error: StoreError) -> Self {
        Self::Store(error)
    }
}

impl RedemptionError {
    /// Classify the procedure's error string.
    fn from_rejection(reason: String) -> Self {
        let normalized = reason.to_lowercase();

        if ["already", "canjead", "redeemed"]
            .iter()
            .any(|marker| normalized.contains(marker))
        {
            Self::AlreadyRedeemed
        } else if ["expir", "vencid"].iter().any(|marker| normalized.contains(marker)) {
            Self::Expired
        } else if ["not_found", "not found", "no encontrad", "invalid"]
            .iter()
            .any(|marker| normalized.contains(marker))
        {
            Self::NotFound
        } else {
            Self::Rejected(reason)
        }
    }
}

impl From<RedemptionError> for Denial {
    fn from(error: RedemptionError) -> Self {
        match error {
            RedemptionError::InvalidCode => Self::bad_request("invalid code"),
            RedemptionError::NotFound => Self::not_found(),
            RedemptionError::AlreadyRedeemed => Self::conflict("already redeemed"),
            RedemptionError::Expired => Self::gone("expired"),
            RedemptionError::Rejected(_) => Self::bad_request("reward unavailable"),
            RedemptionError::Store(_) => Self::internal(),
        }
    }
}

/// Normalize a cashier-entered code: trimmed, uppercase, 4 to 32
/// alphanumerics or dashes.
pub fn normalize_reward_code(code: &str) -> Option<String> {
    let code = code.trim();

    let valid = (MIN_CODE_LEN..=MAX_CODE_LEN).contains(&code.len())
        && code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');

    valid.then(|| code.to_ascii_uppercase())
}

/// When a reward granted at `issued_at` stops being redeemable.
///
/// # Errors
///
/// Returns an error when the result leaves the timestamp range.
pub fn reward_expires_at(issued_at: Timestamp, days: i32) -> Result<Timestamp, jiff::Error> {
    issued_at.checked_add(SignedDuration::from_hours(i64::from(days.max(0)) * 24))
}

/// Redeems rewards at the point of sale.
#[derive(Clone)]
pub struct RedemptionService {
    store: Arc<dyn RecordStore>,
    expiration_days: i32,
}

impl RedemptionService {
    /// Create a new service whose rewards stay redeemable for
    /// `expiration_days`.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, expiration_days: i32) -> Self {
        Self {
            store,
            expiration_days,
        }
    }

    /// When a reward granted at `issued_at` stops being redeemable under the
    /// configured window.
    ///
    /// # Errors
    ///
    /// Returns an error when the result leaves the timestamp range.
    pub fn expires_at(&self, issued_at: Timestamp) -> Result<Timestamp, jiff::Error> {
        reward_expires_at(issued_at, self.expiration_days)
    }

    /// Redeem `code` for `tenant`.
    ///
    /// # Errors
    ///
    /// Malformed codes are refused without a store call; refusals from the
    /// store procedure are classified into [`RedemptionError`] variants.
    #[tracing::instrument(
        name = "rewards.redeem",
        skip(self, code),
        fields(tenant_id = %tenant),
        err
    )]
    pub async fn redeem(
        &self,
        tenant: TenantUuid,
        code: &str,
    ) -> Result<RedeemedReward, RedemptionError> {
        let code = normalize_reward_code(code).ok_or(RedemptionError::InvalidCode)?;

        let outcome = self
            .store
            .redeem_reward_atomic(&code, tenant)
            .await
            .inspect_err(|source| error!(error = %source, "redemption procedure failed"))?;

        match outcome {
            RedemptionOutcome::Redeemed(reward) => {
                info!("reward redeemed");

                Ok(reward)
            }
            RedemptionOutcome::Rejected(reason) => {
                warn!(reason = %reason, "reward redemption refused");

                Err(RedemptionError::from_rejection(reason))
            }
        }
    }
}
