//! Plan catalog and effective-plan resolution.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Paid billing tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanCode {
    /// Single-program small business plan.
    Pyme,

    /// Default plan.
    Pro,

    /// Every program type and every capability.
    Full,
}

impl PlanCode {
    /// Every paid plan, cheapest first.
    pub const ALL: [Self; 3] = [Self::Pyme, Self::Pro, Self::Full];

    /// Stored tag.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pyme => "pyme",
            Self::Pro => "pro",
            Self::Full => "full",
        }
    }

    /// Parse a paid plan tag. `premium` is the retired name of `pro`.
    pub fn parse(tag: &str) -> Option<Self> {
        match StoredPlan::parse(tag)? {
            StoredPlan::Paid(code) => Some(code),
            StoredPlan::Trial => None,
        }
    }

    /// Limits for this plan.
    pub const fn limits(self) -> BillingPlan {
        BillingPlan::for_code(self)
    }
}

impl fmt::Display for PlanCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tag that names no known plan.
#[derive(Debug, Error)]
#[error("unknown plan")]
pub struct UnknownPlan;

impl FromStr for PlanCode {
    type Err = UnknownPlan;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or(UnknownPlan)
    }
}

/// A raw `plan` or `selected_plan` column value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredPlan {
    /// Free trial; entitles nothing on its own.
    Trial,

    /// A paid plan.
    Paid(PlanCode),
}

impl StoredPlan {
    /// Parse `trial|pyme|pro|full|premium`, normalizing `premium` to `pro`.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "trial" => Some(Self::Trial),
            "pyme" => Some(Self::Paid(PlanCode::Pyme)),
            "pro" | "premium" => Some(Self::Paid(PlanCode::Pro)),
            "full" => Some(Self::Paid(PlanCode::Full)),
            _ => None,
        }
    }

    /// The paid plan, if any.
    pub const fn paid(self) -> Option<PlanCode> {
        match self {
            Self::Paid(code) => Some(code),
            Self::Trial => None,
        }
    }
}

/// Plan a tenant is entitled to.
///
/// A paid `plan` wins, then a paid `selected_plan`, then `pro`. The two
/// columns diverge while a plan change awaits payment.
pub fn get_effective_plan(plan: Option<&str>, selected_plan: Option<&str>) -> PlanCode {
    plan.and_then(PlanCode::parse)
        .or_else(|| selected_plan.and_then(PlanCode::parse))
        .unwrap_or(PlanCode::Pro)
}

/// Feature switch granted by a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Customer list CSV export.
    CsvExport,

    /// Advanced analytics dashboards.
    AdvancedAnalytics,
}

impl Capability {
    /// Short label for denials and logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CsvExport => "csv_export",
            Self::AdvancedAnalytics => "advanced_analytics",
        }
    }
}

/// Countable resource capped by a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacity {
    /// Simultaneously selected program types.
    ProgramTypes,

    /// Staff accounts.
    StaffSeats,

    /// Scheduled campaigns.
    ScheduledCampaigns,

    /// Notification recipients per calendar month.
    MonthlyRecipients,
}

impl Capacity {
    /// Short label for denials and logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProgramTypes => "program_types",
            Self::StaffSeats => "staff_seats",
            Self::ScheduledCampaigns => "scheduled_campaigns",
            Self::MonthlyRecipients => "monthly_recipients",
        }
    }
}

/// Entitlement check failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntitlementError {
    /// The plan does not include the capability.
    #[error("not available on your plan")]
    CapabilityNotIncluded {
        /// Plan checked.
        plan: PlanCode,

        /// Capability requested.
        capability: Capability,
    },

    /// The request would exceed the plan's cap.
    #[error("plan limit reached")]
    CapacityExceeded {
        /// Plan checked.
        plan: PlanCode,

        /// Resource requested.
        capacity: Capacity,

        /// Plan cap.
        limit: u32,

        /// Units the caller may still use.
        remaining: u32,
    },
}

/// Limits for one paid plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BillingPlan {
    /// Plan these limits belong to.
    pub code: PlanCode,

    /// Maximum simultaneously selected program types.
    pub max_program_types: u32,

    /// Maximum staff seats.
    pub max_staff_seats: u32,

    /// Maximum scheduled campaigns.
    pub max_scheduled_campaigns: u32,

    /// Maximum notification recipients per month.
    pub max_monthly_recipients: u32,

    /// Customer CSV export.
    pub csv_export: bool,

    /// Advanced analytics.
    pub advanced_analytics: bool,
}

impl BillingPlan {
    /// Catalog entry for `code`.
    ///
    /// | plan | program types | staff | campaigns | recipients/month | CSV | analytics |
    /// |------|---------------|-------|-----------|------------------|-----|-----------|
    /// | pyme | 1 | 2 | 2 | 500 | no | no |
    /// | pro | 3 | 5 | 10 | 5 000 | yes | no |
    /// | full | 8 | 20 | 50 | 50 000 | yes | yes |
    pub const fn for_code(code: PlanCode) -> Self {
        match code {
            PlanCode::Pyme => Self {
                code,
                max_program_types: 1,
                max_staff_seats: 2,
                max_scheduled_campaigns: 2,
                max_monthly_recipients: 500,
                csv_export: false,
                advanced_analytics: false,
            },
            PlanCode::Pro => Self {
                code,
                max_program_types: 3,
                max_staff_seats: 5,
                max_scheduled_campaigns: 10,
                max_monthly_recipients: 5_000,
                csv_export: true,
                advanced_analytics: false,
            },
            PlanCode::Full => Self {
                code,
                max_program_types: 8,
                max_staff_seats: 20,
                max_scheduled_campaigns: 50,
                max_monthly_recipients: 50_000,
                csv_export: true,
                advanced_analytics: true,
            },
        }
    }

    /// The whole catalog, cheapest first.
    pub fn catalog() -> [Self; 3] {
        PlanCode::ALL.map(Self::for_code)
    }

    /// Whether the plan grants `capability`.
    pub const fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::CsvExport => self.csv_export,
            Capability::AdvancedAnalytics => self.advanced_analytics,
        }
    }

    /// Fail unless the plan grants `capability`.
    ///
    /// # Errors
    ///
    /// Returns [`EntitlementError::CapabilityNotIncluded`].
    pub fn require(&self, capability: Capability) -> Result<(), EntitlementError> {
        if self.allows(capability) {
            Ok(())
        } else {
            Err(EntitlementError::CapabilityNotIncluded {
                plan: self.code,
                capability,
            })
        }
    }

    /// Cap for `capacity`.
    pub const fn limit(&self, capacity: Capacity) -> u32 {
        match capacity {
            Capacity::ProgramTypes => self.max_program_types,
            Capacity::StaffSeats => self.max_staff_seats,
            Capacity::ScheduledCampaigns => self.max_scheduled_campaigns,
            Capacity::MonthlyRecipients => self.max_monthly_recipients,
        }
    }

    /// Units of `capacity` left when `in_use` are taken.
    pub const fn remaining(&self, capacity: Capacity, in_use: u32) -> u32 {
        self.limit(capacity).saturating_sub(in_use)
    }

    /// Fail unless `requested` more units fit next to `in_use`.
    ///
    /// # Errors
    ///
    /// Returns [`EntitlementError::CapacityExceeded`] when the total would
    /// exceed the cap.
    pub fn check_capacity(
        &self,
        capacity: Capacity,
        in_use: u32,
        requested: u32,
    ) -> Result<(), EntitlementError> {
        let remaining = self.remaining(capacity, in_use);

        if requested <= remaining {
            return Ok(());
        }

        Err(EntitlementError::CapacityExceeded {
            plan: self.code,
            capacity,
            limit: self.limit(capacity),
            remaining,
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn effective_plan_prefers_paid_plan_column() {
        assert_eq!(get_effective_plan(Some("pro"), Some("full")), PlanCode::Pro);
        assert_eq!(get_effective_plan(None, Some("full")), PlanCode::Full);
        assert_eq!(get_effective_plan(None, None), PlanCode::Pro);
    }

    #[test]
    fn trial_and_unknown_fall_through() {
        assert_eq!(get_effective_plan(Some("trial"), Some("pyme")), PlanCode::Pyme);
        assert_eq!(get_effective_plan(Some("gold"), Some("trial")), PlanCode::Pro);
        assert_eq!(get_effective_plan(Some(""), None), PlanCode::Pro);
    }

    #[test]
    fn premium_is_an_alias_for_pro() {
        assert_eq!(PlanCode::parse("premium"), Some(PlanCode::Pro));
        assert_eq!(get_effective_plan(Some("premium"), Some("full")), PlanCode::Pro);
        assert_eq!(StoredPlan::parse(" Premium "), Some(StoredPlan::Paid(PlanCode::Pro)));
    }

    #[test]
    fn trial_is_not_a_paid_plan() {
        assert_eq!(StoredPlan::parse("trial"), Some(StoredPlan::Trial));
        assert_eq!(StoredPlan::Trial.paid(), None);
        assert!("trial".parse::<PlanCode>().is_err());
    }

    #[test]
    fn catalog_matches_published_limits() {
        let [pyme, pro, full] = BillingPlan::catalog();

        assert_eq!(pyme.limit(Capacity::ProgramTypes), 1);
        assert_eq!(pro.limit(Capacity::StaffSeats), 5);
        assert_eq!(full.limit(Capacity::MonthlyRecipients), 50_000);
        assert!(!pyme.allows(Capability::CsvExport));
        assert!(pro.allows(Capability::CsvExport));
        assert!(!pro.allows(Capability::AdvancedAnalytics));
        assert!(full.allows(Capability::AdvancedAnalytics));
    }

    #[test]
    fn capacity_boundary_is_inclusive() -> TestResult {
        let plan = PlanCode::Pyme.limits();

        plan.check_capacity(Capacity::StaffSeats, 1, 1)?;

        assert_eq!(
            plan.check_capacity(Capacity::StaffSeats, 2, 1),
            Err(EntitlementError::CapacityExceeded {
                plan: PlanCode::Pyme,
                capacity: Capacity::StaffSeats,
                limit: 2,
                remaining: 0,
            })
        );

        Ok(())
    }

    #[test]
    fn over_cap_usage_leaves_nothing_remaining() {
        assert_eq!(PlanCode::Pro.limits().remaining(Capacity::ScheduledCampaigns, 14), 0);
    }

    #[test]
    fn require_reports_missing_capability() {
        assert_eq!(
            PlanCode::Pro.limits().require(Capability::AdvancedAnalytics),
            Err(EntitlementError::CapabilityNotIncluded {
                plan: PlanCode::Pro,
                capability: Capability::AdvancedAnalytics,
            })
        );
    }
}
