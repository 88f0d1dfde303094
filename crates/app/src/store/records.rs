//! Store Records

use jiff::Timestamp;
use lealtad::{
    billing::{PlanCode, get_effective_plan, is_trial_active, normalize_program_choices},
    programs::ProgramTypeSet,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::uuids::TypedUuid;

/// Tenant UUID
pub type TenantUuid = TypedUuid<TenantRecord>;

/// Program UUID
pub type ProgramUuid = TypedUuid<ProgramRecord>;

/// Tenant lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    /// Operating normally.
    #[default]
    Activo,

    /// Paused by the owner.
    Pausado,

    /// Suspended by the platform.
    Suspended,
}

/// Tenant Record
#[derive(Debug, Clone, Deserialize)]
pub struct TenantRecord {
    /// Unique tenant identifier.
    pub id: TenantUuid,

    /// Public slug used in customer-facing URLs.
    pub slug: String,

    /// Currently entitled plan, as stored.
    #[serde(default)]
    pub plan: Option<String>,

    /// Plan chosen but possibly not yet paid.
    #[serde(default)]
    pub selected_plan: Option<String>,

    /// Program types the owner picked.
    #[serde(default, deserialize_with = "null_as_default")]
    pub selected_program_types: Vec<String>,

    /// Lifecycle state.
    #[serde(default, deserialize_with = "null_as_default")]
    pub estado: TenantStatus,

    /// Identity that owns the tenant.
    #[serde(default)]
    pub auth_user_id: Option<String>,

    /// End of the free trial.
    #[serde(default)]
    pub trial_hasta: Option<Timestamp>,

    /// Staff PIN hash.
    #[serde(default)]
    pub pin_hash: Option<String>,

    /// Plaintext staff PIN from before hashing was introduced.
    #[serde(default)]
    pub pin: Option<String>,
}

impl TenantRecord {
    /// Paid plan the tenant is entitled to.
    pub fn effective_plan(&self) -> PlanCode {
        get_effective_plan(self.plan.as_deref(), self.selected_plan.as_deref())
    }

    /// Selected program types, normalized against the effective plan.
    pub fn program_types(&self) -> ProgramTypeSet {
        normalize_program_choices(self.selected_program_types.as_slice(), self.effective_plan())
    }

    /// Whether the free trial is still running at `now`.
    pub fn is_trial_active(&self, now: Timestamp) -> bool {
        is_trial_active(self.trial_hasta, now)
    }

    /// Whether `identity_id` owns this tenant.
    pub fn is_owned_by(&self, identity_id: &str) -> bool {
        self.auth_user_id
            .as_deref()
            .is_some_and(|owner| !owner.is_empty() && owner == identity_id)
    }
}

/// Program Record
#[derive(Debug, Clone, Deserialize)]
pub struct ProgramRecord {
    /// Unique program identifier.
    pub id: ProgramUuid,

    /// Owning tenant.
    pub tenant_id: TenantUuid,

    /// Program type tag, as stored.
    pub tipo_programa: String,

    /// Raw configuration blob.
    #[serde(default)]
    pub config: Value,

    /// Programs are soft-disabled, never deleted.
    #[serde(default = "active", deserialize_with = "null_as_active")]
    pub activo: bool,
}

const fn active() -> bool {
    true
}

/// Columns the store may return as `null` read as their default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_active<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_else(active))
}

/// SSO Token Record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SsoTokenRecord {
    /// Tenant the token grants access to.
    pub tenant_id: TenantUuid,

    /// Hex exchange token.
    pub token: String,

    /// Instant the consumer must stop accepting the token.
    pub expires_at: Timestamp,
}

/// A reward the store marked redeemed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RedeemedReward {
    /// Confirmation message for the cashier.
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,

    /// Reward details, passed through untouched.
    #[serde(default)]
    pub premio: Value,

    /// Customer details, passed through untouched.
    #[serde(default)]
    pub cliente: Value,
}

/// Result of the atomic redemption procedure.
#[derive(Debug, Clone, PartialEq)]
pub enum RedemptionOutcome {
    /// The reward was valid and is now redeemed.
    Redeemed(RedeemedReward),

    /// The procedure refused; carries its error string.
    Rejected(String),
}

impl RedemptionOutcome {
    /// Interpret the procedure's `{error}` or `{message, premio, cliente}` body.
    pub fn from_response(body: Value) -> Result<Self, serde_json::Error> {
        if let Some(error) = body.get("error").filter(|error| !error.is_null()) {
            let error = error
                .as_str()
                .map_or_else(|| error.to_string(), ToString::to_string);

            return Ok(Self::Rejected(error));
        }

        serde_json::from_value(body).map(Self::Redeemed)
    }
}
