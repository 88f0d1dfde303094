//! Lealtad prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    billing::{
        BillingPlan, Capability, Capacity, EntitlementError, PlanCode, StoredPlan,
        SubscriptionStatus, get_effective_plan, is_program_allowed_for_plan,
        normalize_program_choices, sign_subscription_params,
    },
    gamification::{CustomerLoyalty, StreakOutcome, Tier, calculate_tier, process_streak},
    motors::{MotorConfig, MotorFields, legacy_to_variant, merge, resolve, resolve_all},
    pins::{PinError, hash_pin, is_valid_pin, verify_pin},
    programs::{ProgramType, ProgramTypeSet, is_program_type},
    rate_limit::{
        Counter, InMemoryCounter, RateLimit, RateLimitDecision, RateLimiter, rate_limit_key,
    },
    tokens::{
        AdminAllowlist, AdminSession, AdminTokenAuthority, AdminTokenError, SessionCookie,
        SigningKey, SigningKeyError, SsoGrant, SsoSecret, constant_time_eq, generate_sso_token,
    },
};
