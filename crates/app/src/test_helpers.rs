//! Shared fixtures for service tests.

use lealtad::pins::hash_pin;

use crate::{
    identity::Identity,
    store::{TenantRecord, TenantStatus, TenantUuid},
};

pub(crate) const OWNER_ID: &str = "owner-1";

pub(crate) const STAFF_PIN: &str = "4821";

pub(crate) fn identity(email: &str) -> Identity {
    Identity {
        id: OWNER_ID.to_string(),
        email: Some(email.to_string()),
    }
}

pub(crate) fn tenant(slug: &str) -> TenantRecord {
    TenantRecord {
        id: TenantUuid::new(),
        slug: slug.to_string(),
        plan: Some("pro".to_string()),
        selected_plan: None,
        selected_program_types: vec!["sellos".to_string(), "cashback".to_string()],
        estado: TenantStatus::Activo,
        auth_user_id: Some(OWNER_ID.to_string()),
        trial_hasta: None,
        pin_hash: None,
        pin: None,
    }
}

pub(crate) fn tenant_with_pin(slug: &str) -> Result<TenantRecord, lealtad::pins::PinError> {
    let mut record = tenant(slug);

    record.pin_hash = Some(hash_pin(STAFF_PIN)?);

    Ok(record)
}
