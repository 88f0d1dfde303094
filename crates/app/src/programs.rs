//! Program configuration.

use std::{collections::BTreeMap, sync::Arc};

use lealtad::{
    billing::is_program_allowed_for_plan,
    motors::{MotorFields, merge, resolve_all},
    programs::ProgramType,
};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    gate::{Denial, TenantAccess},
    store::{RecordStore, StoreError},
};

/// Program configuration failures.
#[derive(Debug, Error)]
pub enum ProgramError {
    /// An update names a tag that is not a program type.
    #[error("unknown program type")]
    UnknownType,

    /// An update names a type outside the tenant's plan or selection.
    #[error("program type not available on your plan")]
    NotAllowed,

    /// The tenant has no active program.
    #[error("program not found")]
    NotFound,

    /// The store failed.
    #[error("storage error")]
    Store(#[source] StoreError),
}

impl From<StoreError> for ProgramError {
    fn from(error: StoreError) -> Self {
        Self::Store(error)
    }
}

impl From<ProgramError> for Denial {
    fn from(error: ProgramError) -> Self {
        match error {
            ProgramError::UnknownType => Self::bad_request("unknown program type"),
            ProgramError::NotAllowed => Self::forbidden("not available on your plan"),
            ProgramError::NotFound => Self::not_found(),
            ProgramError::Store(_) => Self::internal(),
        }
    }
}

/// Reads and writes per-type motor configuration.
#[derive(Clone)]
pub struct ProgramService {
    store: Arc<dyn RecordStore>,
}

impl ProgramService {
    /// Create a new service.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Effective configuration of every configured type.
    ///
    /// # Errors
    ///
    /// Returns [`ProgramError::NotFound`] without an active program.
    pub async fn motor_configs(
        &self,
        access: &TenantAccess,
    ) -> Result<BTreeMap<ProgramType, MotorFields>, ProgramError> {
        let program = self
            .store
            .find_program(access.tenant.id)
            .await?
            .ok_or(ProgramError::NotFound)?;

        Ok(resolve_all(&program.config))
    }

    /// Save per-type configuration objects keyed by type tag.
    ///
    /// Every tag must be allowed for the tenant's plan and selection, or
    /// nothing is written. Types not named keep their effective
    /// configuration, legacy flat fields included.
    ///
    /// # Errors
    ///
    /// Returns [`ProgramError::UnknownType`] or [`ProgramError::NotAllowed`]
    /// before touching the store.
    #[tracing::instrument(
        name = "programs.save_motor_configs",
        skip(self, access, updates),
        fields(tenant_id = %access.tenant.id, types = updates.len()),
        err
    )]
    pub async fn save_motor_configs(
        &self,
        access: &TenantAccess,
        updates: BTreeMap<String, MotorFields>,
    ) -> Result<Value, ProgramError> {
        let plan = access.tenant.effective_plan();
        let selected = access.tenant.program_types();

        let mut typed = BTreeMap::new();

        for (tag, fields) in updates {
            let ty = ProgramType::parse(&tag).ok_or(ProgramError::UnknownType)?;

            if !is_program_allowed_for_plan(&tag, Some(selected.as_slice()), plan) {
                warn!(program_type = ty.as_str(), plan = plan.as_str(), "program type not allowed");

                return Err(ProgramError::NotAllowed);
            }

            typed.insert(ty, fields);
        }

        let program = self
            .store
            .find_program(access.tenant.id)
            .await?
            .ok_or(ProgramError::NotFound)?;

        let mut combined = resolve_all(&program.config);

        combined.extend(typed);

        let config = merge(&program.config, &combined);

        self.store.update_program_config(program.id, &config).await?;

        info!(program_id = %program.id, "motor configuration saved");

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use crate::{
        store::{MockRecordStore, ProgramRecord, ProgramUuid},
        test_helpers::{identity, tenant},
    };

    use super::*;

    fn access() -> TenantAccess {
        TenantAccess {
            identity: identity("owner@example.com"),
            tenant: tenant("cafe-luna"),
        }
    }

    fn fields(value: Value) -> MotorFields {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn unselected_type_is_forbidden_without_store_calls() -> TestResult {
        let mut store = MockRecordStore::new();

        store.expect_find_program().never();
        store.expect_update_program_config().never();

        let updates =
            BTreeMap::from([("cupon".to_string(), fields(json!({ "vigencia_dias": 7 })))]);

        let error = ProgramService::new(Arc::new(store))
            .save_motor_configs(&access(), updates)
            .await
            .err()
            .ok_or("expected refusal")?;

        assert!(matches!(error, ProgramError::NotAllowed));
        assert_eq!(Denial::from(error).status, 403);

        Ok(())
    }

    #[tokio::test]
    async fn unknown_type_is_bad_request() -> TestResult {
        let updates = BTreeMap::from([("lottery".to_string(), MotorFields::new())]);

        let error = ProgramService::new(Arc::new(MockRecordStore::new()))
            .save_motor_configs(&access(), updates)
            .await
            .err()
            .ok_or("expected refusal")?;

        assert_eq!(Denial::from(error).status, 400);

        Ok(())
    }

    #[tokio::test]
    async fn update_merges_into_stored_config() -> TestResult {
        let access = access();
        let tenant_id = access.tenant.id;
        let program_id = ProgramUuid::new();

        let mut store = MockRecordStore::new();

        store
            .expect_find_program()
            .once()
            .withf(move |tenant| *tenant == tenant_id)
            .return_once(move |_| {
                Ok(Some(ProgramRecord {
                    id: program_id,
                    tenant_id,
                    tipo_programa: "sellos".to_string(),
                    config: json!({
                        "nombre": "Club Luna",
                        "porcentaje": 5,
                        "motors": { "sellos": { "sellos_requeridos": 10 } }
                    }),
                    activo: true,
                }))
            });

        store
            .expect_update_program_config()
            .once()
            .withf(move |program, config| {
                *program == program_id
                    && config["nombre"] == json!("Club Luna")
                    && config["motors"]["sellos"] == json!({ "sellos_requeridos": 10 })
                    && config["motors"]["cashback"] == json!({ "porcentaje": 8 })
            })
            .return_once(|_, _| Ok(()));

        let updates =
            BTreeMap::from([("cashback".to_string(), fields(json!({ "porcentaje": 8 })))]);

        let config = ProgramService::new(Arc::new(store))
            .save_motor_configs(&access, updates)
            .await?;

        assert_eq!(config["porcentaje"], json!(5));

        Ok(())
    }
}
