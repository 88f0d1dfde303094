//! Authorization Gate
//!
//! Every privileged operation starts here: the gate resolves the caller's
//! identity, loads the tenant it wants to touch and checks ownership, admin
//! membership or plan capability. Failures come back as a [`Denial`] that can
//! be returned to the client as-is.

use std::sync::Arc;

use lealtad::{
    billing::{BillingPlan, Capability},
    tokens::AdminAllowlist,
};
use tracing::{Span, error, warn};

use crate::{
    identity::{Identity, IdentityProvider},
    store::{RecordStore, TenantRecord, TenantUuid},
};

mod denial;

pub use denial::Denial;

/// An identity confirmed as the owner of a tenant.
#[derive(Debug, Clone)]
pub struct TenantAccess {
    /// The signed-in owner.
    pub identity: Identity,

    /// The tenant they own.
    pub tenant: TenantRecord,
}

/// Session, ownership and entitlement checks.
#[derive(Clone)]
pub struct AuthorizationGate {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn RecordStore>,
    admins: AdminAllowlist,
}

impl AuthorizationGate {
    /// Create a new gate.
    #[must_use]
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn RecordStore>,
        admins: AdminAllowlist,
    ) -> Self {
        Self {
            identity,
            store,
            admins,
        }
    }

    /// Resolve the caller behind `session`.
    ///
    /// # Errors
    ///
    /// 401 without a valid session, 500 when the provider fails.
    #[tracing::instrument(
        name = "gate.require_user",
        skip_all,
        fields(identity_id = tracing::field::Empty)
    )]
    pub async fn require_user(&self, session: &str) -> Result<Identity, Denial> {
        let identity = self
            .identity
            .current_identity(session)
            .await
            .map_err(|source| {
                error!(error = %source, "identity lookup failed");
                Denial::internal()
            })?
            .ok_or(Denial::unauthorized())?;

        Span::current().record("identity_id", identity.id.as_str());

        Ok(identity)
    }

    /// Resolve the caller and confirm they own tenant `id`.
    ///
    /// # Errors
    ///
    /// 401 without a session, 404 for an unknown tenant, 403 for another
    /// owner's tenant and 500 when a collaborator fails.
    pub async fn require_tenant_owner_by_id(
        &self,
        session: &str,
        id: TenantUuid,
    ) -> Result<TenantAccess, Denial> {
        let identity = self.require_user(session).await?;

        let tenant = self.store.find_tenant_by_id(id).await.map_err(|source| {
            error!(error = %source, tenant_id = %id, "tenant lookup failed");
            Denial::internal()
        })?;

        owned(identity, tenant)
    }

    /// Resolve the caller and confirm they own the tenant at `slug`.
    ///
    /// # Errors
    ///
    /// Same as [`AuthorizationGate::require_tenant_owner_by_id`].
    pub async fn require_tenant_owner_by_slug(
        &self,
        session: &str,
        slug: &str,
    ) -> Result<TenantAccess, Denial> {
        let identity = self.require_user(session).await?;

        let tenant = self.store.find_tenant_by_slug(slug).await.map_err(|source| {
            error!(error = %source, slug, "tenant lookup failed");
            Denial::internal()
        })?;

        owned(identity, tenant)
    }

    /// Resolve the caller and confirm they are a platform admin.
    ///
    /// # Errors
    ///
    /// 401 without a session, 403 for anyone outside the admin allowlist.
    pub async fn require_super_admin(&self, session: &str) -> Result<Identity, Denial> {
        let identity = self.require_user(session).await?;

        let permitted = identity
            .email
            .as_deref()
            .is_some_and(|email| self.admins.permits(email));

        if !permitted {
            warn!(identity_id = %identity.id, "admin access refused");
            return Err(Denial::forbidden("forbidden"));
        }

        Ok(identity)
    }

    /// Confirm the tenant's plan includes `capability`.
    ///
    /// # Errors
    ///
    /// 403 with "not available on your plan".
    pub fn require_plan_capability(
        &self,
        tenant: &TenantRecord,
        capability: Capability,
    ) -> Result<(), Denial> {
        require_capability(tenant, capability)
    }
}

/// Plan capability check shared by the gate and the services.
pub(crate) fn require_capability(
    tenant: &TenantRecord,
    capability: Capability,
) -> Result<(), Denial> {
    BillingPlan::for_code(tenant.effective_plan())
        .require(capability)
        .map_err(|_not_included| Denial::forbidden("not available on your plan"))
}

fn owned(identity: Identity, tenant: Option<TenantRecord>) -> Result<TenantAccess, Denial> {
    let tenant = tenant.ok_or(Denial::not_found())?;

    if !tenant.is_owned_by(&identity.id) {
        warn!(identity_id = %identity.id, tenant_id = %tenant.id, "tenant owner mismatch");
        return Err(Denial::forbidden("forbidden"));
    }

    Ok(TenantAccess { identity, tenant })
}
