//! HTTP identity provider client.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::{
    identity::{Identity, IdentityError, IdentityProvider, IdentitySession},
    store::RestStoreConfig,
};

/// Identity provider reached through the same managed service as the store.
#[derive(Debug, Clone)]
pub struct RestIdentityProvider {
    config: RestStoreConfig,
    http: Client,
}

impl RestIdentityProvider {
    /// Create a new client from the store configuration.
    #[must_use]
    pub fn new(config: RestStoreConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.config.url.trim_end_matches('/'))
    }

    /// Send `request`; 400/401/403/404 mean "no session", not a failure.
    async fn optional<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Option<T>, IdentityError> {
        let response = request.header("apikey", &self.config.service_key).send().await?;

        match response.status() {
            status if status.is_success() => Ok(Some(response.json().await?)),
            StatusCode::BAD_REQUEST
            | StatusCode::UNAUTHORIZED
            | StatusCode::FORBIDDEN
            | StatusCode::NOT_FOUND => Ok(None),
            status => Err(IdentityError::Status(status.as_u16())),
        }
    }
}

#[async_trait]
impl IdentityProvider for RestIdentityProvider {
    #[tracing::instrument(name = "identity.current_identity", skip_all, err)]
    async fn current_identity(&self, session: &str) -> Result<Option<Identity>, IdentityError> {
        if session.trim().is_empty() {
            return Ok(None);
        }

        self.optional(self.http.get(self.endpoint("user")).bearer_auth(session))
            .await
    }

    #[tracing::instrument(name = "identity.sign_in_with_password", skip_all, err)]
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<IdentitySession>, IdentityError> {
        self.optional(
            self.http
                .post(self.endpoint("token"))
                .query(&[("grant_type", "password")])
                .json(&json!({ "email": email, "password": password })),
        )
        .await
    }

    #[tracing::instrument(name = "identity.exchange_code", skip_all, err)]
    async fn exchange_code(
        &self,
        code: &str,
        verifier: &str,
    ) -> Result<Option<IdentitySession>, IdentityError> {
        self.optional(
            self.http
                .post(self.endpoint("token"))
                .query(&[("grant_type", "pkce")])
                .json(&json!({ "auth_code": code, "code_verifier": verifier })),
        )
        .await
    }
}
