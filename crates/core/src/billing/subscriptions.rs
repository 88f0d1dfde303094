//! Payment-provider subscription requests.
//!
//! Requests are signed over their parameters sorted by key, so the provider
//! can verify them regardless of the order they arrive in.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::tokens::SigningKey;

/// Parameter name carrying the signature.
pub const SIGNATURE_PARAM: &str = "s";

/// Parameters plus their signature, in signing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedParams {
    params: Vec<(String, String)>,
}

impl SignedParams {
    /// Key/value pairs, signature last.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.params
    }

    /// The hex signature.
    pub fn signature(&self) -> Option<&str> {
        self.params
            .iter()
            .rev()
            .find(|(key, _)| key == SIGNATURE_PARAM)
            .map(|(_, value)| value.as_str())
    }

    /// Consume into owned pairs for a form or query encoder.
    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.params
    }
}

/// The exact string the provider signs: `k1=v1&k2=v2&…`, keys sorted.
///
/// Any existing signature parameter is excluded.
pub fn signing_input<K, V>(params: impl IntoIterator<Item = (K, V)>) -> String
where
    K: Into<String>,
    V: Into<String>,
{
    query(&sorted(params))
}

/// Sign `params` with HMAC-SHA256 and append the hex signature as `s`.
pub fn sign_subscription_params<K, V>(
    params: impl IntoIterator<Item = (K, V)>,
    key: &SigningKey,
) -> SignedParams
where
    K: Into<String>,
    V: Into<String>,
{
    let sorted = sorted(params);
    let input = query(&sorted);

    let mut params = sorted.into_iter().collect::<Vec<_>>();

    params.push((SIGNATURE_PARAM.to_string(), key.sign_hex(input.as_bytes())));

    SignedParams { params }
}

fn sorted<K, V>(params: impl IntoIterator<Item = (K, V)>) -> BTreeMap<String, String>
where
    K: Into<String>,
    V: Into<String>,
{
    params
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .filter(|(key, _)| key != SIGNATURE_PARAM)
        .collect()
}

fn query(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Subscription state reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionStatus {
    /// Paid and current.
    Active,

    /// Created but not yet paid, or lapsed.
    Inactive,

    /// Cancelled by the tenant or the provider.
    Cancelled,

    /// The provider answered with an error code.
    ProviderError {
        /// Provider error code.
        code: i64,

        /// Provider message, for logs only.
        message: Option<String>,
    },

    /// A status this engine does not interpret.
    Unknown,
}

impl SubscriptionStatus {
    /// Interpret a provider response body.
    ///
    /// A `code` field means the call failed. Otherwise `status` 1 is active,
    /// 0 inactive and 4 cancelled; numbers may arrive as strings.
    pub fn from_response(body: &Value) -> Self {
        if let Some(code) = body.get("code").and_then(integer) {
            return Self::ProviderError {
                code,
                message: body
                    .get("message")
                    .and_then(Value::as_str)
                    .map(ToString::to_string),
            };
        }

        match body.get("status").and_then(integer) {
            Some(1) => Self::Active,
            Some(0) => Self::Inactive,
            Some(4) => Self::Cancelled,
            _ => Self::Unknown,
        }
    }

    /// Whether the subscription entitles the tenant to its plan.
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
