//! Store Config

use clap::Args;

use crate::store::RestStoreConfig;

/// Record store settings.
#[derive(Debug, Args)]
pub struct StoreConfig {
    /// Base URL of the managed store
    #[arg(long = "store-url", env = "STORE_URL")]
    pub url: String,

    /// Service-role key for the store
    #[arg(long = "store-service-key", env = "STORE_SERVICE_KEY", hide_env_values = true)]
    pub service_key: String,
}

impl StoreConfig {
    /// Client configuration for [`crate::store::RestRecordStore`].
    #[must_use]
    pub fn rest(&self) -> RestStoreConfig {
        RestStoreConfig {
            url: self.url.clone(),
            service_key: self.service_key.clone(),
        }
    }
}
