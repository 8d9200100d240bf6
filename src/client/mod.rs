//! Clients for the MiOS / Ezlo cloud endpoints
//!
//! The handshake talks to three services. [`CloudApi`] is the seam between
//! the login flow and the HTTP implementation in [`http_client`].

pub mod http_client;
pub mod models;

use crate::config::{credentials::EzloCredentials, CloudConfig};
use crate::error::Result;
use async_trait::async_trait;

pub use http_client::EzloCloudClient;
pub use models::{AccessKeys, BearerToken, IdentityAssertion, KeyRecord};

/// The three remote calls of the cloud login handshake
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CloudApi: Send + Sync {
    /// Log on with the salted password hash and obtain a signed identity
    async fn authenticate(&self, credentials: &EzloCredentials) -> Result<IdentityAssertion>;

    /// Trade the legacy identity for a cloud bearer token
    async fn exchange_token(&self, identity: &IdentityAssertion) -> Result<BearerToken>;

    /// Fetch the controller access key records
    async fn sync_access_keys(&self, token: &BearerToken) -> Result<AccessKeys>;
}

/// Create the HTTP cloud client for a configuration
pub fn create_client(config: &CloudConfig) -> Result<EzloCloudClient> {
    config.validate()?;
    EzloCloudClient::new(config.clone())
}
