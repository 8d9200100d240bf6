//! The cloud login handshake
//!
//! Authentication, token exchange and key sync run strictly one after the
//! other; the first failure ends the run.

use crate::client::CloudApi;
use crate::config::credentials::EzloCredentials;
use crate::error::Result;
use crate::resolver::{resolve_credential, ResolvedCredential};
use tracing::{info, instrument};

/// Log on to the cloud and resolve the local credential of hub `serial`
#[instrument(skip_all, fields(serial = %serial))]
pub async fn login<C>(
    api: &C,
    credentials: &EzloCredentials,
    serial: &str,
) -> Result<ResolvedCredential>
where
    C: CloudApi + ?Sized,
{
    let identity = api.authenticate(credentials).await?;
    let token = api.exchange_token(&identity).await?;
    let keys = api.sync_access_keys(&token).await?;
    info!("Resolving hub credential from {} key records", keys.len());
    resolve_credential(&keys, serial)
}
