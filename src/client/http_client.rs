//! HTTP client for the MiOS auth server and the Ezlo cloud API
//!
//! Each call is made once. Transport failures, non-200 answers and bodies
//! without the expected fields map to distinct [`EzloError`] variants.

use crate::client::models::{
    AccessKeys, AuthResponse, BearerToken, IdentityAssertion, KeySyncRequest, KeySyncResponse,
    TokenResponse,
};
use crate::client::CloudApi;
use crate::config::{credentials::EzloCredentials, CloudConfig};
use crate::error::{EzloError, LoginStep, Result};
use crate::logging::sanitize_json;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, ClientBuilder, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

const JSON_CONTENT_TYPE: &str = "application/json;charset=UTF-8";

/// HTTP implementation of [`CloudApi`]
pub struct EzloCloudClient {
    /// HTTP client instance
    client: Client,

    /// Endpoints and request settings
    config: CloudConfig,
}

impl EzloCloudClient {
    /// Create a new cloud client
    pub fn new(config: CloudConfig) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));

        let mut client_builder = ClientBuilder::new()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(format!("ezlo-curl-config/{}", env!("CARGO_PKG_VERSION")))
            .default_headers(default_headers);

        if !config.verify_ssl {
            warn!("TLS certificate verification disabled for cloud endpoints - enable it with --verify-tls");
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder
            .build()
            .map_err(|e| EzloError::connection(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Configuration in use
    pub fn config(&self) -> &CloudConfig {
        &self.config
    }

    /// Build the auth URL for a user: `{auth_url}{user}?SHA1Password=..&PK_Oem=..&TokenVersion=..`
    pub fn auth_url(&self, credentials: &EzloCredentials) -> Result<Url> {
        let mut url = self
            .config
            .auth_url
            .join(&urlencoding::encode(&credentials.user_id))
            .map_err(|e| EzloError::invalid_input(format!("Invalid user id for auth URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("SHA1Password", &credentials.password_hash()?)
            .append_pair("PK_Oem", &self.config.oem_id.to_string())
            .append_pair("TokenVersion", &self.config.token_version.to_string());
        Ok(url)
    }

    /// Send a request once and decode a 200 JSON body
    async fn execute<T: DeserializeOwned>(
        &self,
        step: LoginStep,
        request: RequestBuilder,
    ) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| EzloError::from_transport(step, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| EzloError::from_transport(step, e))?;

        if status != StatusCode::OK {
            debug!(step = step.as_str(), status = status.as_u16(), "Request rejected");
            return Err(EzloError::status(step, status.as_u16(), &text));
        }

        log_response_body(step, &text);

        serde_json::from_str(&text).map_err(|e| {
            EzloError::parsing(format!("{step} returned a body that is not the expected JSON: {e}"))
        })
    }
}

#[async_trait]
impl CloudApi for EzloCloudClient {
    async fn authenticate(&self, credentials: &EzloCredentials) -> Result<IdentityAssertion> {
        let url = self.auth_url(credentials)?;
        info!("Logging on to portal as {}", credentials.user_id);
        debug!(step = "authenticate", host = url.host_str().unwrap_or_default(), "GET");

        let response: AuthResponse = self
            .execute(LoginStep::Authenticate, self.client.get(url))
            .await?;
        response.into_assertion()
    }

    async fn exchange_token(&self, identity: &IdentityAssertion) -> Result<BearerToken> {
        info!("Exchanging portal identity for cloud token");
        let request = self
            .client
            .get(self.config.token_exchange_url.clone())
            .header("MMSAuth", &identity.identity)
            .header("MMSAuthSig", &identity.signature);

        let response: TokenResponse = self.execute(LoginStep::TokenExchange, request).await?;
        response.into_token()
    }

    async fn sync_access_keys(&self, token: &BearerToken) -> Result<AccessKeys> {
        let body = KeySyncRequest::controller_keys(self.config.key_sync_version);
        info!("Requesting controller access keys");
        debug!(request_id = %body.params.uuid, "access_keys_sync");

        let request = self
            .client
            .post(self.config.key_sync_url.clone())
            .bearer_auth(token.as_str())
            .json(&body);

        let response: KeySyncResponse = self.execute(LoginStep::KeySync, request).await?;
        let keys = response.into_keys()?;
        debug!("Received {} key records", keys.len());
        Ok(keys)
    }
}

fn log_response_body(step: LoginStep, text: &str) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => debug!(step = step.as_str(), body = %sanitize_json(&value), "Response"),
        Err(_) => debug!(step = step.as_str(), bytes = text.len(), "Non-JSON response"),
    }
}
