//! WireMock-based Ezlo cloud mocking infrastructure
//!
//! Provides a mock HTTP server that answers the auth, token exchange and
//! access key sync calls the way the vendor services do.

use ezlo_curl_config::crypto::{sha1_password_hash, MMS_SALT};
use ezlo_curl_config::CloudConfig;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::{
    matchers::{body_partial_json, header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

pub const AUTH_PATH_PREFIX: &str = "/autha/auth/username/";
pub const TOKEN_EXCHANGE_PATH: &str = "/mca-router/token/exchange/legacy-to-cloud/";
pub const KEY_SYNC_PATH: &str = "/v1/request";

pub const TEST_USER: &str = "alice";
pub const TEST_PASSWORD: &str = "hunter2";
pub const TEST_SERIAL: &str = "45006642";
pub const TEST_IDENTITY: &str = "eyJFeHBpcmVzIjoxNjA0ODA2NDM5fQ==";
pub const TEST_SIGNATURE: &str = "FtASRZZZg4w5Hn5HfPenCvnS7m5ibxgv==";
pub const TEST_BEARER: &str = "cloud-bearer-token";
pub const HUB_USER_UUID: &str = "0f6e2a1c-0000-4d5e-8f90-a1b2c3d4e5f6";
pub const HUB_SECRET: &str = "7a1f0c9e5b2d4e6f";

/// Mock of the three cloud endpoints
pub struct MockEzloCloud {
    pub server: MockServer,
}

impl MockEzloCloud {
    /// Start an empty mock server; mount responses per test
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Start a mock server answering the full handshake successfully
    pub async fn start_happy_path() -> Self {
        let cloud = Self::start().await;
        cloud.mock_auth_success().await;
        cloud.mock_token_exchange_success().await;
        cloud.mock_key_sync(canned_key_sync_response()).await;
        cloud
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Client config pointing at this server
    pub fn config(&self) -> CloudConfig {
        let base = self.uri();
        CloudConfig {
            auth_url: format!("{base}{AUTH_PATH_PREFIX}").parse().unwrap(),
            token_exchange_url: format!("{base}{TOKEN_EXCHANGE_PATH}").parse().unwrap(),
            key_sync_url: format!("{base}{KEY_SYNC_PATH}").parse().unwrap(),
            timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            ..CloudConfig::default()
        }
    }

    /// Expected `SHA1Password` for the test account
    pub fn expected_hash() -> String {
        sha1_password_hash(TEST_USER, TEST_PASSWORD, MMS_SALT).unwrap()
    }

    /// Auth endpoint returns the identity pair for the test account
    pub async fn mock_auth_success(&self) {
        Mock::given(method("GET"))
            .and(path(format!("{AUTH_PATH_PREFIX}{TEST_USER}")))
            .and(query_param("SHA1Password", Self::expected_hash()))
            .and(query_param("PK_Oem", "1"))
            .and(query_param("TokenVersion", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Identity": TEST_IDENTITY,
                "IdentitySignature": TEST_SIGNATURE,
                "Server_Event": "vera-us-oem-event11.mios.com",
                "Server_Account": "vera-us-oem-account11.mios.com"
            })))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Auth endpoint answers with `status` and `body`
    pub async fn mock_auth_response(&self, status: u16, body: Value) {
        Mock::given(method("GET"))
            .and(path(format!("{AUTH_PATH_PREFIX}{TEST_USER}")))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Token exchange returns the bearer when given the identity headers
    pub async fn mock_token_exchange_success(&self) {
        Mock::given(method("GET"))
            .and(path(TOKEN_EXCHANGE_PATH))
            .and(header("MMSAuth", TEST_IDENTITY))
            .and(header("MMSAuthSig", TEST_SIGNATURE))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": TEST_BEARER,
                "expires": 1604806439
            })))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Token exchange answers with `status` and `body`
    pub async fn mock_token_exchange_response(&self, status: u16, body: Value) {
        Mock::given(method("GET"))
            .and(path(TOKEN_EXCHANGE_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Token exchange must not be called
    pub async fn forbid_token_exchange(&self) {
        Mock::given(path(TOKEN_EXCHANGE_PATH))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }

    /// Key sync returns `body` for a well-formed controller key request
    pub async fn mock_key_sync(&self, body: Value) {
        Mock::given(method("POST"))
            .and(path(KEY_SYNC_PATH))
            .and(header("Authorization", format!("Bearer {TEST_BEARER}").as_str()))
            .and(body_partial_json(json!({
                "call": "access_keys_sync",
                "version": "1",
                "params": { "version": 53, "entity": "controller" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Key sync answers after `delay`
    pub async fn mock_slow_key_sync(&self, delay: Duration) {
        Mock::given(method("POST"))
            .and(path(KEY_SYNC_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(canned_key_sync_response())
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    /// Key sync must not be called
    pub async fn forbid_key_sync(&self) {
        Mock::given(path(KEY_SYNC_PATH))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }
}

/// Key sync response with two controllers, a user key for each, and a
/// record without any secret
pub fn canned_key_sync_response() -> Value {
    json!({
        "complete": true,
        "data": {
            "keys": {
                "5f3a7c1e000000000000a001": {
                    "meta": {
                        "entity": { "id": "90000001", "uuid": "ctrl-other-uuid" }
                    },
                    "data": { "string": "controller-key-other" }
                },
                "5f3a7c1e000000000000a002": {
                    "meta": {
                        "entity": { "id": TEST_SERIAL, "uuid": "ctrl-hub-uuid" }
                    },
                    "data": { "string": "controller-key-hub" }
                },
                "5f3a7c1e000000000000a003": {
                    "meta": {
                        "entity": { "uuid": "user-other-uuid" },
                        "target": { "uuid": "ctrl-other-uuid" }
                    },
                    "data": { "string": "other-secret" }
                },
                "5f3a7c1e000000000000a004": {
                    "meta": {
                        "entity": { "uuid": "user-no-secret" },
                        "target": { "uuid": "ctrl-hub-uuid" }
                    }
                },
                "5f3a7c1e000000000000a005": {
                    "meta": {
                        "entity": { "uuid": HUB_USER_UUID },
                        "target": { "uuid": "ctrl-hub-uuid" }
                    },
                    "data": { "string": HUB_SECRET }
                }
            }
        },
        "error": null
    })
}

/// The exact curl config expected for the canned response
pub fn expected_curl_config() -> String {
    use base64::{engine::general_purpose, Engine as _};
    let value = general_purpose::STANDARD.encode(format!("{HUB_USER_UUID}:{HUB_SECRET}"));
    format!("-H \"Authorization: Basic {value}\"\n--insecure\n--http1.1\n")
}
