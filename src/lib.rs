//! Ezlo hub cloud login in Rust
//!
//! This crate performs the MiOS / Ezlo cloud login handshake for a hub and
//! turns the resulting controller key into a curl config, so the hub's
//! local HTTPS API can be scripted with `curl -K`.
//!
//! # Flow
//!
//! 1. Log on with a salted SHA-1 of the account password
//! 2. Exchange the returned identity for a cloud bearer token
//! 3. Sync the controller access keys
//! 4. Pick the key of the hub with the requested serial
//! 5. Render `-H "Authorization: Basic ..."`, `--insecure`, `--http1.1`

pub mod client;
pub mod config;
pub mod crypto;
pub mod curl_config;
pub mod error;
pub mod logging;
pub mod login;
pub mod resolver;

// Re-export main types for convenience
pub use client::{create_client, CloudApi, EzloCloudClient};
pub use config::{credentials::EzloCredentials, CloudConfig};
pub use curl_config::CurlConfig;
pub use error::{EzloError, LoginStep, Result};
pub use login::login;
pub use resolver::{resolve_credential, ResolvedCredential};
