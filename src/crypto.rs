//! Hashing and encoding helpers for the Ezlo cloud handshake
//!
//! The MiOS auth server expects a salted SHA-1 of the lowercased user id and
//! the password. The resulting hub credential is handed to curl as a Basic
//! authorization value.

use crate::error::{EzloError, Result};
use base64::{engine::general_purpose, Engine as _};
use openssl::hash::{hash, MessageDigest};

/// Fixed salt used by the MiOS MMS auth server
pub const MMS_SALT: &str = "oZ7QE6LcLJp6fiWzdqZc";

/// Compute the lowercase hex SHA-1 of `lower(user_id) + password + salt`
pub fn sha1_password_hash(user_id: &str, password: &str, salt: &str) -> Result<String> {
    let salted = format!("{}{password}{salt}", user_id.to_lowercase());
    let digest = hash(MessageDigest::sha1(), salted.as_bytes())
        .map_err(|e| EzloError::crypto(format!("Failed to hash password: {e}")))?;
    Ok(hex::encode(digest))
}

/// Base64 of `user:secret`, the value of a Basic authorization header
pub fn basic_authorization(user: &str, secret: &str) -> String {
    general_purpose::STANDARD.encode(format!("{user}:{secret}"))
}
