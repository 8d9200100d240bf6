//! Ezlo account credentials

use crate::crypto::{sha1_password_hash, MMS_SALT};
use crate::error::{EzloError, Result};
use std::fmt;

/// User id and password of an Ezlo / MiOS account
#[derive(Clone, PartialEq, Eq)]
pub struct EzloCredentials {
    /// Account user id, sent as-is in the auth URL
    pub user_id: String,

    /// Account password, only ever sent hashed
    pub password: String,
}

impl EzloCredentials {
    /// Create credentials, rejecting empty values
    pub fn new<U: Into<String>, P: Into<String>>(user_id: U, password: P) -> Result<Self> {
        let user_id = user_id.into();
        let password = password.into();
        if user_id.trim().is_empty() {
            return Err(EzloError::invalid_input("user id must not be empty"));
        }
        if password.is_empty() {
            return Err(EzloError::invalid_input("password must not be empty"));
        }
        Ok(Self { user_id, password })
    }

    /// Salted SHA-1 expected by the auth server
    pub fn password_hash(&self) -> Result<String> {
        sha1_password_hash(&self.user_id, &self.password, MMS_SALT)
    }
}

impl fmt::Debug for EzloCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EzloCredentials")
            .field("user_id", &self.user_id)
            .field("password", &"***")
            .finish()
    }
}
