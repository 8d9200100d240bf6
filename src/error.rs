//! Error types for the Ezlo cloud login handshake
//!
//! Every failure is terminal for a run. The variants keep transport problems
//! apart from HTTP-level rejections and from payloads that do not carry what
//! the handshake needs.

use std::fmt;
use thiserror::Error;

/// Result type alias for Ezlo operations
pub type Result<T> = std::result::Result<T, EzloError>;

/// The three remote calls of the handshake, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoginStep {
    /// Password-hash authentication against the MiOS auth server
    Authenticate,
    /// Legacy identity to cloud bearer token exchange
    TokenExchange,
    /// Controller access key synchronization
    KeySync,
}

impl LoginStep {
    /// Short lowercase name used in log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginStep::Authenticate => "authenticate",
            LoginStep::TokenExchange => "token_exchange",
            LoginStep::KeySync => "key_sync",
        }
    }
}

impl fmt::Display for LoginStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoginStep::Authenticate => "portal logon",
            LoginStep::TokenExchange => "token exchange",
            LoginStep::KeySync => "access key sync",
        };
        f.write_str(name)
    }
}

/// Error types for the login handshake
#[derive(Error, Debug)]
pub enum EzloError {
    /// Transport-level failure reported by the HTTP client
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Connection could not be established
    #[error("Connection error: {0}")]
    Connection(String),

    /// Request exceeded the configured timeout
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Remote endpoint answered with something other than 200
    #[error("{step} failed with HTTP {status}: {body}")]
    Status {
        step: LoginStep,
        status: u16,
        body: String,
    },

    /// Response body parsed but lacks a field the handshake relies on
    #[error("{step} response is missing `{field}`")]
    MissingField { step: LoginStep, field: &'static str },

    /// Response body could not be interpreted
    #[error("Parsing error: {0}")]
    Parsing(String),

    /// No key record names the requested hub serial
    #[error("Controller serial not found: {0}")]
    SerialNotFound(String),

    /// The serial matched more than one distinct controller
    #[error("Controller serial {serial} matches several controllers: {uuids:?}")]
    DuplicateSerial { serial: String, uuids: Vec<String> },

    /// The controller was found but no record carries its secret
    #[error("No access key found for controller {0}")]
    CredentialNotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Hashing failures
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Invalid input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EzloError {
    /// Create a connection error
    pub fn connection<S: Into<String>>(msg: S) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a timeout error
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a parsing error
    pub fn parsing<S: Into<String>>(msg: S) -> Self {
        Self::Parsing(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a crypto error
    pub fn crypto<S: Into<String>>(msg: S) -> Self {
        Self::Crypto(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a missing field error
    pub fn missing_field(step: LoginStep, field: &'static str) -> Self {
        Self::MissingField { step, field }
    }

    /// Create a status error, keeping at most a short excerpt of the body
    pub fn status<S: AsRef<str>>(step: LoginStep, status: u16, body: S) -> Self {
        const MAX_BODY: usize = 200;
        let body = body.as_ref().trim();
        let body = match body.char_indices().nth(MAX_BODY) {
            Some((idx, _)) => format!("{}...", &body[..idx]),
            None => body.to_string(),
        };
        Self::Status { step, status, body }
    }

    /// Map a `reqwest` error into the transport variants
    pub fn from_transport(step: LoginStep, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(format!("{step}: {err}"))
        } else if err.is_connect() {
            Self::connection(format!("{step}: {err}"))
        } else {
            Self::Http(err)
        }
    }

    /// The handshake step this error belongs to, if any
    pub fn step(&self) -> Option<LoginStep> {
        match self {
            EzloError::Status { step, .. } | EzloError::MissingField { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// Check if the error happened below HTTP (network, TLS, timeout)
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            EzloError::Http(_) | EzloError::Connection(_) | EzloError::Timeout(_)
        )
    }

    /// Check if the remote side rejected the credentials
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            EzloError::Status {
                status: 401 | 403,
                ..
            } | EzloError::Status {
                step: LoginStep::Authenticate,
                status: 400..=499,
                ..
            }
        )
    }
}
