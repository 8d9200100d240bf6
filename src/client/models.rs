//! Wire types of the MiOS / Ezlo cloud endpoints
//!
//! Field names follow the vendor JSON exactly. Response types keep every
//! field optional so that a missing value surfaces as a step-scoped
//! [`EzloError::MissingField`] instead of a generic parse failure.

use crate::error::{EzloError, LoginStep, Result};
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Signed identity returned by the auth server
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityAssertion {
    /// Base64 identity document, sent back as `MMSAuth`
    #[serde(rename = "Identity")]
    pub identity: String,

    /// Signature over the identity, sent back as `MMSAuthSig`
    #[serde(rename = "IdentitySignature")]
    pub signature: String,
}

impl fmt::Debug for IdentityAssertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityAssertion")
            .field("identity", &format!("<{} bytes>", self.identity.len()))
            .field("signature", &"***")
            .finish()
    }
}

/// Raw auth response body
#[derive(Debug, Default, Deserialize)]
pub struct AuthResponse {
    #[serde(rename = "Identity")]
    pub identity: Option<String>,
    #[serde(rename = "IdentitySignature")]
    pub identity_signature: Option<String>,
}

impl AuthResponse {
    /// Extract the identity pair
    pub fn into_assertion(self) -> Result<IdentityAssertion> {
        let identity = non_empty(self.identity)
            .ok_or_else(|| EzloError::missing_field(LoginStep::Authenticate, "Identity"))?;
        let signature = non_empty(self.identity_signature).ok_or_else(|| {
            EzloError::missing_field(LoginStep::Authenticate, "IdentitySignature")
        })?;
        Ok(IdentityAssertion {
            identity,
            signature,
        })
    }
}

/// Short-lived cloud token authorizing the key sync call
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

/// Raw token exchange response body
#[derive(Debug, Default, Deserialize)]
pub struct TokenResponse {
    pub token: Option<String>,
}

impl TokenResponse {
    pub fn into_token(self) -> Result<BearerToken> {
        non_empty(self.token)
            .map(BearerToken)
            .ok_or_else(|| EzloError::missing_field(LoginStep::TokenExchange, "token"))
    }
}

/// Body of the `access_keys_sync` request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeySyncRequest {
    pub call: &'static str,
    pub version: &'static str,
    pub params: KeySyncParams,
}

/// Params of the `access_keys_sync` request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeySyncParams {
    pub version: u32,
    pub entity: &'static str,
    pub uuid: String,
}

impl KeySyncRequest {
    /// Request all controller keys with a fresh request id
    pub fn controller_keys(protocol_version: u32) -> Self {
        Self {
            call: "access_keys_sync",
            version: "1",
            params: KeySyncParams {
                version: protocol_version,
                entity: "controller",
                uuid: uuid::Uuid::new_v4().to_string(),
            },
        }
    }
}

/// Raw key sync response body
#[derive(Debug, Default, Deserialize)]
pub struct KeySyncResponse {
    pub data: Option<KeySyncData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct KeySyncData {
    pub keys: Option<AccessKeys>,
}

impl KeySyncResponse {
    pub fn into_keys(self) -> Result<AccessKeys> {
        let data = self
            .data
            .ok_or_else(|| EzloError::missing_field(LoginStep::KeySync, "data"))?;
        data.keys
            .ok_or_else(|| EzloError::missing_field(LoginStep::KeySync, "data.keys"))
    }
}

/// Key records in the order the server listed them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccessKeys(Vec<(String, KeyRecord)>);

impl AccessKeys {
    pub fn new(records: Vec<(String, KeyRecord)>) -> Self {
        Self(records)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(record id, record)` pairs in response order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &KeyRecord)> {
        self.0.iter().map(|(id, record)| (id.as_str(), record))
    }
}

impl<'de> Deserialize<'de> for AccessKeys {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct KeysVisitor;

        impl<'de> Visitor<'de> for KeysVisitor {
            type Value = AccessKeys;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of key record id to key record")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut records = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((id, record)) = map.next_entry::<String, KeyRecord>()? {
                    records.push((id, record));
                }
                Ok(AccessKeys(records))
            }

            // Accounts without keys get `[]` instead of `{}`
            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                if seq.next_element::<de::IgnoredAny>()?.is_some() {
                    return Err(de::Error::invalid_type(de::Unexpected::Seq, &self));
                }
                Ok(AccessKeys::default())
            }
        }

        deserializer.deserialize_any(KeysVisitor)
    }
}

/// One access key record
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct KeyRecord {
    #[serde(default)]
    pub meta: Option<KeyMeta>,
    #[serde(default)]
    pub data: Option<KeyData>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct KeyMeta {
    #[serde(default)]
    pub entity: Option<EntityRef>,
    #[serde(default)]
    pub target: Option<TargetRef>,
}

/// Entity owning a key
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EntityRef {
    /// Controller serial for controller entities
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub uuid: Option<String>,
}

/// Entity a key grants access to
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TargetRef {
    #[serde(default)]
    pub uuid: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct KeyData {
    #[serde(default)]
    pub string: Option<String>,
}

impl KeyRecord {
    /// `meta.entity.id`, when present and non-empty
    pub fn entity_id(&self) -> Option<&str> {
        self.entity().and_then(|e| e.id.as_deref()).filter(|s| !s.is_empty())
    }

    /// `meta.entity.uuid`, when present and non-empty
    pub fn entity_uuid(&self) -> Option<&str> {
        self.entity().and_then(|e| e.uuid.as_deref()).filter(|s| !s.is_empty())
    }

    /// `meta.target.uuid`, when present and non-empty
    pub fn target_uuid(&self) -> Option<&str> {
        self.meta
            .as_ref()
            .and_then(|m| m.target.as_ref())
            .and_then(|t| t.uuid.as_deref())
            .filter(|s| !s.is_empty())
    }

    /// `data.string`, when present and non-empty
    pub fn secret(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|d| d.string.as_deref())
            .filter(|s| !s.is_empty())
    }

    fn entity(&self) -> Option<&EntityRef> {
        self.meta.as_ref().and_then(|m| m.entity.as_ref())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}
