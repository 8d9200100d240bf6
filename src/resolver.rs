//! Credential resolution over synced access key records
//!
//! The controller is found by matching `meta.entity.id` against the hub
//! serial. Its key is the first record, in response order, whose
//! `meta.target.uuid` names that controller and which carries a secret.

use crate::client::models::AccessKeys;
use crate::crypto::basic_authorization;
use crate::error::{EzloError, Result};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

/// Hub credential: key owner uuid and secret
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedCredential {
    /// `meta.entity.uuid` of the selected key record
    pub user: String,

    /// `data.string` of the selected key record
    pub token: String,
}

impl ResolvedCredential {
    /// Base64 of `user:token`, ready for a Basic authorization header
    pub fn authorization(&self) -> String {
        basic_authorization(&self.user, &self.token)
    }
}

impl fmt::Debug for ResolvedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedCredential")
            .field("user", &self.user)
            .field("token", &"***")
            .finish()
    }
}

/// Index of key records by controller serial and by target uuid
#[derive(Debug, Default)]
struct KeyIndex<'a> {
    /// entity ids in response order, one per record naming a serial
    serials: Vec<&'a str>,
    /// entity id -> distinct entity uuids, in first-seen order
    ///
    /// A serial whose records carry no uuid maps to an empty list.
    controllers: HashMap<&'a str, Vec<&'a str>>,
    /// target uuid -> first (entity uuid, secret) carrying a secret
    secrets: HashMap<&'a str, (Option<&'a str>, &'a str)>,
}

impl<'a> KeyIndex<'a> {
    fn build(keys: &'a AccessKeys) -> Self {
        let mut index = Self::default();
        for (record_id, record) in keys.iter() {
            if let Some(id) = record.entity_id() {
                index.serials.push(id);
                let uuids = index.controllers.entry(id).or_default();
                match record.entity_uuid() {
                    Some(uuid) if !uuids.contains(&uuid) => uuids.push(uuid),
                    Some(_) => {}
                    None => debug!(record = record_id, "Controller record has no uuid"),
                }
            }
            if let (Some(target), Some(secret)) = (record.target_uuid(), record.secret()) {
                index
                    .secrets
                    .entry(target)
                    .or_insert((record.entity_uuid(), secret));
            } else {
                debug!(record = record_id, "Key record carries no usable secret");
            }
        }
        index
    }
}

/// Select the hub credential for `serial`
///
/// Fails with [`EzloError::SerialNotFound`] when no record names the serial,
/// [`EzloError::DuplicateSerial`] when it names several distinct controllers,
/// [`EzloError::Parsing`] when the matching record has no uuid, and
/// [`EzloError::CredentialNotFound`] when no key targets the controller.
pub fn resolve_credential(keys: &AccessKeys, serial: &str) -> Result<ResolvedCredential> {
    let serial = serial.trim();
    let index = KeyIndex::build(keys);

    for id in index.serials.iter().filter(|id| **id != serial) {
        info!("Non-matching serial found: {id}");
    }

    let controller_uuid = match index.controllers.get(serial).map(Vec::as_slice) {
        None => return Err(EzloError::SerialNotFound(serial.to_string())),
        Some([]) => {
            return Err(EzloError::parsing(format!(
                "controller record for serial {serial} has no meta.entity.uuid"
            )))
        }
        Some([uuid]) => *uuid,
        Some(uuids) => {
            return Err(EzloError::DuplicateSerial {
                serial: serial.to_string(),
                uuids: uuids.iter().map(|u| u.to_string()).collect(),
            })
        }
    };
    debug!("Controller {serial} has uuid {controller_uuid}");

    match index.secrets.get(controller_uuid) {
        Some((Some(user), token)) => Ok(ResolvedCredential {
            user: user.to_string(),
            token: token.to_string(),
        }),
        Some((None, _)) => Err(EzloError::parsing(format!(
            "access key for controller {controller_uuid} has no meta.entity.uuid"
        ))),
        None => Err(EzloError::CredentialNotFound(controller_uuid.to_string())),
    }
}
