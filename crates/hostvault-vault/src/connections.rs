// SPDX-FileCopyrightText: 2026 Hostvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The encrypted connection store.
//!
//! The whole profile list is serialized as `{"connections": [...]}` and
//! sealed into a single Fernet token. The vault never inspects or edits
//! individual profiles.

use std::sync::Arc;

use hostvault_core::{BlobStore, ConnectionProfile, HostvaultError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::crypto;
use crate::kdf::VaultKey;

#[derive(Deserialize)]
struct ConnectionsDocument {
    #[serde(default)]
    connections: Vec<ConnectionProfile>,
}

#[derive(Serialize)]
struct ConnectionsDocumentRef<'a> {
    connections: &'a [ConnectionProfile],
}

/// Reads and writes the encrypted profile list under a caller-supplied key.
#[derive(Clone)]
pub struct ConnectionVault {
    store: Arc<dyn BlobStore>,
    file_name: String,
}

impl std::fmt::Debug for ConnectionVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionVault")
            .field("file_name", &self.file_name)
            .finish()
    }
}

impl ConnectionVault {
    pub fn new(store: Arc<dyn BlobStore>, file_name: impl Into<String>) -> Self {
        Self {
            store,
            file_name: file_name.into(),
        }
    }

    /// Load the profile list, treating an unreadable store as empty.
    ///
    /// A missing or zero-length blob is an empty list. A blob that does not
    /// decrypt under `key` or does not parse is logged and also yields an
    /// empty list. Storage failures still propagate.
    pub fn load(&self, key: &VaultKey) -> Result<Vec<ConnectionProfile>, HostvaultError> {
        match self.try_load(key) {
            Err(HostvaultError::Corrupted(reason)) => {
                warn!(file = %self.file_name, %reason, "connection store unreadable, treating as empty");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    /// Load the profile list, failing with [`HostvaultError::Corrupted`]
    /// when the blob does not decrypt or parse.
    pub fn try_load(&self, key: &VaultKey) -> Result<Vec<ConnectionProfile>, HostvaultError> {
        let blob = match self.store.read(&self.file_name)? {
            Some(blob) if !blob.is_empty() => blob,
            _ => {
                debug!(file = %self.file_name, "no connection store yet");
                return Ok(Vec::new());
            }
        };

        let plaintext = crypto::open(key, &blob)
            .map_err(|_| HostvaultError::Corrupted("connection store failed to decrypt".to_string()))?;
        let document: ConnectionsDocument = serde_json::from_slice(&plaintext)
            .map_err(|e| HostvaultError::Corrupted(format!("connection store failed to parse: {e}")))?;

        debug!(count = document.connections.len(), "connection store loaded");
        Ok(document.connections)
    }

    /// Encrypt and persist the full list, replacing the previous store.
    pub fn save(&self, profiles: &[ConnectionProfile], key: &VaultKey) -> Result<(), HostvaultError> {
        let plaintext = Zeroizing::new(
            serde_json::to_vec_pretty(&ConnectionsDocumentRef {
                connections: profiles,
            })
            .map_err(|e| HostvaultError::Internal(format!("failed to serialize profiles: {e}")))?,
        );
        let token = crypto::seal(key, &plaintext)?;
        self.store.write_atomic(&self.file_name, &token)?;

        debug!(count = profiles.len(), "connection store saved");
        Ok(())
    }

    /// Re-encrypt the stored list from `old_key` to `new_key`.
    ///
    /// Uses the strict loader: a store that `old_key` cannot read is left
    /// untouched and the error returned.
    pub fn reencrypt(&self, old_key: &VaultKey, new_key: &VaultKey) -> Result<(), HostvaultError> {
        let profiles = self.try_load(old_key)?;
        self.save(&profiles, new_key)?;
        info!(count = profiles.len(), "connection store re-encrypted");
        Ok(())
    }
}
