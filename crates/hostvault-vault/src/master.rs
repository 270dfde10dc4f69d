// SPDX-FileCopyrightText: 2026 Hostvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The master record: proves a password matches the one the vault was set
//! up with, without storing the password or the key.
//!
//! The record holds the KDF salt and a Fernet token of a fixed constant.
//! A password unlocks the vault iff the key derived from it and the stored
//! salt opens that token and yields the constant.

use std::sync::Arc;

use hostvault_core::{BlobStore, HostvaultError};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::crypto;
use crate::kdf::{self, VaultKey};

/// Plaintext sealed into every verification token.
pub const VERIFY_PLAINTEXT: &[u8] = b"TTP_MASTER_VERIFY";

/// On-disk master record: `{"salt": <hex>, "verify_token": <fernet token>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterRecord {
    pub salt: String,
    pub verify_token: String,
}

impl MasterRecord {
    fn to_json(&self) -> Result<Vec<u8>, HostvaultError> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| HostvaultError::Internal(format!("failed to serialize master record: {e}")))
    }

    fn from_json(bytes: &[u8]) -> Result<Self, HostvaultError> {
        serde_json::from_slice(bytes)
            .map_err(|e| HostvaultError::Vault(format!("master record is malformed: {e}")))
    }

    fn salt_bytes(&self) -> Result<Vec<u8>, HostvaultError> {
        hex::decode(&self.salt)
            .map_err(|_| HostvaultError::Vault("master record salt is not valid hex".to_string()))
    }
}

/// Result of checking a master password.
///
/// A wrong password is an ordinary outcome, not an error.
#[derive(Debug)]
pub enum AuthOutcome {
    Granted(VaultKey),
    Denied,
}

impl AuthOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted(_))
    }

    pub fn into_key(self) -> Option<VaultKey> {
        match self {
            Self::Granted(key) => Some(key),
            Self::Denied => None,
        }
    }
}

/// A new master record and its key, built in memory but not yet persisted.
#[derive(Debug)]
pub struct PreparedMaster {
    record: MasterRecord,
    key: VaultKey,
}

impl PreparedMaster {
    pub fn record(&self) -> &MasterRecord {
        &self.record
    }

    pub fn key(&self) -> &VaultKey {
        &self.key
    }

    pub fn into_key(self) -> VaultKey {
        self.key
    }
}

/// Owns the single persisted master record.
#[derive(Clone)]
pub struct MasterAuthenticator {
    store: Arc<dyn BlobStore>,
    file_name: String,
    iterations: u32,
}

impl std::fmt::Debug for MasterAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterAuthenticator")
            .field("file_name", &self.file_name)
            .field("iterations", &self.iterations)
            .finish()
    }
}

impl MasterAuthenticator {
    pub fn new(store: Arc<dyn BlobStore>, file_name: impl Into<String>, iterations: u32) -> Self {
        Self {
            store,
            file_name: file_name.into(),
            iterations,
        }
    }

    /// Whether a master record has been set up.
    pub fn exists(&self) -> Result<bool, HostvaultError> {
        self.store.exists(&self.file_name)
    }

    /// Create a new master record for `password`, replacing any existing
    /// one, and return its key.
    pub fn setup(&self, password: &SecretString) -> Result<VaultKey, HostvaultError> {
        let prepared = self.prepare(password)?;
        self.commit(&prepared)?;
        info!(file = %self.file_name, "master password set");
        Ok(prepared.into_key())
    }

    /// Fresh salt, derived key and verification token, without writing.
    pub fn prepare(&self, password: &SecretString) -> Result<PreparedMaster, HostvaultError> {
        let salt = kdf::generate_salt()?;
        let key = kdf::derive_key(password.expose_secret().as_bytes(), &salt, self.iterations)?;
        let token = crypto::seal(&key, VERIFY_PLAINTEXT)?;
        let verify_token = String::from_utf8(token)
            .map_err(|_| HostvaultError::Internal("token is not ASCII".to_string()))?;

        Ok(PreparedMaster {
            record: MasterRecord {
                salt: hex::encode(salt),
                verify_token,
            },
            key,
        })
    }

    /// Persist a prepared record, replacing any existing one atomically.
    pub fn commit(&self, prepared: &PreparedMaster) -> Result<(), HostvaultError> {
        self.store
            .write_atomic(&self.file_name, &prepared.record.to_json()?)
    }

    /// Read the persisted record. Missing or malformed records are errors.
    pub fn record(&self) -> Result<MasterRecord, HostvaultError> {
        let bytes = self.store.read(&self.file_name)?.ok_or_else(|| {
            HostvaultError::Vault("no master password has been set up".to_string())
        })?;
        MasterRecord::from_json(&bytes)
    }

    /// Check `password` against the persisted record. Never writes.
    pub fn unlock(&self, password: &SecretString) -> Result<AuthOutcome, HostvaultError> {
        let record = self.record()?;
        let salt = record.salt_bytes()?;
        let key = kdf::derive_key(password.expose_secret().as_bytes(), &salt, self.iterations)?;

        let verified = crypto::open(&key, record.verify_token.as_bytes())
            .map(|plaintext| plaintext.as_slice() == VERIFY_PLAINTEXT)
            .unwrap_or(false);

        if verified {
            debug!("master password accepted");
            Ok(AuthOutcome::Granted(key))
        } else {
            warn!("master password rejected");
            Ok(AuthOutcome::Denied)
        }
    }
}
