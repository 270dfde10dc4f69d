// SPDX-FileCopyrightText: 2026 Hostvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault lifecycle: initialize, unlock, load/save profiles, change password.
//!
//! `CredentialVault` wires a [`MasterAuthenticator`] and a
//! [`ConnectionVault`] to one [`BlobStore`], with file names taken from
//! [`VaultConfig`].

use std::sync::Arc;

use hostvault_config::VaultConfig;
use hostvault_core::{BlobStore, ConnectionProfile, HostvaultError};
use secrecy::SecretString;
use tracing::{error, info};

use crate::connections::ConnectionVault;
use crate::kdf::{KDF_ITERATIONS, VaultKey};
use crate::master::{AuthOutcome, MasterAuthenticator};
use crate::storage::FileBlobStore;

/// The master record and connection store of one vault.
#[derive(Debug, Clone)]
pub struct CredentialVault {
    master: MasterAuthenticator,
    connections: ConnectionVault,
}

impl CredentialVault {
    /// A vault stored as files under `config.data_dir`, at [`KDF_ITERATIONS`].
    pub fn open(config: &VaultConfig) -> Self {
        Self::with_store(
            Arc::new(FileBlobStore::new(config.data_dir_path())),
            config,
            KDF_ITERATIONS,
        )
    }

    /// A vault over any blob store, using the file names in `config`.
    ///
    /// `iterations` must be the cost the vault was set up with. Anything
    /// other than [`KDF_ITERATIONS`] is only meant for throwaway test vaults.
    pub fn with_store(store: Arc<dyn BlobStore>, config: &VaultConfig, iterations: u32) -> Self {
        Self {
            master: MasterAuthenticator::new(store.clone(), config.master_file.as_str(), iterations),
            connections: ConnectionVault::new(store, config.connections_file.as_str()),
        }
    }

    pub fn master(&self) -> &MasterAuthenticator {
        &self.master
    }

    pub fn connections(&self) -> &ConnectionVault {
        &self.connections
    }

    /// Whether a master password has been set up.
    pub fn is_initialized(&self) -> Result<bool, HostvaultError> {
        self.master.exists()
    }

    /// First-time setup. Refuses to replace an existing master record,
    /// since that would orphan the connection store; use
    /// [`change_password`](Self::change_password) instead.
    pub fn initialize(&self, password: &SecretString) -> Result<VaultKey, HostvaultError> {
        if self.master.exists()? {
            return Err(HostvaultError::Vault(
                "vault is already initialized".to_string(),
            ));
        }
        self.master.setup(password)
    }

    pub fn unlock(&self, password: &SecretString) -> Result<AuthOutcome, HostvaultError> {
        self.master.unlock(password)
    }

    pub fn load(&self, key: &VaultKey) -> Result<Vec<ConnectionProfile>, HostvaultError> {
        self.connections.load(key)
    }

    pub fn try_load(&self, key: &VaultKey) -> Result<Vec<ConnectionProfile>, HostvaultError> {
        self.connections.try_load(key)
    }

    pub fn save(&self, profiles: &[ConnectionProfile], key: &VaultKey) -> Result<(), HostvaultError> {
        self.connections.save(profiles, key)
    }

    /// Rotate the master password.
    ///
    /// Returns `Denied` without touching storage if `old` is wrong.
    /// Otherwise the connection store is re-encrypted under the new key
    /// first and the new master record committed second. If the commit
    /// fails the store is put back under the old key, so the old password
    /// keeps working.
    pub fn change_password(
        &self,
        old: &SecretString,
        new: &SecretString,
    ) -> Result<AuthOutcome, HostvaultError> {
        let old_key = match self.master.unlock(old)? {
            AuthOutcome::Granted(key) => key,
            AuthOutcome::Denied => return Ok(AuthOutcome::Denied),
        };

        let prepared = self.master.prepare(new)?;
        self.connections.reencrypt(&old_key, prepared.key())?;

        if let Err(commit_err) = self.master.commit(&prepared) {
            error!(error = %commit_err, "failed to write new master record, restoring connection store");
            if let Err(restore_err) = self.connections.reencrypt(prepared.key(), &old_key) {
                return Err(HostvaultError::Internal(format!(
                    "master record write failed ({commit_err}) and connection store restore failed ({restore_err})"
                )));
            }
            return Err(commit_err);
        }

        info!("master password changed");
        Ok(AuthOutcome::Granted(prepared.into_key()))
    }
}
