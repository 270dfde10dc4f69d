// SPDX-FileCopyrightText: 2026 Hostvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for hostvault.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level hostvault configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HostvaultConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Vault file locations.
    #[serde(default)]
    pub vault: VaultConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Where the vault lives on disk.
///
/// There is no PBKDF2 cost here. The master record does not store one, so
/// it is fixed by the vault format rather than configured.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// Directory holding the master record and the connection store.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// File name of the master record inside `data_dir`.
    #[serde(default = "default_master_file")]
    pub master_file: String,

    /// File name of the encrypted connection store inside `data_dir`.
    #[serde(default = "default_connections_file")]
    pub connections_file: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            master_file: default_master_file(),
            connections_file: default_connections_file(),
        }
    }
}

impl VaultConfig {
    /// A config rooted at `dir` with default file names.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: dir.into().display().to_string(),
            ..Self::default()
        }
    }

    pub fn data_dir_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .map(|d| d.join("hostvault"))
        .unwrap_or_else(|| PathBuf::from("hostvault_data"))
        .display()
        .to_string()
}

fn default_master_file() -> String {
    "master.json".to_string()
}

fn default_connections_file() -> String {
    "connections.enc".to_string()
}
