// SPDX-FileCopyrightText: 2026 Hostvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Temporary on-disk vault directories.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use hostvault_config::VaultConfig;
use tempfile::TempDir;

/// PBKDF2 iteration count for throwaway test vaults. Far below the
/// production cost, and only reachable through explicit constructors.
pub const TEST_KDF_ITERATIONS: u32 = 1_000;

/// A scratch data directory and a [`VaultConfig`] pointing at it.
///
/// The directory is removed on drop.
pub struct TestVaultDir {
    dir: TempDir,
    config: VaultConfig,
}

impl TestVaultDir {
    pub fn new() -> std::io::Result<Self> {
        let dir = tempfile::tempdir()?;
        let config = VaultConfig::in_dir(dir.path());
        Ok(Self { dir, config })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn master_path(&self) -> PathBuf {
        self.dir.path().join(&self.config.master_file)
    }

    pub fn connections_path(&self) -> PathBuf {
        self.dir.path().join(&self.config.connections_file)
    }

    /// Name and contents of every file in the directory.
    pub fn snapshot(&self) -> std::io::Result<BTreeMap<String, Vec<u8>>> {
        let mut files = BTreeMap::new();
        for entry in std::fs::read_dir(self.dir.path())? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                let name = entry.file_name().to_string_lossy().into_owned();
                files.insert(name, std::fs::read(entry.path())?);
            }
        }
        Ok(files)
    }
}
