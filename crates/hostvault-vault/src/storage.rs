// SPDX-FileCopyrightText: 2026 Hostvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Directory-backed [`BlobStore`].

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use hostvault_core::{BlobStore, HostvaultError};
use tempfile::NamedTempFile;
use tracing::debug;

/// Stores each blob as a file directly inside one directory.
///
/// Writes go to a temporary file in the same directory which is flushed,
/// synced and renamed over the target, so a crash leaves either the old or
/// the new contents. Files are created with mode `0600` on Unix.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    /// A store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Full path of a blob. Names must be bare file names.
    pub fn path_for(&self, name: &str) -> Result<PathBuf, HostvaultError> {
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(HostvaultError::Internal(format!(
                "invalid blob name `{name}`"
            )));
        }
        Ok(self.dir.join(name))
    }
}

impl BlobStore for FileBlobStore {
    fn exists(&self, name: &str) -> Result<bool, HostvaultError> {
        Ok(self.path_for(name)?.try_exists()?)
    }

    fn read(&self, name: &str) -> Result<Option<Vec<u8>>, HostvaultError> {
        let path = self.path_for(name)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_atomic(&self, name: &str, data: &[u8]) -> Result<(), HostvaultError> {
        let path = self.path_for(name)?;
        fs::create_dir_all(&self.dir)?;

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        restrict_permissions(tmp.as_file())?;
        tmp.write_all(data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| HostvaultError::storage(e.error))?;

        debug!(path = %path.display(), bytes = data.len(), "blob written");
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(file: &fs::File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &fs::File) -> io::Result<()> {
    Ok(())
}
