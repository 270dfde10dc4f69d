// SPDX-FileCopyrightText: 2026 Hostvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Byte-oriented persistence surface consumed by the vault.

use crate::error::HostvaultError;

/// A named-blob store supplied by the host application.
///
/// Implementations own path resolution and directory creation. The vault
/// assumes exclusive single-writer access to the blobs it names.
pub trait BlobStore: Send + Sync {
    /// Whether a blob with this name exists.
    fn exists(&self, name: &str) -> Result<bool, HostvaultError>;

    /// Read a blob. `Ok(None)` when it does not exist.
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>, HostvaultError>;

    /// Replace a blob atomically: readers observe either the previous
    /// contents or `data`, never a partial write.
    fn write_atomic(&self, name: &str, data: &[u8]) -> Result<(), HostvaultError>;
}
