// SPDX-FileCopyrightText: 2026 Hostvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for hostvault.

use thiserror::Error;

/// The error type shared by every hostvault crate.
///
/// A wrong master password is not an error; it is reported through
/// `AuthOutcome::Denied` in `hostvault-vault`.
#[derive(Debug, Error)]
pub enum HostvaultError {
    /// Configuration errors (invalid TOML, out-of-range values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Underlying read/write failure on a persisted blob.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Key derivation or encryption failures, and missing/malformed master records.
    #[error("vault error: {0}")]
    Vault(String),

    /// The connection store could not be decrypted or parsed.
    #[error("vault corrupted: {0}")]
    Corrupted(String),

    /// A connection profile failed field validation.
    #[error("invalid profile: {0}")]
    Validation(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HostvaultError {
    /// Wrap any error as a storage failure.
    pub fn storage(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Storage {
            source: source.into(),
        }
    }
}

impl From<std::io::Error> for HostvaultError {
    fn from(e: std::io::Error) -> Self {
        Self::storage(e)
    }
}
