// SPDX-FileCopyrightText: 2026 Hostvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master-password protected store for connection profiles.
//!
//! A PBKDF2-HMAC-SHA256 key derived from the master password seals the
//! profile list as a Fernet token. A small master record (salt plus a
//! token of a fixed constant) lets a password be checked without storing
//! it. Changing the password re-encrypts the store under the new key.

pub mod connections;
pub mod crypto;
pub mod kdf;
pub mod master;
pub mod prompt;
pub mod storage;
pub mod vault;

pub use connections::ConnectionVault;
pub use kdf::{KDF_ITERATIONS, VaultKey, derive_key};
pub use master::{AuthOutcome, MasterAuthenticator, MasterRecord, VERIFY_PLAINTEXT};
pub use prompt::get_master_password;
pub use storage::FileBlobStore;
pub use vault::CredentialVault;
