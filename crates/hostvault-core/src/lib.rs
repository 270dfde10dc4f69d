// SPDX-FileCopyrightText: 2026 Hostvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for hostvault.
//!
//! Holds the pieces every other crate agrees on: the shared error type, the
//! connection profile model, and the [`BlobStore`] trait through which the
//! vault reaches persistent storage.

pub mod error;
pub mod profile;
pub mod traits;

pub use error::HostvaultError;
pub use profile::{AuthType, ConnectionProfile, ProfileFields, ProfileId, SortKey, sort_profiles};
pub use traits::BlobStore;
