// SPDX-FileCopyrightText: 2026 Hostvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for hostvault.
//!
//! # Components
//!
//! - [`MemoryBlobStore`] - in-memory blob store that counts writes
//! - [`FailingBlobStore`] - blob store with injectable read/write failures
//! - [`TestVaultDir`] - temp data directory with a low-cost vault config
//! - profile fixtures

pub mod fixtures;
pub mod harness;
pub mod memory;

pub use fixtures::{key_profile, password_profile, sample_profiles};
pub use harness::{TEST_KDF_ITERATIONS, TestVaultDir};
pub use memory::{FailingBlobStore, MemoryBlobStore};
