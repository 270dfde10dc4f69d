// SPDX-FileCopyrightText: 2026 Hostvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the vault and its host application.

pub mod storage;

pub use storage::BlobStore;
