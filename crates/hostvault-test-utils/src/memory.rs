// SPDX-FileCopyrightText: 2026 Hostvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory blob stores, including one that fails on demand.

use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use hostvault_core::{BlobStore, HostvaultError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A [`BlobStore`] backed by a `HashMap`, counting writes.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    writes: AtomicUsize,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents of a blob.
    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        lock(&self.blobs).get(name).cloned()
    }

    /// Seed a blob directly. Not counted as a write.
    pub fn insert(&self, name: &str, data: &[u8]) {
        lock(&self.blobs).insert(name.to_string(), data.to_vec());
    }

    /// Number of successful `write_atomic` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl BlobStore for MemoryBlobStore {
    fn exists(&self, name: &str) -> Result<bool, HostvaultError> {
        Ok(lock(&self.blobs).contains_key(name))
    }

    fn read(&self, name: &str) -> Result<Option<Vec<u8>>, HostvaultError> {
        Ok(self.get(name))
    }

    fn write_atomic(&self, name: &str, data: &[u8]) -> Result<(), HostvaultError> {
        self.insert(name, data);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A [`MemoryBlobStore`] that can be told to fail reads or writes.
#[derive(Debug, Default)]
pub struct FailingBlobStore {
    inner: MemoryBlobStore,
    fail_reads: AtomicBool,
    failing_writes: Mutex<HashSet<String>>,
}

impl FailingBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every read fails.
    pub fn failing_reads() -> Self {
        let store = Self::new();
        store.fail_reads.store(true, Ordering::SeqCst);
        store
    }

    /// Make subsequent writes to `name` fail. The blob keeps its contents.
    pub fn fail_writes_to(&self, name: &str) {
        lock(&self.failing_writes).insert(name.to_string());
    }

    pub fn clear_failures(&self) {
        self.fail_reads.store(false, Ordering::SeqCst);
        lock(&self.failing_writes).clear();
    }
}

impl BlobStore for FailingBlobStore {
    fn exists(&self, name: &str) -> Result<bool, HostvaultError> {
        self.inner.exists(name)
    }

    fn read(&self, name: &str) -> Result<Option<Vec<u8>>, HostvaultError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(HostvaultError::storage(io::Error::other(format!(
                "injected read failure for {name}"
            ))));
        }
        self.inner.read(name)
    }

    fn write_atomic(&self, name: &str, data: &[u8]) -> Result<(), HostvaultError> {
        if lock(&self.failing_writes).contains(name) {
            return Err(HostvaultError::storage(io::Error::other(format!(
                "injected write failure for {name}"
            ))));
        }
        self.inner.write_atomic(name, data)
    }
}
