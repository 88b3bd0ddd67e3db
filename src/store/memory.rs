//! In-process store with scripted failures. Backs the test suite.

use super::{DirectorySource, EntriesStore, StoreError};
use crate::model::{DirectoryRow, EntryRecord};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Directory,
    Fetch,
    Insert,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Reject(u16),
    Unreachable,
}

impl Fault {
    fn into_error(self) -> StoreError {
        match self {
            Fault::Reject(status) => StoreError::Rejected { status },
            Fault::Unreachable => StoreError::Unreachable("connection refused".to_string()),
        }
    }
}

#[derive(Default)]
struct Inner {
    directory: Vec<DirectoryRow>,
    entries: Vec<EntryRecord>,
    faults: HashMap<Operation, Fault>,
    calls: Vec<Operation>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new(directory: Vec<DirectoryRow>, entries: Vec<EntryRecord>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                directory,
                entries,
                ..Inner::default()
            }),
        }
    }

    /// Every later call of `op` fails with `fault` until [`MemoryStore::heal`].
    pub fn fail(&self, op: Operation, fault: Fault) {
        self.inner.lock().faults.insert(op, fault);
    }

    pub fn heal(&self, op: Operation) {
        self.inner.lock().faults.remove(&op);
    }

    pub fn entries(&self) -> Vec<EntryRecord> {
        self.inner.lock().entries.clone()
    }

    pub fn calls(&self) -> Vec<Operation> {
        self.inner.lock().calls.clone()
    }

    fn enter(&self, op: Operation) -> Result<parking_lot::MutexGuard<'_, Inner>, StoreError> {
        let mut inner = self.inner.lock();
        inner.calls.push(op);
        if let Some(fault) = inner.faults.get(&op).copied() {
            return Err(fault.into_error());
        }
        Ok(inner)
    }
}

#[async_trait]
impl DirectorySource for MemoryStore {
    async fn rows(&self) -> Result<Vec<DirectoryRow>, StoreError> {
        Ok(self.enter(Operation::Directory)?.directory.clone())
    }
}

#[async_trait]
impl EntriesStore for MemoryStore {
    async fn all(&self) -> Result<Vec<EntryRecord>, StoreError> {
        Ok(self.enter(Operation::Fetch)?.entries.clone())
    }

    async fn search(&self, column: &str, value: &str) -> Result<Vec<EntryRecord>, StoreError> {
        let inner = self.enter(Operation::Fetch)?;
        Ok(inner
            .entries
            .iter()
            .filter(|e| e.column(column) == Some(value))
            .cloned()
            .collect())
    }

    async fn insert(&self, batch: &[EntryRecord]) -> Result<(), StoreError> {
        self.enter(Operation::Insert)?
            .entries
            .extend(batch.iter().cloned());
        Ok(())
    }

    async fn delete_where(&self, column: &str, value: &str) -> Result<u64, StoreError> {
        let mut inner = self.enter(Operation::Delete)?;
        let before = inner.entries.len();
        inner.entries.retain(|e| e.column(column) != Some(value));
        Ok((before - inner.entries.len()) as u64)
    }
}
