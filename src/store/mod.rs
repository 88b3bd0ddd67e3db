//! Access to the two remote sheets: the read-only directory and the entries
//! table. Both are plain REST resources with no transactions and no update
//! endpoint.

pub mod http;
pub mod memory;

use crate::model::{DirectoryRow, EntryRecord};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No response at all (connect failure, dropped connection, timeout).
    #[error("store unreachable: {0}")]
    Unreachable(String),

    #[error("store rejected the request with status {status}")]
    Rejected { status: u16 },

    #[error("malformed store response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait DirectorySource: Send + Sync {
    /// Every directory row, in sheet order.
    async fn rows(&self) -> Result<Vec<DirectoryRow>, StoreError>;
}

#[async_trait]
pub trait EntriesStore: Send + Sync {
    /// Every entry row, in sheet order.
    async fn all(&self) -> Result<Vec<EntryRecord>, StoreError>;

    /// Rows whose `column` equals `value` exactly.
    async fn search(&self, column: &str, value: &str) -> Result<Vec<EntryRecord>, StoreError>;

    async fn insert(&self, batch: &[EntryRecord]) -> Result<(), StoreError>;

    /// Removes every row whose `column` equals `value`; returns how many went.
    async fn delete_where(&self, column: &str, value: &str) -> Result<u64, StoreError>;
}
