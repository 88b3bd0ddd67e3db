use crate::model::{timestamp_now, EntryRecord, Fields};
use crate::store::{EntriesStore, StoreError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("rejected by store: {0}")]
    Rejected(String),

    #[error("unreachable: {0}")]
    Unreachable(String),
}

impl From<StoreError> for SubmitError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unreachable(msg) => SubmitError::Unreachable(msg),
            other => SubmitError::Rejected(other.to_string()),
        }
    }
}

#[derive(Clone)]
pub struct Submitter {
    store: Arc<dyn EntriesStore>,
}

impl Submitter {
    pub fn new(store: Arc<dyn EntriesStore>) -> Self {
        Self { store }
    }

    /// Stamps and appends one record. Not idempotent: a retry after a lost
    /// response creates a second row with a new timestamp.
    pub async fn submit(
        &self,
        center: &str,
        student: &str,
        fields: &Fields,
    ) -> Result<EntryRecord, SubmitError> {
        let record = EntryRecord::new(timestamp_now(), center, student, fields);
        match self.store.insert(std::slice::from_ref(&record)).await {
            Ok(()) => {
                info!(timestamp = %record.timestamp, center, student, "entry submitted");
                Ok(record)
            }
            Err(e) => {
                warn!(error = %e, center, student, "entry submission failed");
                Err(e.into())
            }
        }
    }
}
