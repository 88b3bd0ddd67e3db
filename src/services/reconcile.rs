//! Edits are a delete followed by an insert: the entries sheet has no update
//! endpoint. The two phases are not atomic.

use super::query::EntryQuery;
use crate::model::{EntryRecord, COL_TIMESTAMP};
use crate::store::{EntriesStore, StoreError};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EditStage {
    Delete,
    Insert,
}

impl fmt::Display for EditStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditStage::Delete => f.write_str("delete"),
            EditStage::Insert => f.write_str("insert"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("edit of {record_id} failed in {stage} phase: {cause}")]
pub struct EditError {
    pub stage: EditStage,
    pub record_id: String,
    pub cause: StoreError,
}

impl EditError {
    /// After a failed delete nothing changed. After a failed insert the
    /// original row is already gone.
    pub fn is_recoverable(&self) -> bool {
        self.stage == EditStage::Delete
    }
}

#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn EntriesStore>,
    query: EntryQuery,
}

impl Reconciler {
    pub fn new(store: Arc<dyn EntriesStore>, query: EntryQuery) -> Self {
        Self { store, query }
    }

    /// Replaces the row stamped `replacement.timestamp` with `replacement` and
    /// returns the refreshed entries of its center.
    pub async fn save(&self, replacement: &EntryRecord) -> Result<Vec<EntryRecord>, EditError> {
        let record_id = replacement.timestamp.as_str();

        match self.store.delete_where(COL_TIMESTAMP, record_id).await {
            Ok(0) => warn!(record_id, "no row matched the edited timestamp"),
            Ok(n) => info!(record_id, deleted = n, "edit delete phase done"),
            Err(cause) => {
                warn!(record_id, error = %cause, "edit delete phase failed");
                return Err(EditError {
                    stage: EditStage::Delete,
                    record_id: record_id.to_string(),
                    cause,
                });
            }
        }

        if let Err(cause) = self.store.insert(std::slice::from_ref(replacement)).await {
            error!(record_id, error = %cause, "edit insert phase failed; row is lost");
            return Err(EditError {
                stage: EditStage::Insert,
                record_id: record_id.to_string(),
                cause,
            });
        }

        info!(record_id, "entry updated");
        Ok(self.query.list_entries(&replacement.center_name).await)
    }
}
