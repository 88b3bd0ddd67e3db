use crate::error::SessionError;
use crate::model::{EntryRecord, COL_CENTER};
use crate::store::EntriesStore;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct EntryQuery {
    store: Arc<dyn EntriesStore>,
    server_filter: bool,
}

impl EntryQuery {
    pub fn new(store: Arc<dyn EntriesStore>, server_filter: bool) -> Self {
        Self {
            store,
            server_filter,
        }
    }

    /// Entries of `center` in store order. A failed fetch reads as an empty
    /// center.
    pub async fn list_entries(&self, center: &str) -> Vec<EntryRecord> {
        let fetched = if self.server_filter {
            self.store.search(COL_CENTER, center).await
        } else {
            self.store.all().await
        };
        match fetched {
            Ok(rows) => {
                let entries: Vec<EntryRecord> = rows
                    .into_iter()
                    .filter(|e| e.center_name == center)
                    .collect();
                debug!(center, count = entries.len(), "entries listed");
                entries
            }
            Err(e) => {
                warn!(
                    error = %SessionError::QueryFailed(e.to_string()),
                    center,
                    "entries query failed; showing none"
                );
                Vec::new()
            }
        }
    }
}
