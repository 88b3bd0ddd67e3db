pub mod query;
pub mod reconcile;
pub mod submission;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::store::http::SheetStore;
use crate::store::{DirectorySource, EntriesStore, StoreError};
use std::sync::Arc;

pub use query::EntryQuery;
pub use reconcile::{EditError, EditStage, Reconciler};
pub use submission::{SubmitError, Submitter};

/// Everything the driver needs to execute session effects.
#[derive(Clone)]
pub struct Services {
    pub catalog: Catalog,
    pub submitter: Submitter,
    pub query: EntryQuery,
    pub reconciler: Reconciler,
}

impl Services {
    pub fn new(
        directory: Arc<dyn DirectorySource>,
        entries: Arc<dyn EntriesStore>,
        server_filter: bool,
    ) -> Self {
        let query = EntryQuery::new(entries.clone(), server_filter);
        Self {
            catalog: Catalog::new(directory),
            submitter: Submitter::new(entries.clone()),
            reconciler: Reconciler::new(entries, query.clone()),
            query,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, StoreError> {
        let store = Arc::new(SheetStore::new(config)?);
        Ok(Self::new(store.clone(), store, config.server_filter))
    }
}
