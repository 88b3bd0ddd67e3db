use super::{DirectorySource, EntriesStore, StoreError};
use crate::config::Config;
use crate::model::{DirectoryRow, EntryRecord};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Sheet-backed REST store (SheetDB shape): `GET` lists rows, `POST {data}`
/// appends, `DELETE /search?col=val` removes matches.
#[derive(Debug, Clone)]
pub struct SheetStore {
    client: Client,
    directory_url: String,
    entries_url: String,
}

#[derive(Serialize)]
struct Batch<'a> {
    data: &'a [EntryRecord],
}

#[derive(Deserialize)]
struct DeleteReply {
    #[serde(default)]
    deleted: u64,
}

impl SheetStore {
    pub fn new(config: &Config) -> Result<Self, StoreError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.http_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| StoreError::Unreachable(format!("failed to build http client: {e}")))?;
        Ok(Self {
            client,
            directory_url: trim_url(&config.directory_url),
            entries_url: trim_url(&config.entries_url),
        })
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.entries_url)
    }
}

fn trim_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

async fn send(request: RequestBuilder, what: &str) -> Result<Response, StoreError> {
    let response = request
        .send()
        .await
        .map_err(|e| StoreError::Unreachable(e.to_string()))?;
    let status = response.status();
    debug!(%status, what, "store responded");
    if !status.is_success() {
        return Err(StoreError::Rejected {
            status: status.as_u16(),
        });
    }
    Ok(response)
}

async fn read_rows<T: DeserializeOwned>(response: Response) -> Result<Vec<T>, StoreError> {
    response
        .json::<Vec<T>>()
        .await
        .map_err(|e| StoreError::Malformed(e.to_string()))
}

#[async_trait]
impl DirectorySource for SheetStore {
    async fn rows(&self) -> Result<Vec<DirectoryRow>, StoreError> {
        let response = send(self.client.get(&self.directory_url), "directory.list").await?;
        read_rows(response).await
    }
}

#[async_trait]
impl EntriesStore for SheetStore {
    async fn all(&self) -> Result<Vec<EntryRecord>, StoreError> {
        let response = send(self.client.get(&self.entries_url), "entries.list").await?;
        read_rows(response).await
    }

    async fn search(&self, column: &str, value: &str) -> Result<Vec<EntryRecord>, StoreError> {
        let request = self.client.get(self.search_url()).query(&[(column, value)]);
        let response = send(request, "entries.search").await?;
        read_rows(response).await
    }

    async fn insert(&self, batch: &[EntryRecord]) -> Result<(), StoreError> {
        let request = self.client.post(&self.entries_url).json(&Batch { data: batch });
        send(request, "entries.insert").await?;
        Ok(())
    }

    async fn delete_where(&self, column: &str, value: &str) -> Result<u64, StoreError> {
        let request = self.client.delete(self.search_url()).query(&[(column, value)]);
        let response = send(request, "entries.delete").await?;
        // Success is the status; the count is informational.
        Ok(response
            .json::<DeleteReply>()
            .await
            .map(|r| r.deleted)
            .unwrap_or(0))
    }
}
