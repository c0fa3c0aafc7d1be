//! JetStream KV document store
//!
//! Every record lives in one bucket under `<collection>.<id>`. Entry revisions
//! back the conditional writes used by occupancy updates.

use anyhow::{Context, Result};
use async_nats::jetstream::{
    self,
    kv::{Entry, Operation, Store},
};
use async_trait::async_trait;
use custody::{Document, DocumentStore};
use futures_util::StreamExt;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct KvStore {
    kv_store: Store,
}

impl KvStore {
    /// Connect to NATS and open (or create) `bucket_name`.
    pub async fn connect(
        nats_url: &str,
        creds_path: Option<&str>,
        bucket_name: &str,
    ) -> Result<Self> {
        info!(
            "Connecting to NATS at {} for KV operations (bucket: {})",
            nats_url, bucket_name
        );

        let client = if let Some(creds_path) = creds_path {
            info!("Using credentials file: {}", creds_path);
            async_nats::ConnectOptions::new()
                .credentials_file(creds_path)
                .await?
                .connect(nats_url)
                .await?
        } else {
            warn!("No NATS credentials provided, connecting without auth");
            async_nats::connect(nats_url).await?
        };

        let jetstream = jetstream::new(client);

        let kv_store = match jetstream.get_key_value(bucket_name).await {
            Ok(store) => {
                info!("Using existing KV bucket: {}", bucket_name);
                store
            }
            Err(_) => {
                info!("Creating new KV bucket: {}", bucket_name);
                let config = jetstream::kv::Config {
                    bucket: bucket_name.to_string(),
                    description: "Prison management records".to_string(),
                    ..Default::default()
                };
                jetstream.create_key_value(config).await?
            }
        };

        Ok(Self { kv_store })
    }

    fn key(collection: &str, id: &str) -> String {
        format!("{}.{}", collection, id)
    }

    /// Latest entry for `key` unless it is a delete/purge marker.
    async fn live_entry(&self, key: &str) -> Result<Option<Entry>> {
        let entry = self
            .kv_store
            .entry(key)
            .await
            .with_context(|| format!("Failed to read KV entry: {}", key))?;
        Ok(entry.filter(|e| matches!(e.operation, Operation::Put)))
    }
}

fn document(id: &str, entry: Entry) -> Document {
    Document {
        id: id.to_string(),
        revision: entry.revision,
        body: entry.value.to_vec(),
    }
}

#[async_trait]
impl DocumentStore for KvStore {
    async fn scan(&self, collection: &str) -> Result<Vec<Document>> {
        let prefix = format!("{}.", collection);
        let mut documents = Vec::new();

        let mut keys = self.kv_store.keys().await?.boxed();

        while let Some(key_result) = keys.next().await {
            match key_result {
                Ok(key) => {
                    let Some(id) = key.strip_prefix(&prefix) else {
                        continue;
                    };
                    if let Some(entry) = self.live_entry(&key).await? {
                        documents.push(document(id, entry));
                    }
                }
                Err(e) => {
                    warn!("Error reading key from KV: {}", e);
                }
            }
        }

        debug!("Scanned {} documents from {}", documents.len(), collection);
        Ok(documents)
    }

    async fn fetch(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let key = Self::key(collection, id);
        debug!("Fetching document from KV: {}", key);
        Ok(self.live_entry(&key).await?.map(|entry| document(id, entry)))
    }

    async fn put(&self, collection: &str, id: &str, body: Vec<u8>) -> Result<u64> {
        let key = Self::key(collection, id);
        debug!("Storing document in KV: {}", key);

        self.kv_store
            .put(&key, body.into())
            .await
            .with_context(|| format!("Failed to store document in KV: {}", key))
    }

    async fn put_if(
        &self,
        collection: &str,
        id: &str,
        body: Vec<u8>,
        revision: u64,
    ) -> Result<Option<u64>> {
        let key = Self::key(collection, id);
        debug!("Updating document in KV: {} at revision {}", key, revision);

        match self.kv_store.update(&key, body.into(), revision).await {
            Ok(new_revision) => Ok(Some(new_revision)),
            Err(e) => {
                // A wrong-last-sequence rejection surfaces as a generic error;
                // tell it apart by checking whether the entry moved on.
                let current = self
                    .kv_store
                    .entry(&key)
                    .await
                    .with_context(|| format!("Failed to read KV entry: {}", key))?;
                match current {
                    Some(entry) if entry.revision == revision => Err(anyhow::Error::new(e)
                        .context(format!("Failed to update document in KV: {}", key))),
                    _ => {
                        debug!("Stale write rejected for {} (expected {})", key, revision);
                        Ok(None)
                    }
                }
            }
        }
    }

    async fn remove(&self, collection: &str, id: &str) -> Result<bool> {
        let key = Self::key(collection, id);
        debug!("Deleting document from KV: {}", key);

        if self.live_entry(&key).await?.is_none() {
            return Ok(false);
        }

        self.kv_store
            .delete(&key)
            .await
            .with_context(|| format!("Failed to delete document from KV: {}", key))?;

        info!("Deleted document: {}", key);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(KvStore::key("cells", "abc-123"), "cells.abc-123");
        assert_eq!(
            KvStore::key("weekly_activity", "d1"),
            "weekly_activity.d1"
        );
    }
}
