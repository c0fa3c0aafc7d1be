use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::store::{Document, DocumentStore};

/// In-process store used for tests and `--store memory` runs.
///
/// Revisions come from one counter shared by all collections, like stream
/// sequence numbers. Scans return documents in ascending id order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryDb>>,
}

#[derive(Debug, Default)]
struct MemoryDb {
    collections: HashMap<String, BTreeMap<String, Slot>>,
    sequence: u64,
}

#[derive(Debug, Clone)]
struct Slot {
    revision: u64,
    body: Vec<u8>,
}

impl MemoryDb {
    fn write(&mut self, collection: &str, id: &str, body: Vec<u8>) -> u64 {
        self.sequence += 1;
        let revision = self.sequence;
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), Slot { revision, body });
        revision
    }

    fn current_revision(&self, collection: &str, id: &str) -> Option<u64> {
        self.collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|slot| slot.revision)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn scan(&self, collection: &str) -> Result<Vec<Document>> {
        let guard = self.state.read().await;
        Ok(guard
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, slot)| Document {
                        id: id.clone(),
                        revision: slot.revision,
                        body: slot.body.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn fetch(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let guard = self.state.read().await;
        Ok(guard
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|slot| Document {
                id: id.to_string(),
                revision: slot.revision,
                body: slot.body.clone(),
            }))
    }

    async fn put(&self, collection: &str, id: &str, body: Vec<u8>) -> Result<u64> {
        let mut guard = self.state.write().await;
        Ok(guard.write(collection, id, body))
    }

    async fn put_if(
        &self,
        collection: &str,
        id: &str,
        body: Vec<u8>,
        revision: u64,
    ) -> Result<Option<u64>> {
        let mut guard = self.state.write().await;
        if guard.current_revision(collection, id) != Some(revision) {
            return Ok(None);
        }
        Ok(Some(guard.write(collection, id, body)))
    }

    async fn remove(&self, collection: &str, id: &str) -> Result<bool> {
        let mut guard = self.state.write().await;
        Ok(guard
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_if_rejects_stale_revision() {
        let store = MemoryStore::new();
        let first = store.put("cells", "c1", b"{}".to_vec()).await.unwrap();
        let second = store.put("cells", "c1", b"{}".to_vec()).await.unwrap();
        assert!(second > first);

        let stale = store
            .put_if("cells", "c1", b"{}".to_vec(), first)
            .await
            .unwrap();
        assert!(stale.is_none());

        let fresh = store
            .put_if("cells", "c1", b"{}".to_vec(), second)
            .await
            .unwrap();
        assert!(fresh.is_some());
    }

    #[tokio::test]
    async fn test_put_if_on_missing_document_is_stale() {
        let store = MemoryStore::new();
        let result = store
            .put_if("cells", "ghost", b"{}".to_vec(), 1)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let store = MemoryStore::new();
        store.put("cells", "x", b"1".to_vec()).await.unwrap();
        store.put("inmates", "y", b"2".to_vec()).await.unwrap();

        let cells = store.scan("cells").await.unwrap();
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].id, "x");
        assert!(store.fetch("cells", "y").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_reports_whether_document_existed() {
        let store = MemoryStore::new();
        store.put("staff", "s1", b"{}".to_vec()).await.unwrap();

        assert!(store.remove("staff", "s1").await.unwrap());
        assert!(!store.remove("staff", "s1").await.unwrap());
        assert!(store.scan("staff").await.unwrap().is_empty());
    }
}
