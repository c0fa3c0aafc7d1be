//! Document store abstraction
//!
//! Backends persist opaque JSON documents per collection and stamp every
//! write with a revision. [`Repository`] layers typed access on top and
//! [`Records`] bundles one repository per collection.

use std::marker::PhantomData;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::models::{
    Cell, CellBlock, Inmate, Record, Staff, StaffStatus, Visitor, WeeklyActivity,
};

/// A stored document as the backend sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    /// Revision of the latest write to this document.
    pub revision: u64,
    pub body: Vec<u8>,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every live document in `collection`.
    async fn scan(&self, collection: &str) -> Result<Vec<Document>>;

    async fn fetch(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// Unconditional upsert. Returns the new revision.
    async fn put(&self, collection: &str, id: &str, body: Vec<u8>) -> Result<u64>;

    /// Writes only if the document is still at `revision`.
    ///
    /// Returns `Ok(None)` when the document moved on (or disappeared) since
    /// that revision was read.
    async fn put_if(
        &self,
        collection: &str,
        id: &str,
        body: Vec<u8>,
        revision: u64,
    ) -> Result<Option<u64>>;

    /// Returns whether a live document was removed.
    async fn remove(&self, collection: &str, id: &str) -> Result<bool>;
}

/// A record together with the revision it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<T> {
    pub revision: u64,
    pub record: T,
}

/// Typed access to one collection.
pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _record: PhantomData,
        }
    }
}

impl<T: Record> Repository<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    pub async fn all(&self) -> Result<Vec<T>> {
        Ok(self
            .all_versioned()
            .await?
            .into_iter()
            .map(|v| v.record)
            .collect())
    }

    /// Full scan. A document that no longer decodes fails the whole scan.
    pub async fn all_versioned(&self) -> Result<Vec<Versioned<T>>> {
        let documents = self
            .store
            .scan(T::COLLECTION)
            .await
            .with_context(|| format!("Failed to scan {}", T::COLLECTION))?;

        let records = documents
            .iter()
            .map(|document| {
                Ok(Versioned {
                    revision: document.revision,
                    record: decode::<T>(document)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("Scanned {} {} records", records.len(), T::COLLECTION);
        Ok(records)
    }

    pub async fn get(&self, id: &str) -> Result<Option<T>> {
        Ok(self.get_versioned(id).await?.map(|v| v.record))
    }

    pub async fn get_versioned(&self, id: &str) -> Result<Option<Versioned<T>>> {
        match self.store.fetch(T::COLLECTION, id).await? {
            Some(document) => Ok(Some(Versioned {
                revision: document.revision,
                record: decode(&document)?,
            })),
            None => Ok(None),
        }
    }

    /// Stores `record` under a freshly assigned id.
    pub async fn create(&self, mut record: T) -> Result<T> {
        record.set_id(Uuid::new_v4().to_string());
        self.save(&record).await?;
        Ok(record)
    }

    pub async fn save(&self, record: &T) -> Result<u64> {
        let body = encode(record)?;
        self.store
            .put(T::COLLECTION, record.id(), body)
            .await
            .with_context(|| format!("Failed to store {} {}", T::COLLECTION, record.id()))
    }

    /// Conditional save; `false` means the stored record changed since
    /// `revision` was read and nothing was written.
    pub async fn save_if(&self, record: &T, revision: u64) -> Result<bool> {
        let body = encode(record)?;
        let written = self
            .store
            .put_if(T::COLLECTION, record.id(), body, revision)
            .await
            .with_context(|| format!("Failed to update {} {}", T::COLLECTION, record.id()))?;
        Ok(written.is_some())
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        self.store
            .remove(T::COLLECTION, id)
            .await
            .with_context(|| format!("Failed to delete {} {}", T::COLLECTION, id))
    }
}

fn encode<T: Record>(record: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(record)
        .with_context(|| format!("Failed to serialize {} {}", T::COLLECTION, record.id()))
}

fn decode<T: Record>(document: &Document) -> Result<T> {
    let mut record: T = serde_json::from_slice(&document.body)
        .with_context(|| format!("Failed to parse {} {}", T::COLLECTION, document.id))?;
    // The key is authoritative over whatever id the body carries.
    record.set_id(document.id.clone());
    Ok(record)
}

/// One repository per collection over a shared store.
#[derive(Clone)]
pub struct Records {
    pub cell_blocks: Repository<CellBlock>,
    pub cells: Repository<Cell>,
    pub inmates: Repository<Inmate>,
    pub staff: Repository<Staff>,
    pub staff_status: Repository<StaffStatus>,
    pub visitors: Repository<Visitor>,
    pub weekly_activity: Repository<WeeklyActivity>,
}

impl Records {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            cell_blocks: Repository::new(Arc::clone(&store)),
            cells: Repository::new(Arc::clone(&store)),
            inmates: Repository::new(Arc::clone(&store)),
            staff: Repository::new(Arc::clone(&store)),
            staff_status: Repository::new(Arc::clone(&store)),
            visitors: Repository::new(Arc::clone(&store)),
            weekly_activity: Repository::new(store),
        }
    }
}
