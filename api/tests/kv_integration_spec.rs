//! Integration tests for the JetStream KV document store
//!
//! These tests require a running NATS server with JetStream enabled.
//! Run with: NATS_URL=nats://127.0.0.1:4222 cargo test -p prisonman-api -- --ignored

use std::sync::Arc;

use anyhow::Result;
use custody::{
    Cell, CellBlock, DocumentStore, Inmate, InmateLookup, OccupancyCoordinator, Records,
};
use prisonman_api::kv::KvStore;

async fn new_isolated_store() -> Result<(KvStore, String)> {
    let bucket = format!("prisonman_test_{}", uuid::Uuid::new_v4().simple());
    let store = KvStore::connect(&nats_url(), None, &bucket).await?;
    Ok((store, bucket))
}

fn nats_url() -> String {
    std::env::var("NATS_URL").unwrap_or_else(|_| "nats://127.0.0.1:4222".to_string())
}

#[tokio::test]
#[ignore] // Requires NATS server running
async fn given_empty_bucket_when_scanning_then_returns_no_documents() -> Result<()> {
    // Arrange
    let (store, bucket) = new_isolated_store().await?;

    // Act
    let documents = store.scan("cells").await?;

    // Assert
    assert!(
        documents.is_empty(),
        "Expected empty KV bucket {}, found {} items",
        bucket,
        documents.len()
    );

    Ok(())
}

#[tokio::test]
#[ignore] // Requires NATS server running
async fn given_document_when_written_then_scan_is_scoped_to_collection() -> Result<()> {
    // Arrange
    let (store, _) = new_isolated_store().await?;

    // Act
    store.put("cells", "c1", br#"{"cellNumber":"101"}"#.to_vec()).await?;
    store.put("inmates", "i1", br#"{"inmateId":"INM-1"}"#.to_vec()).await?;

    // Assert
    let cells = store.scan("cells").await?;
    assert_eq!(cells.len(), 1);
    assert_eq!(cells[0].id, "c1");
    let fetched = store.fetch("inmates", "i1").await?.expect("inmate document");
    assert_eq!(fetched.body, br#"{"inmateId":"INM-1"}"#.to_vec());

    Ok(())
}

#[tokio::test]
#[ignore] // Requires NATS server running
async fn given_stale_revision_when_conditional_put_then_rejected() -> Result<()> {
    // Arrange
    let (store, _) = new_isolated_store().await?;
    let first = store.put("cells", "c1", b"{}".to_vec()).await?;
    let second = store.put("cells", "c1", b"{\"capacity\":2}".to_vec()).await?;

    // Act
    let stale = store.put_if("cells", "c1", b"{}".to_vec(), first).await?;
    let fresh = store.put_if("cells", "c1", b"{}".to_vec(), second).await?;

    // Assert
    assert!(stale.is_none(), "stale revision must not be applied");
    assert!(fresh.is_some(), "current revision must be applied");

    Ok(())
}

#[tokio::test]
#[ignore] // Requires NATS server running
async fn given_deleted_document_when_fetched_then_absent() -> Result<()> {
    // Arrange
    let (store, _) = new_isolated_store().await?;
    store.put("visitors", "v1", b"{}".to_vec()).await?;

    // Act
    let removed = store.remove("visitors", "v1").await?;
    let removed_again = store.remove("visitors", "v1").await?;

    // Assert
    assert!(removed);
    assert!(!removed_again);
    assert!(store.fetch("visitors", "v1").await?.is_none());
    assert!(store.scan("visitors").await?.is_empty());

    Ok(())
}

#[tokio::test]
#[ignore] // Requires NATS server running
async fn given_kv_records_when_admitting_and_releasing_then_block_tracks_cells() -> Result<()> {
    // Arrange
    let (store, _) = new_isolated_store().await?;
    let store: Arc<dyn DocumentStore> = Arc::new(store);
    let records = Records::new(store);
    let occupancy = OccupancyCoordinator::new(records.clone());

    let block = occupancy
        .create_block(CellBlock {
            name: "A".to_string(),
            ..Default::default()
        })
        .await?;
    occupancy
        .create_cell(Cell {
            cell_number: "101".to_string(),
            block: "A".to_string(),
            capacity: 2,
            ..Default::default()
        })
        .await?;

    // Act
    occupancy
        .admit(Inmate {
            name: "John Doe".to_string(),
            inmate_id: "INM-1".to_string(),
            cell_number: "101".to_string(),
            block: "A".to_string(),
            ..Default::default()
        })
        .await?;

    // Assert
    let stored = records.cell_blocks.get(&block.id).await?.expect("block");
    assert_eq!((stored.capacity, stored.current, stored.utilization), (2, 1, 50));

    // Act
    occupancy
        .release(&InmateLookup::ByCode("INM-1".to_string()))
        .await?;

    // Assert
    let stored = records.cell_blocks.get(&block.id).await?.expect("block");
    assert_eq!((stored.capacity, stored.current, stored.utilization), (2, 0, 0));
    assert!(records.inmates.all().await?.is_empty());

    Ok(())
}
