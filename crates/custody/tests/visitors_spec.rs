use std::sync::Arc;

use custody::{
    register_visitor, upsert_visitor, CustodyError, Inmate, MemoryStore, Records, Visitor,
};

fn records() -> Records {
    Records::new(Arc::new(MemoryStore::new()))
}

fn visitor(code: &str) -> Visitor {
    Visitor {
        name: "Jane Doe".to_string(),
        relationship: "Sister".to_string(),
        visit_date: "2024-02-01".to_string(),
        visit_time: "14:00".to_string(),
        status: "Scheduled".to_string(),
        phone: "555-0100".to_string(),
        id_number: "DL-12345".to_string(),
        visiting_inmate: code.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn given_unknown_inmate_code_when_registering_then_invalid_reference() {
    // Arrange
    let records = records();

    // Act
    let result = register_visitor(&records, visitor("INM-404")).await;

    // Assert
    match result {
        Err(CustodyError::InvalidReference(message)) => {
            assert_eq!(message, "specified inmate does not exist")
        }
        other => panic!("expected invalid reference, got {:?}", other),
    }
    assert!(records.visitors.all().await.unwrap().is_empty());
}

#[tokio::test]
async fn given_known_inmate_code_when_registering_then_visitor_is_stored_unchanged() {
    // Arrange
    let records = records();
    records
        .inmates
        .create(Inmate {
            name: "John Doe".to_string(),
            inmate_id: "INM-1".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    let request = visitor("INM-1");

    // Act
    let saved = register_visitor(&records, request.clone()).await.unwrap();

    // Assert
    assert!(!saved.id.is_empty());
    let expected = Visitor {
        id: saved.id.clone(),
        ..request
    };
    assert_eq!(saved, expected);
    assert_eq!(
        records.visitors.get(&saved.id).await.unwrap(),
        Some(expected)
    );
}

#[tokio::test]
async fn given_store_id_instead_of_code_when_registering_then_invalid_reference() {
    // Arrange
    let records = records();
    let inmate = records
        .inmates
        .create(Inmate {
            inmate_id: "INM-2".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    // Act
    let result = register_visitor(&records, visitor(&inmate.id)).await;

    // Assert
    assert!(matches!(result, Err(CustodyError::InvalidReference(_))));
}

#[tokio::test]
async fn given_inmate_with_blank_code_when_registering_blank_reference_then_invalid_reference() {
    // Arrange
    let records = records();
    records
        .inmates
        .create(Inmate {
            name: "Legacy Record".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    // Act
    let result = register_visitor(&records, visitor("")).await;

    // Assert
    assert!(matches!(result, Err(CustodyError::InvalidReference(_))));
    assert!(records.visitors.all().await.unwrap().is_empty());
}

#[tokio::test]
async fn given_absent_id_when_upserting_then_inserted_under_that_id() {
    // Arrange
    let records = records();

    // Act
    let (saved, inserted) = upsert_visitor(&records, "visit-7", visitor("anyone"))
        .await
        .unwrap();

    // Assert
    assert!(inserted);
    assert_eq!(saved.id, "visit-7");
    assert!(records.visitors.get("visit-7").await.unwrap().is_some());
}

#[tokio::test]
async fn given_existing_visitor_when_upserting_then_fields_are_replaced() {
    // Arrange
    let records = records();
    upsert_visitor(&records, "visit-8", visitor("INM-1"))
        .await
        .unwrap();
    let mut changed = visitor("INM-1");
    changed.status = "Completed".to_string();

    // Act
    let (saved, inserted) = upsert_visitor(&records, "visit-8", changed).await.unwrap();

    // Assert
    assert!(!inserted);
    assert_eq!(saved.status, "Completed");
    assert_eq!(records.visitors.all().await.unwrap().len(), 1);
}
