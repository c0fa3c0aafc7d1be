use tracing::{debug, info};

use crate::error::{CustodyError, CustodyResult};
use crate::models::Visitor;
use crate::store::Records;

/// Stores `visitor` once its `visitingInmate` code resolves to an inmate.
pub async fn register_visitor(records: &Records, visitor: Visitor) -> CustodyResult<Visitor> {
    let known = !visitor.visiting_inmate.trim().is_empty()
        && records
            .inmates
            .all()
            .await?
            .iter()
            .any(|inmate| inmate.inmate_id == visitor.visiting_inmate);

    if !known {
        debug!(
            "Rejecting visitor {}: no inmate with code {}",
            visitor.name, visitor.visiting_inmate
        );
        return Err(CustodyError::InvalidReference(
            "specified inmate does not exist".to_string(),
        ));
    }

    let visitor = records.visitors.create(visitor).await?;
    info!(
        "Registered visitor {} for inmate {} ({})",
        visitor.name, visitor.visiting_inmate, visitor.id
    );
    Ok(visitor)
}

/// Replaces visitor `id`, inserting it under that id when absent.
///
/// Returns the stored visitor and whether it was newly inserted.
pub async fn upsert_visitor(
    records: &Records,
    id: &str,
    mut visitor: Visitor,
) -> CustodyResult<(Visitor, bool)> {
    let inserted = records.visitors.get(id).await?.is_none();
    visitor.id = id.to_string();
    records.visitors.save(&visitor).await?;
    Ok((visitor, inserted))
}
