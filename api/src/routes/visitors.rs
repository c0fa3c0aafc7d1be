use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use custody::Visitor;
use tracing::{debug, info};

use super::record_id;
use crate::{AppResult, AppState};

/// GET /api/visitors
pub async fn list_visitors(State(state): State<AppState>) -> AppResult<Json<Vec<Visitor>>> {
    debug!("Handling GET /api/visitors");
    Ok(Json(state.records.visitors.all().await?))
}

/// POST /api/visitors
///
/// Rejected with 400 unless `visitingInmate` names an existing inmate code.
pub async fn register_visitor(
    State(state): State<AppState>,
    Json(visitor): Json<Visitor>,
) -> AppResult<(StatusCode, Json<Visitor>)> {
    debug!(
        "Handling POST /api/visitors for inmate {}",
        visitor.visiting_inmate
    );
    let visitor = custody::register_visitor(&state.records, visitor).await?;
    Ok((StatusCode::CREATED, Json(visitor)))
}

/// PUT /api/visitors/:id
///
/// Update-or-insert under the given id.
pub async fn upsert_visitor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(visitor): Json<Visitor>,
) -> AppResult<(StatusCode, Json<Visitor>)> {
    let id = record_id(&id)?;
    debug!("Handling PUT /api/visitors/{}", id);

    let (visitor, inserted) = custody::upsert_visitor(&state.records, id, visitor).await?;
    let status = if inserted {
        info!("Inserted visitor {} via update", id);
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(visitor)))
}

/// DELETE /api/visitors/:id
pub async fn delete_visitor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = record_id(&id)?;
    debug!("Handling DELETE /api/visitors/{}", id);

    if state.records.visitors.delete(id).await? {
        info!("Deleted visitor {}", id);
    }
    Ok(StatusCode::NO_CONTENT)
}
