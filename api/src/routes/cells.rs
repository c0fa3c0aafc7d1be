use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use custody::{Cell, Record};
use tracing::{debug, info};

use super::record_id;
use crate::{AppError, AppResult, AppState};

/// GET /api/cells
pub async fn list_cells(State(state): State<AppState>) -> AppResult<Json<Vec<Cell>>> {
    debug!("Handling GET /api/cells");
    Ok(Json(state.records.cells.all().await?))
}

/// GET /api/cells/:id
pub async fn get_cell(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Cell>> {
    let id = record_id(&id)?;
    debug!("Handling GET /api/cells/{}", id);

    state
        .records
        .cells
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(Cell::ENTITY, id))
}

/// POST /api/cells
pub async fn create_cell(
    State(state): State<AppState>,
    Json(cell): Json<Cell>,
) -> AppResult<(StatusCode, Json<Cell>)> {
    debug!(
        "Handling POST /api/cells for cell {} in block {}",
        cell.cell_number, cell.block
    );
    let cell = state.occupancy.create_cell(cell).await?;
    Ok((StatusCode::CREATED, Json(cell)))
}

/// PUT /api/cells/:id
///
/// Replaces every mutable field including the roster. Occupancy and status
/// follow the roster.
pub async fn update_cell(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(cell): Json<Cell>,
) -> AppResult<Json<Cell>> {
    let id = record_id(&id)?;
    debug!("Handling PUT /api/cells/{}", id);

    let cell = state.occupancy.update_cell(id, cell).await?;
    info!(
        "Updated cell {} in block {} ({})",
        cell.cell_number, cell.block, cell.id
    );
    Ok(Json(cell))
}

/// DELETE /api/cells/:id
pub async fn delete_cell(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = record_id(&id)?;
    debug!("Handling DELETE /api/cells/{}", id);

    if state.occupancy.delete_cell(id).await? {
        info!("Deleted cell {}", id);
    }
    Ok(StatusCode::NO_CONTENT)
}
