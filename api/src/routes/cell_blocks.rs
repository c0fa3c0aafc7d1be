use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use custody::{CellBlock, Record};
use tracing::{debug, info};

use super::record_id;
use crate::{AppError, AppResult, AppState};

/// GET /api/cell-block
pub async fn list_cell_blocks(State(state): State<AppState>) -> AppResult<Json<Vec<CellBlock>>> {
    debug!("Handling GET /api/cell-block");
    Ok(Json(state.records.cell_blocks.all().await?))
}

/// GET /api/cell-block/:id
pub async fn get_cell_block(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<CellBlock>> {
    let id = record_id(&id)?;
    debug!("Handling GET /api/cell-block/{}", id);

    state
        .records
        .cell_blocks
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(CellBlock::ENTITY, id))
}

/// POST /api/cell-block
///
/// Capacity, current and utilization are derived from the block's cells.
pub async fn create_cell_block(
    State(state): State<AppState>,
    Json(block): Json<CellBlock>,
) -> AppResult<(StatusCode, Json<CellBlock>)> {
    debug!("Handling POST /api/cell-block for {}", block.name);
    let block = state.occupancy.create_block(block).await?;
    Ok((StatusCode::CREATED, Json(block)))
}

/// PUT /api/cell-block/:id
///
/// Only the name is taken from the body; the numbers are recomputed.
pub async fn update_cell_block(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(block): Json<CellBlock>,
) -> AppResult<Json<CellBlock>> {
    let id = record_id(&id)?;
    debug!("Handling PUT /api/cell-block/{}", id);

    let block = state.occupancy.update_block(id, block).await?;
    info!("Updated cell block {} ({})", block.name, block.id);
    Ok(Json(block))
}

/// DELETE /api/cell-block/:id
pub async fn delete_cell_block(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = record_id(&id)?;
    debug!("Handling DELETE /api/cell-block/{}", id);

    if state.records.cell_blocks.delete(id).await? {
        info!("Deleted cell block {}", id);
    }
    Ok(StatusCode::NO_CONTENT)
}
