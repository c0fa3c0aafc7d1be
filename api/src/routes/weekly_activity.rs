use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use custody::{Record, WeeklyActivity};
use tracing::debug;

use super::record_id;
use crate::{AppError, AppResult, AppState};

/// GET /api/weekly-activity
pub async fn list_weekly_activity(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<WeeklyActivity>>> {
    debug!("Handling GET /api/weekly-activity");
    Ok(Json(state.records.weekly_activity.all().await?))
}

/// GET /api/weekly-activity/:id
pub async fn get_weekly_activity(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<WeeklyActivity>> {
    let id = record_id(&id)?;
    debug!("Handling GET /api/weekly-activity/{}", id);

    state
        .records
        .weekly_activity
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(WeeklyActivity::ENTITY, id))
}

/// POST /api/weekly-activity
pub async fn create_weekly_activity(
    State(state): State<AppState>,
    Json(activity): Json<WeeklyActivity>,
) -> AppResult<(StatusCode, Json<WeeklyActivity>)> {
    debug!("Handling POST /api/weekly-activity for {}", activity.day);
    let activity = state.records.weekly_activity.create(activity).await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

/// PUT /api/weekly-activity/:id
pub async fn update_weekly_activity(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<WeeklyActivity>,
) -> AppResult<Json<WeeklyActivity>> {
    let id = record_id(&id)?;
    debug!("Handling PUT /api/weekly-activity/{}", id);

    let mut activity = state
        .records
        .weekly_activity
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found(WeeklyActivity::ENTITY, id))?;

    activity.replace_counts(update);
    state.records.weekly_activity.save(&activity).await?;
    Ok(Json(activity))
}

/// DELETE /api/weekly-activity/:id
pub async fn delete_weekly_activity(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = record_id(&id)?;
    debug!("Handling DELETE /api/weekly-activity/{}", id);

    state.records.weekly_activity.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
