//! Staff roster and staff status counters

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use custody::{Staff, StaffStatus};
use tracing::{debug, info};

use super::record_id;
use crate::{AppResult, AppState};

/// GET /api/staff
pub async fn list_staff(State(state): State<AppState>) -> AppResult<Json<Vec<Staff>>> {
    debug!("Handling GET /api/staff");
    Ok(Json(state.records.staff.all().await?))
}

/// POST /api/staff
pub async fn add_staff(
    State(state): State<AppState>,
    Json(staff): Json<Staff>,
) -> AppResult<(StatusCode, Json<Staff>)> {
    debug!("Handling POST /api/staff for {}", staff.employee_id);
    let staff = state.records.staff.create(staff).await?;
    info!("Added staff member {} ({})", staff.name, staff.id);
    Ok((StatusCode::CREATED, Json(staff)))
}

/// DELETE /api/staff/:id
pub async fn delete_staff(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = record_id(&id)?;
    debug!("Handling DELETE /api/staff/{}", id);

    if state.records.staff.delete(id).await? {
        info!("Deleted staff member {}", id);
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/staff-status
pub async fn list_staff_status(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<StaffStatus>>> {
    debug!("Handling GET /api/staff-status");
    Ok(Json(state.records.staff_status.all().await?))
}

/// POST /api/staff-status
pub async fn add_staff_status(
    State(state): State<AppState>,
    Json(status): Json<StaffStatus>,
) -> AppResult<(StatusCode, Json<StaffStatus>)> {
    debug!("Handling POST /api/staff-status for {}", status.name);
    let status = state.records.staff_status.create(status).await?;
    Ok((StatusCode::CREATED, Json(status)))
}
