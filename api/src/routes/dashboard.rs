use axum::{extract::State, response::Json};
use custody::DashboardSummary;
use tracing::debug;

use crate::{AppResult, AppState};

/// GET /api/dashboard-summary
pub async fn get_summary(State(state): State<AppState>) -> AppResult<Json<DashboardSummary>> {
    debug!("Handling GET /api/dashboard-summary");
    Ok(Json(custody::summarize(&state.records).await?))
}
