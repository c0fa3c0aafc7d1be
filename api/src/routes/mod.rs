//! HTTP route handlers, one module per resource

pub mod cell_blocks;
pub mod cells;
pub mod dashboard;
pub mod inmates;
pub mod staff;
pub mod visitors;
pub mod weekly_activity;

use axum::{
    routing::{delete, get, put},
    Router,
};

use crate::{AppError, AppResult, AppState};

/// Build the `/api` router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/cell-block",
            get(cell_blocks::list_cell_blocks).post(cell_blocks::create_cell_block),
        )
        .route(
            "/cell-block/:id",
            get(cell_blocks::get_cell_block)
                .put(cell_blocks::update_cell_block)
                .delete(cell_blocks::delete_cell_block),
        )
        .route("/cells", get(cells::list_cells).post(cells::create_cell))
        .route(
            "/cells/:id",
            get(cells::get_cell)
                .put(cells::update_cell)
                .delete(cells::delete_cell),
        )
        .route(
            "/inmates",
            get(inmates::list_inmates).post(inmates::admit_inmate),
        )
        .route(
            "/inmates/:id",
            get(inmates::get_inmate)
                .put(inmates::update_inmate)
                .delete(inmates::release_inmate),
        )
        .route("/staff", get(staff::list_staff).post(staff::add_staff))
        .route("/staff/:id", delete(staff::delete_staff))
        .route(
            "/staff-status",
            get(staff::list_staff_status).post(staff::add_staff_status),
        )
        .route(
            "/visitors",
            get(visitors::list_visitors).post(visitors::register_visitor),
        )
        .route(
            "/visitors/:id",
            put(visitors::upsert_visitor).delete(visitors::delete_visitor),
        )
        .route(
            "/weekly-activity",
            get(weekly_activity::list_weekly_activity)
                .post(weekly_activity::create_weekly_activity),
        )
        .route(
            "/weekly-activity/:id",
            get(weekly_activity::get_weekly_activity)
                .put(weekly_activity::update_weekly_activity)
                .delete(weekly_activity::delete_weekly_activity),
        )
        .route("/dashboard-summary", get(dashboard::get_summary))
}

/// Ids double as KV key tokens, so only `[A-Za-z0-9_-]` is accepted.
pub(crate) fn record_id(raw: &str) -> AppResult<&str> {
    let valid = !raw.is_empty()
        && raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(raw)
    } else {
        Err(AppError::bad_request(format!("Invalid record id: {}", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_accepts_uuid_and_simple_tokens() {
        assert!(record_id("4f1c2a9e-1b7d-4c1e-9a8e-0d2b7f6c5a31").is_ok());
        assert!(record_id("visit_7").is_ok());
    }

    #[test]
    fn test_record_id_rejects_key_separators() {
        assert!(record_id("").is_err());
        assert!(record_id("cells.abc").is_err());
        assert!(record_id("a*").is_err());
        assert!(record_id("a b").is_err());
    }
}
