use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use custody::{Inmate, InmateLookup, Record};
use serde::Deserialize;
use tracing::{debug, info};

use super::record_id;
use crate::{AppError, AppResult, AppState};

/// Which identifier the path segment carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupKind {
    /// Store-assigned id
    #[default]
    Id,
    /// External inmate code
    Code,
}

#[derive(Debug, Default, Deserialize)]
pub struct LookupQuery {
    #[serde(default)]
    pub lookup: LookupKind,
}

impl LookupQuery {
    fn resolve(&self, key: &str) -> AppResult<InmateLookup> {
        match self.lookup {
            LookupKind::Id => Ok(InmateLookup::ById(record_id(key)?.to_string())),
            LookupKind::Code => Ok(InmateLookup::ByCode(key.to_string())),
        }
    }
}

/// GET /api/inmates
pub async fn list_inmates(State(state): State<AppState>) -> AppResult<Json<Vec<Inmate>>> {
    debug!("Handling GET /api/inmates");
    Ok(Json(state.records.inmates.all().await?))
}

/// GET /api/inmates/:id?lookup=id|code
pub async fn get_inmate(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<LookupQuery>,
) -> AppResult<Json<Inmate>> {
    debug!("Handling GET /api/inmates/{} ({:?})", key, query.lookup);
    let lookup = query.resolve(&key)?;

    state
        .occupancy
        .find_inmate(&lookup)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(Inmate::ENTITY, &key))
}

/// POST /api/inmates
///
/// Admits the inmate into the requested cell, or the first free cell when
/// `cellNumber`/`block` are not both given.
pub async fn admit_inmate(
    State(state): State<AppState>,
    Json(inmate): Json<Inmate>,
) -> AppResult<(StatusCode, Json<Inmate>)> {
    debug!("Handling POST /api/inmates for {}", inmate.inmate_id);
    let inmate = state.occupancy.admit(inmate).await?;
    Ok((StatusCode::CREATED, Json(inmate)))
}

/// PUT /api/inmates/:id
///
/// Field replacement by store id; the cell assignment is untouched.
pub async fn update_inmate(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<Inmate>,
) -> AppResult<Json<Inmate>> {
    let id = record_id(&id)?;
    debug!("Handling PUT /api/inmates/{}", id);

    let mut inmate = state
        .records
        .inmates
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found(Inmate::ENTITY, id))?;

    inmate.replace_details(update);
    state.records.inmates.save(&inmate).await?;

    info!("Updated inmate {} ({})", inmate.inmate_id, inmate.id);
    Ok(Json(inmate))
}

/// DELETE /api/inmates/:id?lookup=id|code
///
/// Releases the inmate from its cell and deletes the record.
pub async fn release_inmate(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<LookupQuery>,
) -> AppResult<StatusCode> {
    debug!("Handling DELETE /api/inmates/{} ({:?})", key, query.lookup);
    let lookup = query.resolve(&key)?;

    state.occupancy.release(&lookup).await?;
    Ok(StatusCode::NO_CONTENT)
}
