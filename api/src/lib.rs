//! Prison Management API
//!
//! REST surface over the custody records: cell blocks, cells, inmates, staff,
//! staff status counters, visitors, weekly activity and the dashboard summary.
//! Records live in a NATS JetStream KV bucket (or in memory for local runs).

pub mod config;
pub mod kv;
pub mod routes;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use custody::{CustodyError, DocumentStore, MemoryStore, OccupancyCoordinator, Records};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use config::{Config, StoreBackend, DEFAULT_CORS_ORIGIN};
use kv::KvStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub records: Records,
    pub occupancy: OccupancyCoordinator,
    pub cors_origin: HeaderValue,
}

impl AppState {
    /// Create application state for the configured store backend
    pub async fn new(config: &Config) -> Result<Self> {
        let store: Arc<dyn DocumentStore> = match config.store_backend {
            StoreBackend::Jetstream => Arc::new(
                KvStore::connect(
                    &config.nats_url,
                    config.nats_creds_path.as_deref(),
                    &config.kv_bucket,
                )
                .await?,
            ),
            StoreBackend::Memory => {
                info!("Using in-memory store; records will not survive a restart");
                Arc::new(MemoryStore::new())
            }
        };

        let cors_origin = HeaderValue::from_str(&config.cors_origin)
            .with_context(|| format!("Invalid CORS origin: {}", config.cors_origin))?;

        let state = Self::with_store(store, config.occupancy_retry_limit, cors_origin);
        info!("Successfully initialized prison management application state");
        Ok(state)
    }

    pub fn with_store(
        store: Arc<dyn DocumentStore>,
        retry_limit: u32,
        cors_origin: HeaderValue,
    ) -> Self {
        let records = Records::new(store);
        let occupancy = OccupancyCoordinator::with_retry_limit(records.clone(), retry_limit);
        Self {
            records,
            occupancy,
            cors_origin,
        }
    }

    /// Empty in-memory state with default settings
    pub fn in_memory() -> Self {
        Self::with_store(
            Arc::new(MemoryStore::new()),
            custody::DEFAULT_RETRY_LIMIT,
            HeaderValue::from_static(DEFAULT_CORS_ORIGIN),
        )
    }
}

/// Error response format
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: String,
}

/// Custom error type for API responses
#[derive(Debug)]
pub struct AppError {
    pub status_code: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl AppError {
    pub fn not_found(entity: &str, id: &str) -> Self {
        AppError {
            status_code: StatusCode::NOT_FOUND,
            code: "NOT_FOUND",
            message: format!("{} not found: {}", entity, id),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError {
            status_code: StatusCode::BAD_REQUEST,
            code: "BAD_REQUEST",
            message: message.into(),
        }
    }
}

impl From<CustodyError> for AppError {
    fn from(err: CustodyError) -> Self {
        let (status_code, code) = match &err {
            CustodyError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            CustodyError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            CustodyError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            CustodyError::InvalidReference(_) => (StatusCode::BAD_REQUEST, "INVALID_REFERENCE"),
            CustodyError::Store(e) => {
                error!("Store failure: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };
        AppError {
            status_code,
            code,
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        error!("Internal error: {:#}", err);
        AppError {
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR",
            message: format!("Internal server error: {}", err),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status_code,
            Json(ErrorResponse {
                error: self.message,
                code: self.code.to_string(),
            }),
        )
            .into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Health check endpoint
async fn healthz() -> impl IntoResponse {
    "OK"
}

/// Create the Axum application router
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(state.cors_origin.clone())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/healthz", get(healthz))
        .nest("/api", routes::routes())
        .layer(cors)
        // Avoid logging request headers.
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
