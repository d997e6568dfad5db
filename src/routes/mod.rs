use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware as axum_middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id;
use crate::models::{PlantCatalog, ProjectionSet, SimilarityMatrix};

pub mod neighbors;
pub mod plants;
pub mod projections;
pub mod recommendations;

/// Shared application state.
///
/// The catalog, similarity matrix, and projections are loaded once at
/// startup and only ever read; the pool serves the detail lookups.
pub struct AppState {
    pub db_pool: SqlitePool,
    pub catalog: Arc<PlantCatalog>,
    pub similarity: Arc<SimilarityMatrix>,
    pub projections: Arc<ProjectionSet>,
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes(state))
        .layer(
            ServiceBuilder::new()
                .layer(axum_middleware::from_fn(request_id::request_id_middleware))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(request_id::make_span_with_request_id),
                )
                // The dashboard is served from a different origin.
                .layer(CorsLayer::permissive()),
        )
}

/// API routes under /api/v1
fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/plants", get(plants::list))
        .route("/plants/:name", get(plants::detail))
        .route("/recommendations", post(recommendations::recommend))
        .route("/neighbors", get(neighbors::neighbors))
        .route("/projections/:name", get(projections::layout))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
