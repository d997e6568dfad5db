use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::AppResult, models::PlantDetails, routes::AppState, services::details::plant_details,
};

/// Handler for the catalog listing: every plant name in position order.
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.catalog.ids().to_vec())
}

/// Handler for a single plant's detail card.
pub async fn detail(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> AppResult<Json<PlantDetails>> {
    let details = plant_details(&state.db_pool, &name).await?;
    Ok(Json(details))
}
