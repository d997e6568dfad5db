use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{error::AppResult, routes::AppState, services::NeighborLocator};

/// The comparison panel shows three most similar and three most different.
const DEFAULT_K: usize = 3;

#[derive(Debug, Deserialize)]
pub struct NeighborQuery {
    pub plant: String,
    pub projection: String,
    #[serde(default = "default_k")]
    pub k_near: usize,
    #[serde(default = "default_k")]
    pub k_far: usize,
}

fn default_k() -> usize {
    DEFAULT_K
}

#[derive(Debug, Serialize)]
pub struct NeighborResponse {
    /// Nearest plants first (ascending distance), then farthest
    /// (descending distance).
    pub plants: Vec<String>,
}

/// Handler for the scatter-view neighbor endpoint
pub async fn neighbors(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NeighborQuery>,
) -> AppResult<Json<NeighborResponse>> {
    let locator = NeighborLocator::new(&state.catalog, &state.projections);
    let plants = locator.nearest_and_farthest(
        &params.plant,
        &params.projection,
        params.k_near,
        params.k_far,
    )?;

    Ok(Json(NeighborResponse { plants }))
}
