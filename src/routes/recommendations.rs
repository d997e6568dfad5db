use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{error::AppResult, routes::AppState, services::Recommender};

/// Six recommendation cards fit the dashboard layout.
const DEFAULT_TOP_K: usize = 6;

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    /// One or more selected plants, equally weighted.
    pub plants: Vec<String>,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    /// Recommended plant names, most similar first.
    pub plants: Vec<String>,
}

/// Handler for the recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    let recommender = Recommender::new(&state.catalog, &state.similarity);
    let plants = recommender.recommend(&request.plants, request.top_k)?;

    tracing::info!(
        selected = request.plants.len(),
        top_k = request.top_k,
        returned = plants.len(),
        "Recommendations served"
    );

    Ok(Json(RecommendationResponse { plants }))
}
