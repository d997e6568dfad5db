use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::ProjectionPoint,
    routes::AppState,
};

/// Handler for a full scatter layout, for the dashboard to plot.
pub async fn layout(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> AppResult<Json<Vec<ProjectionPoint>>> {
    let projection = state
        .projections
        .get(&name)
        .ok_or_else(|| AppError::NotFound(format!("unknown projection: {}", name)))?;

    Ok(Json(projection.points.clone()))
}
