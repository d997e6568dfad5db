use std::collections::HashMap;

use sqlx::SqlitePool;

use crate::{
    error::{AppError, AppResult},
    models::{PlantCatalog, Projection, ProjectionPoint, ProjectionSet, SimilarityMatrix},
};

/// Loads the plant catalog in table row order.
///
/// Row order is the position order: the offline modeling step that produced
/// the similarity matrix iterated the same table the same way, so row index
/// here is the matrix index there.
pub async fn load_catalog(pool: &SqlitePool) -> AppResult<PlantCatalog> {
    let names: Vec<String> = sqlx::query_scalar("SELECT plant_name FROM plants ORDER BY rowid")
        .fetch_all(pool)
        .await?;

    PlantCatalog::from_ids(names)
}

/// Loads the similarity matrix from its single JSON blob row and validates
/// it against the catalog size.
pub async fn load_similarity(
    pool: &SqlitePool,
    catalog: &PlantCatalog,
) -> AppResult<SimilarityMatrix> {
    let blob: Option<String> = sqlx::query_scalar("SELECT matrix FROM similarity ORDER BY id LIMIT 1")
        .fetch_optional(pool)
        .await?;

    let blob = blob.ok_or_else(|| {
        AppError::Internal("similarity table is empty; run the offline modeling step".to_string())
    })?;

    let rows: Vec<Vec<f64>> = serde_json::from_str(&blob)
        .map_err(|e| AppError::Internal(format!("similarity matrix is not valid JSON: {}", e)))?;

    let matrix = SimilarityMatrix::from_rows(rows)?;

    if matrix.len() != catalog.len() {
        return Err(AppError::Internal(format!(
            "similarity matrix covers {} plants but the catalog has {}",
            matrix.len(),
            catalog.len()
        )));
    }

    Ok(matrix)
}

/// Loads every named projection, re-ordering points into catalog position
/// order and refusing layouts that do not cover the catalog exactly.
pub async fn load_projections(
    pool: &SqlitePool,
    catalog: &PlantCatalog,
) -> AppResult<ProjectionSet> {
    let rows: Vec<(String, String, f64, f64)> =
        sqlx::query_as("SELECT projection, plant_name, x, y FROM projections")
            .fetch_all(pool)
            .await?;

    let mut slots: HashMap<String, Vec<Option<ProjectionPoint>>> = HashMap::new();

    for (projection, plant_name, x, y) in rows {
        let position = catalog.position(&plant_name).ok_or_else(|| {
            AppError::Internal(format!(
                "projection {} references a plant not in the catalog: {}",
                projection, plant_name
            ))
        })?;

        let points = slots
            .entry(projection.clone())
            .or_insert_with(|| vec![None; catalog.len()]);

        if points[position].is_some() {
            return Err(AppError::Internal(format!(
                "projection {} has duplicate coordinates for {}",
                projection, plant_name
            )));
        }
        points[position] = Some(ProjectionPoint { plant_name, x, y });
    }

    let mut set = ProjectionSet::default();
    for (name, points) in slots {
        let mut ordered = Vec::with_capacity(points.len());
        for (position, point) in points.into_iter().enumerate() {
            match point {
                Some(point) => ordered.push(point),
                None => {
                    return Err(AppError::Internal(format!(
                        "projection {} is missing a point for {}",
                        name,
                        catalog.id_at(position).unwrap_or("?")
                    )))
                }
            }
        }
        set.insert(Projection {
            name,
            points: ordered,
        });
    }

    Ok(set)
}
