use sqlx::SqlitePool;

use crate::{
    error::{AppError, AppResult},
    models::{Plant, PlantDetails, PlantImage},
};

/// Sentinel stored in `hyperlinks.url` when the search found nothing.
pub const NO_LINK_SENTINEL: &str = "no link found";

/// Sentinel stored in `plant_images` when the image search found nothing.
pub const NO_IMAGE_SENTINEL: &str = "no image found";

/// Assembles everything the presentation layer shows for one plant: the
/// scraped metadata row plus its image and reference link when those were
/// resolved during ingest.
pub async fn plant_details(pool: &SqlitePool, plant_name: &str) -> AppResult<PlantDetails> {
    let plant: Plant = sqlx::query_as("SELECT * FROM plants WHERE plant_name = ?")
        .bind(plant_name)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("unknown plant: {}", plant_name)))?;

    let image: Option<PlantImage> =
        sqlx::query_as("SELECT * FROM plant_images WHERE plant_name = ? AND file_path <> ?")
            .bind(plant_name)
            .bind(NO_IMAGE_SENTINEL)
            .fetch_optional(pool)
            .await?;

    let reference_url: Option<String> =
        sqlx::query_scalar("SELECT url FROM hyperlinks WHERE plant_name = ? AND url <> ?")
            .bind(plant_name)
            .bind(NO_LINK_SENTINEL)
            .fetch_optional(pool)
            .await?;

    Ok(PlantDetails {
        common_names_display: plant.common_names_display(),
        plant,
        image,
        reference_url,
    })
}
