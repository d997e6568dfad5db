use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppResult;

pub mod google;

pub use google::GoogleCustomSearch;

/// An image the search turned up: where the file is and which site it came
/// from (shown as attribution next to the plant card).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageHit {
    pub url: String,
    pub website: String,
}

/// Search-API abstraction used by the ingest pipeline.
///
/// The pipeline only cares about two questions per plant: where its page on
/// the botanical reference site is, and where a usable photo is. Keeping
/// this a trait lets the batch loops run against a mock in tests and leaves
/// room for a different search vendor.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ReferenceSearcher: Send + Sync {
    /// Resolves the reference-site link for a plant.
    ///
    /// Returns `None` when the top hit is not a plant-detail page; anything
    /// else on the reference site (search pages, glossaries) is useless to
    /// the detail scraper.
    async fn find_reference_link(&self, latin_name: &str) -> AppResult<Option<String>>;

    /// Finds an image for a plant.
    async fn find_image(&self, latin_name: &str) -> AppResult<Option<ImageHit>>;
}

/// Outcome of a batch link search, partitioned so both halves can be stored:
/// unresolved names get sentinel rows and are never searched again.
#[derive(Debug, Default)]
pub struct LinkResolution {
    pub resolved: Vec<(String, String)>,
    pub unresolved: Vec<String>,
}

/// Resolves reference links for a batch of names, politely spacing requests.
///
/// Errors abort the batch; the quota guard inside the searcher surfaces
/// exhaustion as an error before any quota is wasted.
pub async fn resolve_links(
    searcher: &dyn ReferenceSearcher,
    latin_names: &[String],
    delay: Duration,
) -> AppResult<LinkResolution> {
    let mut resolution = LinkResolution::default();

    for (index, name) in latin_names.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(delay).await;
        }

        match searcher.find_reference_link(name).await? {
            Some(url) => {
                tracing::info!(plant = %name, url = %url, "Reference link resolved");
                resolution.resolved.push((name.clone(), url));
            }
            None => {
                tracing::info!(plant = %name, "No reference link found");
                resolution.unresolved.push(name.clone());
            }
        }
    }

    Ok(resolution)
}

/// Outcome of a batch image search.
#[derive(Debug, Default)]
pub struct ImageResolution {
    pub resolved: Vec<(String, ImageHit)>,
    pub unresolved: Vec<String>,
}

/// Finds images for a batch of names, politely spacing requests.
pub async fn resolve_images(
    searcher: &dyn ReferenceSearcher,
    latin_names: &[String],
    delay: Duration,
) -> AppResult<ImageResolution> {
    let mut resolution = ImageResolution::default();

    for (index, name) in latin_names.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(delay).await;
        }

        match searcher.find_image(name).await? {
            Some(hit) => {
                tracing::info!(plant = %name, url = %hit.url, "Image found");
                resolution.resolved.push((name.clone(), hit));
            }
            None => {
                tracing::info!(plant = %name, "No image found");
                resolution.unresolved.push(name.clone());
            }
        }
    }

    Ok(resolution)
}
