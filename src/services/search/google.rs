/// Google Custom Search client
///
/// Resolves reference-site links and plant images through the paid Custom
/// Search JSON API. Two things make this client careful with requests:
/// answers are cached in Redis for a month (search results for a latin name
/// barely change), and a daily quota counter fails closed before the API's
/// own 100-queries/day limit is hit. Ingest runs across several days lean
/// on both.
use chrono::Utc;
use redis::{AsyncCommands, Client as RedisClient};
use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    services::search::{ImageHit, ReferenceSearcher},
};

const LINK_CACHE_TTL: u64 = 2_592_000; // 30 days
const DAILY_QUOTA: u32 = 100;

/// Only plant-detail pages are worth handing to the scraper.
const DETAIL_PAGE_MARKER: &str = "/PlantFinder/PlantFinderDetails";

pub struct GoogleCustomSearch {
    http_client: HttpClient,
    redis_client: RedisClient,
    cache: Cache,
    api_key: String,
    engine_id: String,
    api_url: String,
    reference_site: String,
}

impl GoogleCustomSearch {
    pub fn new(
        cache: Cache,
        redis_client: RedisClient,
        api_key: String,
        engine_id: String,
        api_url: String,
        reference_site: String,
    ) -> Self {
        Self {
            http_client: HttpClient::new(),
            redis_client,
            cache,
            api_key,
            engine_id,
            api_url,
            reference_site,
        }
    }

    /// Runs one search query and returns the raw result items.
    async fn query_api(&self, query_params: &[(&str, &str)]) -> AppResult<Vec<SearchItem>> {
        self.check_quota().await?;

        let url = format!("{}/customsearch/v1", self.api_url);
        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
            ])
            .query(query_params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Search API returned status {}: {}",
                status, body
            )));
        }

        let results: SearchResponse = response.json().await?;
        self.increment_quota().await?;

        Ok(results.items)
    }

    /// Checks the daily quota counter before spending a query.
    async fn check_quota(&self) -> AppResult<()> {
        let day_key = quota_key();
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;

        let count: u32 = conn.get(&day_key).await.unwrap_or(0);

        if count >= DAILY_QUOTA {
            tracing::error!(current = count, quota = DAILY_QUOTA, "Daily search quota exhausted");
            return Err(AppError::ExternalApi(
                "daily search quota exhausted, retry tomorrow".to_string(),
            ));
        }

        if count as f32 / DAILY_QUOTA as f32 > 0.8 {
            tracing::warn!(
                current = count,
                quota = DAILY_QUOTA,
                remaining = DAILY_QUOTA - count,
                "Search quota at 80%"
            );
        }

        Ok(())
    }

    /// Bumps the daily quota counter after a successful query.
    async fn increment_quota(&self) -> AppResult<()> {
        let day_key = quota_key();
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;

        let count: u32 = conn.incr(&day_key, 1).await?;
        // Keep the counter around past midnight so a late run still sees it.
        let _: () = conn.expire(&day_key, 60 * 60 * 48).await?;

        tracing::debug!(daily_count = count, "Search quota incremented");

        Ok(())
    }
}

/// Quota counter key for today, UTC.
fn quota_key() -> String {
    format!("search_quota:{}", Utc::now().format("%Y-%m-%d"))
}

/// Whether a result URL points at a plant-detail page on the reference site.
fn is_detail_page(link: &str) -> bool {
    link.contains(DETAIL_PAGE_MARKER)
}

#[async_trait::async_trait]
impl ReferenceSearcher for GoogleCustomSearch {
    async fn find_reference_link(&self, latin_name: &str) -> AppResult<Option<String>> {
        if latin_name.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "plant name cannot be empty".to_string(),
            ));
        }

        cached!(
            self.cache,
            CacheKey::ReferenceLink(latin_name.to_string()),
            LINK_CACHE_TTL,
            async move {
                // Exact-phrase query pinned to the reference site.
                let query = format!("\"{}\" site:{}", latin_name, self.reference_site);
                let items = self.query_api(&[("q", query.as_str())]).await?;

                let link: Option<String> = items
                    .into_iter()
                    .next()
                    .map(|item| item.link)
                    .filter(|link| is_detail_page(link));

                tracing::info!(
                    plant = %latin_name,
                    found = link.is_some(),
                    provider = "google",
                    "Reference link search completed"
                );

                Ok::<_, AppError>(link)
            }
        )
    }

    async fn find_image(&self, latin_name: &str) -> AppResult<Option<ImageHit>> {
        if latin_name.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "plant name cannot be empty".to_string(),
            ));
        }

        cached!(
            self.cache,
            CacheKey::PlantImage(latin_name.to_string()),
            LINK_CACHE_TTL,
            async move {
                let items = self
                    .query_api(&[
                        ("q", latin_name),
                        ("searchType", "image"),
                        ("num", "1"),
                    ])
                    .await?;

                let hit: Option<ImageHit> = items.into_iter().next().map(|item| {
                    let website = item
                        .image
                        .and_then(|info| info.context_link)
                        .or(item.display_link)
                        .unwrap_or_else(|| "unknown".to_string());
                    ImageHit {
                        url: item.link,
                        website,
                    }
                });

                tracing::info!(
                    plant = %latin_name,
                    found = hit.is_some(),
                    provider = "google",
                    "Image search completed"
                );

                Ok::<_, AppError>(hit)
            }
        )
    }
}

/// Custom Search JSON API response; `items` is absent when nothing matched.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItem {
    link: String,
    #[serde(default)]
    display_link: Option<String>,
    #[serde(default)]
    image: Option<ImageInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageInfo {
    #[serde(default)]
    context_link: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_detail_page() {
        assert!(is_detail_page(
            "https://www.missouribotanicalgarden.org/PlantFinder/PlantFinderDetails.aspx?kempercode=b553"
        ));
        assert!(!is_detail_page(
            "https://www.missouribotanicalgarden.org/gardens-gardening"
        ));
        assert!(!is_detail_page("https://en.wikipedia.org/wiki/Monstera"));
    }

    #[test]
    fn test_search_response_deserialization() {
        let json = r#"{
            "items": [
                {
                    "link": "https://www.missouribotanicalgarden.org/PlantFinder/PlantFinderDetails.aspx?kempercode=b553",
                    "displayLink": "www.missouribotanicalgarden.org"
                }
            ]
        }"#;

        let response: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.items.len(), 1);
        assert!(is_detail_page(&response.items[0].link));
        assert_eq!(
            response.items[0].display_link.as_deref(),
            Some("www.missouribotanicalgarden.org")
        );
    }

    #[test]
    fn test_search_response_without_items() {
        let response: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(response.items.is_empty());
    }

    #[test]
    fn test_image_item_deserialization() {
        let json = r#"{
            "link": "https://img.example.org/monstera.jpg",
            "displayLink": "img.example.org",
            "image": { "contextLink": "https://example.org/monstera" }
        }"#;

        let item: SearchItem = serde_json::from_str(json).unwrap();
        let context = item.image.unwrap().context_link.unwrap();
        assert_eq!(context, "https://example.org/monstera");
    }

    #[test]
    fn test_quota_key_shape() {
        let key = quota_key();
        assert!(key.starts_with("search_quota:"));
        // YYYY-MM-DD suffix
        assert_eq!(key.len(), "search_quota:".len() + 10);
    }
}
