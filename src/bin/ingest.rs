use std::time::Duration;

use clap::{Parser, Subcommand};
use sqlx::SqlitePool;
use tracing_subscriber::EnvFilter;

use verdant_api::{
    config::Config,
    db::{self, redis::CacheWriterHandle, Cache},
    scrape::{botanical, retailer},
    services::{
        details::{NO_IMAGE_SENTINEL, NO_LINK_SENTINEL},
        search::{resolve_images, resolve_links, GoogleCustomSearch},
    },
};

/// Fixed delay between upstream requests; the retailer, the reference site,
/// and the search API are all hit politely.
const POLITE_DELAY: Duration = Duration::from_secs(2);

/// Offline pipeline that builds the houseplant database the API serves from
#[derive(Parser, Debug)]
#[command(name = "ingest")]
#[command(about = "Builds the houseplant database: scrape names, resolve links, scrape details, fetch images", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape the retailer listing and replace the stored latin names
    Catalog {
        /// Product-listing page to scrape
        #[arg(long)]
        url: String,
    },
    /// Resolve reference-site links for a range of latin names
    ///
    /// The search API allows 100 queries per day; run consecutive ranges on
    /// consecutive days.
    Links {
        /// First name index to search (inclusive)
        #[arg(long, default_value_t = 0)]
        start: usize,
        /// Last name index to search (exclusive)
        #[arg(long)]
        end: usize,
    },
    /// Scrape botanical metadata for every plant with a resolved link
    Details,
    /// Find and download images for a range of plants
    Images {
        /// First name index to search (inclusive)
        #[arg(long, default_value_t = 0)]
        start: usize,
        /// Last name index to search (exclusive)
        #[arg(long)]
        end: usize,
        /// Drop existing image rows before inserting
        #[arg(long)]
        restart: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;

    let db_pool = db::create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&db_pool).await?;

    match args.command {
        Command::Catalog { url } => run_catalog(&db_pool, &url).await,
        Command::Links { start, end } => run_links(&db_pool, &config, start, end).await,
        Command::Details => run_details(&db_pool).await,
        Command::Images {
            start,
            end,
            restart,
        } => run_images(&db_pool, &config, start, end, restart).await,
    }
}

/// Step 1: the retailer listing is the source of which plants exist at all.
async fn run_catalog(pool: &SqlitePool, url: &str) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let names = retailer::fetch_scientific_names(&client, url).await?;
    tracing::info!(count = names.len(), "Scientific names scraped");

    sqlx::query("DELETE FROM latin_names").execute(pool).await?;
    for name in &names {
        sqlx::query("INSERT INTO latin_names (plant_name) VALUES (?)")
            .bind(name)
            .execute(pool)
            .await?;
    }

    tracing::info!(count = names.len(), "Latin names stored");
    Ok(())
}

/// Step 2: resolve each name to its reference-site detail page.
async fn run_links(
    pool: &SqlitePool,
    config: &Config,
    start: usize,
    end: usize,
) -> anyhow::Result<()> {
    let names: Vec<String> =
        sqlx::query_scalar("SELECT plant_name FROM latin_names ORDER BY plant_name")
            .fetch_all(pool)
            .await?;

    let subset = slice_range(&names, start, end);
    if subset.is_empty() {
        anyhow::bail!(
            "range {}..{} selects no names ({} stored); run the catalog step first",
            start,
            end,
            names.len()
        );
    }

    let (searcher, cache_handle) = build_searcher(config).await?;
    let resolution = resolve_links(&searcher, subset, POLITE_DELAY).await?;

    for (name, url) in &resolution.resolved {
        sqlx::query("INSERT OR REPLACE INTO hyperlinks (plant_name, url) VALUES (?, ?)")
            .bind(name)
            .bind(url)
            .execute(pool)
            .await?;
    }
    for name in &resolution.unresolved {
        sqlx::query("INSERT OR REPLACE INTO hyperlinks (plant_name, url) VALUES (?, ?)")
            .bind(name)
            .bind(NO_LINK_SENTINEL)
            .execute(pool)
            .await?;
    }

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM hyperlinks")
        .fetch_one(pool)
        .await?;
    let found: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM hyperlinks WHERE url <> ?")
        .bind(NO_LINK_SENTINEL)
        .fetch_one(pool)
        .await?;
    tracing::info!(
        searched = total,
        found,
        missing = total - found,
        "Link search state"
    );

    cache_handle.shutdown().await;
    Ok(())
}

/// Step 3: scrape the detail page of every plant that has a link.
async fn run_details(pool: &SqlitePool) -> anyhow::Result<()> {
    let rows: Vec<(String, String)> =
        sqlx::query_as("SELECT plant_name, url FROM hyperlinks WHERE url <> ? ORDER BY plant_name")
            .bind(NO_LINK_SENTINEL)
            .fetch_all(pool)
            .await?;

    if rows.is_empty() {
        anyhow::bail!("no resolved links in the database; run the links step first");
    }

    let client = reqwest::Client::new();
    let mut plants = Vec::with_capacity(rows.len());

    for (index, (name, url)) in rows.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(POLITE_DELAY).await;
        }
        tracing::info!(plant = %name, url = %url, "Scraping detail page");
        let scraped = botanical::fetch_plant_page(&client, url).await?;
        plants.push(scraped.into_plant(name.clone()));
    }

    // Replace wholesale; catalog positions are assigned by this insert order.
    sqlx::query("DELETE FROM plants").execute(pool).await?;
    for plant in &plants {
        sqlx::query(
            "INSERT INTO plants VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&plant.plant_name)
        .bind(&plant.common_names)
        .bind(&plant.plant_type)
        .bind(&plant.family)
        .bind(&plant.zones)
        .bind(&plant.native_range)
        .bind(&plant.heights)
        .bind(&plant.spreads)
        .bind(&plant.bloom_times)
        .bind(&plant.bloom_description)
        .bind(&plant.sunlight)
        .bind(&plant.watering)
        .bind(&plant.maintenance)
        .bind(&plant.flowers)
        .bind(&plant.leafs)
        .bind(&plant.fruits)
        .execute(pool)
        .await?;
    }

    tracing::info!(count = plants.len(), "Plant metadata stored");
    Ok(())
}

/// Step 4: find and download one image per plant.
async fn run_images(
    pool: &SqlitePool,
    config: &Config,
    start: usize,
    end: usize,
    restart: bool,
) -> anyhow::Result<()> {
    let names: Vec<String> = sqlx::query_scalar(
        "SELECT plant_name FROM hyperlinks WHERE url <> ? ORDER BY plant_name",
    )
    .bind(NO_LINK_SENTINEL)
    .fetch_all(pool)
    .await?;

    let subset = slice_range(&names, start, end);
    if subset.is_empty() {
        anyhow::bail!(
            "range {}..{} selects no names ({} with links); run the links step first",
            start,
            end,
            names.len()
        );
    }

    if restart {
        sqlx::query("DELETE FROM plant_images").execute(pool).await?;
    }

    let (searcher, cache_handle) = build_searcher(config).await?;
    let resolution = resolve_images(&searcher, subset, POLITE_DELAY).await?;

    tokio::fs::create_dir_all(&config.image_dir).await?;
    let client = reqwest::Client::new();

    for (name, hit) in &resolution.resolved {
        match download_image(&client, &config.image_dir, name, &hit.url).await {
            Ok(path) => {
                sqlx::query(
                    "INSERT OR REPLACE INTO plant_images (plant_name, file_path, website) VALUES (?, ?, ?)",
                )
                .bind(name)
                .bind(&path)
                .bind(&hit.website)
                .execute(pool)
                .await?;
            }
            Err(e) => {
                tracing::warn!(plant = %name, error = %e, "Image download failed");
                insert_image_sentinel(pool, name).await?;
            }
        }
    }
    for name in &resolution.unresolved {
        insert_image_sentinel(pool, name).await?;
    }

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM plant_images")
        .fetch_one(pool)
        .await?;
    let found: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM plant_images WHERE file_path <> ?")
        .bind(NO_IMAGE_SENTINEL)
        .fetch_one(pool)
        .await?;
    tracing::info!(
        searched = total,
        found,
        missing = total - found,
        "Image search state"
    );

    cache_handle.shutdown().await;
    Ok(())
}

async fn insert_image_sentinel(pool: &SqlitePool, name: &str) -> anyhow::Result<()> {
    sqlx::query(
        "INSERT OR REPLACE INTO plant_images (plant_name, file_path, website) VALUES (?, ?, ?)",
    )
    .bind(name)
    .bind(NO_IMAGE_SENTINEL)
    .bind(NO_IMAGE_SENTINEL)
    .execute(pool)
    .await?;
    Ok(())
}

async fn download_image(
    client: &reqwest::Client,
    image_dir: &str,
    name: &str,
    url: &str,
) -> anyhow::Result<String> {
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        anyhow::bail!("image host returned status {}", response.status());
    }
    let bytes = response.bytes().await?;

    let file_name = format!("{}.jpg", name.replace([' ', '/'], "_"));
    let path = std::path::Path::new(image_dir).join(file_name);
    tokio::fs::write(&path, &bytes).await?;

    Ok(path.to_string_lossy().into_owned())
}

/// Both search steps run over index ranges so multi-day quota splits line up
/// with the stored name order.
fn slice_range(names: &[String], start: usize, end: usize) -> &[String] {
    let end = end.min(names.len());
    let start = start.min(end);
    &names[start..end]
}

async fn build_searcher(config: &Config) -> anyhow::Result<(GoogleCustomSearch, CacheWriterHandle)> {
    if config.google_api_key.is_empty() || config.google_search_engine_id.is_empty() {
        anyhow::bail!(
            "GOOGLE_API_KEY and GOOGLE_SEARCH_ENGINE_ID must be set for the search steps"
        );
    }

    let redis_client = db::create_redis_client(&config.redis_url)?;
    let (cache, cache_handle) = Cache::new(redis_client.clone()).await;

    let searcher = GoogleCustomSearch::new(
        cache,
        redis_client,
        config.google_api_key.clone(),
        config.google_search_engine_id.clone(),
        config.google_api_url.clone(),
        config.reference_site_url.clone(),
    );

    Ok((searcher, cache_handle))
}
