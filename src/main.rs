use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use verdant_api::{
    config::Config,
    db,
    routes::{create_router, AppState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let db_pool = db::create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&db_pool).await?;

    // All three tables are read once here and shared read-only with every
    // request; mismatches between them are startup failures, not 500s.
    let catalog = Arc::new(db::load::load_catalog(&db_pool).await?);
    let similarity = Arc::new(db::load::load_similarity(&db_pool, &catalog).await?);
    let projections = Arc::new(db::load::load_projections(&db_pool, &catalog).await?);

    tracing::info!(
        plants = catalog.len(),
        projections = projections.len(),
        "Catalog loaded"
    );

    let state = Arc::new(AppState {
        db_pool,
        catalog,
        similarity,
        projections,
    });

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
