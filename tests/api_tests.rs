use std::sync::Arc;

use axum_test::TestServer;
use serde_json::json;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use verdant_api::db::load;
use verdant_api::routes::{create_router, AppState};

/// Fixture catalog in position order with the similarity rows the
/// recommendation assertions are written against.
const PLANTS: [&str; 4] = [
    "Monstera deliciosa",
    "Aechmea",
    "Calathea ornata",
    "Ficus lyrata",
];

async fn seed_database(pool: &SqlitePool) {
    for name in PLANTS {
        sqlx::query(
            "INSERT INTO plants VALUES (?, 'a,b', 'Vine', 'Araceae', '10 to 12', 'Mexico',
             '10 feet', '6 feet', 'Seasonal', 'White', 'Part shade', 'Medium', 'Low',
             'Showy', 'Evergreen', 'Showy')",
        )
        .bind(name)
        .execute(pool)
        .await
        .unwrap();
    }

    let matrix = json!([
        [1.0, 0.9, 0.1, 0.5],
        [0.9, 1.0, 0.2, 0.2],
        [0.1, 0.2, 1.0, 0.7],
        [0.5, 0.2, 0.7, 1.0]
    ]);
    sqlx::query("INSERT INTO similarity (matrix) VALUES (?)")
        .bind(matrix.to_string())
        .execute(pool)
        .await
        .unwrap();

    let points = [
        ("Monstera deliciosa", 0.0, 0.0),
        ("Aechmea", 1.0, 0.0),
        ("Calathea ornata", 0.0, 2.0),
        ("Ficus lyrata", 3.0, 3.0),
    ];
    for (name, x, y) in points {
        sqlx::query("INSERT INTO projections VALUES ('tsne_all', ?, ?, ?)")
            .bind(name)
            .bind(x)
            .bind(y)
            .execute(pool)
            .await
            .unwrap();
    }

    sqlx::query(
        "INSERT INTO plant_images VALUES
            ('Monstera deliciosa', 'images/Monstera_deliciosa.jpg', 'https://example.org')",
    )
    .execute(pool)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO hyperlinks VALUES
            ('Monstera deliciosa', 'https://example.org/PlantFinder/PlantFinderDetails.aspx?kempercode=b553'),
            ('Aechmea', 'no link found')",
    )
    .execute(pool)
    .await
    .unwrap();
}

async fn create_test_server() -> TestServer {
    // One connection keeps the in-memory database shared across queries.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    seed_database(&pool).await;

    let catalog = Arc::new(load::load_catalog(&pool).await.unwrap());
    let similarity = Arc::new(load::load_similarity(&pool, &catalog).await.unwrap());
    let projections = Arc::new(load::load_projections(&pool, &catalog).await.unwrap());

    let state = Arc::new(AppState {
        db_pool: pool,
        catalog,
        similarity,
        projections,
    });

    TestServer::new(create_router(state)).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server().await;
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_list_plants_in_catalog_order() {
    let server = create_test_server().await;

    let response = server.get("/api/v1/plants").await;
    response.assert_status_ok();

    let names: Vec<String> = response.json();
    assert_eq!(names, PLANTS);
}

#[tokio::test]
async fn test_plant_detail() {
    let server = create_test_server().await;

    let response = server.get("/api/v1/plants/Monstera%20deliciosa").await;
    response.assert_status_ok();

    let details: serde_json::Value = response.json();
    assert_eq!(details["plant_name"], "Monstera deliciosa");
    assert_eq!(details["family"], "Araceae");
    assert_eq!(details["common_names_display"], "a, b");
    assert_eq!(
        details["image"]["file_path"],
        "images/Monstera_deliciosa.jpg"
    );
    assert_eq!(
        details["reference_url"],
        "https://example.org/PlantFinder/PlantFinderDetails.aspx?kempercode=b553"
    );
}

#[tokio::test]
async fn test_plant_detail_sentinel_link_hidden() {
    let server = create_test_server().await;

    let response = server.get("/api/v1/plants/Aechmea").await;
    response.assert_status_ok();

    let details: serde_json::Value = response.json();
    assert!(details["reference_url"].is_null());
    assert!(details["image"].is_null());
}

#[tokio::test]
async fn test_plant_detail_not_found() {
    let server = create_test_server().await;

    let response = server.get("/api/v1/plants/Ghost%20orchid").await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);

    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("Ghost orchid"));
}

#[tokio::test]
async fn test_recommendations_single_plant() {
    let server = create_test_server().await;

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "plants": ["Monstera deliciosa"], "top_k": 2 }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["plants"], json!(["Aechmea", "Ficus lyrata"]));
}

#[tokio::test]
async fn test_recommendations_multiple_plants() {
    let server = create_test_server().await;

    // Combined: Aechmea = 0.9 + 0.2 = 1.1, Ficus = 0.5 + 0.7 = 1.2
    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "plants": ["Monstera deliciosa", "Calathea ornata"], "top_k": 2 }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["plants"], json!(["Ficus lyrata", "Aechmea"]));
}

#[tokio::test]
async fn test_recommendations_default_top_k_returns_available() {
    let server = create_test_server().await;

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "plants": ["Monstera deliciosa"] }))
        .await;
    response.assert_status_ok();

    // Default top_k is 6 but only 3 other plants exist.
    let body: serde_json::Value = response.json();
    assert_eq!(body["plants"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_recommendations_empty_selection_rejected() {
    let server = create_test_server().await;

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "plants": [] }))
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recommendations_unknown_plant() {
    let server = create_test_server().await;

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "plants": ["Ghost orchid"] }))
        .await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);

    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("Ghost orchid"));
}

#[tokio::test]
async fn test_neighbors() {
    let server = create_test_server().await;

    let response = server
        .get("/api/v1/neighbors")
        .add_query_param("plant", "Monstera deliciosa")
        .add_query_param("projection", "tsne_all")
        .add_query_param("k_near", "1")
        .add_query_param("k_far", "1")
        .await;
    response.assert_status_ok();

    // Distances from Monstera: Aechmea=1, Calathea=2, Ficus=6
    let body: serde_json::Value = response.json();
    assert_eq!(body["plants"], json!(["Aechmea", "Ficus lyrata"]));
}

#[tokio::test]
async fn test_neighbors_default_k() {
    let server = create_test_server().await;

    let response = server
        .get("/api/v1/neighbors")
        .add_query_param("plant", "Monstera deliciosa")
        .add_query_param("projection", "tsne_all")
        .await;
    response.assert_status_ok();

    // Three near plus three far over a three-plant candidate pool.
    let body: serde_json::Value = response.json();
    assert_eq!(body["plants"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_neighbors_unknown_projection() {
    let server = create_test_server().await;

    let response = server
        .get("/api/v1/neighbors")
        .add_query_param("plant", "Monstera deliciosa")
        .add_query_param("projection", "sunlight_water")
        .await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_projection_layout() {
    let server = create_test_server().await;

    let response = server.get("/api/v1/projections/tsne_all").await;
    response.assert_status_ok();

    let points: Vec<serde_json::Value> = response.json();
    assert_eq!(points.len(), 4);
    assert_eq!(points[0]["plant_name"], "Monstera deliciosa");
    assert_eq!(points[3]["plant_name"], "Ficus lyrata");
}

#[tokio::test]
async fn test_projection_layout_not_found() {
    let server = create_test_server().await;

    let response = server.get("/api/v1/projections/heights_spreads").await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}
