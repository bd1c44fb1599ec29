use axum::{
    extract::Query,
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Extension, Router,
};
use hyper::Server;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

use crate::error::IngestError;
use crate::gazetteer::Gazetteer;
use crate::metrics::render_metrics;
use crate::pipeline::Ingestor;
use crate::storage::SnapshotStore;

#[derive(Debug, Deserialize)]
struct UploadParams {
    filename: Option<String>,
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "ncix-ingest",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Ingest one CSV document sent as the request body.
///
/// The source filename rides in the `filename` query parameter and must end
/// in `.csv`. Unusable input maps to 400; store failures map to 500.
async fn upload(
    Extension(store): Extension<Arc<dyn SnapshotStore>>,
    Query(params): Query<UploadParams>,
    body: String,
) -> Response {
    let filename = match params.filename.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return error_body(StatusCode::BAD_REQUEST, "No file uploaded"),
    };
    if !filename.ends_with(".csv") {
        return error_body(StatusCode::BAD_REQUEST, "Only CSV files are allowed");
    }

    match Ingestor::run(&body, &filename, store).await {
        Ok(report) => Json(serde_json::json!({
            "success": true,
            "message": "Data processed successfully",
            "runId": report.run_id,
            "statistics": report.statistics,
            "outputFile": report.output_file,
        }))
        .into_response(),
        Err(e @ (IngestError::EmptyInput | IngestError::MissingColumns(_))) => {
            error_body(StatusCode::BAD_REQUEST, &e.to_string())
        }
        Err(e) => {
            error!("Upload processing failed: {}", e);
            error_body(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

/// Latest snapshot document, verbatim.
async fn members(Extension(store): Extension<Arc<dyn SnapshotStore>>) -> Response {
    match store.load_latest().await {
        Ok(Some(snapshot)) => Json(snapshot).into_response(),
        Ok(None) => error_body(StatusCode::NOT_FOUND, "No data available"),
        Err(e) => {
            error!("Failed to load latest snapshot: {}", e);
            error_body(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

/// The gazetteer, for map bootstrapping before any upload exists.
async fn locations() -> impl IntoResponse {
    Json(serde_json::json!({
        "locations": Gazetteer::global().entries()
    }))
}

/// Prometheus exposition text.
async fn metrics_text() -> Response {
    match render_metrics() {
        Some(text) => text.into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "metrics recorder not installed",
        )
            .into_response(),
    }
}

/// Create the HTTP server with all routes
pub fn create_server(store: Arc<dyn SnapshotStore>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/upload", post(upload))
        .route("/api/data/members", get(members))
        .route("/api/data/locations", get(locations))
        .route("/metrics", get(metrics_text))
        .layer(Extension(store))
        .layer(ServiceBuilder::new().layer(cors))
}

/// Start the HTTP server on the specified port
pub async fn start_server(
    store: Arc<dyn SnapshotStore>,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_server(store);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    println!("🚀 HTTP server running on http://localhost:{port}");
    println!("💚 Health check:  http://localhost:{port}/health");
    println!("📤 Upload:        POST http://localhost:{port}/api/upload?filename=<name>.csv");
    println!("📊 Members data:  http://localhost:{port}/api/data/members");
    println!("📈 Metrics:       http://localhost:{port}/metrics");

    Server::bind(&addr).serve(app.into_make_service()).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemorySnapshotStore;

    const SAMPLE: &str = "\
PERIOD,CUSTOMER,LOCATION_DC,MEMBERSHIP_NCIX
202412,Acme Corp,JAKARTA MERUYA,Membership Class A
202412,Globex,BATAM CENTRE,Member
";

    fn store() -> Arc<dyn SnapshotStore> {
        Arc::new(InMemorySnapshotStore::new())
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn query(filename: Option<&str>) -> Query<UploadParams> {
        Query(UploadParams {
            filename: filename.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn test_upload_happy_path() {
        let store = store();
        let response = upload(
            Extension(store.clone()),
            query(Some("members.csv")),
            SAMPLE.to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Data processed successfully");
        assert_eq!(body["statistics"]["processed"], 2);
        assert!(body["outputFile"].as_str().unwrap().starts_with("members-"));

        let latest = store.load_latest().await.unwrap().unwrap();
        assert_eq!(latest.members.len(), 2);
    }

    #[tokio::test]
    async fn test_upload_requires_filename() {
        let response = upload(Extension(store()), query(None), SAMPLE.to_string()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "No file uploaded");
    }

    #[tokio::test]
    async fn test_upload_rejects_non_csv_filename() {
        let response = upload(
            Extension(store()),
            query(Some("members.xlsx")),
            SAMPLE.to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "Only CSV files are allowed");
    }

    #[tokio::test]
    async fn test_upload_maps_empty_input_to_bad_request() {
        let response = upload(Extension(store()), query(Some("x.csv")), "  ".to_string()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_maps_missing_columns_to_bad_request() {
        let response = upload(
            Extension(store()),
            query(Some("x.csv")),
            "PERIOD,LOCATION_DC\n202412,MALANG\n".to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("CUSTOMER"));
        assert!(body["error"].as_str().unwrap().contains("MEMBERSHIP_NCIX"));
    }

    #[tokio::test]
    async fn test_members_is_404_before_first_upload() {
        let response = members(Extension(store())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"], "No data available");
    }

    #[tokio::test]
    async fn test_members_returns_latest_document() {
        let store = store();
        upload(
            Extension(store.clone()),
            query(Some("members.csv")),
            SAMPLE.to_string(),
        )
        .await;

        let response = members(Extension(store)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["metadata"]["sourceFile"], "members.csv");
        assert_eq!(body["members"].as_array().unwrap().len(), 2);
        assert_eq!(body["locations"].as_array().unwrap().len(), 26);
    }

    #[tokio::test]
    async fn test_locations_lists_full_gazetteer() {
        let response = locations().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let entries = body["locations"].as_array().unwrap();
        assert_eq!(entries.len(), 26);
        assert_eq!(entries[0]["name"], "JAKARTA KARET TENGSIN");
        assert_eq!(entries[0]["city"], "Jakarta");
    }

    #[tokio::test]
    async fn test_health_reports_service_name() {
        let response = health().await.into_response();
        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "ncix-ingest");
    }
}
