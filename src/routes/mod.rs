//! Route definitions for the ad-serving API.

pub mod ads;
pub mod app_configs;
pub mod categories;
pub mod health;
pub mod serve;

use std::convert::Infallible;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::services::creatives::MEDIA_ROUTE;
use crate::AppState;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let upload = post(ads::upload)
        .layer::<_, Infallible>(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(state.config.max_upload_bytes));

    let api_routes = Router::new()
        .route("/categories", get(categories::list))
        .route("/serve", get(serve::serve))
        .route("/ads", get(ads::list).post(ads::create))
        .route("/ads/upload", upload)
        .route(
            "/ads/{ad_id}",
            get(ads::get_by_id).put(ads::update).delete(ads::delete),
        )
        .route(
            "/apps/{app_id}/config",
            get(app_configs::get).put(app_configs::update),
        );

    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest("/v1", api_routes)
        .nest_service(MEDIA_ROUTE, ServeDir::new(&state.config.upload_dir))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;
    use std::path::PathBuf;
    use tower::ServiceExt;

    /// Router over a pool that never connects; only usable for requests
    /// rejected before any query runs.
    fn offline_router(require_app_id: bool) -> Router {
        let config = ServerConfig {
            database_url: "postgres://adserve@localhost:5432/adserve_offline".to_string(),
            database_max_connections: 1,
            host: "127.0.0.1".to_string(),
            port: 0,
            default_app_id: "demo_app".to_string(),
            require_app_id,
            upload_dir: PathBuf::from("./uploads"),
            max_upload_bytes: 1024,
            public_base_url: "http://localhost:5000".to_string(),
        };
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        router(AppState { db, config })
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn liveness_probe() {
        let request = Request::get("/health/live").body(Body::empty()).unwrap();
        let response = offline_router(false).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), 16).await.unwrap();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn serve_requires_app_id_when_app_scoped() {
        let request = Request::get("/v1/serve?categories=SPORT")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(offline_router(true), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "app_id is required");
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn create_ad_reports_missing_fields() {
        let request = json_request("POST", "/v1/ads", r#"{"ad_id": "ad_1", "title": " "}"#);
        let (status, body) = send(offline_router(false), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"]["message"],
            "Missing required fields: category_id, title, video_url"
        );
    }

    #[tokio::test]
    async fn create_ad_requires_app_when_app_scoped() {
        let request = json_request(
            "POST",
            "/v1/ads",
            r#"{"ad_id": "a", "category_id": "SPORT", "title": "t", "video_url": "https://v"}"#,
        );
        let (status, body) = send(offline_router(true), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "app_id is required");
    }

    #[tokio::test]
    async fn update_ad_without_fields_is_rejected() {
        let request = json_request("PUT", "/v1/ads/ad_1", r#"{"unknown": 1}"#);
        let (status, body) = send(offline_router(false), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("No valid fields to update"));
    }

    #[tokio::test]
    async fn config_update_rejects_blank_app_id() {
        let request = json_request("PUT", "/v1/apps/%20/config", r#"{"x_delay_seconds": 10}"#);
        let (status, _) = send(offline_router(false), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
