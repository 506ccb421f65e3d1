// src/api/router.rs
// Top-level HTTP router: every feature router nested under /api

use std::time::Duration;

use axum::{
    Router,
    http::{HeaderValue, Method, StatusCode, header},
    routing::get,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::warn;

use super::handlers::{health_handler, stats_handler};
use crate::{
    auth::auth_router, community::community_router, competition::competition_router, config::EcoConfig,
    event::event_router, report::report_router, state::SharedState,
};

pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");

fn cors_layer(config: &EcoConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origin
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    // Credentials are allowed, so origins must be listed explicitly.
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

pub fn build_router(state: SharedState) -> Router {
    let api = Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .merge(auth_router())
        .merge(competition_router())
        .merge(event_router())
        .merge(report_router())
        .merge(community_router());

    // API version header on all responses
    let version_header = SetResponseHeaderLayer::if_not_present(
        header::HeaderName::from_static("x-api-version"),
        HeaderValue::from_static(API_VERSION),
    );

    // Each layer wraps the ones above it; CORS ends up outermost
    Router::new()
        .nest("/api", api)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(state.config.request_timeout),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(version_header)
        .layer(cors_layer(&state.config))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use sqlx::sqlite::SqlitePoolOptions;
    use tower::ServiceExt;

    use crate::server::run_migrations;
    use crate::state::AppState;

    #[test]
    fn test_cors_layer_accepts_origin_list() {
        let config = EcoConfig::from_lookup(|key| match key {
            "ECO_CORS_ORIGIN" => Some("http://localhost:5173, https://eco.example.org".to_string()),
            _ => None,
        });
        // Building must not panic with credentials and an explicit list
        let _ = cors_layer(&config);
    }

    #[tokio::test]
    async fn test_middleware_stack_serves_requests() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        run_migrations(&pool).await.unwrap();
        let config = EcoConfig::from_lookup(|key| match key {
            "ECO_CORS_ORIGIN" => Some("http://localhost:5173".to_string()),
            _ => None,
        });
        let app = build_router(Arc::new(AppState::new(pool, config)));

        let request = Request::builder()
            .uri("/api/health")
            .header(header::ORIGIN, "http://localhost:5173")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-api-version"], API_VERSION);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:5173"
        );

        let preflight = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/stats")
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(preflight).await.unwrap();
        assert!(response.status().is_success());
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }
}
