/**
 * Router Configuration
 *
 * This module assembles the complete HTTP surface into a single Axum router.
 *
 * # Layout
 *
 * 1. `/api/v1` - API routes (`api_routes`) with `/admin` nested inside
 * 2. `/uploads` - stored media, served from the upload directory
 * 3. `/health` - liveness probe
 * 4. Fallback - 404 in the standard envelope
 *
 * # Layers
 *
 * - CORS for the configured frontend origin, with credentials so the
 *   session cookie travels on cross-origin requests
 * - A request body limit just above the upload limit, so oversized images
 *   are reported by the media store instead of being cut off by axum's
 *   2 MB default
 */

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::backend::media::UPLOADS_ROUTE;
use crate::backend::routes::admin_routes::configure_admin_routes;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;
use crate::shared::ApiResponse;

/// Room for multipart framing and the text fields around an upload
const BODY_LIMIT_MARGIN: usize = 64 * 1024;

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    let config = app_state.config.clone();

    let api = configure_api_routes(app_state.clone())
        .nest("/admin", configure_admin_routes(app_state.clone()));

    Router::new()
        .nest("/api/v1", api)
        .route("/health", get(health))
        .nest_service(UPLOADS_ROUTE, ServeDir::new(&config.upload_dir))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes + BODY_LIMIT_MARGIN))
        .layer(cors_layer(&config.cors_origin))
        .with_state(app_state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    match HeaderValue::from_str(origin) {
        Ok(origin) => layer.allow_origin(origin),
        Err(e) => {
            tracing::warn!("Ignoring invalid CORS origin {:?}: {:?}", origin, e);
            layer
        }
    }
}

async fn health() -> Json<ApiResponse<()>> {
    Json(ApiResponse::<()>::ok("OK"))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ApiResponse::<()>::failure("Route not found")))
}
