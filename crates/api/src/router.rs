use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, CorsLayer},
    trace::TraceLayer,
};

use crate::{handlers, state::AppState};

/// Uploads above this size are rejected before the reader runs.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Create the main application router with all API endpoints
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.settings.allowed_origins);

    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Upload analysis
        .route("/analyze", post(handlers::analyze))
        // Narration (credit-gated)
        .route("/advisor", post(handlers::advisor))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
        // Add middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// CORS from the configured origin list, with credentials. Methods and
/// headers mirror the request, which is what credentialed CORS requires.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| o.parse::<HeaderValue>().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_accepts_origin_list() {
        // Construction must not panic with credentials + explicit origins.
        let _ = cors_layer(&[
            "http://localhost:3000".to_string(),
            "https://app.example.com".to_string(),
        ]);
    }
}
