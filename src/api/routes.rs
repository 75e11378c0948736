use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use super::handlers;
use super::AppState;
use crate::middleware::{make_span_with_request_id, request_id_middleware};

/// Creates the main router: API routes plus the landing page and its assets
pub fn create_router(state: AppState) -> Router {
    let index = ServeFile::new(state.static_dir.join("index.html"));
    let assets = ServeDir::new(&state.static_dir);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route_service("/", index)
        // Catalog
        .route("/api/types", get(handlers::list_types))
        .route("/api/genres", get(handlers::list_genres))
        // Recommendations and votes
        .route("/api/recommend-genres", post(handlers::recommend_genres))
        .route("/api/vote", post(handlers::vote))
        .fallback_service(assets)
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
        .with_state(state)
}
