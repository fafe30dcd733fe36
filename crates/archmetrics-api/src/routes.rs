use crate::{handlers, AppState};
use axum::{
    routing::{delete, get},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/summary/architecture",
            get(handlers::default_architecture_summary),
        )
        .route(
            "/api/summary/architecture/{org}/{repo}",
            get(handlers::architecture_summary),
        )
        .route(
            "/api/repos/architecture/{org}/{repo}",
            get(handlers::architecture_repos),
        )
        .route("/api/repos/{org}", get(handlers::list_org_repos))
        .route("/api/adf/cache/stats", get(handlers::cache_stats))
        .route("/api/adf/cache", delete(handlers::clear_cache))
        .route("/api/adf/{org}/{repo}", get(handlers::get_architecture))
        .route(
            "/api/adf/{org}/{repo}/export",
            get(handlers::export_architecture),
        )
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}
