use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the main application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::metrics_handler));

    let api_routes = Router::new()
        .route("/api/options", get(handlers::options::get_options))
        .route("/api/options/groups", put(handlers::options::update_groups))
        .route(
            "/api/projects",
            get(handlers::projects::list_projects).post(handlers::projects::create_project),
        )
        .route("/api/judges", get(handlers::judges::list_judges))
        .route(
            "/api/admin/projects/reassign",
            post(handlers::admin::reassign_in_order),
        )
        .route(
            "/api/admin/projects/reassign-groups",
            post(handlers::admin::reassign_by_group),
        )
        .route(
            "/api/admin/judges/rotate-groups",
            post(handlers::admin::rotate_judge_groups),
        );

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
