pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use state::AppState;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Auth routes
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        .route("/refresh", post(routes::auth::refresh))
        .route("/me", get(routes::auth::me));

    // Workspace routes; the route table mirrors the public API surface
    // of the original workspace router.
    let workspace_routes = Router::new()
        .route("/", get(routes::workspace::list))
        .route("/", post(routes::workspace::create))
        .route("/accept-invite-token", post(routes::invite::accept_invite_token))
        .route("/{workspace_id}", get(routes::workspace::get))
        .route("/{workspace_id}", put(routes::workspace::update))
        .route("/{workspace_id}", delete(routes::workspace::delete))
        .route("/{workspace_id}/stats", get(routes::workspace::stats))
        .route("/{workspace_id}/members", get(routes::workspace::members))
        .route("/{workspace_id}/invite-member", post(routes::invite::invite_member))
        .route(
            "/{workspace_id}/accept-generate-invite",
            post(routes::invite::generate_invite),
        )
        .route(
            "/{workspace_id}/transfer-ownership",
            post(routes::workspace::transfer_ownership),
        )
        .route("/{workspace_id}/projects", get(routes::project::list))
        .route("/{workspace_id}/projects", post(routes::project::create))
        .route(
            "/{workspace_id}/projects/{project_id}",
            put(routes::project::update),
        )
        .route(
            "/{workspace_id}/projects/{project_id}/tasks",
            get(routes::task::list),
        )
        .route(
            "/{workspace_id}/projects/{project_id}/tasks",
            post(routes::task::create),
        )
        .route("/{workspace_id}/tasks/{task_id}", put(routes::task::update))
        .route(
            "/{workspace_id}/archived/projects",
            get(routes::project::archived),
        )
        .route("/{workspace_id}/archived/tasks", get(routes::task::archived));

    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/workspaces", workspace_routes);

    // Health check
    let health = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api)
        .merge(health)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
