//! Route table.

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{self, auth, comments, projects, tasks, users};
use crate::middleware::{cors_policy, track_requests};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/user-info", get(auth::user_info));

    let projects_routes = Router::new()
        .route("/", post(projects::create).get(projects::list))
        .route(
            "/{id}",
            get(projects::get).put(projects::update).delete(projects::delete),
        )
        .route("/{id}/members", post(projects::add_member));

    let tasks_routes = Router::new()
        .route("/", post(tasks::create))
        .route("/all", get(tasks::list_all))
        .route("/reorder", put(tasks::reorder))
        .route("/project/{id}", get(tasks::list_by_project))
        .route("/{id}", put(tasks::update).delete(tasks::delete));

    let comments_routes = Router::new()
        .route("/task/{task_id}", get(comments::list).post(comments::create))
        .route("/{id}", put(comments::update).delete(comments::delete));

    let users_routes = Router::new()
        .route("/members", get(users::list_members))
        .route("/members/{id}", axum::routing::delete(users::delete_member));

    Router::new()
        .nest("/auth", auth_routes)
        .nest("/projects", projects_routes)
        .nest("/tasks", tasks_routes)
        .nest("/comments", comments_routes)
        .nest("/users", users_routes)
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .layer(from_fn_with_state(state.clone(), track_requests))
        .layer(TraceLayer::new_for_http())
        .layer(cors_policy())
        .with_state(state)
}
