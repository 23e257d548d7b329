// src/admin/routes.rs

use axum::{
    routing::{delete, get, patch},
    Router,
};

use super::handlers;

pub fn admin_routes() -> Router {
    Router::new()
        .route("/api/admin/stats", get(handlers::get_admin_stats))
        .route("/api/admin/users", get(handlers::list_users))
        .route(
            "/api/admin/users/:id/role",
            patch(handlers::update_user_role),
        )
        .route("/api/admin/users/:id", delete(handlers::delete_user))
}
