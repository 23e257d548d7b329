// src/applications/routes.rs

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use super::handlers;

pub fn applications_routes() -> Router {
    Router::new()
        .route("/api/jobs/:id/apply", post(handlers::apply_to_job))
        .route(
            "/api/jobs/:id/applications",
            get(handlers::get_job_applications),
        )
        .route("/api/applications", get(handlers::get_own_applications))
        .route(
            "/api/applications/:id",
            delete(handlers::withdraw_application),
        )
        .route(
            "/api/applications/:id/status",
            patch(handlers::update_application_status),
        )
}
