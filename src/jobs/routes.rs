// src/jobs/routes.rs

use axum::{
    routing::{get, patch},
    Router,
};

use super::handlers;

pub fn jobs_routes() -> Router {
    Router::new()
        .route("/api/jobs", get(handlers::list_jobs).post(handlers::create_job))
        .route(
            "/api/jobs/:id",
            get(handlers::get_job)
                .put(handlers::update_job)
                .delete(handlers::delete_job),
        )
        .route("/api/jobs/:id/status", patch(handlers::update_job_status))
}
