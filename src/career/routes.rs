// src/career/routes.rs

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

pub fn career_routes() -> Router {
    Router::new()
        .route("/api/career/resume-score", post(handlers::score_resume))
        .route(
            "/api/career/interview-score",
            post(handlers::score_interview),
        )
        .route("/api/career/stats", get(handlers::get_career_stats))
        .route(
            "/api/career/interview-history",
            get(handlers::get_interview_history),
        )
}
