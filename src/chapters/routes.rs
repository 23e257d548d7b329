// src/chapters/routes.rs

use axum::{
    routing::{get, patch, post},
    Router,
};

use super::handlers;

pub fn chapters_routes() -> Router {
    Router::new()
        .route(
            "/api/chapters",
            get(handlers::list_chapters).post(handlers::create_chapter),
        )
        .route("/api/chapters/:id", get(handlers::get_chapter))
        .route("/api/chapters/:id/join", post(handlers::join_chapter))
        .route("/api/chapters/:id/members", get(handlers::list_members))
        .route(
            "/api/chapters/:id/members/:user_id",
            patch(handlers::approve_member),
        )
        .route(
            "/api/chapters/:id/posts",
            get(handlers::list_posts).post(handlers::create_post),
        )
}
