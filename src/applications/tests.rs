use axum::extract::{Extension, Json, Path};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::handlers;
use super::models::{CreateApplicationRequest, UpdateApplicationStatusRequest};
use crate::auth::{AuthedUser, Role};
use crate::common::{migrations, ApiError, AppState};
use crate::services::EmailService;

async fn test_state() -> Arc<RwLock<AppState>> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    migrations::run_migrations(&pool).await.expect("migrations");

    Arc::new(RwLock::new(AppState {
        db: pool,
        jwt_secret: "test-secret".to_string(),
        admin_emails: HashSet::new(),
        email: Arc::new(EmailService::disabled()),
    }))
}

async fn seed_user(pool: &SqlitePool, id: &str, email: &str, role: &str) {
    sqlx::query(
        "INSERT INTO users (id, email, name, password_hash, role) VALUES (?, ?, 'Test User', 'x', ?)",
    )
    .bind(id)
    .bind(email)
    .bind(role)
    .execute(pool)
    .await
    .expect("seed user");
}

async fn seed_job(pool: &SqlitePool, id: &str, poster_id: &str, status: &str) {
    sqlx::query(
        "INSERT INTO jobs (id, poster_id, title, status, application_count) VALUES (?, ?, 'Backend Engineer', ?, 0)",
    )
    .bind(id)
    .bind(poster_id)
    .bind(status)
    .execute(pool)
    .await
    .expect("seed job");
}

fn seeker() -> AuthedUser {
    AuthedUser {
        id: "U_SEEKER".to_string(),
        email: "seeker@example.com".to_string(),
        role: Role::JobSeeker,
    }
}

fn poster() -> AuthedUser {
    AuthedUser {
        id: "U_POSTER".to_string(),
        email: "poster@example.com".to_string(),
        role: Role::JobPoster,
    }
}

async fn application_count(pool: &SqlitePool, job_id: &str) -> i64 {
    sqlx::query_scalar("SELECT application_count FROM jobs WHERE id = ?")
        .bind(job_id)
        .fetch_one(pool)
        .await
        .expect("counter")
}

#[tokio::test]
async fn test_double_apply_conflicts_and_counter_rises_once() {
    let state = test_state().await;
    let pool = state.read().await.db.clone();
    seed_user(&pool, "U_POSTER", "poster@example.com", "job_poster").await;
    seed_user(&pool, "U_SEEKER", "seeker@example.com", "job_seeker").await;
    seed_job(&pool, "J_TEST01", "U_POSTER", "active").await;

    let first = handlers::apply_to_job(
        Extension(state.clone()),
        seeker(),
        Path("J_TEST01".to_string()),
        Json(CreateApplicationRequest { cover_letter: None }),
    )
    .await;
    assert!(first.is_ok());

    let second = handlers::apply_to_job(
        Extension(state.clone()),
        seeker(),
        Path("J_TEST01".to_string()),
        Json(CreateApplicationRequest { cover_letter: None }),
    )
    .await;
    assert!(matches!(second, Err(ApiError::Conflict(_))));

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM applications WHERE job_id = ?")
        .bind("J_TEST01")
        .fetch_one(&pool)
        .await
        .expect("count");
    assert_eq!(stored, 1);
    assert_eq!(application_count(&pool, "J_TEST01").await, 1);
}

#[tokio::test]
async fn test_withdraw_decrements_counter_with_zero_floor() {
    let state = test_state().await;
    let pool = state.read().await.db.clone();
    seed_user(&pool, "U_POSTER", "poster@example.com", "job_poster").await;
    seed_user(&pool, "U_SEEKER", "seeker@example.com", "job_seeker").await;
    seed_job(&pool, "J_TEST01", "U_POSTER", "active").await;

    let created = handlers::apply_to_job(
        Extension(state.clone()),
        seeker(),
        Path("J_TEST01".to_string()),
        Json(CreateApplicationRequest { cover_letter: None }),
    )
    .await
    .expect("apply");
    let application_id = created.0.data.id.clone();
    assert_eq!(application_count(&pool, "J_TEST01").await, 1);

    handlers::withdraw_application(
        Extension(state.clone()),
        seeker(),
        Path(application_id.clone()),
    )
    .await
    .expect("withdraw");
    assert_eq!(application_count(&pool, "J_TEST01").await, 0);

    // Withdrawing a row seeded while the counter is already at zero must
    // leave the counter at zero, not -1.
    sqlx::query(
        "INSERT INTO applications (id, job_id, user_id, status) VALUES ('A_FLOOR1', 'J_TEST01', 'U_SEEKER', 'pending')",
    )
    .execute(&pool)
    .await
    .expect("seed application");

    handlers::withdraw_application(
        Extension(state.clone()),
        seeker(),
        Path("A_FLOOR1".to_string()),
    )
    .await
    .expect("withdraw");
    assert_eq!(application_count(&pool, "J_TEST01").await, 0);
}

#[tokio::test]
async fn test_cannot_apply_to_closed_job() {
    let state = test_state().await;
    let pool = state.read().await.db.clone();
    seed_user(&pool, "U_POSTER", "poster@example.com", "job_poster").await;
    seed_user(&pool, "U_SEEKER", "seeker@example.com", "job_seeker").await;
    seed_job(&pool, "J_CLOSED", "U_POSTER", "closed").await;

    let result = handlers::apply_to_job(
        Extension(state.clone()),
        seeker(),
        Path("J_CLOSED".to_string()),
        Json(CreateApplicationRequest { cover_letter: None }),
    )
    .await;
    assert!(matches!(result, Err(ApiError::BadRequest(_))));
}

#[tokio::test]
async fn test_poster_role_cannot_apply() {
    let state = test_state().await;
    let pool = state.read().await.db.clone();
    seed_user(&pool, "U_POSTER", "poster@example.com", "job_poster").await;
    seed_job(&pool, "J_TEST01", "U_POSTER", "active").await;

    let result = handlers::apply_to_job(
        Extension(state.clone()),
        poster(),
        Path("J_TEST01".to_string()),
        Json(CreateApplicationRequest { cover_letter: None }),
    )
    .await;
    assert!(matches!(result, Err(ApiError::Forbidden(_))));
}

#[tokio::test]
async fn test_status_transitions_are_reversible() {
    let state = test_state().await;
    let pool = state.read().await.db.clone();
    seed_user(&pool, "U_POSTER", "poster@example.com", "job_poster").await;
    seed_user(&pool, "U_SEEKER", "seeker@example.com", "job_seeker").await;
    seed_job(&pool, "J_TEST01", "U_POSTER", "active").await;

    let created = handlers::apply_to_job(
        Extension(state.clone()),
        seeker(),
        Path("J_TEST01".to_string()),
        Json(CreateApplicationRequest { cover_letter: None }),
    )
    .await
    .expect("apply");
    let application_id = created.0.data.id.clone();

    // Forward to accepted, then back to pending: any state may overwrite
    // any other.
    for status in ["accepted", "pending", "shortlisted"] {
        let updated = handlers::update_application_status(
            Extension(state.clone()),
            poster(),
            Path(application_id.clone()),
            Json(UpdateApplicationStatusRequest {
                status: status.to_string(),
            }),
        )
        .await
        .expect("status update");
        assert_eq!(updated.0.data.status, status);
    }

    let rejected = handlers::update_application_status(
        Extension(state.clone()),
        poster(),
        Path(application_id.clone()),
        Json(UpdateApplicationStatusRequest {
            status: "hired".to_string(),
        }),
    )
    .await;
    assert!(matches!(rejected, Err(ApiError::ValidationFailed(_))));

    // Only the poster (or an admin) may change status
    let denied = handlers::update_application_status(
        Extension(state.clone()),
        seeker(),
        Path(application_id),
        Json(UpdateApplicationStatusRequest {
            status: "reviewed".to_string(),
        }),
    )
    .await;
    assert!(matches!(denied, Err(ApiError::Forbidden(_))));
}
