use axum::extract::{Extension, Json, Path};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::handlers;
use super::models::{CreateChapterRequest, CreatePostRequest};
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

fn alum(id: &str) -> AuthedUser {
    AuthedUser {
        id: id.to_string(),
        email: format!("{}@example.com", id.to_lowercase()),
        role: Role::Alumni,
    }
}

async fn member_count(pool: &SqlitePool, chapter_id: &str) -> i64 {
    sqlx::query_scalar("SELECT member_count FROM chapters WHERE id = ?")
        .bind(chapter_id)
        .fetch_one(pool)
        .await
        .expect("member_count")
}

async fn create_test_chapter(state: &Arc<RwLock<AppState>>, creator: &AuthedUser) -> String {
    let created = handlers::create_chapter(
        Extension(state.clone()),
        AuthedUser {
            id: creator.id.clone(),
            email: creator.email.clone(),
            role: creator.role,
        },
        Json(CreateChapterRequest {
            name: "Bay Area Chapter".to_string(),
            description: None,
            region: Some("California".to_string()),
        }),
    )
    .await
    .expect("create chapter");
    created.0.data.id.clone()
}

#[tokio::test]
async fn test_creator_is_first_approved_member() {
    let state = test_state().await;
    let pool = state.read().await.db.clone();
    seed_user(&pool, "U_ALUM01", "alum01@example.com", "alumni").await;

    let chapter_id = create_test_chapter(&state, &alum("U_ALUM01")).await;

    assert_eq!(member_count(&pool, &chapter_id).await, 1);

    let status: String = sqlx::query_scalar(
        "SELECT status FROM chapter_members WHERE chapter_id = ? AND user_id = 'U_ALUM01'",
    )
    .bind(&chapter_id)
    .fetch_one(&pool)
    .await
    .expect("creator membership");
    assert_eq!(status, "approved");
}

#[tokio::test]
async fn test_duplicate_chapter_name_conflicts() {
    let state = test_state().await;
    let pool = state.read().await.db.clone();
    seed_user(&pool, "U_ALUM01", "alum01@example.com", "alumni").await;
    create_test_chapter(&state, &alum("U_ALUM01")).await;

    let duplicate = handlers::create_chapter(
        Extension(state.clone()),
        alum("U_ALUM01"),
        Json(CreateChapterRequest {
            name: "Bay Area Chapter".to_string(),
            description: None,
            region: None,
        }),
    )
    .await;
    assert!(matches!(duplicate, Err(ApiError::Conflict(_))));
}

#[tokio::test]
async fn test_join_then_approve_increments_count_once() {
    let state = test_state().await;
    let pool = state.read().await.db.clone();
    seed_user(&pool, "U_ALUM01", "alum01@example.com", "alumni").await;
    seed_user(&pool, "U_STUD01", "stud01@example.com", "student").await;

    let chapter_id = create_test_chapter(&state, &alum("U_ALUM01")).await;

    let joined = handlers::join_chapter(
        Extension(state.clone()),
        AuthedUser {
            id: "U_STUD01".to_string(),
            email: "stud01@example.com".to_string(),
            role: Role::Student,
        },
        Path(chapter_id.clone()),
    )
    .await
    .expect("join");
    assert_eq!(joined.0.data.status, "pending");
    // Pending requests do not count as members
    assert_eq!(member_count(&pool, &chapter_id).await, 1);

    let approved = handlers::approve_member(
        Extension(state.clone()),
        alum("U_ALUM01"),
        Path((chapter_id.clone(), "U_STUD01".to_string())),
    )
    .await
    .expect("approve");
    assert_eq!(approved.0.data.status, "approved");
    assert_eq!(member_count(&pool, &chapter_id).await, 2);

    // Approving again must not inflate the counter
    let again = handlers::approve_member(
        Extension(state.clone()),
        alum("U_ALUM01"),
        Path((chapter_id.clone(), "U_STUD01".to_string())),
    )
    .await;
    assert!(matches!(again, Err(ApiError::Conflict(_))));
    assert_eq!(member_count(&pool, &chapter_id).await, 2);
}

#[tokio::test]
async fn test_duplicate_join_conflicts() {
    let state = test_state().await;
    let pool = state.read().await.db.clone();
    seed_user(&pool, "U_ALUM01", "alum01@example.com", "alumni").await;
    seed_user(&pool, "U_STUD01", "stud01@example.com", "student").await;

    let chapter_id = create_test_chapter(&state, &alum("U_ALUM01")).await;

    let student = || AuthedUser {
        id: "U_STUD01".to_string(),
        email: "stud01@example.com".to_string(),
        role: Role::Student,
    };

    handlers::join_chapter(Extension(state.clone()), student(), Path(chapter_id.clone()))
        .await
        .expect("first join");
    let second = handlers::join_chapter(Extension(state.clone()), student(), Path(chapter_id)).await;
    assert!(matches!(second, Err(ApiError::Conflict(_))));
}

#[tokio::test]
async fn test_only_approved_members_can_post() {
    let state = test_state().await;
    let pool = state.read().await.db.clone();
    seed_user(&pool, "U_ALUM01", "alum01@example.com", "alumni").await;
    seed_user(&pool, "U_STUD01", "stud01@example.com", "student").await;

    let chapter_id = create_test_chapter(&state, &alum("U_ALUM01")).await;

    let student = || AuthedUser {
        id: "U_STUD01".to_string(),
        email: "stud01@example.com".to_string(),
        role: Role::Student,
    };

    let post_request = || CreatePostRequest {
        title: "Meetup next week".to_string(),
        body: "We are meeting on Thursday.".to_string(),
    };

    // Not a member yet
    let denied = handlers::create_post(
        Extension(state.clone()),
        student(),
        Path(chapter_id.clone()),
        Json(post_request()),
    )
    .await;
    assert!(matches!(denied, Err(ApiError::Forbidden(_))));

    // Pending membership is still not enough
    handlers::join_chapter(Extension(state.clone()), student(), Path(chapter_id.clone()))
        .await
        .expect("join");
    let still_denied = handlers::create_post(
        Extension(state.clone()),
        student(),
        Path(chapter_id.clone()),
        Json(post_request()),
    )
    .await;
    assert!(matches!(still_denied, Err(ApiError::Forbidden(_))));

    handlers::approve_member(
        Extension(state.clone()),
        alum("U_ALUM01"),
        Path((chapter_id.clone(), "U_STUD01".to_string())),
    )
    .await
    .expect("approve");

    let posted = handlers::create_post(
        Extension(state.clone()),
        student(),
        Path(chapter_id.clone()),
        Json(post_request()),
    )
    .await
    .expect("post");
    assert_eq!(posted.0.data.title, "Meetup next week");
}

#[tokio::test]
async fn test_only_creator_or_admin_approves() {
    let state = test_state().await;
    let pool = state.read().await.db.clone();
    seed_user(&pool, "U_ALUM01", "alum01@example.com", "alumni").await;
    seed_user(&pool, "U_ALUM02", "alum02@example.com", "alumni").await;
    seed_user(&pool, "U_STUD01", "stud01@example.com", "student").await;

    let chapter_id = create_test_chapter(&state, &alum("U_ALUM01")).await;

    handlers::join_chapter(
        Extension(state.clone()),
        AuthedUser {
            id: "U_STUD01".to_string(),
            email: "stud01@example.com".to_string(),
            role: Role::Student,
        },
        Path(chapter_id.clone()),
    )
    .await
    .expect("join");

    let denied = handlers::approve_member(
        Extension(state.clone()),
        alum("U_ALUM02"),
        Path((chapter_id.clone(), "U_STUD01".to_string())),
    )
    .await;
    assert!(matches!(denied, Err(ApiError::Forbidden(_))));

    let admin = AuthedUser {
        id: "U_ADMIN1".to_string(),
        email: "admin@example.com".to_string(),
        role: Role::Admin,
    };
    handlers::approve_member(
        Extension(state.clone()),
        admin,
        Path((chapter_id, "U_STUD01".to_string())),
    )
    .await
    .expect("admin approves");
}
