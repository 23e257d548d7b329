// src/chapters/handlers.rs

use axum::extract::{Extension, Json, Path};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::auth::{require_role, AuthedUser, Role};
use crate::chapters::models::*;
use crate::chapters::validators::ChapterValidator;
use crate::common::{
    generate_chapter_id, generate_membership_id, generate_post_id, is_unique_violation, ApiError,
    ApiResponse, AppState, Validator,
};

/// POST /api/chapters - Create an alumni chapter (alumni/admin)
///
/// The creator becomes an approved member, so member_count starts at 1.
pub async fn create_chapter(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(request): Json<CreateChapterRequest>,
) -> Result<Json<ApiResponse<Chapter>>, ApiError> {
    let state = state_lock.read().await.clone();

    require_role(&authed, &[Role::Alumni, Role::Admin])?;

    let validator = ChapterValidator;
    let validation_result = validator.validate(&request);
    if !validation_result.is_valid {
        return Err(ApiError::from(validation_result));
    }

    let name = request.name.trim();

    // Fast path; the UNIQUE index on chapters.name is the enforcement.
    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM chapters WHERE name = ?")
        .bind(name)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    if existing > 0 {
        return Err(ApiError::Conflict(
            "A chapter with this name already exists".to_string(),
        ));
    }

    let chapter_id = generate_chapter_id();

    let insert = sqlx::query(
        r#"
        INSERT INTO chapters (id, name, description, region, created_by, member_count, created_at)
        VALUES (?, ?, ?, ?, ?, 1, datetime('now'))
        "#,
    )
    .bind(&chapter_id)
    .bind(name)
    .bind(request.description.as_deref())
    .bind(request.region.as_deref())
    .bind(&authed.id)
    .execute(&state.db)
    .await;

    if let Err(e) = insert {
        if is_unique_violation(&e) {
            return Err(ApiError::Conflict(
                "A chapter with this name already exists".to_string(),
            ));
        }
        return Err(ApiError::DatabaseError(e));
    }

    let membership_id = generate_membership_id();
    sqlx::query(
        r#"
        INSERT INTO chapter_members (id, chapter_id, user_id, status, joined_at)
        VALUES (?, ?, ?, 'approved', datetime('now'))
        "#,
    )
    .bind(&membership_id)
    .bind(&chapter_id)
    .bind(&authed.id)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let chapter = sqlx::query_as::<_, Chapter>("SELECT * FROM chapters WHERE id = ?")
        .bind(&chapter_id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(
        user_id = %authed.id,
        chapter_id = %chapter_id,
        name = %chapter.name,
        "Chapter created"
    );

    Ok(ApiResponse::ok(chapter))
}

/// GET /api/chapters - Public chapter list with member counts
pub async fn list_chapters(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<Json<ApiResponse<Vec<Chapter>>>, ApiError> {
    let state = state_lock.read().await.clone();

    let chapters = sqlx::query_as::<_, Chapter>("SELECT * FROM chapters ORDER BY name ASC")
        .fetch_all(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok(ApiResponse::ok(chapters))
}

/// GET /api/chapters/:id - Chapter detail with recent posts
pub async fn get_chapter(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(chapter_id): Path<String>,
) -> Result<Json<ApiResponse<ChapterDetail>>, ApiError> {
    let state = state_lock.read().await.clone();

    let chapter = sqlx::query_as::<_, Chapter>("SELECT * FROM chapters WHERE id = ?")
        .bind(&chapter_id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound(format!("Chapter not found: {}", chapter_id)))?;

    let recent_posts = sqlx::query_as::<_, ChapterPost>(
        "SELECT * FROM chapter_posts WHERE chapter_id = ? ORDER BY created_at DESC LIMIT 20",
    )
    .bind(&chapter_id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    Ok(ApiResponse::ok(ChapterDetail {
        chapter,
        recent_posts,
    }))
}

/// POST /api/chapters/:id/join - Request membership (pending until approved)
pub async fn join_chapter(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(chapter_id): Path<String>,
) -> Result<Json<ApiResponse<ChapterMember>>, ApiError> {
    let state = state_lock.read().await.clone();

    require_role(
        &authed,
        &[Role::JobSeeker, Role::Student, Role::Alumni, Role::Admin],
    )?;

    let chapter_exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM chapters WHERE id = ?")
        .bind(&chapter_id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    if chapter_exists == 0 {
        return Err(ApiError::NotFound(format!(
            "Chapter not found: {}",
            chapter_id
        )));
    }

    // Fast path; UNIQUE(chapter_id, user_id) is the enforcement.
    let existing = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM chapter_members WHERE chapter_id = ? AND user_id = ?",
    )
    .bind(&chapter_id)
    .bind(&authed.id)
    .fetch_one(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    if existing > 0 {
        return Err(ApiError::Conflict(
            "You are already a member of this chapter".to_string(),
        ));
    }

    let membership_id = generate_membership_id();

    let insert = sqlx::query(
        r#"
        INSERT INTO chapter_members (id, chapter_id, user_id, status, joined_at)
        VALUES (?, ?, ?, 'pending', datetime('now'))
        "#,
    )
    .bind(&membership_id)
    .bind(&chapter_id)
    .bind(&authed.id)
    .execute(&state.db)
    .await;

    if let Err(e) = insert {
        if is_unique_violation(&e) {
            return Err(ApiError::Conflict(
                "You are already a member of this chapter".to_string(),
            ));
        }
        return Err(ApiError::DatabaseError(e));
    }

    let membership =
        sqlx::query_as::<_, ChapterMember>("SELECT * FROM chapter_members WHERE id = ?")
            .bind(&membership_id)
            .fetch_one(&state.db)
            .await
            .map_err(ApiError::DatabaseError)?;

    info!(
        user_id = %authed.id,
        chapter_id = %chapter_id,
        "Chapter membership requested"
    );

    Ok(ApiResponse::ok(membership))
}

/// GET /api/chapters/:id/members - Member list (chapter creator or admin)
pub async fn list_members(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(chapter_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<MemberDetails>>>, ApiError> {
    let state = state_lock.read().await.clone();

    fetch_managed_chapter(&state, &chapter_id, &authed).await?;

    let members = sqlx::query_as::<_, MemberDetails>(
        r#"
        SELECT
            m.id, m.user_id,
            u.name AS member_name, u.email AS member_email,
            m.status, m.joined_at
        FROM chapter_members m
        INNER JOIN users u ON m.user_id = u.id
        WHERE m.chapter_id = ?
        ORDER BY m.joined_at ASC
        "#,
    )
    .bind(&chapter_id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    Ok(ApiResponse::ok(members))
}

/// PATCH /api/chapters/:id/members/:user_id - Approve a pending membership
/// (chapter creator or admin)
pub async fn approve_member(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path((chapter_id, user_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<ChapterMember>>, ApiError> {
    let state = state_lock.read().await.clone();

    fetch_managed_chapter(&state, &chapter_id, &authed).await?;

    // Guarded flip: the member_count increment below only runs when a
    // pending row actually transitioned, so repeated approvals cannot
    // inflate the counter.
    let flipped = sqlx::query(
        r#"
        UPDATE chapter_members
        SET status = 'approved'
        WHERE chapter_id = ? AND user_id = ? AND status = 'pending'
        "#,
    )
    .bind(&chapter_id)
    .bind(&user_id)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    if flipped.rows_affected() == 0 {
        let membership = sqlx::query_as::<_, ChapterMember>(
            "SELECT * FROM chapter_members WHERE chapter_id = ? AND user_id = ?",
        )
        .bind(&chapter_id)
        .bind(&user_id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        return match membership {
            Some(_) => Err(ApiError::Conflict(
                "Membership is already approved".to_string(),
            )),
            None => Err(ApiError::NotFound(
                "No membership request for this user".to_string(),
            )),
        };
    }

    if let Err(e) = sqlx::query("UPDATE chapters SET member_count = member_count + 1 WHERE id = ?")
        .bind(&chapter_id)
        .execute(&state.db)
        .await
    {
        warn!(
            error = %e,
            chapter_id = %chapter_id,
            "Member counter increment failed, count now drifts low"
        );
    }

    let membership = sqlx::query_as::<_, ChapterMember>(
        "SELECT * FROM chapter_members WHERE chapter_id = ? AND user_id = ?",
    )
    .bind(&chapter_id)
    .bind(&user_id)
    .fetch_one(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    info!(
        chapter_id = %chapter_id,
        member_user_id = %user_id,
        approved_by = %authed.id,
        "Chapter membership approved"
    );

    Ok(ApiResponse::ok(membership))
}

/// POST /api/chapters/:id/posts - Publish a post (approved members only)
pub async fn create_post(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(chapter_id): Path<String>,
    Json(request): Json<CreatePostRequest>,
) -> Result<Json<ApiResponse<ChapterPost>>, ApiError> {
    let state = state_lock.read().await.clone();

    let validator = ChapterValidator;
    let validation_result = validator.validate(&request);
    if !validation_result.is_valid {
        return Err(ApiError::from(validation_result));
    }

    let chapter_exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM chapters WHERE id = ?")
        .bind(&chapter_id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    if chapter_exists == 0 {
        return Err(ApiError::NotFound(format!(
            "Chapter not found: {}",
            chapter_id
        )));
    }

    let approved = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM chapter_members WHERE chapter_id = ? AND user_id = ? AND status = 'approved'",
    )
    .bind(&chapter_id)
    .bind(&authed.id)
    .fetch_one(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    if approved == 0 && authed.role != Role::Admin {
        return Err(ApiError::Forbidden(
            "Only approved chapter members can post".to_string(),
        ));
    }

    let post_id = generate_post_id();

    sqlx::query(
        r#"
        INSERT INTO chapter_posts (id, chapter_id, author_id, title, body, created_at)
        VALUES (?, ?, ?, ?, ?, datetime('now'))
        "#,
    )
    .bind(&post_id)
    .bind(&chapter_id)
    .bind(&authed.id)
    .bind(request.title.trim())
    .bind(&request.body)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let post = sqlx::query_as::<_, ChapterPost>("SELECT * FROM chapter_posts WHERE id = ?")
        .bind(&post_id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(
        user_id = %authed.id,
        chapter_id = %chapter_id,
        post_id = %post_id,
        "Chapter post published"
    );

    Ok(ApiResponse::ok(post))
}

/// GET /api/chapters/:id/posts - Public post list, newest first
pub async fn list_posts(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(chapter_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<ChapterPost>>>, ApiError> {
    let state = state_lock.read().await.clone();

    let chapter_exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM chapters WHERE id = ?")
        .bind(&chapter_id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    if chapter_exists == 0 {
        return Err(ApiError::NotFound(format!(
            "Chapter not found: {}",
            chapter_id
        )));
    }

    let posts = sqlx::query_as::<_, ChapterPost>(
        "SELECT * FROM chapter_posts WHERE chapter_id = ? ORDER BY created_at DESC",
    )
    .bind(&chapter_id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    Ok(ApiResponse::ok(posts))
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Fetch a chapter and enforce creator-or-admin access for membership
/// management
async fn fetch_managed_chapter(
    state: &AppState,
    chapter_id: &str,
    authed: &AuthedUser,
) -> Result<Chapter, ApiError> {
    let chapter = sqlx::query_as::<_, Chapter>("SELECT * FROM chapters WHERE id = ?")
        .bind(chapter_id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound(format!("Chapter not found: {}", chapter_id)))?;

    if chapter.created_by != authed.id && authed.role != Role::Admin {
        return Err(ApiError::Forbidden(
            "Only the chapter creator can manage memberships".to_string(),
        ));
    }

    Ok(chapter)
}
