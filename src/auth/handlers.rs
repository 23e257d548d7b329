//! Authentication handlers

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::{Extension, Json};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::extractors::AuthedUser;
use super::models::*;
use super::validators::RegistrationValidator;
use crate::common::{
    generate_raw_id, generate_token_id, generate_user_id, is_unique_violation, safe_email_log,
    ApiError, ApiResponse, AppState, MessageResponse, Validator,
};
use crate::services::email;

/// POST /api/auth/register - Create an account and return a JWT
pub async fn register(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    let state = state_lock.read().await.clone();

    let validator = RegistrationValidator;
    let validation_result = validator.validate(&request);
    if !validation_result.is_valid {
        warn!(
            email = %safe_email_log(&request.email),
            errors = ?validation_result.errors,
            "Registration validation failed"
        );
        return Err(ApiError::from(validation_result));
    }

    let email = request.email.trim().to_lowercase();

    // Fast path; the UNIQUE index on users.email is the enforcement.
    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind(&email)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    if existing > 0 {
        return Err(ApiError::Conflict(
            "An account with this email already exists".to_string(),
        ));
    }

    let role = if state.admin_emails.contains(&email) {
        Role::Admin
    } else {
        request
            .role
            .as_deref()
            .and_then(Role::parse)
            .unwrap_or(Role::JobSeeker)
    };

    let password_hash = hash_password(&request.password)?;
    let user_id = generate_user_id();

    let insert = sqlx::query(
        r#"
        INSERT INTO users (id, email, name, password_hash, role, created_at)
        VALUES (?, ?, ?, ?, ?, datetime('now'))
        "#,
    )
    .bind(&user_id)
    .bind(&email)
    .bind(request.name.trim())
    .bind(&password_hash)
    .bind(role.as_str())
    .execute(&state.db)
    .await;

    if let Err(e) = insert {
        if is_unique_violation(&e) {
            return Err(ApiError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }
        return Err(ApiError::DatabaseError(e));
    }

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(&user_id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let token = create_token(&user.id, &user.role, &state.jwt_secret)?;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        role = %user.role,
        "User account created"
    );

    state.email.send_detached(
        user.email.clone(),
        "Welcome to CampusBoard".to_string(),
        email::welcome_email(&user.name),
    );

    Ok(ApiResponse::ok(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// POST /api/auth/login - Verify credentials and return a JWT
pub async fn login(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    let state = state_lock.read().await.clone();

    let email = request.email.trim().to_lowercase();

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    // Same response for unknown email and wrong password
    let user = match user {
        Some(u) => u,
        None => {
            warn!(email = %safe_email_log(&email), "Login failed: unknown email");
            return Err(ApiError::Unauthorized(
                "Invalid email or password".to_string(),
            ));
        }
    };

    if !verify_password(&request.password, &user.password_hash) {
        warn!(user_id = %user.id, "Login failed: wrong password");
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let token = create_token(&user.id, &user.role, &state.jwt_secret)?;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        "User logged in"
    );

    Ok(ApiResponse::ok(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// GET /api/auth/me - Return the authenticated user
pub async fn me_handler(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let state = state_lock.read().await.clone();

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(&authed.id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok(ApiResponse::ok(user.into()))
}

/// POST /api/auth/forgot-password - Issue a single-use reset token
///
/// Always answers 200 so the endpoint cannot be used to probe which emails
/// have accounts.
pub async fn forgot_password(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let email = request.email.trim().to_lowercase();

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    if let Some(user) = user {
        let token = generate_raw_id(32);
        let token_row_id = generate_token_id();

        sqlx::query(
            r#"
            INSERT INTO password_reset_tokens (id, user_id, token, expires_at, used, created_at)
            VALUES (?, ?, ?, datetime('now', '+1 hour'), 0, datetime('now'))
            "#,
        )
        .bind(&token_row_id)
        .bind(&user.id)
        .bind(&token)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        info!(user_id = %user.id, "Password reset token issued");

        state.email.send_detached(
            user.email.clone(),
            "CampusBoard password reset".to_string(),
            email::password_reset_email(&user.name, &token),
        );
    } else {
        info!(email = %safe_email_log(&email), "Password reset requested for unknown email");
    }

    Ok(MessageResponse::ok(
        "If that account exists, a reset email has been sent",
    ))
}

/// POST /api/auth/reset-password - Consume a reset token and set a new password
pub async fn reset_password(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let validator = RegistrationValidator;
    let validation_result = validator.validate(&request);
    if !validation_result.is_valid {
        return Err(ApiError::from(validation_result));
    }

    // Single guarded UPDATE is the enforcement: rows_affected == 0 covers
    // unknown, already-used, and expired tokens alike.
    let consumed = sqlx::query(
        r#"
        UPDATE password_reset_tokens
        SET used = 1
        WHERE token = ? AND used = 0 AND expires_at > datetime('now')
        "#,
    )
    .bind(&request.token)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    if consumed.rows_affected() == 0 {
        warn!("Password reset failed: invalid, used, or expired token");
        return Err(ApiError::BadRequest(
            "Invalid or expired reset token".to_string(),
        ));
    }

    let user_id: String =
        sqlx::query_scalar("SELECT user_id FROM password_reset_tokens WHERE token = ?")
            .bind(&request.token)
            .fetch_one(&state.db)
            .await
            .map_err(ApiError::DatabaseError)?;

    let password_hash = hash_password(&request.password)?;

    sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
        .bind(&password_hash)
        .bind(&user_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(user_id = %user_id, "Password reset completed");

    Ok(MessageResponse::ok("Password has been reset"))
}

// ============================================================================
// Helper Functions
// ============================================================================

pub fn create_token(user_id: &str, role: &str, secret: &str) -> Result<String, ApiError> {
    let exp = (Utc::now() + Duration::hours(24)).timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        role: role.to_string(),
        exp,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        error!(error = %e, user_id = %user_id, "JWT encoding error");
        ApiError::InternalServer("jwt error".to_string())
    })
}

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!(error = %e, "Password hashing failed");
            ApiError::InternalServer("password hashing failed".to_string())
        })
}

pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            error!(error = %e, "Stored password hash is malformed");
            false
        }
    }
}
