// src/handlers/auth.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::{AppError, is_unique_violation, is_unique_violation_on},
    models::user::{LoginRequest, SignupRequest, User},
    utils::{
        hash::{hash_password, verify_password},
        jwt::{Claims, sign_jwt},
    },
};

/// Registers a new user and logs them in.
///
/// Rejects mismatched passwords and an email that is already in use.
/// Returns 201 Created with the user object (excluding password) and a token.
pub async fn signup(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if payload.password1 != payload.confirm_password {
        return Err(AppError::BadRequest("Passwords do not match".to_string()));
    }

    let email_taken: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(&payload.email)
        .fetch_optional(&pool)
        .await?;
    if email_taken.is_some() {
        return Err(AppError::BadRequest("Email is already in use".to_string()));
    }

    let hashed_password = hash_password(&payload.password1)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, email, password)
        VALUES ($1, $2, $3)
        RETURNING id, username, email, password, role, created_at
        "#,
    )
    .bind(&payload.username)
    .bind(&payload.email)
    .bind(&hashed_password)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        // A concurrent signup may claim the email between the check above and this insert
        if is_unique_violation_on(&e, "users.email") {
            AppError::BadRequest("Email is already in use".to_string())
        } else if is_unique_violation(&e) {
            AppError::Conflict(format!("Username '{}' already exists", payload.username))
        } else {
            tracing::error!("Failed to register user: {:?}", e);
            AppError::from(e)
        }
    })?;

    let token = sign_jwt(user.id, &user.role, &config.jwt_secret, config.jwt_expiration)?;
    tracing::info!("Account created for {}", user.username);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "user": user,
            "token": token,
            "type": "Bearer",
            "message": "Account created successfully"
        })),
    ))
}

/// Authenticates a user and returns a JWT token.
pub async fn login(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, password, role, created_at
        FROM users
        WHERE username = $1
        "#,
    )
    .bind(&payload.username)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Login DB error: {:?}", e);
        AppError::from(e)
    })?
    .ok_or(AppError::AuthError("Invalid username or password".to_string()))?;

    if !verify_password(&payload.password, &user.password)? {
        return Err(AppError::AuthError("Invalid username or password".to_string()));
    }

    let token = sign_jwt(user.id, &user.role, &config.jwt_secret, config.jwt_expiration)?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "message": "Logged in successfully"
    })))
}

/// Acknowledges a logout. Tokens are stateless, the client drops its copy.
pub async fn logout(Extension(claims): Extension<Claims>) -> Result<impl IntoResponse, AppError> {
    tracing::debug!("User {} logged out", claims.user_id()?);

    Ok(Json(json!({ "message": "Logged out successfully" })))
}
