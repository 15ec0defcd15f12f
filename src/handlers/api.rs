// src/handlers/api.rs

use axum::{Json, extract::State, response::IntoResponse};
use sqlx::SqlitePool;

use crate::{error::AppError, services::catalog};

/// All quizzes, every column as stored.
pub async fn list_quizzes(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(catalog::all_quizzes(&pool).await?))
}

/// All questions, every column as stored.
pub async fn list_questions(
    State(pool): State<SqlitePool>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(catalog::all_questions(&pool).await?))
}
