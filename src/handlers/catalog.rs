// src/handlers/catalog.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::SqlitePool;

use crate::{error::AppError, services::catalog};

/// Lists all categories.
pub async fn list_categories(
    State(pool): State<SqlitePool>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(catalog::list_categories(&pool).await?))
}

/// Lists the quizzes of a category. 404 when the category does not exist.
pub async fn list_quizzes(
    State(pool): State<SqlitePool>,
    Path(category_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(catalog::list_quizzes(&pool, category_id).await?))
}
