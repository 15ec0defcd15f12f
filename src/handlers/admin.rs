// src/handlers/admin.rs

//! Catalog authoring endpoints. Mounted behind auth + admin middleware.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        category::CategoryRequest,
        question::{CreateQuestionRequest, NewChoice, UpdateChoiceRequest, UpdateQuestionRequest},
        quiz::{CreateQuizRequest, UpdateQuizRequest},
    },
    services::admin::CatalogAdmin,
};

/// Row counts of the catalog tables.
pub async fn dashboard(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(pool.dashboard().await?))
}

pub async fn create_category(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let category = pool.create_category(payload.name.trim()).await?;

    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn rename_category(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    Ok(Json(pool.rename_category(id, payload.name.trim()).await?))
}

/// Deletes a category with all of its quizzes.
pub async fn delete_category(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    pool.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_quiz(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let quiz = pool.create_quiz(&payload).await?;

    Ok((StatusCode::CREATED, Json(quiz)))
}

pub async fn update_quiz(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    Ok(Json(pool.update_quiz(id, &payload).await?))
}

pub async fn delete_quiz(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    pool.delete_quiz(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn duplicate_quiz(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let copy = pool.duplicate_quiz(id).await?;
    tracing::info!("Duplicated quiz {} as {}", id, copy.id);

    Ok((StatusCode::CREATED, Json(copy)))
}

/// Creates a question with its choices. At least one choice must be correct.
pub async fn create_question(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let question = pool.create_question(&payload).await?;

    Ok((StatusCode::CREATED, Json(question)))
}

pub async fn update_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    Ok(Json(pool.update_question(id, &payload.text).await?))
}

pub async fn delete_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    pool.delete_question(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_choice(
    State(pool): State<SqlitePool>,
    Path(question_id): Path<i64>,
    Json(payload): Json<NewChoice>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let choice = pool.add_choice(question_id, &payload).await?;

    Ok((StatusCode::CREATED, Json(choice)))
}

pub async fn update_choice(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateChoiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    Ok(Json(pool.update_choice(id, &payload).await?))
}

pub async fn delete_choice(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    pool.delete_choice(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
